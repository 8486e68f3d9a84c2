//! Pointer gesture recognition.
//!
//! Mouse and touch input arrive here as id-tagged [`PointerInput`]s in
//! screen pixels. The controller tracks one [`PointerSession`] per active
//! pointer and runs a small state machine over them:
//!
//! ```text
//! Idle ──press on node──▶ NodeDragging ──release──▶ Idle
//!  │
//!  └─press on empty──▶ PendingTap ──moved ≥ threshold──▶ Pan
//!                          │                              │
//!                          └──────second pointer──────────┴──▶ Pinch
//! ```
//!
//! A release that never moved past `tapThreshold` within `tapTimeoutMs`
//! is a tap and runs selection. Anything observers should hear about is
//! queued and drained with [`GestureController::take_events`].

use std::collections::HashMap;

use log::trace;

use super::events::{DragPhase, NodeDragEvent};
use super::hit::HitTester;
use super::options::GraphOptions;
use super::simulation::{DRAG_ENERGY, SimulationBridge};
use super::store::GraphStore;
use super::view::ViewTransform;

/// Zoom factor applied per wheel notch.
const WHEEL_ZOOM_IN: f64 = 1.1;
const WHEEL_ZOOM_OUT: f64 = 0.9;

/// Identifies one pointer for the duration of its contact.
pub type PointerId = i64;

/// A pointer sample in screen pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerInput {
	/// Pointer identity.
	pub id: PointerId,
	/// Screen x in CSS pixels.
	pub x: f64,
	/// Screen y in CSS pixels.
	pub y: f64,
	/// Event timestamp in milliseconds.
	pub time_ms: f64,
}

impl PointerInput {
	/// Creates a sample.
	pub fn new(id: PointerId, x: f64, y: f64, time_ms: f64) -> Self {
		Self { id, x, y, time_ms }
	}

	fn position(&self) -> (f64, f64) {
		(self.x, self.y)
	}
}

/// Bookkeeping for one active pointer.
#[derive(Clone, Debug, PartialEq)]
pub struct PointerSession {
	/// Screen position at press.
	pub start: (f64, f64),
	/// Most recent screen position.
	pub last: (f64, f64),
	/// Timestamp of the press.
	pub start_time_ms: f64,
	/// Only the primary pointer may produce a tap.
	pub is_primary: bool,
	/// Set once the pointer moved past the tap threshold or joined a pinch.
	pub mutated: bool,
}

impl PointerSession {
	fn new(input: &PointerInput) -> Self {
		Self {
			start: input.position(),
			last: input.position(),
			start_time_ms: input.time_ms,
			is_primary: false,
			mutated: false,
		}
	}
}

/// Gestures that move the view rather than a node.
#[derive(Clone, Debug, PartialEq)]
pub enum ViewGesture {
	/// One pointer drags the view.
	Pan {
		/// The dragging pointer.
		pointer: PointerId,
	},
	/// Two pointers pan and zoom together.
	Pinch {
		/// The pointer that started the view gesture.
		first: PointerId,
		/// The pointer that joined it.
		second: PointerId,
		/// Screen distance between the two pointers at the last update.
		distance: f64,
		/// Screen midpoint at the last update.
		midpoint: (f64, f64),
	},
}

/// What the active pointers are currently doing.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum GestureState {
	/// No gesture in progress.
	#[default]
	Idle,
	/// Pressed on empty space; becomes a pan once it moves far enough.
	PendingTap {
		/// The pressed pointer.
		pointer: PointerId,
	},
	/// A node follows the pointer.
	NodeDragging {
		/// The dragging pointer.
		pointer: PointerId,
		/// The grabbed node.
		node_id: String,
	},
	/// The view is being moved.
	ViewGesture(ViewGesture),
}

/// Something observers of the widget should be told about.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GraphEvent {
	/// A node was tapped. `None` means node selection was cleared.
	NodeClick(Option<String>),
	/// A link was tapped. `None` means link selection was cleared.
	LinkClick(Option<String>),
	/// A drag started, moved or ended.
	NodeDrag(NodeDragEvent),
}

/// Everything a gesture may touch, borrowed for the duration of one event.
pub struct GestureTarget<'a, N, E> {
	/// Nodes, edges and selection.
	pub store: &'a mut GraphStore<N, E>,
	/// Current pan and zoom.
	pub view: &'a mut ViewTransform,
	/// Layout engine, for drag energy.
	pub bridge: &'a mut dyn SimulationBridge<N, E>,
}

/// Turns raw pointer input into drags, pans, pinches and taps.
pub struct GestureController {
	tap_threshold: f64,
	tap_timeout_ms: f64,
	hit: HitTester,
	sessions: HashMap<PointerId, PointerSession>,
	state: GestureState,
	events: Vec<GraphEvent>,
	redraw: bool,
}

impl GestureController {
	/// Creates an idle controller using the tap and hit settings from `options`.
	pub fn new(options: &GraphOptions) -> Self {
		Self {
			tap_threshold: options.tap_threshold,
			tap_timeout_ms: options.tap_timeout_ms,
			hit: HitTester::new(options),
			sessions: HashMap::new(),
			state: GestureState::Idle,
			events: Vec::new(),
			redraw: false,
		}
	}

	/// Current gesture.
	pub fn state(&self) -> &GestureState {
		&self.state
	}

	/// Session of an active pointer.
	pub fn session(&self, id: PointerId) -> Option<&PointerSession> {
		self.sessions.get(&id)
	}

	/// Number of pointers currently down.
	pub fn active_pointers(&self) -> usize {
		self.sessions.len()
	}

	/// Id of the node being dragged, if any.
	pub fn dragged_node(&self) -> Option<&str> {
		match &self.state {
			GestureState::NodeDragging { node_id, .. } => Some(node_id),
			_ => None,
		}
	}

	/// Drains queued events in the order they happened.
	pub fn take_events(&mut self) -> Vec<GraphEvent> {
		std::mem::take(&mut self.events)
	}

	/// Whether anything visible changed since the last call.
	pub fn take_redraw(&mut self) -> bool {
		std::mem::replace(&mut self.redraw, false)
	}

	/// A pointer made contact.
	///
	/// From idle the press either grabs the node under it or waits to see
	/// whether it becomes a tap or a pan. A second pointer during a pending
	/// tap or pan turns the gesture into a pinch. Further pointers are
	/// tracked but do not change the gesture.
	pub fn pointer_down<N, E>(&mut self, input: PointerInput, target: &mut GestureTarget<'_, N, E>) {
		if self.sessions.contains_key(&input.id) {
			return;
		}
		let mut session = PointerSession::new(&input);

		let pinch_anchor = match self.state {
			GestureState::PendingTap { pointer }
			| GestureState::ViewGesture(ViewGesture::Pan { pointer }) => Some(pointer),
			_ => None,
		};

		if matches!(self.state, GestureState::Idle) {
			session.is_primary = true;
			let (wx, wy) = target.view.to_world(input.x, input.y);
			let hit = self
				.hit
				.nearest_node(target.store, wx, wy, target.view.scale())
				.map(|n| n.id.clone());
			match hit {
				Some(node_id) => {
					target.store.pin(&node_id, wx, wy);
					target.bridge.reheat(DRAG_ENERGY);
					trace!("gesture: drag start on `{node_id}`");
					self.events.push(GraphEvent::NodeDrag(NodeDragEvent {
						phase: DragPhase::Start,
						node_id: node_id.clone(),
					}));
					self.state = GestureState::NodeDragging {
						pointer: input.id,
						node_id,
					};
					self.redraw = true;
				}
				None => {
					self.state = GestureState::PendingTap { pointer: input.id };
				}
			}
		} else if let Some(first) = pinch_anchor {
			if let Some(anchor) = self.sessions.get_mut(&first) {
				anchor.mutated = true;
				let a = anchor.last;
				let b = input.position();
				session.mutated = true;
				trace!("gesture: pinch between {first} and {}", input.id);
				self.state = GestureState::ViewGesture(ViewGesture::Pinch {
					first,
					second: input.id,
					distance: distance(a, b),
					midpoint: midpoint(a, b),
				});
			}
		}

		self.sessions.insert(input.id, session);
	}

	/// A tracked pointer moved. Unknown pointers are ignored.
	pub fn pointer_move<N, E>(&mut self, input: PointerInput, target: &mut GestureTarget<'_, N, E>) {
		let pos = input.position();
		let (start, previous) = match self.sessions.get_mut(&input.id) {
			Some(session) => {
				let previous = session.last;
				session.last = pos;
				(session.start, previous)
			}
			None => return,
		};
		let moved_far = distance(start, pos) >= self.tap_threshold;

		match &self.state {
			GestureState::NodeDragging { pointer, node_id } if *pointer == input.id => {
				let node_id = node_id.clone();
				let (wx, wy) = target.view.to_world(pos.0, pos.1);
				target.store.pin(&node_id, wx, wy);
				if moved_far {
					self.mark_mutated(input.id);
				}
				self.events.push(GraphEvent::NodeDrag(NodeDragEvent {
					phase: DragPhase::Drag,
					node_id,
				}));
				self.redraw = true;
			}
			GestureState::PendingTap { pointer } if *pointer == input.id => {
				if moved_far {
					target.view.apply_pan(pos.0 - start.0, pos.1 - start.1);
					self.mark_mutated(input.id);
					self.state = GestureState::ViewGesture(ViewGesture::Pan { pointer: input.id });
					self.redraw = true;
				}
			}
			GestureState::ViewGesture(ViewGesture::Pan { pointer }) if *pointer == input.id => {
				target.view.apply_pan(pos.0 - previous.0, pos.1 - previous.1);
				self.redraw = true;
			}
			GestureState::ViewGesture(ViewGesture::Pinch {
				first,
				second,
				distance: last_distance,
				midpoint: last_midpoint,
			}) if input.id == *first || input.id == *second => {
				let (first, second) = (*first, *second);
				let (last_distance, last_midpoint) = (*last_distance, *last_midpoint);
				let (Some(a), Some(b)) = (
					self.sessions.get(&first).map(|s| s.last),
					self.sessions.get(&second).map(|s| s.last),
				) else {
					return;
				};
				let (d, m) = (distance(a, b), midpoint(a, b));
				target
					.view
					.apply_pan(m.0 - last_midpoint.0, m.1 - last_midpoint.1);
				if last_distance > f64::EPSILON && d > f64::EPSILON {
					target.view.apply_zoom(m, d / last_distance);
				}
				self.state = GestureState::ViewGesture(ViewGesture::Pinch {
					first,
					second,
					distance: d,
					midpoint: m,
				});
				self.redraw = true;
			}
			_ => {}
		}
	}

	/// A tracked pointer lifted. May resolve to a tap.
	pub fn pointer_up<N, E>(&mut self, input: PointerInput, target: &mut GestureTarget<'_, N, E>) {
		self.release(input.id, Some(input), target);
	}

	/// A tracked pointer was cancelled or left the canvas.
	///
	/// Ends the gesture like a release but never counts as a tap.
	pub fn pointer_cancel<N, E>(&mut self, id: PointerId, target: &mut GestureTarget<'_, N, E>) {
		self.release(id, None, target);
	}

	/// Cancels every active pointer, ending any drag.
	pub fn cancel_all<N, E>(&mut self, target: &mut GestureTarget<'_, N, E>) {
		let ids: Vec<PointerId> = self.sessions.keys().copied().collect();
		for id in ids {
			self.release(id, None, target);
		}
		self.state = GestureState::Idle;
	}

	/// Wheel zoom about the cursor. Negative `delta_y` zooms in.
	pub fn wheel(&mut self, x: f64, y: f64, delta_y: f64, view: &mut ViewTransform) {
		if delta_y == 0.0 || !delta_y.is_finite() {
			return;
		}
		let factor = if delta_y < 0.0 {
			WHEEL_ZOOM_IN
		} else {
			WHEEL_ZOOM_OUT
		};
		view.apply_zoom((x, y), factor);
		self.redraw = true;
	}

	fn release<N, E>(
		&mut self,
		id: PointerId,
		input: Option<PointerInput>,
		target: &mut GestureTarget<'_, N, E>,
	) {
		let Some(session) = self.sessions.remove(&id) else {
			return;
		};

		match &self.state {
			GestureState::NodeDragging { pointer, node_id } if *pointer == id => {
				let node_id = node_id.clone();
				if !target.store.selection().is_node(&node_id) {
					target.store.unpin(&node_id);
				}
				target.bridge.cool();
				trace!("gesture: drag end on `{node_id}`");
				self.events.push(GraphEvent::NodeDrag(NodeDragEvent {
					phase: DragPhase::End,
					node_id,
				}));
				self.state = GestureState::Idle;
				self.redraw = true;
			}
			GestureState::PendingTap { pointer }
			| GestureState::ViewGesture(ViewGesture::Pan { pointer })
				if *pointer == id =>
			{
				self.state = GestureState::Idle;
			}
			GestureState::ViewGesture(ViewGesture::Pinch { first, second, .. })
				if id == *first || id == *second =>
			{
				let remaining = if id == *first { *second } else { *first };
				self.state = match self.sessions.get_mut(&remaining) {
					Some(other) => {
						other.is_primary = true;
						GestureState::ViewGesture(ViewGesture::Pan { pointer: remaining })
					}
					None => GestureState::Idle,
				};
			}
			_ => {}
		}

		if let Some(input) = input {
			if self.is_tap(&session, &input) {
				self.perform_selection(input.x, input.y, target);
			}
		}
	}

	fn is_tap(&self, session: &PointerSession, input: &PointerInput) -> bool {
		session.is_primary
			&& !session.mutated
			&& input.time_ms - session.start_time_ms < self.tap_timeout_ms
			&& distance(session.start, input.position()) < self.tap_threshold
	}

	fn mark_mutated(&mut self, id: PointerId) {
		if let Some(session) = self.sessions.get_mut(&id) {
			session.mutated = true;
		}
	}

	/// Toggles selection for whatever lies under a tap at `(sx, sy)`.
	///
	/// Nodes take precedence over links. Tapping the selected element
	/// clears it, tapping empty space clears both kinds.
	fn perform_selection<N, E>(&mut self, sx: f64, sy: f64, target: &mut GestureTarget<'_, N, E>) {
		let (wx, wy) = target.view.to_world(sx, sy);
		let k = target.view.scale();
		let node = self
			.hit
			.nearest_node(target.store, wx, wy, k)
			.map(|n| n.id.clone());
		let link = match node {
			Some(_) => None,
			None => self
				.hit
				.nearest_edge(target.store, wx, wy, k)
				.map(|e| e.id.clone()),
		};

		let store = &mut *target.store;
		match (node, link) {
			(Some(id), _) => {
				if store.selection().is_node(&id) {
					store.deselect_node();
					self.events.push(GraphEvent::NodeClick(None));
				} else {
					let had_link = store.selection().link.is_some();
					store.select_node(&id);
					self.events.push(GraphEvent::NodeClick(Some(id)));
					if had_link {
						self.events.push(GraphEvent::LinkClick(None));
					}
				}
			}
			(None, Some(id)) => {
				if store.selection().is_link(&id) {
					store.deselect_link();
					self.events.push(GraphEvent::LinkClick(None));
				} else {
					let had_node = store.selection().node.is_some();
					store.select_link(&id);
					self.events.push(GraphEvent::LinkClick(Some(id)));
					if had_node {
						self.events.push(GraphEvent::NodeClick(None));
					}
				}
			}
			(None, None) => {
				store.clear_selection();
				self.events.push(GraphEvent::NodeClick(None));
				self.events.push(GraphEvent::LinkClick(None));
			}
		}
		self.redraw = true;
	}
}

fn distance(a: (f64, f64), b: (f64, f64)) -> f64 {
	((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt()
}

fn midpoint(a: (f64, f64), b: (f64, f64)) -> (f64, f64) {
	((a.0 + b.0) / 2.0, (a.1 + b.1) / 2.0)
}
