//! Widget core: store, view, gestures and layout engine wired together.
//!
//! [`ForceGraphState`] owns everything the canvas component needs and exposes
//! the public widget operations. It has no DOM dependency, so hosts and tests
//! can drive it directly. [`ForceGraphHandle`] wraps it in shared ownership
//! and delivers observer callbacks only after the state is released, so an
//! observer may call straight back into the widget.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::f64::consts::PI;
use std::rc::Rc;

use log::{debug, info, warn};

use super::events::{EventHub, NodeDragEvent, Subscription};
use super::gesture::{GestureController, GestureState, GestureTarget, GraphEvent, PointerId, PointerInput};
use super::options::GraphOptions;
use super::simulation::{ForceLayout, SimulationBridge};
use super::store::{GraphStore, Selection};
use super::types::{Edge, GraphData, Node};
use super::view::{ViewAnimation, ViewTransform};

/// Radius of the ring unplaced nodes start on.
const SEED_RADIUS: f64 = 100.0;

/// Observer lists, one per event kind.
struct Hubs<N, E> {
	node_click: EventHub<Option<Node<N>>>,
	link_click: EventHub<Option<Edge<E>>>,
	node_drag: EventHub<NodeDragEvent>,
}

impl<N, E> Clone for Hubs<N, E> {
	fn clone(&self) -> Self {
		Self {
			node_click: self.node_click.clone(),
			link_click: self.link_click.clone(),
			node_drag: self.node_drag.clone(),
		}
	}
}

enum Notice<N, E> {
	NodeClick(Option<Node<N>>),
	LinkClick(Option<Edge<E>>),
	NodeDrag(NodeDragEvent),
}

/// Observer notifications collected while the widget was borrowed.
#[must_use = "observers are only notified by `deliver`"]
pub struct PendingEvents<N, E> {
	hubs: Hubs<N, E>,
	notices: Vec<Notice<N, E>>,
}

impl<N: 'static, E: 'static> PendingEvents<N, E> {
	/// Number of queued notifications.
	pub fn len(&self) -> usize {
		self.notices.len()
	}

	/// Whether nothing is queued.
	pub fn is_empty(&self) -> bool {
		self.notices.is_empty()
	}

	/// Notifies observers in the order the events happened.
	pub fn deliver(self) {
		for notice in self.notices {
			match notice {
				Notice::NodeClick(node) => self.hubs.node_click.emit(&node),
				Notice::LinkClick(edge) => self.hubs.link_click.emit(&edge),
				Notice::NodeDrag(event) => self.hubs.node_drag.emit(&event),
			}
		}
	}
}

/// Interactive graph widget without a drawing surface.
///
/// Created once when the component mounts, then fed pointer input and
/// frame ticks. `tick` advances view animation, settle timers and the
/// layout engine; `take_redraw` reports whether a frame must be drawn.
pub struct ForceGraphState<N, E> {
	options: GraphOptions,
	store: GraphStore<N, E>,
	view: ViewTransform,
	reset: Option<ViewAnimation>,
	gestures: GestureController,
	bridge: Box<dyn SimulationBridge<N, E>>,
	width: f64,
	height: f64,
	fit_requested: bool,
	redraw: Rc<Cell<bool>>,
	hubs: Hubs<N, E>,
	pending: Vec<Notice<N, E>>,
}

impl<N, E> ForceGraphState<N, E>
where
	N: Clone + 'static,
	E: Clone + 'static,
{
	/// Creates the widget state around a layout engine.
	///
	/// When the data carries no positions at all, nodes start on a ring
	/// around the view centre.
	pub fn new(
		data: GraphData<N, E>,
		options: GraphOptions,
		mut bridge: Box<dyn SimulationBridge<N, E>>,
		width: f64,
		height: f64,
	) -> Self {
		let options = options.sanitized();
		let redraw = Rc::new(Cell::new(true));
		let flag = redraw.clone();
		bridge.on_tick(Box::new(move || flag.set(true)));

		let mut state = Self {
			store: GraphStore::new(&options),
			view: ViewTransform::identity(options.min_zoom, options.max_zoom),
			reset: None,
			gestures: GestureController::new(&options),
			bridge,
			width,
			height,
			fit_requested: false,
			redraw,
			hubs: Hubs {
				node_click: EventHub::new(),
				link_click: EventHub::new(),
				node_drag: EventHub::new(),
			},
			pending: Vec::new(),
			options,
		};
		state.update_data(data);
		info!(
			"graph: initialized with {} nodes, {} links",
			state.store.nodes().len(),
			state.store.edges().len()
		);
		state
	}

	/// Creates the widget state driven by [`ForceLayout`].
	pub fn with_force_layout(data: GraphData<N, E>, options: GraphOptions, width: f64, height: f64) -> Self {
		let bridge = Box::new(ForceLayout::new(&options.sanitized()));
		Self::new(data, options, bridge, width, height)
	}

	/// Effective options.
	pub fn options(&self) -> &GraphOptions {
		&self.options
	}

	/// Nodes, edges and selection.
	pub fn store(&self) -> &GraphStore<N, E> {
		&self.store
	}

	/// Current pan and zoom.
	pub fn view(&self) -> &ViewTransform {
		&self.view
	}

	/// Current selection.
	pub fn selection(&self) -> &Selection {
		self.store.selection()
	}

	/// Current gesture.
	pub fn gesture(&self) -> &GestureState {
		self.gestures.state()
	}

	/// Id of the node being dragged, if any.
	pub fn dragged_node(&self) -> Option<&str> {
		self.gestures.dragged_node()
	}

	/// Canvas size in CSS pixels.
	pub fn size(&self) -> (f64, f64) {
		(self.width, self.height)
	}

	/// Layout engine energy.
	pub fn energy(&self) -> f64 {
		self.bridge.energy()
	}

	/// Whether a reset animation is in flight.
	pub fn is_resetting(&self) -> bool {
		self.reset.is_some()
	}

	/// World point under the centre of the canvas.
	pub fn view_center(&self) -> (f64, f64) {
		self.view.to_world(self.width / 2.0, self.height / 2.0)
	}

	/// Inserts a node near the view centre, or near `connect_to`.
	///
	/// A rejected insert is logged and leaves the graph unchanged.
	pub fn add_node(&mut self, node: Node<N>, connect_to: Option<&str>) -> bool
	where
		E: Default,
	{
		let center = self.view_center();
		match self.store.add_node(node, connect_to, center, self.bridge.as_mut()) {
			Ok(()) => {
				self.redraw.set(true);
				true
			}
			Err(err) => {
				warn!("graph: {err}");
				false
			}
		}
	}

	/// Inserts an edge between two existing nodes.
	pub fn add_edge(&mut self, edge: Edge<E>) -> bool {
		match self.store.add_edge(edge, self.bridge.as_mut()) {
			Ok(()) => {
				self.redraw.set(true);
				true
			}
			Err(err) => {
				warn!("graph: {err}");
				false
			}
		}
	}

	/// Removes a node and its edges. Absent ids are ignored.
	///
	/// A selection cleared by the removal is reported as a null click.
	pub fn remove_node(&mut self, id: &str) -> Option<Node<N>> {
		if self.gestures.dragged_node() == Some(id) {
			self.cancel_gestures();
		}
		let before = self.store.selection().clone();
		let removed = self.store.remove_node(id, self.bridge.as_mut());
		if removed.is_some() {
			self.report_cleared(before);
			self.redraw.set(true);
		}
		removed
	}

	/// Replaces the whole graph. Links that do not resolve are dropped, and
	/// a previous selection is reported as cleared.
	pub fn update_data(&mut self, mut data: GraphData<N, E>) {
		self.cancel_gestures();
		let center = self.view_center();
		spread_unplaced(&mut data.nodes, center);
		let before = self.store.selection().clone();
		let dropped = self.store.update_data(data, self.bridge.as_mut());
		self.report_cleared(before);
		if dropped > 0 {
			debug!("graph: dropped {dropped} unresolved or repeated link(s)");
		}
		self.redraw.set(true);
	}

	/// Starts an animated return to the identity transform.
	pub fn reset_view(&mut self) {
		self.reset = Some(ViewAnimation::to_identity(self.view, self.options.reset_duration_ms));
		self.redraw.set(true);
	}

	/// Records a new canvas size.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
		self.redraw.set(true);
	}

	/// Asks the drawing surface to re-measure its container and resize to it.
	pub fn request_fit(&mut self) {
		self.fit_requested = true;
	}

	/// Whether a fit was requested since the last call.
	pub fn take_fit_request(&mut self) -> bool {
		std::mem::take(&mut self.fit_requested)
	}

	/// Registers a node click observer. `None` means node selection was cleared.
	pub fn on_node_click(&self, callback: impl FnMut(&Option<Node<N>>) + 'static) -> Subscription {
		self.hubs.node_click.subscribe(callback)
	}

	/// Registers a link click observer. `None` means link selection was cleared.
	pub fn on_link_click(&self, callback: impl FnMut(&Option<Edge<E>>) + 'static) -> Subscription {
		self.hubs.link_click.subscribe(callback)
	}

	/// Registers a node drag observer.
	pub fn on_node_drag(&self, callback: impl FnMut(&NodeDragEvent) + 'static) -> Subscription {
		self.hubs.node_drag.subscribe(callback)
	}

	/// A pointer made contact. Cancels a running reset animation.
	pub fn pointer_down(&mut self, input: PointerInput) {
		self.reset = None;
		self.with_gestures(|gestures, target| gestures.pointer_down(input, target));
	}

	/// A pointer moved.
	pub fn pointer_move(&mut self, input: PointerInput) {
		self.with_gestures(|gestures, target| gestures.pointer_move(input, target));
	}

	/// A pointer lifted.
	pub fn pointer_up(&mut self, input: PointerInput) {
		self.with_gestures(|gestures, target| gestures.pointer_up(input, target));
	}

	/// A pointer was cancelled or left the canvas.
	pub fn pointer_cancel(&mut self, id: PointerId) {
		self.with_gestures(|gestures, target| gestures.pointer_cancel(id, target));
	}

	/// Wheel zoom about the cursor.
	pub fn wheel(&mut self, x: f64, y: f64, delta_y: f64) {
		self.reset = None;
		self.gestures.wheel(x, y, delta_y, &mut self.view);
		self.collect_events();
	}

	/// Advances the widget by `dt_ms` milliseconds.
	pub fn tick(&mut self, dt_ms: f64) {
		if let Some(animation) = &mut self.reset {
			if animation.advance(&mut self.view, dt_ms) {
				self.reset = None;
			}
			self.redraw.set(true);
		}

		let held = self.gestures.dragged_node().map(str::to_string);
		let released = self.store.advance(dt_ms, held.as_deref());
		if !released.is_empty() {
			debug!("graph: settled {}", released.join(", "));
			if held.is_none() {
				self.bridge.cool();
			}
			self.redraw.set(true);
		}

		self.bridge.step(self.store.nodes_mut(), dt_ms / 1000.0);
	}

	/// Whether a frame must be drawn. Clears the request.
	pub fn take_redraw(&mut self) -> bool {
		self.redraw.replace(false)
	}

	/// Notifications queued since the last call.
	pub fn take_events(&mut self) -> PendingEvents<N, E> {
		PendingEvents {
			hubs: self.hubs.clone(),
			notices: std::mem::take(&mut self.pending),
		}
	}

	fn with_gestures(&mut self, f: impl FnOnce(&mut GestureController, &mut GestureTarget<'_, N, E>)) {
		let mut target = GestureTarget {
			store: &mut self.store,
			view: &mut self.view,
			bridge: self.bridge.as_mut(),
		};
		f(&mut self.gestures, &mut target);
		self.collect_events();
	}

	fn cancel_gestures(&mut self) {
		self.with_gestures(|gestures, target| gestures.cancel_all(target));
	}

	/// Queues a null click for each part of `before` a structural change cleared.
	fn report_cleared(&mut self, before: Selection) {
		let now = self.store.selection();
		let node_cleared = before.node.is_some() && now.node.is_none();
		let link_cleared = before.link.is_some() && now.link.is_none();
		if node_cleared {
			self.pending.push(Notice::NodeClick(None));
		}
		if link_cleared {
			self.pending.push(Notice::LinkClick(None));
		}
	}

	fn collect_events(&mut self) {
		for event in self.gestures.take_events() {
			let notice = match event {
				GraphEvent::NodeClick(id) => {
					Notice::NodeClick(id.and_then(|id| self.store.node(&id).cloned()))
				}
				GraphEvent::LinkClick(id) => {
					Notice::LinkClick(id.and_then(|id| self.store.edge(&id).cloned()))
				}
				GraphEvent::NodeDrag(event) => Notice::NodeDrag(event),
			};
			self.pending.push(notice);
		}
		if self.gestures.take_redraw() {
			self.redraw.set(true);
		}
	}
}

/// Puts nodes on a ring around `center` when none of them has a position.
fn spread_unplaced<N>(nodes: &mut [Node<N>], center: (f64, f64)) {
	let unplaced = nodes
		.iter()
		.all(|n| n.x == 0.0 && n.y == 0.0 && !n.is_pinned());
	if !unplaced || nodes.len() < 2 {
		return;
	}
	let count = nodes.len() as f64;
	for (i, node) in nodes.iter_mut().enumerate() {
		let angle = i as f64 * 2.0 * PI / count;
		node.x = center.0 + SEED_RADIUS * angle.cos();
		node.y = center.1 + SEED_RADIUS * angle.sin();
	}
}

/// Shared handle to a [`ForceGraphState`].
///
/// Every operation borrows the state, applies the change, releases the
/// borrow and only then notifies observers. Changes made by an observer are
/// queued and delivered after the current batch, in order.
pub struct ForceGraphHandle<N, E> {
	state: Rc<RefCell<ForceGraphState<N, E>>>,
	outbox: Rc<RefCell<VecDeque<PendingEvents<N, E>>>>,
	delivering: Rc<Cell<bool>>,
}

impl<N, E> Clone for ForceGraphHandle<N, E> {
	fn clone(&self) -> Self {
		Self {
			state: self.state.clone(),
			outbox: self.outbox.clone(),
			delivering: self.delivering.clone(),
		}
	}
}

impl<N, E> ForceGraphHandle<N, E>
where
	N: Clone + 'static,
	E: Clone + 'static,
{
	/// Takes ownership of `state`.
	pub fn new(state: ForceGraphState<N, E>) -> Self {
		Self {
			state: Rc::new(RefCell::new(state)),
			outbox: Rc::new(RefCell::new(VecDeque::new())),
			delivering: Rc::new(Cell::new(false)),
		}
	}

	/// Reads the state.
	pub fn with<R>(&self, f: impl FnOnce(&ForceGraphState<N, E>) -> R) -> R {
		f(&self.state.borrow())
	}

	fn update<R>(&self, f: impl FnOnce(&mut ForceGraphState<N, E>) -> R) -> R {
		let (result, pending) = {
			let mut state = self.state.borrow_mut();
			let result = f(&mut state);
			(result, state.take_events())
		};
		if !pending.is_empty() {
			self.outbox.borrow_mut().push_back(pending);
		}
		self.flush();
		result
	}

	/// Delivers queued notifications unless an outer call is already doing so.
	fn flush(&self) {
		if self.delivering.replace(true) {
			return;
		}
		loop {
			let next = self.outbox.borrow_mut().pop_front();
			match next {
				Some(pending) => pending.deliver(),
				None => break,
			}
		}
		self.delivering.set(false);
	}

	/// See [`ForceGraphState::add_node`].
	pub fn add_node(&self, node: Node<N>, connect_to: Option<&str>) -> bool
	where
		E: Default,
	{
		self.update(|s| s.add_node(node, connect_to))
	}

	/// See [`ForceGraphState::add_edge`].
	pub fn add_edge(&self, edge: Edge<E>) -> bool {
		self.update(|s| s.add_edge(edge))
	}

	/// See [`ForceGraphState::remove_node`].
	pub fn remove_node(&self, id: &str) -> Option<Node<N>> {
		self.update(|s| s.remove_node(id))
	}

	/// See [`ForceGraphState::update_data`].
	pub fn update_data(&self, data: GraphData<N, E>) {
		self.update(|s| s.update_data(data));
	}

	/// See [`ForceGraphState::reset_view`].
	pub fn reset_view(&self) {
		self.update(|s| s.reset_view());
	}

	/// See [`ForceGraphState::resize`]. The canvas follows on the next frame.
	pub fn resize(&self, width: f64, height: f64) {
		self.update(|s| s.resize(width, height));
	}

	/// Re-measures the container on the next frame and resizes to it.
	pub fn fit(&self) {
		self.state.borrow_mut().request_fit();
	}

	/// See [`ForceGraphState::take_fit_request`].
	pub fn take_fit_request(&self) -> bool {
		self.state.borrow_mut().take_fit_request()
	}

	/// See [`ForceGraphState::on_node_click`].
	pub fn on_node_click(&self, callback: impl FnMut(&Option<Node<N>>) + 'static) -> Subscription {
		self.state.borrow().on_node_click(callback)
	}

	/// See [`ForceGraphState::on_link_click`].
	pub fn on_link_click(&self, callback: impl FnMut(&Option<Edge<E>>) + 'static) -> Subscription {
		self.state.borrow().on_link_click(callback)
	}

	/// See [`ForceGraphState::on_node_drag`].
	pub fn on_node_drag(&self, callback: impl FnMut(&NodeDragEvent) + 'static) -> Subscription {
		self.state.borrow().on_node_drag(callback)
	}

	/// See [`ForceGraphState::pointer_down`].
	pub fn pointer_down(&self, input: PointerInput) {
		self.update(|s| s.pointer_down(input));
	}

	/// See [`ForceGraphState::pointer_move`].
	pub fn pointer_move(&self, input: PointerInput) {
		self.update(|s| s.pointer_move(input));
	}

	/// See [`ForceGraphState::pointer_up`].
	pub fn pointer_up(&self, input: PointerInput) {
		self.update(|s| s.pointer_up(input));
	}

	/// See [`ForceGraphState::pointer_cancel`].
	pub fn pointer_cancel(&self, id: PointerId) {
		self.update(|s| s.pointer_cancel(id));
	}

	/// See [`ForceGraphState::wheel`].
	pub fn wheel(&self, x: f64, y: f64, delta_y: f64) {
		self.update(|s| s.wheel(x, y, delta_y));
	}

	/// See [`ForceGraphState::tick`].
	pub fn tick(&self, dt_ms: f64) {
		self.update(|s| s.tick(dt_ms));
	}

	/// See [`ForceGraphState::take_redraw`].
	pub fn take_redraw(&self) -> bool {
		self.state.borrow_mut().take_redraw()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::force_graph::events::DragPhase;
	use crate::components::force_graph::simulation::StaticLayout;
	use crate::components::force_graph::types::EdgeInput;

	fn state(nodes: Vec<Node<()>>, links: Vec<EdgeInput<()>>) -> ForceGraphState<(), ()> {
		ForceGraphState::new(
			GraphData { nodes, links },
			GraphOptions::default(),
			Box::new(StaticLayout::default()),
			800.0,
			600.0,
		)
	}

	#[test]
	fn positionless_data_is_spread_around_center() {
		let s = state(vec![Node::new("a", ()), Node::new("b", ())], vec![]);
		let a = s.store().node("a").unwrap();
		let b = s.store().node("b").unwrap();
		assert_eq!((a.x, a.y), (500.0, 300.0));
		assert!((b.x - 300.0).abs() < 1e-9);
	}

	#[test]
	fn positioned_data_is_kept() {
		let s = state(
			vec![Node::new("a", ()), Node::new("b", ()).at(5.0, 5.0)],
			vec![],
		);
		assert_eq!(s.store().node("a").unwrap().x, 0.0);
	}

	#[test]
	fn added_node_lands_near_view_center() {
		let mut s = state(vec![Node::new("a", ()).at(1.0, 1.0)], vec![]);
		assert!(s.add_node(Node::new("b", ()), None));
		let b = s.store().node("b").unwrap();
		assert!((b.x - 400.0).abs() <= 30.0 && (b.y - 300.0).abs() <= 30.0);
		assert!(!s.add_node(Node::new("b", ()), None));
		assert_eq!(s.store().nodes().len(), 2);
	}

	#[test]
	fn settle_releases_inserted_node_on_tick() {
		let mut s = state(vec![Node::new("a", ()).at(1.0, 1.0)], vec![]);
		s.add_node(Node::new("b", ()), None);
		s.tick(16.0);
		assert!(s.store().node("b").unwrap().is_pinned());
		for _ in 0..40 {
			s.tick(16.0);
		}
		assert!(!s.store().node("b").unwrap().is_pinned());
	}

	#[test]
	fn reset_view_animates_and_press_cancels() {
		let mut s = state(vec![Node::new("a", ()).at(1.0, 1.0)], vec![]);
		s.wheel(100.0, 100.0, -1.0);
		s.reset_view();
		s.tick(100.0);
		assert!(s.is_resetting());
		s.pointer_down(PointerInput::new(0, 700.0, 500.0, 0.0));
		assert!(!s.is_resetting());
		assert!(s.view().scale() > 1.0);

		s.reset_view();
		s.tick(1000.0);
		assert!(!s.is_resetting());
		assert_eq!(s.view().scale(), 1.0);
		assert_eq!(s.view().translation(), (0.0, 0.0));
	}

	#[test]
	fn removing_dragged_node_ends_drag() {
		let mut s = state(
			vec![Node::new("a", ()).at(10.0, 10.0), Node::new("b", ()).at(200.0, 10.0)],
			vec![EdgeInput::new("ab", "a", "b", ())],
		);
		let drags = Rc::new(RefCell::new(Vec::new()));
		let seen = drags.clone();
		s.on_node_drag(move |e| seen.borrow_mut().push(e.phase)).detach();

		s.pointer_down(PointerInput::new(0, 10.0, 10.0, 0.0));
		assert_eq!(s.dragged_node(), Some("a"));
		s.remove_node("a");
		assert_eq!(s.dragged_node(), None);
		assert!(s.store().edges().is_empty());

		s.take_events().deliver();
		assert_eq!(*drags.borrow(), [DragPhase::Start, DragPhase::End]);
	}

	#[test]
	fn redraw_is_requested_and_cleared() {
		let mut s = state(vec![Node::new("a", ()).at(1.0, 1.0)], vec![]);
		assert!(s.take_redraw());
		assert!(!s.take_redraw());
		s.tick(16.0);
		assert!(s.take_redraw());
		while s.energy() >= 0.001 {
			s.tick(16.0);
		}
		s.tick(16.0);
		s.take_redraw();
		s.tick(16.0);
		assert!(!s.take_redraw());
	}

	#[test]
	fn fit_request_is_taken_once() {
		let handle = ForceGraphHandle::new(state(vec![Node::new("a", ()).at(1.0, 1.0)], vec![]));
		assert!(!handle.take_fit_request());
		handle.fit();
		assert!(handle.take_fit_request());
		assert!(!handle.take_fit_request());

		handle.resize(320.0, 200.0);
		handle.with(|s| {
			assert_eq!(s.size(), (320.0, 200.0));
			assert_eq!(s.view_center(), (160.0, 100.0));
		});
	}

	#[test]
	fn structural_clear_queues_null_clicks() {
		let mut s = state(
			vec![Node::new("a", ()).at(10.0, 10.0), Node::new("b", ()).at(200.0, 10.0)],
			vec![EdgeInput::new("ab", "a", "b", ())],
		);
		s.pointer_down(PointerInput::new(0, 10.0, 10.0, 0.0));
		s.pointer_up(PointerInput::new(0, 10.0, 10.0, 40.0));
		assert_eq!(s.take_events().len(), 1);

		s.remove_node("b");
		assert!(s.take_events().is_empty());
		s.remove_node("a");
		assert_eq!(s.take_events().len(), 1);
	}

	#[test]
	fn observers_may_call_back_into_handle() {
		let handle = ForceGraphHandle::new(state(
			vec![Node::new("a", ()).at(10.0, 10.0), Node::new("b", ()).at(200.0, 10.0)],
			vec![],
		));
		let inner = handle.clone();
		handle
			.on_node_click(move |node| {
				if let Some(node) = node {
					inner.remove_node(&node.id);
				}
			})
			.detach();

		handle.pointer_down(PointerInput::new(0, 200.0, 10.0, 0.0));
		handle.pointer_up(PointerInput::new(0, 200.0, 10.0, 40.0));
		handle.with(|s| {
			assert!(!s.store().contains_node("b"));
			assert_eq!(s.selection(), &Selection::default());
		});
	}
}
