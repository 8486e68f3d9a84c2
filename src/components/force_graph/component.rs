//! Leptos component wrapping the graph canvas.
//!
//! The component creates an HTML canvas element and translates mouse, touch
//! and wheel events into pointer input for the widget. Mouse input uses
//! pointer id 0 and each touch point its identifier plus one. An animation
//! loop runs via `requestAnimationFrame`, ticking the widget and redrawing
//! only when something changed.

use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::{error, info};
use wasm_bindgen::prelude::*;
use web_sys::{
	CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, TouchEvent, WheelEvent, Window,
};

use super::error::InitError;
use super::events::NodeDragEvent;
use super::gesture::{PointerId, PointerInput};
use super::options::GraphOptions;
use super::render;
use super::state::{ForceGraphHandle, ForceGraphState};
use super::theme::Theme;
use super::types::{Edge, GraphData, GraphNode, LinkMeta, NodeMeta};

/// Pointer id used for mouse input.
const MOUSE_POINTER: PointerId = 0;
/// Frame delta used for the first frame and clamped gaps.
const FRAME_MS: f64 = 16.0;
/// Longest step a single frame may take, so a backgrounded tab does not jump.
const MAX_FRAME_MS: f64 = 100.0;
/// Canvas size when nothing can be measured.
const DEFAULT_SIZE: (f64, f64) = (800.0, 600.0);

/// Where the canvas takes its pixel size from.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum SurfaceSize {
	/// The browser viewport.
	Viewport,
	/// The parent element, unless a fixed width or height is given.
	#[default]
	Container,
	/// Fixed pixel size; either side may still follow the parent.
	Fixed {
		/// Fixed width, or the parent's.
		width: Option<f64>,
		/// Fixed height, or the parent's.
		height: Option<f64>,
	},
}

impl SurfaceSize {
	fn new(fullscreen: bool, width: Option<f64>, height: Option<f64>) -> Self {
		match (fullscreen, width, height) {
			(true, _, _) => SurfaceSize::Viewport,
			(false, None, None) => SurfaceSize::Container,
			(false, width, height) => SurfaceSize::Fixed { width, height },
		}
	}

	/// Current pixel size for `canvas`.
	fn measure(self, canvas: &HtmlCanvasElement) -> (f64, f64) {
		let parent = || {
			canvas
				.parent_element()
				.map(|p| (p.client_width() as f64, p.client_height() as f64))
				.filter(|&(w, h)| w > 0.0 && h > 0.0)
				.unwrap_or(DEFAULT_SIZE)
		};
		match self {
			SurfaceSize::Viewport => web_sys::window()
				.as_ref()
				.and_then(viewport_size)
				.unwrap_or(DEFAULT_SIZE),
			SurfaceSize::Container => parent(),
			SurfaceSize::Fixed { width, height } => {
				let (pw, ph) = parent();
				(width.unwrap_or(pw), height.unwrap_or(ph))
			}
		}
	}
}

/// Widget bound to a canvas 2d context.
pub struct GraphSurface {
	handle: ForceGraphHandle<NodeMeta, LinkMeta>,
	canvas: HtmlCanvasElement,
	ctx: CanvasRenderingContext2d,
	theme: Theme,
	size: SurfaceSize,
	last_frame_ms: Option<f64>,
}

/// Binds a widget to `canvas`, sized to the canvas' current pixel size.
///
/// Fails if the canvas cannot hand out a 2d context.
pub fn initialize(
	canvas: HtmlCanvasElement,
	data: GraphData,
	options: GraphOptions,
	theme: Theme,
) -> Result<GraphSurface, InitError> {
	let ctx: CanvasRenderingContext2d = canvas
		.get_context("2d")
		.map_err(|e| InitError::NoContext(format!("{e:?}")))?
		.ok_or_else(|| InitError::NoContext("2d contexts are unsupported".into()))?
		.dyn_into()
		.map_err(|_| InitError::NotCanvas2d)?;

	let (width, height) = (canvas.width() as f64, canvas.height() as f64);
	let state = ForceGraphState::with_force_layout(data, options, width, height);
	Ok(GraphSurface {
		handle: ForceGraphHandle::new(state),
		canvas,
		ctx,
		theme,
		size: SurfaceSize::default(),
		last_frame_ms: None,
	})
}

impl GraphSurface {
	/// Shared handle to the widget.
	pub fn handle(&self) -> &ForceGraphHandle<NodeMeta, LinkMeta> {
		&self.handle
	}

	/// Sets what [`GraphSurface::fit`] measures.
	pub fn size_to(&mut self, size: SurfaceSize) {
		self.size = size;
	}

	/// Advances the widget to `now_ms` and redraws if anything changed.
	pub fn frame(&mut self, now_ms: f64) {
		let dt = match self.last_frame_ms {
			Some(last) => (now_ms - last).clamp(0.0, MAX_FRAME_MS),
			None => FRAME_MS,
		};
		self.last_frame_ms = Some(now_ms);

		if self.handle.take_fit_request() {
			self.fit();
		}
		self.sync_canvas_size();

		self.handle.tick(dt);
		if self.handle.take_redraw() {
			self.handle
				.with(|state| render::render(state, &self.ctx, &self.theme));
		}
	}

	/// Re-measures the container and resizes to it.
	pub fn fit(&mut self) {
		let (width, height) = self.size.measure(&self.canvas);
		self.resize(width, height);
	}

	/// Resizes the canvas and recomputes the view centre.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.handle.resize(width, height);
		self.sync_canvas_size();
	}

	/// Applies the widget's recorded size to the canvas element.
	fn sync_canvas_size(&self) {
		let (width, height) = self.handle.with(|state| state.size());
		let (w, h) = (width.max(0.0) as u32, height.max(0.0) as u32);
		if self.canvas.width() != w || self.canvas.height() != h {
			self.canvas.set_width(w);
			self.canvas.set_height(h);
		}
	}
}

fn viewport_size(window: &Window) -> Option<(f64, f64)> {
	Some((
		window.inner_width().ok()?.as_f64()?,
		window.inner_height().ok()?.as_f64()?,
	))
}

/// Position of a client-space point relative to the canvas.
fn local_point(canvas_ref: NodeRef<leptos::html::Canvas>, client_x: i32, client_y: i32) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((client_x as f64 - rect.left(), client_y as f64 - rect.top()))
}

/// Changed touches of `ev` as pointer input.
fn touch_inputs(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &TouchEvent) -> Vec<PointerInput> {
	let touches = ev.changed_touches();
	let time = ev.time_stamp();
	(0..touches.length())
		.filter_map(|i| touches.get(i))
		.filter_map(|touch| {
			let (x, y) = local_point(canvas_ref, touch.client_x(), touch.client_y())?;
			Some(PointerInput::new(touch.identifier() as PointerId + 1, x, y, time))
		})
		.collect()
}

/// Renders an interactive graph on a canvas element.
///
/// Pass graph data via the reactive `data` signal; every change replaces
/// the graph. The component sizes itself to its parent container by
/// default; set `fullscreen = true` to fill the viewport instead. Explicit
/// `width`/`height` override automatic sizing. Unless both are fixed, the
/// canvas re-measures on window resize. `on_ready` receives a handle for
/// imperative use (`add_node`, `remove_node`, `reset_view`, `fit`, ...).
#[component]
pub fn ForceGraphCanvas(
	#[prop(into)] data: Signal<GraphData>,
	#[prop(optional)] options: GraphOptions,
	#[prop(optional)] theme: Option<Theme>,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
	#[prop(optional, into)] on_node_click: Option<Callback<Option<GraphNode>>>,
	#[prop(optional, into)] on_link_click: Option<Callback<Option<Edge<LinkMeta>>>>,
	#[prop(optional, into)] on_node_drag: Option<Callback<NodeDragEvent>>,
	#[prop(optional, into)] on_ready: Option<Callback<ForceGraphHandle<NodeMeta, LinkMeta>>>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let surface: Rc<RefCell<Option<GraphSurface>>> = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let mouse_cbs: Rc<RefCell<Vec<Closure<dyn FnMut(MouseEvent)>>>> = Rc::new(RefCell::new(Vec::new()));
	let (surface_init, animate_init, resize_cb_init, mouse_cbs_init) =
		(surface.clone(), animate.clone(), resize_cb.clone(), mouse_cbs.clone());
	let theme = theme.unwrap_or_default();

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		if surface_init.borrow().is_some() {
			return;
		}
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			error!("graph: {}", InitError::NoWindow);
			return;
		};

		let size = SurfaceSize::new(fullscreen, width, height);
		let (w, h) = size.measure(&canvas);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let mut graph = match initialize(canvas, data.get_untracked(), options.clone(), theme.clone()) {
			Ok(graph) => graph,
			Err(err) => {
				error!("graph: {err}");
				return;
			}
		};
		let handle = graph.handle().clone();
		if let Some(cb) = on_node_click {
			handle.on_node_click(move |node| cb.run(node.clone())).detach();
		}
		if let Some(cb) = on_link_click {
			handle.on_link_click(move |edge| cb.run(edge.clone())).detach();
		}
		if let Some(cb) = on_node_drag {
			handle.on_node_drag(move |event| cb.run(event.clone())).detach();
		}
		graph.size_to(size);
		*surface_init.borrow_mut() = Some(graph);
		info!("graph: canvas ready at {w}x{h}");

		// Fixed sizes never change, everything else follows the window.
		if !matches!(size, SurfaceSize::Fixed { width: Some(_), height: Some(_) }) {
			let surface_resize = surface_init.clone();
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				if let Some(ref mut s) = *surface_resize.borrow_mut() {
					s.fit();
				}
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				let _ =
					window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		// Moves and releases come from the window so a gesture survives the
		// cursor leaving the canvas.
		let (handle_mm, handle_mu) = (handle.clone(), handle.clone());
		let on_move: Closure<dyn FnMut(MouseEvent)> = Closure::new(move |ev: MouseEvent| {
			if let Some((x, y)) = local_point(canvas_ref, ev.client_x(), ev.client_y()) {
				handle_mm.pointer_move(PointerInput::new(MOUSE_POINTER, x, y, ev.time_stamp()));
			}
		});
		let on_up: Closure<dyn FnMut(MouseEvent)> = Closure::new(move |ev: MouseEvent| {
			match local_point(canvas_ref, ev.client_x(), ev.client_y()) {
				Some((x, y)) => {
					handle_mu.pointer_up(PointerInput::new(MOUSE_POINTER, x, y, ev.time_stamp()))
				}
				None => handle_mu.pointer_cancel(MOUSE_POINTER),
			}
		});
		let _ = window.add_event_listener_with_callback("mousemove", on_move.as_ref().unchecked_ref());
		let _ = window.add_event_listener_with_callback("mouseup", on_up.as_ref().unchecked_ref());
		*mouse_cbs_init.borrow_mut() = vec![on_move, on_up];

		let (surface_anim, animate_inner) = (surface_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move |now: f64| {
			if let Some(ref mut s) = *surface_anim.borrow_mut() {
				s.frame(now);
			}
			if let (Some(cb), Some(win)) = (animate_inner.borrow().as_ref(), web_sys::window()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}

		if let Some(cb) = on_ready {
			cb.run(handle);
		}
	});

	let surface_data = surface.clone();
	Effect::new(move |prev: Option<()>| {
		let data = data.get();
		if prev.is_none() {
			return;
		}
		let handle = surface_data.borrow().as_ref().map(|s| s.handle().clone());
		if let Some(handle) = handle {
			info!(
				"graph: data changed, {} nodes, {} links",
				data.nodes.len(),
				data.links.len()
			);
			handle.update_data(data);
		}
	});

	// Handlers clone the handle out of the surface so observers run with no
	// borrow held.
	let handle_of = {
		let surface = surface.clone();
		move || surface.borrow().as_ref().map(|s| s.handle().clone())
	};

	let handle_md = handle_of.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let (Some(handle), Some((x, y))) =
			(handle_md(), local_point(canvas_ref, ev.client_x(), ev.client_y()))
		else {
			return;
		};
		handle.pointer_down(PointerInput::new(MOUSE_POINTER, x, y, ev.time_stamp()));
	};

	let handle_ts = handle_of.clone();
	let on_touchstart = move |ev: TouchEvent| {
		ev.prevent_default();
		if let Some(handle) = handle_ts() {
			for input in touch_inputs(canvas_ref, &ev) {
				handle.pointer_down(input);
			}
		}
	};

	let handle_tm = handle_of.clone();
	let on_touchmove = move |ev: TouchEvent| {
		ev.prevent_default();
		if let Some(handle) = handle_tm() {
			for input in touch_inputs(canvas_ref, &ev) {
				handle.pointer_move(input);
			}
		}
	};

	let handle_te = handle_of.clone();
	let on_touchend = move |ev: TouchEvent| {
		ev.prevent_default();
		if let Some(handle) = handle_te() {
			for input in touch_inputs(canvas_ref, &ev) {
				handle.pointer_up(input);
			}
		}
	};

	let handle_tc = handle_of.clone();
	let on_touchcancel = move |ev: TouchEvent| {
		if let Some(handle) = handle_tc() {
			for input in touch_inputs(canvas_ref, &ev) {
				handle.pointer_cancel(input.id);
			}
		}
	};

	let handle_wh = handle_of;
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let (Some(handle), Some((x, y))) =
			(handle_wh(), local_point(canvas_ref, ev.client_x(), ev.client_y()))
		else {
			return;
		};
		handle.wheel(x, y, ev.delta_y());
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="force-graph-canvas"
			on:mousedown=on_mousedown
			on:touchstart=on_touchstart
			on:touchmove=on_touchmove
			on:touchend=on_touchend
			on:touchcancel=on_touchcancel
			on:wheel=on_wheel
			style="display: block; cursor: grab; touch-action: none;"
		/>
	}
}
