//! graph-canvas: interactive graph canvas with pan, zoom, drag and tap selection.
//!
//! This crate provides a WASM-based graph widget that renders node/link data
//! on a canvas with a pluggable force layout, gesture handling for mouse and
//! touch, and selection callbacks. The interaction core is plain Rust and can
//! be driven without a browser.

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, debug, info, warn};
use serde::de::DeserializeOwned;
use wasm_bindgen::JsCast;
use web_sys::{HtmlScriptElement, Window};

pub mod components;

pub use components::force_graph::{
	DragPhase, Edge, EdgeInput, ForceGraphCanvas, ForceGraphHandle, ForceGraphState, GraphData,
	GraphError, GraphLink, GraphNode, GraphOptions, InitError, LinkMeta, Node, NodeDragEvent,
	NodeMeta, PointerInput, SimulationBridge, StaticLayout, Subscription, Theme,
};

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("graph-canvas: logging initialized");
}

/// Reads and parses the JSON text of `<script id="{id}">`.
fn load_script_json<T: DeserializeOwned>(id: &str) -> Option<T> {
	let window: Window = web_sys::window()?;
	let document = window.document()?;
	let Some(element) = document.get_element_by_id(id) else {
		debug!("graph-canvas: no #{id} element");
		return None;
	};
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	let json_text = script.text().ok()?;

	match serde_json::from_str::<T>(&json_text) {
		Ok(value) => Some(value),
		Err(e) => {
			warn!("graph-canvas: failed to parse #{id}: {}", e);
			None
		}
	}
}

/// Load graph data from a script element with id="graph-data".
/// Expected format: JSON with { nodes: [...], links: [...] }
fn load_graph_data() -> Option<GraphData> {
	let data: GraphData = load_script_json("graph-data")?;
	info!(
		"graph-canvas: loaded {} nodes, {} links",
		data.nodes.len(),
		data.links.len()
	);
	Some(data)
}

/// Load widget options from a script element with id="graph-options".
/// Every field is optional; see [`GraphOptions`] for names and defaults.
fn load_graph_options() -> Option<GraphOptions> {
	load_script_json("graph-options")
}

/// Main application component.
/// Loads graph data and options from the DOM and renders the canvas.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let graph_data = load_graph_data().unwrap_or_default();
	let graph_signal = Signal::derive(move || graph_data.clone());
	let options = load_graph_options().unwrap_or_default();

	let (selected, set_selected) = signal(None::<String>);
	let handle = StoredValue::new_local(None::<ForceGraphHandle<NodeMeta, LinkMeta>>);

	let describe = |node: &GraphNode| node.payload.label.clone().unwrap_or_else(|| node.id.clone());
	let on_node_click = move |node: Option<GraphNode>| set_selected.set(node.as_ref().map(describe));
	let on_link_click = move |edge: Option<Edge<LinkMeta>>| {
		set_selected.set(edge.map(|e| e.payload.label.unwrap_or(format!("{} → {}", e.source, e.target))))
	};
	let on_ready = move |h: ForceGraphHandle<NodeMeta, LinkMeta>| handle.set_value(Some(h));
	let reset_view = move |_| {
		handle.with_value(|h| {
			if let Some(h) = h {
				h.reset_view();
			}
		})
	};

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />
		<Title text="Graph Canvas" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<div class="fullscreen-graph">
			<ForceGraphCanvas
				data=graph_signal
				options=options
				fullscreen=true
				on_node_click=on_node_click
				on_link_click=on_link_click
				on_ready=on_ready
			/>
			<div class="graph-overlay">
				<h1>"Graph Canvas"</h1>
				<p class="subtitle">"Drag nodes to reposition. Scroll or pinch to zoom. Drag background to pan. Tap to select."</p>
				<p class="selection">{move || selected.get().unwrap_or_default()}</p>
				<button on:click=reset_view>"Reset view"</button>
			</div>
		</div>
	}
}
