//! Fixtures shared by the integration tests.

use graph_canvas::{
	EdgeInput, ForceGraphHandle, ForceGraphState, GraphData, GraphNode, GraphOptions, LinkMeta,
	NodeMeta, PointerInput, StaticLayout,
};

/// Canvas size used by every fixture.
pub const SIZE: (f64, f64) = (800.0, 600.0);

/// A labelled node at a fixed world position.
pub fn node(id: &str, x: f64, y: f64) -> GraphNode {
	GraphNode::new(
		id,
		NodeMeta {
			label: Some(id.to_uppercase()),
			..NodeMeta::default()
		},
	)
	.at(x, y)
}

/// A link given by endpoint ids.
pub fn link(id: &str, source: &str, target: &str) -> EdgeInput<LinkMeta> {
	EdgeInput::new(id, source, target, LinkMeta::default())
}

/// Builds a handle over a layout that never moves nodes.
pub fn handle(nodes: Vec<GraphNode>, links: Vec<EdgeInput<LinkMeta>>) -> ForceGraphHandle<NodeMeta, LinkMeta> {
	let state = ForceGraphState::new(
		GraphData { nodes, links },
		GraphOptions::default(),
		Box::new(StaticLayout::default()),
		SIZE.0,
		SIZE.1,
	);
	ForceGraphHandle::new(state)
}

/// A(0,0), B(100,0), C(100,100) with links A-B and B-C.
pub fn triangle() -> ForceGraphHandle<NodeMeta, LinkMeta> {
	handle(
		vec![node("a", 0.0, 0.0), node("b", 100.0, 0.0), node("c", 100.0, 100.0)],
		vec![link("ab", "a", "b"), link("bc", "b", "c")],
	)
}

/// Sorted node ids.
pub fn node_ids(handle: &ForceGraphHandle<NodeMeta, LinkMeta>) -> Vec<String> {
	let mut ids: Vec<String> = handle.with(|s| s.store().nodes().iter().map(|n| n.id.clone()).collect());
	ids.sort();
	ids
}

/// Sorted edge ids.
pub fn edge_ids(handle: &ForceGraphHandle<NodeMeta, LinkMeta>) -> Vec<String> {
	let mut ids: Vec<String> = handle.with(|s| s.store().edges().iter().map(|e| e.id.clone()).collect());
	ids.sort();
	ids
}

/// Press and release pointer 0 at the same screen point.
pub fn tap(handle: &ForceGraphHandle<NodeMeta, LinkMeta>, x: f64, y: f64, at_ms: f64) {
	handle.pointer_down(PointerInput::new(0, x, y, at_ms));
	handle.pointer_up(PointerInput::new(0, x, y, at_ms + 50.0));
}
