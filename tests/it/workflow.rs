//! Structural edits through the public handle.

use graph_canvas::{Edge, GraphData, LinkMeta};

use crate::helpers::{edge_ids, handle, link, node, node_ids, triangle};

#[test]
fn removing_middle_node_drops_its_links() {
	let graph = triangle();
	let removed = graph.remove_node("b");

	assert_eq!(removed.map(|n| n.id), Some("b".to_string()));
	assert_eq!(node_ids(&graph), ["a", "c"]);
	assert!(edge_ids(&graph).is_empty());
}

#[test]
fn removing_unknown_node_is_a_no_op() {
	let graph = triangle();
	assert!(graph.remove_node("zz").is_none());
	assert_eq!(node_ids(&graph), ["a", "b", "c"]);
	assert_eq!(edge_ids(&graph), ["ab", "bc"]);
}

#[test]
fn connected_insert_adds_link_to_anchor() {
	let graph = triangle();
	graph.remove_node("b");
	assert!(graph.add_node(node("d", 0.0, 0.0), Some("a")));

	let edges = graph.with(|s| s.store().edges().to_vec());
	assert_eq!(edges.len(), 1);
	assert_eq!((edges[0].source.as_str(), edges[0].target.as_str()), ("d", "a"));

	// Placed near the anchor, held until it settles.
	graph.with(|s| {
		let d = s.store().node("d").unwrap();
		assert!(d.x.abs() <= 30.0 && d.y.abs() <= 30.0);
		assert!(d.is_pinned());
	});
}

#[test]
fn insert_with_unknown_anchor_adds_only_the_node() {
	let graph = triangle();
	assert!(graph.add_node(node("d", 0.0, 0.0), Some("nope")));
	assert_eq!(node_ids(&graph), ["a", "b", "c", "d"]);
	assert_eq!(edge_ids(&graph), ["ab", "bc"]);
}

#[test]
fn ids_stay_unique() {
	let graph = triangle();
	assert!(!graph.add_node(node("a", 5.0, 5.0), None));
	assert!(!graph.add_edge(Edge::new("ab", "b", "c", LinkMeta::default())));
	assert!(!graph.add_edge(Edge::new("ax", "a", "x", LinkMeta::default())));
	assert!(graph.add_edge(Edge::new("ac", "a", "c", LinkMeta::default())));

	assert_eq!(node_ids(&graph), ["a", "b", "c"]);
	assert_eq!(edge_ids(&graph), ["ab", "ac", "bc"]);
	graph.with(|s| assert_eq!(s.store().node("a").unwrap().x, 0.0));
}

#[test]
fn replacing_data_drops_dangling_links() {
	let graph = triangle();
	graph.update_data(GraphData {
		nodes: vec![node("x", 10.0, 10.0)],
		links: vec![link("e1", "x", "y")],
	});

	assert_eq!(node_ids(&graph), ["x"]);
	assert!(edge_ids(&graph).is_empty());
}

#[test]
fn replacing_data_clears_selection() {
	let graph = handle(vec![node("a", 10.0, 10.0), node("b", 200.0, 10.0)], vec![]);
	crate::helpers::tap(&graph, 10.0, 10.0, 0.0);
	graph.with(|s| assert_eq!(s.selection().node.as_deref(), Some("a")));

	graph.update_data(GraphData {
		nodes: vec![node("a", 10.0, 10.0)],
		links: vec![],
	});
	graph.with(|s| assert!(s.selection().node.is_none()));
}

#[test]
fn inserted_node_settles_after_delay() {
	let graph = triangle();
	graph.add_node(node("d", 0.0, 0.0), Some("c"));
	for _ in 0..50 {
		graph.tick(16.0);
	}
	graph.with(|s| {
		assert!(!s.store().node("d").unwrap().is_pinned());
		assert_eq!(s.store().settling().count(), 0);
	});
}
