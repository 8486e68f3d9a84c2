//! Host-supplied JSON.

use graph_canvas::{GraphData, GraphOptions};

use crate::helpers::{handle, node_ids};

#[test]
fn graph_data_from_host_json() {
	let json = r##"{
		"nodes": [
			{ "id": "core", "label": "Core", "group": "lib", "x": 10, "y": 20 },
			{ "id": "cli", "color": "#ff8800" }
		],
		"edges": [
			{ "id": "e1", "source": "cli", "target": { "id": "core" }, "label": "uses" }
		]
	}"##;
	let data: GraphData = serde_json::from_str(json).unwrap();

	assert_eq!(data.nodes.len(), 2);
	assert_eq!((data.nodes[0].x, data.nodes[0].y), (10.0, 20.0));
	assert_eq!(data.nodes[1].payload.color.as_deref(), Some("#ff8800"));
	assert_eq!(data.links[0].target.id(), "core");
	assert_eq!(data.links[0].payload.label.as_deref(), Some("uses"));

	let graph = handle(data.nodes, data.links);
	assert_eq!(node_ids(&graph), ["cli", "core"]);
	graph.with(|s| assert_eq!(s.store().edges()[0].source, "cli"));
}

#[test]
fn options_from_partial_json() {
	let options: GraphOptions =
		serde_json::from_str(r#"{ "selectionRadius": 20, "settleDelayMs": 250 }"#).unwrap();
	assert_eq!(options.selection_radius, 20.0);
	assert_eq!(options.settle_delay_ms, 250.0);
	assert_eq!(options.tap_timeout_ms, GraphOptions::default().tap_timeout_ms);
}

#[test]
fn malformed_json_is_an_error() {
	assert!(serde_json::from_str::<GraphData>(r#"{ "nodes": [{ "label": "no id" }] }"#).is_err());
	assert!(serde_json::from_str::<GraphOptions>(r#"{ "maxZoom": "big" }"#).is_err());
}
