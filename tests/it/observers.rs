//! Observer registration and delivery.

use std::cell::RefCell;
use std::rc::Rc;

use graph_canvas::{ForceGraphHandle, GraphData, LinkMeta, NodeMeta};

use crate::helpers::{node, tap, triangle};

#[test]
fn every_subscriber_hears_each_click() {
	let graph = triangle();
	let log = Rc::new(RefCell::new(Vec::new()));

	let first = log.clone();
	let _a = graph.on_node_click(move |n| first.borrow_mut().push(("first", n.as_ref().map(|n| n.id.clone()))));
	let second = log.clone();
	let _b = graph.on_node_click(move |n| second.borrow_mut().push(("second", n.as_ref().map(|n| n.id.clone()))));

	tap(&graph, 0.0, 0.0, 0.0);
	assert_eq!(
		*log.borrow(),
		[("first", Some("a".to_string())), ("second", Some("a".to_string()))]
	);
}

#[test]
fn unsubscribed_observer_is_silent() {
	let graph = triangle();
	let count = Rc::new(RefCell::new(0));

	let counter = count.clone();
	let sub = graph.on_node_click(move |_| *counter.borrow_mut() += 1);
	tap(&graph, 0.0, 0.0, 0.0);
	assert_eq!(*count.borrow(), 1);

	sub.unsubscribe();
	tap(&graph, 0.0, 0.0, 500.0);
	assert_eq!(*count.borrow(), 1);
}

#[test]
fn empty_tap_reports_null_selection() {
	let graph = triangle();
	let nodes = Rc::new(RefCell::new(Vec::new()));
	let links = Rc::new(RefCell::new(Vec::new()));

	let n = nodes.clone();
	graph.on_node_click(move |node| n.borrow_mut().push(node.is_some())).detach();
	let l = links.clone();
	graph.on_link_click(move |edge| l.borrow_mut().push(edge.is_some())).detach();

	tap(&graph, 50.0, 2.0, 0.0);
	tap(&graph, 600.0, 500.0, 500.0);

	assert_eq!(*links.borrow(), [true, false]);
	assert_eq!(*nodes.borrow(), [false]);
}

#[test]
fn link_observer_receives_edge_payload() {
	let graph = triangle();
	let seen = Rc::new(RefCell::new(None));
	let slot = seen.clone();
	graph
		.on_link_click(move |edge| *slot.borrow_mut() = edge.as_ref().map(|e| (e.source.clone(), e.target.clone())))
		.detach();

	tap(&graph, 100.0, 50.0, 0.0);
	assert_eq!(*seen.borrow(), Some(("b".to_string(), "c".to_string())));
}

/// Records every node click as the clicked id.
fn node_log(graph: &ForceGraphHandle<NodeMeta, LinkMeta>) -> Rc<RefCell<Vec<Option<String>>>> {
	let log = Rc::new(RefCell::new(Vec::new()));
	let sink = log.clone();
	graph
		.on_node_click(move |node| sink.borrow_mut().push(node.as_ref().map(|n| n.id.clone())))
		.detach();
	log
}

#[test]
fn removing_selected_node_reports_null_once() {
	let graph = triangle();
	let log = node_log(&graph);

	tap(&graph, 100.0, 0.0, 0.0);
	graph.remove_node("b");
	graph.update_data(GraphData {
		nodes: vec![node("x", 5.0, 5.0)],
		links: vec![],
	});

	assert_eq!(*log.borrow(), [Some("b".to_string()), None]);
	graph.with(|s| assert!(s.selection().node.is_none()));
}

#[test]
fn replacing_data_reports_cleared_selection() {
	let graph = triangle();
	let log = node_log(&graph);

	tap(&graph, 0.0, 0.0, 0.0);
	graph.update_data(GraphData {
		nodes: vec![node("a", 0.0, 0.0)],
		links: vec![],
	});

	assert_eq!(*log.borrow(), [Some("a".to_string()), None]);
}

#[test]
fn cascaded_link_removal_reports_null_link() {
	let graph = triangle();
	let links = Rc::new(RefCell::new(Vec::new()));
	let sink = links.clone();
	graph
		.on_link_click(move |edge| sink.borrow_mut().push(edge.as_ref().map(|e| e.id.clone())))
		.detach();

	tap(&graph, 50.0, 2.0, 0.0);
	graph.remove_node("a");

	assert_eq!(*links.borrow(), [Some("ab".to_string()), None]);
}

#[test]
fn observer_removing_clicked_node_hears_the_clear_afterwards() {
	let graph = triangle();
	let log = Rc::new(RefCell::new(Vec::new()));
	let (sink, inner) = (log.clone(), graph.clone());
	graph
		.on_node_click(move |node| {
			sink.borrow_mut().push(node.as_ref().map(|n| n.id.clone()));
			if let Some(node) = node {
				inner.remove_node(&node.id);
			}
		})
		.detach();

	tap(&graph, 100.0, 0.0, 0.0);

	assert_eq!(*log.borrow(), [Some("b".to_string()), None]);
	graph.with(|s| assert!(!s.store().contains_node("b")));
}
