//! Pointer sequences driven through the handle.

use graph_canvas::{DragPhase, PointerInput};

use crate::helpers::{handle, node, tap, triangle};

#[test]
fn tap_selects_then_toggles_off() {
	let graph = triangle();
	tap(&graph, 100.0, 0.0, 0.0);
	graph.with(|s| assert_eq!(s.selection().node.as_deref(), Some("b")));

	tap(&graph, 100.0, 0.0, 500.0);
	graph.with(|s| assert!(s.selection().node.is_none()));
}

#[test]
fn tap_on_link_midpoint_selects_link() {
	let graph = triangle();
	tap(&graph, 50.0, 2.0, 0.0);
	graph.with(|s| {
		assert_eq!(s.selection().link.as_deref(), Some("ab"));
		assert!(s.selection().node.is_none());
	});
}

#[test]
fn slow_press_is_not_a_tap() {
	let graph = triangle();
	graph.pointer_down(PointerInput::new(0, 400.0, 400.0, 0.0));
	graph.pointer_up(PointerInput::new(0, 400.0, 400.0, 2000.0));
	graph.with(|s| assert!(s.selection().node.is_none() && s.selection().link.is_none()));
}

#[test]
fn background_drag_pans_view() {
	let graph = triangle();
	graph.pointer_down(PointerInput::new(0, 400.0, 400.0, 0.0));
	graph.pointer_move(PointerInput::new(0, 440.0, 430.0, 20.0));
	graph.pointer_up(PointerInput::new(0, 440.0, 430.0, 40.0));

	graph.with(|s| {
		assert_eq!(s.view().translation(), (40.0, 30.0));
		assert!(s.selection().node.is_none());
	});
}

#[test]
fn dragged_node_follows_pointer_and_reports_phases() {
	let graph = handle(vec![node("a", 10.0, 10.0), node("b", 300.0, 10.0)], vec![]);
	let phases = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
	let seen = phases.clone();
	graph.on_node_drag(move |e| seen.borrow_mut().push((e.phase, e.node_id.clone()))).detach();

	graph.pointer_down(PointerInput::new(0, 10.0, 10.0, 0.0));
	graph.pointer_move(PointerInput::new(0, 60.0, 80.0, 30.0));
	graph.with(|s| {
		let a = s.store().node("a").unwrap();
		assert_eq!((a.x, a.y), (60.0, 80.0));
		assert!(a.is_pinned());
	});
	graph.pointer_up(PointerInput::new(0, 60.0, 80.0, 60.0));

	let phases: Vec<DragPhase> = phases.borrow().iter().map(|(p, _)| *p).collect();
	assert_eq!(phases.first(), Some(&DragPhase::Start));
	assert_eq!(phases.last(), Some(&DragPhase::End));
	graph.with(|s| {
		assert!(!s.store().node("a").unwrap().is_pinned());
		assert!(s.dragged_node().is_none());
	});
}

#[test]
fn wheel_zooms_about_cursor() {
	let graph = triangle();
	graph.with(|s| assert_eq!(s.view().to_world(300.0, 200.0), (300.0, 200.0)));
	graph.wheel(300.0, 200.0, -120.0);

	graph.with(|s| {
		assert!((s.view().scale() - 1.1).abs() < 1e-9);
		let (wx, wy) = s.view().to_world(300.0, 200.0);
		assert!((wx - 300.0).abs() < 1e-9 && (wy - 200.0).abs() < 1e-9);
	});
}

#[test]
fn cancelled_press_never_selects() {
	let graph = triangle();
	graph.pointer_down(PointerInput::new(0, 100.0, 0.0, 0.0));
	graph.pointer_cancel(0);
	graph.pointer_up(PointerInput::new(0, 100.0, 0.0, 10.0));
	graph.with(|s| assert!(s.selection().node.is_none()));
}

#[test]
fn drag_follows_pointer_outside_canvas() {
	let graph = handle(vec![node("a", 10.0, 10.0), node("b", 300.0, 10.0)], vec![]);
	graph.pointer_down(PointerInput::new(0, 10.0, 10.0, 0.0));
	graph.pointer_move(PointerInput::new(0, -40.0, 700.0, 30.0));
	graph.with(|s| {
		let a = s.store().node("a").unwrap();
		assert_eq!((a.x, a.y), (-40.0, 700.0));
		assert_eq!(s.dragged_node(), Some("a"));
	});

	graph.pointer_up(PointerInput::new(0, -40.0, 700.0, 60.0));
	graph.with(|s| {
		assert!(s.dragged_node().is_none());
		assert!(s.selection().node.is_none());
		assert_eq!(s.store().node("a").unwrap().x, -40.0);
	});
}
