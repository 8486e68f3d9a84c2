//! Adapter contract to the layout engine, and the engines shipped with the widget.
//!
//! The widget never computes layout forces itself. It pushes structure
//! through [`SimulationBridge::set_nodes`] / [`SimulationBridge::set_edges`],
//! raises or lowers energy, and asks the engine to [`step`] once per frame.
//! The engine writes positions and velocities into the store's nodes in
//! place and fires its tick hooks, which request a redraw.
//!
//! Energy follows the usual alpha model: `alpha` decays toward `target`
//! each tick and the engine idles once both are below `min`.
//!
//! [`step`]: SimulationBridge::step

use std::collections::HashMap;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};

use super::options::GraphOptions;
use super::types::{Edge, Node};

/// Energy held while a node is dragged.
pub const DRAG_ENERGY: f64 = 0.3;

/// Push/pull contract between the widget and a layout engine.
pub trait SimulationBridge<N, E> {
	/// Replaces the node set. Order matches the slice later passed to `step`.
	fn set_nodes(&mut self, nodes: &[Node<N>]);

	/// Replaces the edge set. Endpoints are always live node ids.
	fn set_edges(&mut self, edges: &[Edge<E>]);

	/// Raises energy to at least `level` and holds it there until [`cool`](Self::cool).
	fn reheat(&mut self, level: f64);

	/// Lets energy decay toward rest.
	fn cool(&mut self);

	/// Raises energy to at least `level` without holding it.
	fn kick(&mut self, level: f64) {
		self.reheat(level);
		self.cool();
	}

	/// Registers a hook fired after every tick that moved nodes.
	fn on_tick(&mut self, callback: Box<dyn FnMut()>);

	/// Advances one tick of `dt` seconds, writing positions into `nodes`.
	///
	/// Returns `false` when the engine is at rest and nothing moved.
	fn step(&mut self, nodes: &mut [Node<N>], dt: f64) -> bool;

	/// Current energy level.
	fn energy(&self) -> f64;
}

/// Alpha-style energy level with exponential decay toward a target.
#[derive(Clone, Debug)]
pub struct Energy {
	alpha: f64,
	target: f64,
	decay: f64,
	min: f64,
}

impl Default for Energy {
	fn default() -> Self {
		let min: f64 = 0.001;
		Self {
			alpha: 1.0,
			target: 0.0,
			// Reaches `min` from 1.0 in ~300 ticks.
			decay: 1.0 - min.powf(1.0 / 300.0),
			min,
		}
	}
}

impl Energy {
	/// Current level.
	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	/// Level the current one decays toward.
	pub fn target(&self) -> f64 {
		self.target
	}

	/// Whether another tick would move anything.
	pub fn is_active(&self) -> bool {
		self.alpha >= self.min || self.target >= self.min
	}

	/// Holds energy at `level` or above.
	pub fn reheat(&mut self, level: f64) {
		self.target = level;
		self.alpha = self.alpha.max(level);
	}

	/// Drops the held level to rest.
	pub fn cool(&mut self) {
		self.target = 0.0;
	}

	/// Bumps the current level without changing the target.
	pub fn kick(&mut self, level: f64) {
		self.alpha = self.alpha.max(level);
	}

	/// Decays one tick. Returns `false` when at rest.
	pub fn advance(&mut self) -> bool {
		if !self.is_active() {
			return false;
		}
		self.alpha += (self.target - self.alpha) * self.decay;
		true
	}
}

/// Spring constant matching the default 60-unit link distance.
const BASE_SPRING: f64 = 0.05;
const BASE_LINK_DISTANCE: f64 = 60.0;

/// Layout engine backed by the `force_graph` crate.
///
/// The engine keeps its own copy of the graph, rebuilt whenever structure
/// changes. Pins are mirrored onto anchor flags before each tick.
pub struct ForceLayout {
	graph: ForceGraph<String, ()>,
	force_charge: f32,
	force_spring: f32,
	ids: Vec<String>,
	links: Vec<(String, String)>,
	slots: HashMap<DefaultNodeIdx, usize>,
	dirty: bool,
	energy: Energy,
	hooks: Vec<Box<dyn FnMut()>>,
}

impl ForceLayout {
	/// Creates an engine using `linkDistance` and `chargeStrength` from the options.
	pub fn new(options: &GraphOptions) -> Self {
		let force_charge = options.charge_strength as f32;
		let force_spring = (BASE_SPRING * BASE_LINK_DISTANCE / options.link_distance) as f32;
		Self {
			graph: ForceGraph::new(Self::parameters(force_charge, force_spring)),
			force_charge,
			force_spring,
			ids: Vec::new(),
			links: Vec::new(),
			slots: HashMap::new(),
			dirty: true,
			energy: Energy::default(),
			hooks: Vec::new(),
		}
	}

	fn parameters(force_charge: f32, force_spring: f32) -> SimulationParameters {
		SimulationParameters {
			force_charge,
			force_spring,
			force_max: 100.0,
			node_speed: 3000.0,
			damping_factor: 0.9,
		}
	}

	fn rebuild<N>(&mut self, nodes: &[Node<N>]) {
		let mut graph = ForceGraph::new(Self::parameters(self.force_charge, self.force_spring));
		let mut by_id = HashMap::with_capacity(nodes.len());
		self.slots.clear();
		for (slot, node) in nodes.iter().enumerate() {
			let idx = graph.add_node(NodeData {
				x: node.fx.unwrap_or(node.x) as f32,
				y: node.fy.unwrap_or(node.y) as f32,
				mass: 10.0,
				is_anchor: node.is_pinned(),
				user_data: node.id.clone(),
			});
			by_id.insert(node.id.as_str(), idx);
			self.slots.insert(idx, slot);
		}
		for (source, target) in &self.links {
			if let (Some(&a), Some(&b)) = (by_id.get(source.as_str()), by_id.get(target.as_str())) {
				graph.add_edge(a, b, EdgeData::default());
			}
		}
		self.graph = graph;
		self.ids = nodes.iter().map(|n| n.id.clone()).collect();
		self.dirty = false;
	}

	fn is_stale<N>(&self, nodes: &[Node<N>]) -> bool {
		self.dirty
			|| self.ids.len() != nodes.len()
			|| self.ids.iter().zip(nodes).any(|(id, node)| *id != node.id)
	}
}

impl<N, E> SimulationBridge<N, E> for ForceLayout {
	fn set_nodes(&mut self, nodes: &[Node<N>]) {
		self.ids = nodes.iter().map(|n| n.id.clone()).collect();
		self.dirty = true;
	}

	fn set_edges(&mut self, edges: &[Edge<E>]) {
		self.links = edges
			.iter()
			.map(|e| (e.source.clone(), e.target.clone()))
			.collect();
		self.dirty = true;
	}

	fn reheat(&mut self, level: f64) {
		self.energy.reheat(level);
	}

	fn cool(&mut self) {
		self.energy.cool();
	}

	fn kick(&mut self, level: f64) {
		self.energy.kick(level);
	}

	fn on_tick(&mut self, callback: Box<dyn FnMut()>) {
		self.hooks.push(callback);
	}

	fn step(&mut self, nodes: &mut [Node<N>], dt: f64) -> bool {
		if !self.energy.advance() {
			return false;
		}
		if self.is_stale(nodes) {
			self.rebuild(nodes);
		}

		let slots = &self.slots;
		self.graph.visit_nodes_mut(|gn| {
			if let Some(node) = slots.get(&gn.index()).and_then(|&i| nodes.get(i)) {
				gn.data.x = node.fx.unwrap_or(node.x) as f32;
				gn.data.y = node.fy.unwrap_or(node.y) as f32;
				gn.data.is_anchor = node.is_pinned();
			}
		});

		self.graph.update((dt * self.energy.alpha()) as f32);

		self.graph.visit_nodes(|gn| {
			if let Some(node) = slots.get(&gn.index()).and_then(|&i| nodes.get_mut(i)) {
				let (x, y) = (gn.x() as f64, gn.y() as f64);
				if dt > 0.0 {
					node.vx = (x - node.x) / dt;
					node.vy = (y - node.y) / dt;
				}
				node.x = x;
				node.y = y;
			}
		});

		for hook in &mut self.hooks {
			hook();
		}
		true
	}

	fn energy(&self) -> f64 {
		self.energy.alpha()
	}
}

/// Layout engine that never moves free nodes; pinned nodes snap to their pin.
///
/// Used for static graphs and for driving the widget without physics.
#[derive(Default)]
pub struct StaticLayout {
	energy: Energy,
	node_count: usize,
	edge_count: usize,
	hooks: Vec<Box<dyn FnMut()>>,
}

impl StaticLayout {
	/// Number of nodes last pushed.
	pub fn node_count(&self) -> usize {
		self.node_count
	}

	/// Number of edges last pushed.
	pub fn edge_count(&self) -> usize {
		self.edge_count
	}

	/// Energy level the layout is decaying toward.
	pub fn target(&self) -> f64 {
		self.energy.target()
	}
}

impl<N, E> SimulationBridge<N, E> for StaticLayout {
	fn set_nodes(&mut self, nodes: &[Node<N>]) {
		self.node_count = nodes.len();
	}

	fn set_edges(&mut self, edges: &[Edge<E>]) {
		self.edge_count = edges.len();
	}

	fn reheat(&mut self, level: f64) {
		self.energy.reheat(level);
	}

	fn cool(&mut self) {
		self.energy.cool();
	}

	fn kick(&mut self, level: f64) {
		self.energy.kick(level);
	}

	fn on_tick(&mut self, callback: Box<dyn FnMut()>) {
		self.hooks.push(callback);
	}

	fn step(&mut self, nodes: &mut [Node<N>], _dt: f64) -> bool {
		if !self.energy.advance() {
			return false;
		}
		for node in nodes.iter_mut() {
			if let (Some(fx), Some(fy)) = (node.fx, node.fy) {
				node.x = fx;
				node.y = fy;
			}
			node.vx = 0.0;
			node.vy = 0.0;
		}
		for hook in &mut self.hooks {
			hook();
		}
		true
	}

	fn energy(&self) -> f64 {
		self.energy.alpha()
	}
}

#[cfg(test)]
mod tests {
	use std::cell::Cell;
	use std::rc::Rc;

	use super::*;

	#[test]
	fn energy_decays_to_rest_and_stops() {
		let mut energy = Energy::default();
		let mut ticks = 0;
		while energy.advance() {
			ticks += 1;
			assert!(ticks < 1000);
		}
		assert!((250..=350).contains(&ticks));
		assert!(energy.alpha() < 0.001);
	}

	#[test]
	fn reheat_holds_until_cooled() {
		let mut energy = Energy::default();
		while energy.advance() {}

		energy.reheat(DRAG_ENERGY);
		for _ in 0..2000 {
			assert!(energy.advance());
		}
		assert!((energy.alpha() - DRAG_ENERGY).abs() < 1e-6);

		energy.cool();
		let mut ticks = 0;
		while energy.advance() {
			ticks += 1;
		}
		assert!(ticks > 0);
	}

	#[test]
	fn kick_does_not_hold() {
		let mut energy = Energy::default();
		energy.reheat(0.3);
		energy.kick(1.0);
		assert_eq!(energy.alpha(), 1.0);
		assert_eq!(energy.target(), 0.3);
	}

	fn bridge<B: SimulationBridge<(), ()>>(layout: &mut B) -> &mut dyn SimulationBridge<(), ()> {
		layout
	}

	#[test]
	fn force_layout_moves_free_nodes_and_keeps_pins() {
		let mut layout = ForceLayout::new(&GraphOptions::default());
		let layout = bridge(&mut layout);
		let ticks = Rc::new(Cell::new(0));
		let counter = ticks.clone();
		layout.on_tick(Box::new(move || counter.set(counter.get() + 1)));

		let mut nodes = vec![Node::new("a", ()).at(0.0, 0.0), Node::new("b", ()).at(1.0, 0.0)];
		nodes[0].pin(0.0, 0.0);
		layout.set_nodes(&nodes);
		layout.set_edges(&[Edge::new("ab", "a", "b", ())]);

		for _ in 0..10 {
			assert!(layout.step(&mut nodes, 0.016));
		}
		assert_eq!(ticks.get(), 10);
		assert_eq!((nodes[0].x, nodes[0].y), (0.0, 0.0));
		assert!(nodes[1].x != 1.0 || nodes[1].y != 0.0);
	}

	#[test]
	fn static_layout_snaps_pins_and_rests() {
		let mut layout = StaticLayout::default();
		let mut nodes = vec![Node::new("a", ()).at(3.0, 4.0)];
		nodes[0].fx = Some(10.0);
		nodes[0].fy = Some(20.0);
		{
			let layout = bridge(&mut layout);
			layout.set_nodes(&nodes);
			assert!(layout.step(&mut nodes, 0.016));
			assert_eq!((nodes[0].x, nodes[0].y), (10.0, 20.0));

			while layout.step(&mut nodes, 0.016) {}
			assert!(layout.energy() < 0.001);
		}
		assert_eq!(layout.node_count(), 1);
	}
}
