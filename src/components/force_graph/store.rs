//! Node and edge collections with their identity invariants.
//!
//! The store is the single owner of graph structure. Node ids are unique,
//! and every admitted edge references two live nodes. Each structural
//! mutation pushes the new collections to the [`SimulationBridge`] and
//! raises its energy so the layout relaxes around the change.
//!
//! Freshly inserted nodes start pinned where they were placed and are
//! released after `settleDelayMs` on the store clock, which the frame loop
//! advances through [`GraphStore::advance`].

use std::collections::{HashMap, HashSet};

use log::{debug, warn};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use super::error::GraphError;
use super::options::GraphOptions;
use super::simulation::SimulationBridge;
use super::types::{Edge, GraphData, Node};

/// Energy kick for inserting or removing a single element.
const STRUCTURE_ENERGY: f64 = 0.5;
/// Energy kick for a full data replace.
const FULL_ENERGY: f64 = 1.0;

/// Currently selected node or link. At most one of the two is set.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection {
	/// Selected node id.
	pub node: Option<String>,
	/// Selected link id.
	pub link: Option<String>,
}

impl Selection {
	/// Whether `id` is the selected node.
	pub fn is_node(&self, id: &str) -> bool {
		self.node.as_deref() == Some(id)
	}

	/// Whether `id` is the selected link.
	pub fn is_link(&self, id: &str) -> bool {
		self.link.as_deref() == Some(id)
	}
}

#[derive(Clone, Debug)]
struct Settling {
	node_id: String,
	release_at_ms: f64,
}

/// Owns the graph structure, the selection and pending settle timers.
pub struct GraphStore<N, E> {
	nodes: Vec<Node<N>>,
	index: HashMap<String, usize>,
	edges: Vec<Edge<E>>,
	selection: Selection,
	settling: Vec<Settling>,
	clock_ms: f64,
	settle_delay_ms: f64,
	spawn_jitter: f64,
	rng: SmallRng,
}

impl<N, E> GraphStore<N, E> {
	/// Creates an empty store.
	pub fn new(options: &GraphOptions) -> Self {
		Self {
			nodes: Vec::new(),
			index: HashMap::new(),
			edges: Vec::new(),
			selection: Selection::default(),
			settling: Vec::new(),
			clock_ms: 0.0,
			settle_delay_ms: options.settle_delay_ms,
			spawn_jitter: options.spawn_jitter,
			rng: SmallRng::seed_from_u64(options.seed),
		}
	}

	/// All nodes in insertion order.
	pub fn nodes(&self) -> &[Node<N>] {
		&self.nodes
	}

	/// Mutable access for the layout engine. Ids must not be changed.
	pub(crate) fn nodes_mut(&mut self) -> &mut [Node<N>] {
		&mut self.nodes
	}

	/// All edges in insertion order.
	pub fn edges(&self) -> &[Edge<E>] {
		&self.edges
	}

	/// Looks up a node by id.
	pub fn node(&self, id: &str) -> Option<&Node<N>> {
		self.index.get(id).map(|&i| &self.nodes[i])
	}

	fn node_mut(&mut self, id: &str) -> Option<&mut Node<N>> {
		self.index.get(id).map(|&i| &mut self.nodes[i])
	}

	/// Looks up an edge by id.
	pub fn edge(&self, id: &str) -> Option<&Edge<E>> {
		self.edges.iter().find(|e| e.id == id)
	}

	/// Whether a node with this id exists.
	pub fn contains_node(&self, id: &str) -> bool {
		self.index.contains_key(id)
	}

	/// Current selection.
	pub fn selection(&self) -> &Selection {
		&self.selection
	}

	/// Ids of nodes still waiting for their settle timer.
	pub fn settling(&self) -> impl Iterator<Item = &str> {
		self.settling.iter().map(|s| s.node_id.as_str())
	}

	/// Inserts a node near `center`, or near `connect_to` when that node exists.
	///
	/// When `connect_to` resolves, an edge from the new node to it is added
	/// as well. An unresolved `connect_to` is logged and only the node is
	/// inserted. A duplicate id is rejected without touching the store.
	pub fn add_node<B>(
		&mut self,
		mut node: Node<N>,
		connect_to: Option<&str>,
		center: (f64, f64),
		bridge: &mut B,
	) -> Result<(), GraphError>
	where
		E: Default,
		B: SimulationBridge<N, E> + ?Sized,
	{
		if self.contains_node(&node.id) {
			return Err(GraphError::DuplicateNode(node.id));
		}

		let anchor = connect_to.and_then(|target| match self.node(target) {
			Some(t) => Some((target.to_string(), t.x, t.y)),
			None => {
				warn!(
					"graph: cannot connect `{}` to unknown node `{}`, skipping edge",
					node.id, target
				);
				None
			}
		});
		let (bx, by) = anchor.as_ref().map(|(_, x, y)| (*x, *y)).unwrap_or(center);
		let (x, y) = (bx + self.jitter(), by + self.jitter());

		node.pin(x, y);
		node.vx = 0.0;
		node.vy = 0.0;
		let id = node.id.clone();
		self.index.insert(id.clone(), self.nodes.len());
		self.nodes.push(node);
		self.settling.push(Settling {
			node_id: id.clone(),
			release_at_ms: self.clock_ms + self.settle_delay_ms,
		});

		if let Some((target, _, _)) = anchor {
			let edge_id = format!("{id}-{target}");
			if self.edge(&edge_id).is_some() {
				warn!("graph: edge `{edge_id}` already exists, skipping");
			} else {
				self.edges.push(Edge::new(edge_id, id, target, E::default()));
			}
		}

		self.sync(bridge, STRUCTURE_ENERGY);
		Ok(())
	}

	/// Inserts an edge between two existing nodes.
	pub fn add_edge<B>(&mut self, edge: Edge<E>, bridge: &mut B) -> Result<(), GraphError>
	where
		B: SimulationBridge<N, E> + ?Sized,
	{
		if self.edge(&edge.id).is_some() {
			return Err(GraphError::DuplicateEdge(edge.id));
		}
		for endpoint in [&edge.source, &edge.target] {
			if !self.contains_node(endpoint) {
				return Err(GraphError::UnresolvedEndpoint {
					edge: edge.id.clone(),
					node: endpoint.clone(),
				});
			}
		}
		self.edges.push(edge);
		self.sync(bridge, STRUCTURE_ENERGY);
		Ok(())
	}

	/// Removes a node and every edge touching it. Absent ids are ignored.
	pub fn remove_node<B>(&mut self, id: &str, bridge: &mut B) -> Option<Node<N>>
	where
		B: SimulationBridge<N, E> + ?Sized,
	{
		let position = self.index.remove(id)?;
		let node = self.nodes.remove(position);
		self.reindex();

		if self.selection.is_node(id) {
			self.selection.node = None;
		}
		let before = self.edges.len();
		self.edges.retain(|e| !e.touches(id));
		if let Some(link) = self.selection.link.as_deref() {
			if self.edge(link).is_none() {
				self.selection.link = None;
			}
		}
		self.settling.retain(|s| s.node_id != id);
		debug!(
			"graph: removed node `{id}` and {} edge(s)",
			before - self.edges.len()
		);

		self.sync(bridge, STRUCTURE_ENERGY);
		Some(node)
	}

	/// Replaces all nodes and edges.
	///
	/// Edges whose endpoints do not resolve against the new node set are
	/// dropped silently, as are repeated node or edge ids. Clears the
	/// selection and pending settle timers. Returns the number of links
	/// that were dropped.
	pub fn update_data<B>(&mut self, data: GraphData<N, E>, bridge: &mut B) -> usize
	where
		B: SimulationBridge<N, E> + ?Sized,
	{
		self.nodes.clear();
		self.index.clear();
		for node in data.nodes {
			if self.index.contains_key(&node.id) {
				warn!("graph: duplicate node `{}` in data, keeping the first", node.id);
				continue;
			}
			self.index.insert(node.id.clone(), self.nodes.len());
			self.nodes.push(node);
		}

		self.edges.clear();
		let mut seen = HashSet::new();
		let mut dropped = 0;
		for link in data.links {
			let resolved =
				self.contains_node(link.source.id()) && self.contains_node(link.target.id());
			if !resolved || !seen.insert(link.id.clone()) {
				debug!("graph: dropping link `{}`", link.id);
				dropped += 1;
				continue;
			}
			self.edges.push(link.into_edge());
		}

		self.selection = Selection::default();
		self.settling.clear();
		self.sync(bridge, FULL_ENERGY);
		dropped
	}

	/// Pins a node at a world position.
	pub fn pin(&mut self, id: &str, x: f64, y: f64) -> bool {
		match self.node_mut(id) {
			Some(node) => {
				node.pin(x, y);
				true
			}
			None => false,
		}
	}

	/// Releases a node's pin.
	pub fn unpin(&mut self, id: &str) -> bool {
		match self.node_mut(id) {
			Some(node) => {
				node.unpin();
				true
			}
			None => false,
		}
	}

	/// Selects a node, pinning it where it currently is.
	///
	/// Any previously selected node is released and link selection cleared.
	pub fn select_node(&mut self, id: &str) -> bool {
		let Some((x, y)) = self.node(id).map(|n| (n.x, n.y)) else {
			return false;
		};
		if !self.selection.is_node(id) {
			self.deselect_node();
		}
		self.selection.link = None;
		self.pin(id, x, y);
		self.selection.node = Some(id.to_string());
		true
	}

	/// Clears node selection and releases the node's pin.
	pub fn deselect_node(&mut self) -> Option<String> {
		let id = self.selection.node.take()?;
		self.unpin(&id);
		Some(id)
	}

	/// Selects a link, clearing any node selection.
	pub fn select_link(&mut self, id: &str) -> bool {
		if self.edge(id).is_none() {
			return false;
		}
		self.deselect_node();
		self.selection.link = Some(id.to_string());
		true
	}

	/// Clears link selection.
	pub fn deselect_link(&mut self) -> Option<String> {
		self.selection.link.take()
	}

	/// Clears both node and link selection.
	pub fn clear_selection(&mut self) {
		self.deselect_node();
		self.deselect_link();
	}

	/// Advances the store clock and releases nodes whose settle delay elapsed.
	///
	/// Nodes that are selected or `held` (being dragged) at expiry keep their
	/// pin; their timer is dropped. Returns the released ids.
	pub fn advance(&mut self, dt_ms: f64, held: Option<&str>) -> Vec<String> {
		self.clock_ms += dt_ms;
		let now = self.clock_ms;
		let (due, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut self.settling)
			.into_iter()
			.partition(|s| s.release_at_ms <= now);
		self.settling = pending;

		let mut released = Vec::new();
		for entry in due {
			if self.selection.is_node(&entry.node_id) || held == Some(entry.node_id.as_str()) {
				continue;
			}
			if self.unpin(&entry.node_id) {
				released.push(entry.node_id);
			}
		}
		released
	}

	fn jitter(&mut self) -> f64 {
		if self.spawn_jitter > 0.0 {
			self.rng.gen_range(-self.spawn_jitter..=self.spawn_jitter)
		} else {
			0.0
		}
	}

	fn reindex(&mut self) {
		self.index = self
			.nodes
			.iter()
			.enumerate()
			.map(|(i, n)| (n.id.clone(), i))
			.collect();
	}

	fn sync<B>(&self, bridge: &mut B, energy: f64)
	where
		B: SimulationBridge<N, E> + ?Sized,
	{
		bridge.set_nodes(&self.nodes);
		bridge.set_edges(&self.edges);
		bridge.kick(energy);
	}
}
