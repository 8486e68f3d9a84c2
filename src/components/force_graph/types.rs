//! Graph data structures shared by the store, the simulation and the boundary.
//!
//! Nodes and edges are generic over an opaque payload so hosts can carry
//! whatever extra fields they need. Payload fields are flattened on the wire,
//! which keeps the JSON shape `{ "id": "a", ...payload }`.

use serde::Deserialize;

/// A node in world space, together with its simulation state.
#[derive(Clone, Debug, Deserialize)]
pub struct Node<N> {
	/// Unique identifier for this node. Used to reference nodes in links.
	pub id: String,
	/// World-space position, written by the layout engine each tick.
	#[serde(default)]
	pub x: f64,
	/// See [`Node::x`].
	#[serde(default)]
	pub y: f64,
	/// Velocity maintained by the layout engine.
	#[serde(skip)]
	pub vx: f64,
	/// See [`Node::vx`].
	#[serde(skip)]
	pub vy: f64,
	/// Pinned position. While set, the layout engine holds the node here.
	#[serde(default)]
	pub fx: Option<f64>,
	/// See [`Node::fx`].
	#[serde(default)]
	pub fy: Option<f64>,
	/// Host payload, opaque to the widget.
	#[serde(flatten)]
	pub payload: N,
}

impl<N> Node<N> {
	/// Creates an unpinned node at the world origin.
	pub fn new(id: impl Into<String>, payload: N) -> Self {
		Self {
			id: id.into(),
			x: 0.0,
			y: 0.0,
			vx: 0.0,
			vy: 0.0,
			fx: None,
			fy: None,
			payload,
		}
	}

	/// Places the node at a world position.
	pub fn at(mut self, x: f64, y: f64) -> Self {
		self.x = x;
		self.y = y;
		self
	}

	/// Whether the layout engine must hold this node fixed.
	pub fn is_pinned(&self) -> bool {
		self.fx.is_some() || self.fy.is_some()
	}

	/// Pins the node at `(x, y)` and moves it there immediately.
	pub fn pin(&mut self, x: f64, y: f64) {
		self.fx = Some(x);
		self.fy = Some(y);
		self.x = x;
		self.y = y;
	}

	/// Releases the pin, handing the node back to the layout engine.
	pub fn unpin(&mut self) {
		self.fx = None;
		self.fy = None;
	}

	/// Squared distance from the node centre to a world point.
	pub fn distance_sq(&self, x: f64, y: f64) -> f64 {
		let (dx, dy) = (self.x - x, self.y - y);
		dx * dx + dy * dy
	}
}

/// An edge admitted into the store. Both endpoints are live node ids.
#[derive(Clone, Debug)]
pub struct Edge<E> {
	/// Unique identifier for this edge.
	pub id: String,
	/// Source node id.
	pub source: String,
	/// Target node id.
	pub target: String,
	/// Host payload, opaque to the widget.
	pub payload: E,
}

impl<E> Edge<E> {
	/// Creates an edge between two node ids.
	pub fn new(
		id: impl Into<String>,
		source: impl Into<String>,
		target: impl Into<String>,
		payload: E,
	) -> Self {
		Self {
			id: id.into(),
			source: source.into(),
			target: target.into(),
			payload,
		}
	}

	/// Whether either endpoint is the given node.
	pub fn touches(&self, node_id: &str) -> bool {
		self.source == node_id || self.target == node_id
	}
}

/// An edge endpoint as it arrives from the host: a bare id or a node-shaped object.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum EndpointRef {
	/// `"a"`
	Id(String),
	/// `{ "id": "a", ... }`; any other fields are ignored.
	Node {
		/// Referenced node id.
		id: String,
	},
}

impl EndpointRef {
	/// The referenced node id.
	pub fn id(&self) -> &str {
		match self {
			EndpointRef::Id(id) | EndpointRef::Node { id } => id,
		}
	}
}

impl From<&str> for EndpointRef {
	fn from(id: &str) -> Self {
		EndpointRef::Id(id.to_string())
	}
}

impl From<String> for EndpointRef {
	fn from(id: String) -> Self {
		EndpointRef::Id(id)
	}
}

/// An edge before its endpoints are resolved against a node set.
#[derive(Clone, Debug, Deserialize)]
pub struct EdgeInput<E> {
	/// Unique identifier for this edge.
	pub id: String,
	/// Source endpoint.
	pub source: EndpointRef,
	/// Target endpoint.
	pub target: EndpointRef,
	/// Host payload, opaque to the widget.
	#[serde(flatten)]
	pub payload: E,
}

impl<E> EdgeInput<E> {
	/// Creates an unresolved edge.
	pub fn new(
		id: impl Into<String>,
		source: impl Into<EndpointRef>,
		target: impl Into<EndpointRef>,
		payload: E,
	) -> Self {
		Self {
			id: id.into(),
			source: source.into(),
			target: target.into(),
			payload,
		}
	}

	/// Turns this into a store edge. Endpoints are not checked here.
	pub fn into_edge(self) -> Edge<E> {
		Edge {
			id: self.id,
			source: self.source.id().to_string(),
			target: self.target.id().to_string(),
			payload: self.payload,
		}
	}
}

/// Display metadata carried by nodes of the shipped component.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct NodeMeta {
	/// Optional display label.
	#[serde(default)]
	pub label: Option<String>,
	/// Optional CSS color override (e.g., "#ff0000" or "rgb(255, 0, 0)").
	/// If not set, color is derived from the theme palette based on `group`.
	#[serde(default)]
	pub color: Option<String>,
	/// Optional group name for cluster-based coloring.
	#[serde(default)]
	pub group: Option<String>,
}

/// Display metadata carried by links of the shipped component.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct LinkMeta {
	/// Optional display label.
	#[serde(default)]
	pub label: Option<String>,
}

/// A node of the shipped component.
pub type GraphNode = Node<NodeMeta>;

/// A link of the shipped component, as supplied by the host.
pub type GraphLink = EdgeInput<LinkMeta>;

/// Complete graph data: nodes and links.
#[derive(Clone, Debug, Deserialize)]
#[serde(bound(deserialize = "N: Deserialize<'de>, E: Deserialize<'de>"))]
pub struct GraphData<N = NodeMeta, E = LinkMeta> {
	/// All nodes, in insertion order.
	#[serde(default = "Vec::new")]
	pub nodes: Vec<Node<N>>,
	/// All links, endpoints unresolved.
	#[serde(default = "Vec::new", alias = "edges")]
	pub links: Vec<EdgeInput<E>>,
}

impl<N, E> Default for GraphData<N, E> {
	fn default() -> Self {
		Self {
			nodes: Vec::new(),
			links: Vec::new(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn endpoints_accept_ids_and_node_objects() {
		let json = r#"{
			"nodes": [{ "id": "a", "label": "A" }, { "id": "b" }],
			"links": [
				{ "id": "e1", "source": "a", "target": { "id": "b", "x": 3.0 } }
			]
		}"#;
		let data: GraphData = serde_json::from_str(json).unwrap();

		assert_eq!(data.nodes[0].payload.label.as_deref(), Some("A"));
		assert_eq!(data.links[0].source, EndpointRef::Id("a".into()));
		assert_eq!(data.links[0].target.id(), "b");
	}

	#[test]
	fn edges_alias_and_missing_collections() {
		let data: GraphData = serde_json::from_str(
			r#"{ "edges": [{ "id": "e", "source": "x", "target": "y" }] }"#,
		)
		.unwrap();
		assert!(data.nodes.is_empty());
		assert_eq!(data.links.len(), 1);
	}

	#[test]
	fn pin_moves_node_and_unpin_releases() {
		let mut node = Node::new("a", ()).at(1.0, 2.0);
		node.pin(5.0, 6.0);
		assert!(node.is_pinned());
		assert_eq!((node.x, node.y), (5.0, 6.0));
		node.unpin();
		assert!(!node.is_pinned());
		assert_eq!((node.x, node.y), (5.0, 6.0));
	}
}
