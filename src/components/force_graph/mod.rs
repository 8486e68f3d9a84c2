//! Interactive graph canvas component.
//!
//! Renders a force-directed graph on an HTML canvas with:
//! - Physics-based node positioning behind a pluggable layout bridge
//! - Pan, wheel and pinch zoom, node dragging for mouse and touch
//! - Tap selection of nodes and links with observer callbacks
//! - Runtime node insertion and removal, full data replacement
//!
//! Everything except `component` and `render` is free of DOM types, so the
//! widget can be driven and tested natively through [`ForceGraphState`].
//!
//! # Example
//!
//! ```ignore
//! use graph_canvas::{ForceGraphCanvas, GraphData, GraphNode, GraphLink, NodeMeta};
//!
//! let data = GraphData {
//!     nodes: vec![
//!         GraphNode::new("a", NodeMeta { label: Some("Node A".into()), ..Default::default() }),
//!         GraphNode::new("b", NodeMeta::default()),
//!     ],
//!     links: vec![GraphLink::new("a-b", "a", "b", Default::default())],
//! };
//!
//! view! { <ForceGraphCanvas data=Signal::stored(data) fullscreen=true /> }
//! ```

mod component;
pub mod error;
pub mod events;
pub mod gesture;
pub mod hit;
pub mod options;
mod render;
pub mod scale;
pub mod simulation;
pub mod state;
pub mod store;
pub mod theme;
pub mod types;
pub mod view;

pub use component::{ForceGraphCanvas, GraphSurface, SurfaceSize, initialize};
pub use error::{GraphError, InitError};
pub use events::{DragPhase, NodeDragEvent, Subscription};
pub use gesture::{PointerId, PointerInput};
pub use options::GraphOptions;
pub use simulation::{ForceLayout, SimulationBridge, StaticLayout};
pub use state::{ForceGraphHandle, ForceGraphState};
pub use store::{GraphStore, Selection};
pub use theme::Theme;
pub use types::{Edge, EdgeInput, EndpointRef, GraphData, GraphLink, GraphNode, LinkMeta, Node, NodeMeta};
pub use view::ViewTransform;
