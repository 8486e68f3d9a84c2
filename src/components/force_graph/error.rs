//! Error types for the force graph widget.
//!
//! [`GraphError`] covers rejected mutations. They leave the store untouched
//! and are logged rather than propagated past the widget, so a bad call never
//! takes the canvas down. [`InitError`] is the only fatal kind.

use thiserror::Error;

/// A structural mutation the store refused to apply.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
	/// A node with this id is already present.
	#[error("node `{0}` already exists")]
	DuplicateNode(String),

	/// An edge with this id is already present.
	#[error("edge `{0}` already exists")]
	DuplicateEdge(String),

	/// The edge references a node that is not in the store.
	#[error("edge `{edge}` references unknown node `{node}`")]
	UnresolvedEndpoint {
		/// Offending edge id.
		edge: String,
		/// Endpoint that did not resolve.
		node: String,
	},
}

/// The widget could not obtain what it needs to draw.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InitError {
	/// No browser window is available.
	#[error("no window available")]
	NoWindow,

	/// The canvas refused to hand out a 2d context.
	#[error("canvas did not provide a 2d context: {0}")]
	NoContext(String),

	/// The context object is not a `CanvasRenderingContext2d`.
	#[error("canvas context is not a CanvasRenderingContext2d")]
	NotCanvas2d,
}
