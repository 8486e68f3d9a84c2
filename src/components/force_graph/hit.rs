//! Resolves what lies under the pointer.
//!
//! Queries take world coordinates plus the current zoom so that tolerances
//! stay a fixed number of screen pixels. Both queries scan newest-first, so
//! on equal distance the element drawn last (on top) wins.

use super::options::GraphOptions;
use super::scale::ScaledValues;
use super::store::GraphStore;
use super::types::{Edge, Node};

/// Nearest-element queries over a [`GraphStore`].
#[derive(Clone, Debug)]
pub struct HitTester {
	options: GraphOptions,
}

impl HitTester {
	/// Builds a tester using `selectionRadius` and `linkTolerance` from the options.
	pub fn new(options: &GraphOptions) -> Self {
		Self {
			options: options.clone(),
		}
	}

	/// The node nearest to `(wx, wy)` within the node tolerance, if any.
	pub fn nearest_node<'a, N, E>(
		&self,
		store: &'a GraphStore<N, E>,
		wx: f64,
		wy: f64,
		k: f64,
	) -> Option<&'a Node<N>> {
		let radius = ScaledValues::new(&self.options, k).hit_radius;
		let limit = radius * radius;
		let mut best: Option<(&Node<N>, f64)> = None;
		for node in store.nodes().iter().rev() {
			let d = node.distance_sq(wx, wy);
			if d < limit && best.is_none_or(|(_, bd)| d < bd) {
				best = Some((node, d));
			}
		}
		best.map(|(node, _)| node)
	}

	/// The edge nearest to `(wx, wy)` within the link tolerance, if any.
	///
	/// Distance is measured to the closest point on the segment between the
	/// endpoints, not to the infinite line.
	pub fn nearest_edge<'a, N, E>(
		&self,
		store: &'a GraphStore<N, E>,
		wx: f64,
		wy: f64,
		k: f64,
	) -> Option<&'a Edge<E>> {
		let tolerance = ScaledValues::new(&self.options, k).link_tolerance;
		let mut best: Option<(&Edge<E>, f64)> = None;
		for edge in store.edges().iter().rev() {
			let (Some(a), Some(b)) = (store.node(&edge.source), store.node(&edge.target)) else {
				continue;
			};
			let d = segment_distance((wx, wy), (a.x, a.y), (b.x, b.y));
			if d < tolerance && best.is_none_or(|(_, bd)| d < bd) {
				best = Some((edge, d));
			}
		}
		best.map(|(edge, _)| edge)
	}
}

/// Distance from `p` to the segment `a`–`b`.
pub fn segment_distance(p: (f64, f64), a: (f64, f64), b: (f64, f64)) -> f64 {
	let (abx, aby) = (b.0 - a.0, b.1 - a.1);
	let len_sq = abx * abx + aby * aby;
	let t = if len_sq > f64::EPSILON {
		(((p.0 - a.0) * abx + (p.1 - a.1) * aby) / len_sq).clamp(0.0, 1.0)
	} else {
		0.0
	};
	let (cx, cy) = (a.0 + abx * t, a.1 + aby * t);
	((p.0 - cx).powi(2) + (p.1 - cy).powi(2)).sqrt()
}
