//! Zoom-dependent sizes for hit-testing and drawing.
//!
//! World lengths grow on screen as the view zooms in; screen lengths stay
//! the same number of pixels. Hit tolerances are screen lengths, so a
//! pointer within 12px of a node picks it at every zoom level.

use super::options::GraphOptions;

/// How a length reacts to zoom.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Sizing {
	/// Fixed on screen, in pixels.
	Screen,
	/// Fixed in world units, but never drawn smaller than `min_px` pixels.
	WorldWithFloor {
		/// Smallest on-screen size in pixels.
		min_px: f64,
	},
}

impl Sizing {
	/// World-space length for `base` at zoom `k`.
	pub fn at(self, base: f64, k: f64) -> f64 {
		match self {
			Sizing::Screen => base / k,
			Sizing::WorldWithFloor { min_px } => base.max(min_px / k),
		}
	}
}

/// Pre-computed world-space sizes for a specific zoom level.
///
/// Create this once per frame (or per hit query) from the options.
#[derive(Clone, Debug)]
pub struct ScaledValues {
	/// Current zoom level.
	pub k: f64,
	/// Node draw radius.
	pub node_radius: f64,
	/// Node hit radius.
	pub hit_radius: f64,
	/// Link hit tolerance.
	pub link_tolerance: f64,
	/// Link stroke width.
	pub link_width: f64,
	/// Selection ring stroke width.
	pub ring_width: f64,
	/// Selection ring offset from the node edge.
	pub ring_offset: f64,
	/// Label font string (e.g., "10px sans-serif").
	pub label_font: String,
}

/// Node radius never shrinks below this many pixels.
const MIN_NODE_SCREEN_PX: f64 = 3.0;
const LABEL_SCREEN_PX: f64 = 10.0;
const LABEL_MIN_K: f64 = 0.5;

impl ScaledValues {
	/// Compute scaled values from the options and current zoom level.
	pub fn new(options: &GraphOptions, k: f64) -> Self {
		let node = Sizing::WorldWithFloor {
			min_px: MIN_NODE_SCREEN_PX,
		};
		let px = |value: f64| Sizing::Screen.at(value, k);
		Self {
			k,
			node_radius: node.at(options.node_radius, k),
			hit_radius: px(options.selection_radius),
			link_tolerance: px(options.link_tolerance),
			link_width: px(options.link_width),
			ring_width: px(2.0),
			ring_offset: px(3.0),
			label_font: format!("{}px sans-serif", LABEL_SCREEN_PX / k.max(LABEL_MIN_K)),
		}
	}
}
