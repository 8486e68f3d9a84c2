//! Behavioral configuration for the widget.
//!
//! Every field has a default, so a host may supply any subset as JSON
//! (`{ "tapThreshold": 10 }`). Colors and other draw-only values live in
//! [`Theme`](super::theme::Theme) instead.

use serde::Deserialize;

/// Recognized widget options.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct GraphOptions {
	/// Draw radius of a node, in world units.
	pub node_radius: f64,
	/// Node hit tolerance in screen pixels.
	pub selection_radius: f64,
	/// Link hit tolerance in screen pixels.
	pub link_tolerance: f64,
	/// Preferred link length, forwarded to the layout engine.
	pub link_distance: f64,
	/// Node repulsion, forwarded to the layout engine.
	pub charge_strength: f64,
	/// Lower zoom clamp.
	pub min_zoom: f64,
	/// Upper zoom clamp.
	pub max_zoom: f64,
	/// Screen distance (px) a pointer may travel and still count as a tap.
	pub tap_threshold: f64,
	/// Longest press (ms) that still counts as a tap.
	pub tap_timeout_ms: f64,
	/// How long (ms) a freshly inserted node stays pinned.
	pub settle_delay_ms: f64,
	/// Duration (ms) of the animated return to the identity view.
	pub reset_duration_ms: f64,
	/// Maximum offset (world units) applied when placing a new node.
	pub spawn_jitter: f64,
	/// Link stroke width in screen pixels.
	pub link_width: f64,
	/// Seed for placement jitter.
	pub seed: u64,
}

impl Default for GraphOptions {
	fn default() -> Self {
		Self {
			node_radius: 5.0,
			selection_radius: 12.0,
			link_tolerance: 6.0,
			link_distance: 60.0,
			charge_strength: 150.0,
			min_zoom: 0.1,
			max_zoom: 10.0,
			tap_threshold: 6.0,
			tap_timeout_ms: 300.0,
			settle_delay_ms: 600.0,
			reset_duration_ms: 450.0,
			spawn_jitter: 30.0,
			link_width: 1.5,
			seed: 0x5eed,
		}
	}
}

impl GraphOptions {
	/// Returns a copy with nonsensical values replaced by defaults.
	///
	/// Zoom bounds are swapped if inverted; non-positive radii and
	/// thresholds fall back to their defaults.
	pub fn sanitized(&self) -> Self {
		let defaults = Self::default();
		let positive = |value: f64, fallback: f64| {
			if value.is_finite() && value > 0.0 {
				value
			} else {
				fallback
			}
		};
		let min_zoom = positive(self.min_zoom, defaults.min_zoom);
		let max_zoom = positive(self.max_zoom, defaults.max_zoom);
		Self {
			node_radius: positive(self.node_radius, defaults.node_radius),
			selection_radius: positive(self.selection_radius, defaults.selection_radius),
			link_tolerance: positive(self.link_tolerance, defaults.link_tolerance),
			link_distance: positive(self.link_distance, defaults.link_distance),
			charge_strength: positive(self.charge_strength, defaults.charge_strength),
			min_zoom: min_zoom.min(max_zoom),
			max_zoom: max_zoom.max(min_zoom),
			tap_threshold: positive(self.tap_threshold, defaults.tap_threshold),
			tap_timeout_ms: positive(self.tap_timeout_ms, defaults.tap_timeout_ms),
			settle_delay_ms: self.settle_delay_ms.max(0.0),
			reset_duration_ms: self.reset_duration_ms.max(0.0),
			spawn_jitter: self.spawn_jitter.abs(),
			link_width: positive(self.link_width, defaults.link_width),
			seed: self.seed,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn partial_json_keeps_defaults() {
		let options: GraphOptions =
			serde_json::from_str(r#"{ "tapThreshold": 10, "maxZoom": 4 }"#).unwrap();
		assert_eq!(options.tap_threshold, 10.0);
		assert_eq!(options.max_zoom, 4.0);
		assert_eq!(options.selection_radius, 12.0);
	}

	#[test]
	fn sanitized_repairs_bad_values() {
		let options = GraphOptions {
			min_zoom: 8.0,
			max_zoom: 2.0,
			selection_radius: -1.0,
			..GraphOptions::default()
		}
		.sanitized();
		assert_eq!((options.min_zoom, options.max_zoom), (2.0, 8.0));
		assert_eq!(options.selection_radius, 12.0);
	}
}
