//! Pan and zoom transform between screen and world coordinates.
//!
//! `screen = world * k + (x, y)`. The scale `k` never leaves the configured
//! zoom bounds; every mutation goes through a method that clamps it.

/// Pan and zoom transform applied to the entire graph view.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
	x: f64,
	y: f64,
	k: f64,
	min_zoom: f64,
	max_zoom: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self::identity(0.1, 10.0)
	}
}

impl ViewTransform {
	/// Identity transform with the given zoom bounds.
	pub fn identity(min_zoom: f64, max_zoom: f64) -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			k: 1.0_f64.clamp(min_zoom, max_zoom),
			min_zoom,
			max_zoom,
		}
	}

	/// Screen-space translation `(x, y)`.
	pub fn translation(&self) -> (f64, f64) {
		(self.x, self.y)
	}

	/// Zoom factor (1.0 = 100%).
	pub fn scale(&self) -> f64 {
		self.k
	}

	/// Screen pixel to world coordinate.
	pub fn to_world(&self, sx: f64, sy: f64) -> (f64, f64) {
		((sx - self.x) / self.k, (sy - self.y) / self.k)
	}

	/// World coordinate to screen pixel.
	pub fn to_screen(&self, wx: f64, wy: f64) -> (f64, f64) {
		(wx * self.k + self.x, wy * self.k + self.y)
	}

	/// Converts a length in screen pixels into world units at the current zoom.
	pub fn screen_length(&self, px: f64) -> f64 {
		px / self.k
	}

	/// Shifts the view by a screen-space delta.
	pub fn apply_pan(&mut self, dx: f64, dy: f64) {
		self.x += dx;
		self.y += dy;
	}

	/// Multiplies the zoom by `factor`, keeping the world point under `focal` fixed.
	pub fn apply_zoom(&mut self, focal: (f64, f64), factor: f64) {
		if !factor.is_finite() || factor <= 0.0 {
			return;
		}
		let (wx, wy) = self.to_world(focal.0, focal.1);
		self.k = (self.k * factor).clamp(self.min_zoom, self.max_zoom);
		self.x = focal.0 - wx * self.k;
		self.y = focal.1 - wy * self.k;
	}

	/// Jumps back to the identity transform.
	pub fn reset(&mut self) {
		*self = Self::identity(self.min_zoom, self.max_zoom);
	}

	fn lerp(from: &Self, to: &Self, t: f64) -> Self {
		let mix = |a: f64, b: f64| a + (b - a) * t;
		Self {
			x: mix(from.x, to.x),
			y: mix(from.y, to.y),
			k: mix(from.k, to.k).clamp(to.min_zoom, to.max_zoom),
			min_zoom: to.min_zoom,
			max_zoom: to.max_zoom,
		}
	}
}

/// Smooth ease-in/ease-out curve on `[0, 1]`.
pub(crate) fn smooth_step(t: f64) -> f64 {
	t * t * (3.0 - 2.0 * t)
}

/// An in-flight animated return to the identity transform.
#[derive(Clone, Debug)]
pub struct ViewAnimation {
	from: ViewTransform,
	to: ViewTransform,
	elapsed_ms: f64,
	duration_ms: f64,
}

impl ViewAnimation {
	/// Animates from `from` to its identity over `duration_ms`.
	pub fn to_identity(from: ViewTransform, duration_ms: f64) -> Self {
		let mut to = from;
		to.reset();
		Self {
			from,
			to,
			elapsed_ms: 0.0,
			duration_ms,
		}
	}

	/// Advances the animation and writes the eased transform into `view`.
	///
	/// Returns `true` once the target has been reached.
	pub fn advance(&mut self, view: &mut ViewTransform, dt_ms: f64) -> bool {
		self.elapsed_ms += dt_ms;
		if self.duration_ms <= 0.0 || self.elapsed_ms >= self.duration_ms {
			*view = self.to;
			return true;
		}
		let t = smooth_step(self.elapsed_ms / self.duration_ms);
		*view = ViewTransform::lerp(&self.from, &self.to, t);
		false
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn close(a: (f64, f64), b: (f64, f64)) -> bool {
		(a.0 - b.0).abs() < 1e-9 && (a.1 - b.1).abs() < 1e-9
	}

	#[test]
	fn world_and_screen_are_inverse() {
		let mut view = ViewTransform::identity(0.1, 10.0);
		view.apply_pan(40.0, -15.0);
		view.apply_zoom((100.0, 80.0), 2.5);

		let world = view.to_world(321.0, 123.0);
		assert!(close(view.to_screen(world.0, world.1), (321.0, 123.0)));
	}

	#[test]
	fn zoom_keeps_focal_world_point() {
		let mut view = ViewTransform::identity(0.1, 10.0);
		view.apply_pan(12.0, 34.0);
		let focal = (250.0, 175.0);
		let before = view.to_world(focal.0, focal.1);

		view.apply_zoom(focal, 3.0);
		assert!(close(view.to_world(focal.0, focal.1), before));

		view.apply_zoom(focal, 0.2);
		assert!(close(view.to_world(focal.0, focal.1), before));
	}

	#[test]
	fn zoom_is_clamped_to_bounds() {
		let mut view = ViewTransform::identity(0.5, 4.0);
		view.apply_zoom((0.0, 0.0), 100.0);
		assert_eq!(view.scale(), 4.0);
		view.apply_zoom((0.0, 0.0), 0.0001);
		assert_eq!(view.scale(), 0.5);
		view.apply_zoom((0.0, 0.0), f64::NAN);
		assert_eq!(view.scale(), 0.5);
	}

	#[test]
	fn screen_length_divides_by_scale() {
		let mut view = ViewTransform::identity(0.1, 10.0);
		view.apply_zoom((0.0, 0.0), 4.0);
		assert_eq!(view.screen_length(12.0), 3.0);
	}

	#[test]
	fn reset_animation_lands_on_identity() {
		let mut view = ViewTransform::identity(0.1, 10.0);
		view.apply_pan(200.0, -50.0);
		view.apply_zoom((10.0, 10.0), 3.0);

		let mut animation = ViewAnimation::to_identity(view, 300.0);
		assert!(!animation.advance(&mut view, 150.0));
		assert!(view.scale() > 1.0 && view.scale() < 3.0);
		assert!(animation.advance(&mut view, 200.0));
		assert_eq!(view, ViewTransform::identity(0.1, 10.0));
	}
}
