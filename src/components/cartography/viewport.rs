//! Pan/zoom algebra for the cartography viewport.
//!
//! Everything here is plain data in, plain data out: the component reads the
//! container size from the DOM, hands it to these functions and writes the
//! resulting transform back.

pub const ZOOM_MIN: f64 = 0.1;
pub const ZOOM_MAX: f64 = 10.0;
pub const ZOOM_STEP: f64 = 0.15;
/// Scale used before the first fit, and for content of unknown size.
pub const INITIAL_SCALE: f64 = 0.5;
/// Total margin (both sides together) left around fitted content.
pub const FIT_MARGIN: f64 = 40.0;
/// Pan used on an axis where the scaled content overflows the container.
pub const OVERFLOW_MARGIN: f64 = 20.0;
pub const DEFAULT_CONTENT: Size = Size {
	width: 1000.0,
	height: 800.0,
};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Size {
	pub width: f64,
	pub height: f64,
}

impl Size {
	pub fn new(width: f64, height: f64) -> Self {
		Self { width, height }
	}

	pub fn is_positive(&self) -> bool {
		self.width > 0.0 && self.height > 0.0
	}

	pub fn center(&self) -> (f64, f64) {
		(self.width / 2.0, self.height / 2.0)
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ZoomDirection {
	In,
	Out,
}

impl ZoomDirection {
	/// Wheel scrolling down (positive delta) zooms out.
	pub fn from_wheel_delta(delta_y: f64) -> Self {
		if delta_y > 0.0 { Self::Out } else { Self::In }
	}

	fn factor(self) -> f64 {
		match self {
			Self::In => 1.0 + ZOOM_STEP,
			Self::Out => 1.0 - ZOOM_STEP,
		}
	}
}

/// Translate + uniform scale over a diagram of fixed size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportState {
	pub scale: f64,
	pub pan_x: f64,
	pub pan_y: f64,
	pub content: Size,
}

impl ViewportState {
	pub fn new(content: Size) -> Self {
		Self {
			scale: INITIAL_SCALE,
			pan_x: 0.0,
			pan_y: 0.0,
			content,
		}
	}

	/// Largest scale showing the whole content with [`FIT_MARGIN`] to spare,
	/// never above 1.0 and never below [`ZOOM_MIN`].
	pub fn fit_scale(content: Size, container: Size) -> f64 {
		if !content.is_positive() {
			return INITIAL_SCALE;
		}
		let scale_x = (container.width - FIT_MARGIN) / content.width;
		let scale_y = (container.height - FIT_MARGIN) / content.height;
		scale_x.min(scale_y).min(1.0).max(ZOOM_MIN)
	}

	pub fn with_scale(self, scale: f64) -> Self {
		Self {
			scale: scale.clamp(ZOOM_MIN, ZOOM_MAX),
			..self
		}
	}

	/// Centers the scaled content; an overflowing axis is pinned to
	/// [`OVERFLOW_MARGIN`] so its top-left corner stays reachable.
	pub fn centered_in(self, container: Size) -> Self {
		let scaled_w = self.content.width * self.scale;
		let scaled_h = self.content.height * self.scale;
		let pan_x = if scaled_w > container.width {
			OVERFLOW_MARGIN
		} else {
			(container.width - scaled_w) / 2.0
		};
		let pan_y = if scaled_h > container.height {
			OVERFLOW_MARGIN
		} else {
			(container.height - scaled_h) / 2.0
		};
		Self {
			pan_x,
			pan_y,
			..self
		}
	}

	/// Fit then center.
	pub fn reset_in(self, container: Size) -> Self {
		self.with_scale(Self::fit_scale(self.content, container))
			.centered_in(container)
	}

	/// One zoom step keeping the content point under `(x, y)` fixed on screen.
	pub fn zoomed_at(self, direction: ZoomDirection, x: f64, y: f64) -> Self {
		let new_scale = (self.scale * direction.factor()).clamp(ZOOM_MIN, ZOOM_MAX);
		let ratio = new_scale / self.scale;
		Self {
			scale: new_scale,
			pan_x: x - (x - self.pan_x) * ratio,
			pan_y: y - (y - self.pan_y) * ratio,
			..self
		}
	}

	pub fn zoomed_at_center(self, direction: ZoomDirection, container: Size) -> Self {
		let (cx, cy) = container.center();
		self.zoomed_at(direction, cx, cy)
	}

	pub fn panned_to(self, pan_x: f64, pan_y: f64) -> Self {
		Self {
			pan_x,
			pan_y,
			..self
		}
	}

	pub fn screen_to_content(&self, sx: f64, sy: f64) -> (f64, f64) {
		((sx - self.pan_x) / self.scale, (sy - self.pan_y) / self.scale)
	}

	pub fn css_transform(&self) -> String {
		format!(
			"translate({}px, {}px) scale({})",
			self.pan_x, self.pan_y, self.scale
		)
	}

	pub fn zoom_label(&self) -> String {
		format_zoom(self.scale)
	}
}

pub fn format_zoom(scale: f64) -> String {
	format!("{}%", (scale * 100.0).round())
}

#[cfg(test)]
mod tests {
	use super::*;

	const EPS: f64 = 1e-9;

	fn close(a: f64, b: f64) -> bool {
		(a - b).abs() < EPS * a.abs().max(b.abs()).max(1.0)
	}

	#[test]
	fn zoom_stays_within_bounds() {
		let mut v = ViewportState::new(DEFAULT_CONTENT);
		for _ in 0..200 {
			v = v.zoomed_at(ZoomDirection::In, 300.0, 200.0);
			assert!(v.scale <= ZOOM_MAX);
		}
		assert_eq!(v.scale, ZOOM_MAX);
		for _ in 0..200 {
			v = v.zoomed_at(ZoomDirection::Out, 10.0, 900.0);
			assert!(v.scale >= ZOOM_MIN);
		}
		assert_eq!(v.scale, ZOOM_MIN);

		// Alternating and uneven sequences.
		for i in 0..500 {
			let dir = if (i * 7) % 3 == 0 {
				ZoomDirection::Out
			} else {
				ZoomDirection::In
			};
			v = v.zoomed_at(dir, i as f64, -(i as f64));
			assert!((ZOOM_MIN..=ZOOM_MAX).contains(&v.scale));
		}
	}

	#[test]
	fn zoom_keeps_point_under_cursor() {
		let pointers = [(0.0, 0.0), (123.4, 56.7), (-40.0, 900.0), (1500.0, 1500.0)];
		let starts = [
			ViewportState::new(DEFAULT_CONTENT),
			ViewportState::new(DEFAULT_CONTENT)
				.with_scale(2.3)
				.panned_to(-310.0, 47.5),
			ViewportState::new(DEFAULT_CONTENT)
				.with_scale(0.12)
				.panned_to(20.0, 20.0),
		];
		for start in starts {
			for (mx, my) in pointers {
				for dir in [ZoomDirection::In, ZoomDirection::Out] {
					let after = start.zoomed_at(dir, mx, my);
					let (cx0, cy0) = start.screen_to_content(mx, my);
					let (cx1, cy1) = after.screen_to_content(mx, my);
					assert!(close(cx0, cx1), "x drifted: {cx0} vs {cx1}");
					assert!(close(cy0, cy1), "y drifted: {cy0} vs {cy1}");
				}
			}
		}
	}

	#[test]
	fn zoom_at_clamped_scale_does_not_move_content() {
		let v = ViewportState::new(DEFAULT_CONTENT)
			.with_scale(ZOOM_MAX)
			.panned_to(12.0, 34.0);
		let after = v.zoomed_at(ZoomDirection::In, 400.0, 300.0);
		assert_eq!(after.scale, ZOOM_MAX);
		assert!(close(after.pan_x, 12.0));
		assert!(close(after.pan_y, 34.0));
	}

	#[test]
	fn zoom_step_is_fifteen_percent() {
		let v = ViewportState::new(DEFAULT_CONTENT).with_scale(1.0);
		assert!(close(v.zoomed_at(ZoomDirection::In, 0.0, 0.0).scale, 1.15));
		assert!(close(v.zoomed_at(ZoomDirection::Out, 0.0, 0.0).scale, 0.85));
	}

	#[test]
	fn zoom_at_center_uses_container_midpoint() {
		let container = Size::new(800.0, 600.0);
		let v = ViewportState::new(DEFAULT_CONTENT).panned_to(50.0, 60.0);
		let a = v.zoomed_at_center(ZoomDirection::In, container);
		let b = v.zoomed_at(ZoomDirection::In, 400.0, 300.0);
		assert_eq!(a, b);
	}

	#[test]
	fn reset_fits_content_with_margin() {
		let container = Size::new(800.0, 600.0);
		let v = ViewportState::new(Size::new(2000.0, 1000.0)).reset_in(container);
		assert!(v.scale * 2000.0 <= container.width - FIT_MARGIN + EPS);
		assert!(v.scale * 1000.0 <= container.height - FIT_MARGIN + EPS);
		assert!(close(v.scale, 0.38));
	}

	#[test]
	fn reset_never_magnifies_small_content() {
		let v = ViewportState::new(Size::new(100.0, 50.0)).reset_in(Size::new(1920.0, 1080.0));
		assert_eq!(v.scale, 1.0);
		assert!(close(v.pan_x, (1920.0 - 100.0) / 2.0));
		assert!(close(v.pan_y, (1080.0 - 50.0) / 2.0));
	}

	#[test]
	fn reset_floors_at_min_zoom() {
		let v = ViewportState::new(Size::new(100_000.0, 100_000.0)).reset_in(Size::new(400.0, 300.0));
		assert_eq!(v.scale, ZOOM_MIN);
		// 10_000 px scaled content overflows, so both axes pin to the margin.
		assert_eq!((v.pan_x, v.pan_y), (OVERFLOW_MARGIN, OVERFLOW_MARGIN));
	}

	#[test]
	fn center_pins_only_the_overflowing_axis() {
		let v = ViewportState::new(Size::new(1000.0, 200.0))
			.with_scale(1.0)
			.centered_in(Size::new(600.0, 600.0));
		assert_eq!(v.pan_x, OVERFLOW_MARGIN);
		assert!(close(v.pan_y, 200.0));
	}

	#[test]
	fn transform_and_label_formatting() {
		let v = ViewportState::new(DEFAULT_CONTENT)
			.with_scale(1.15)
			.panned_to(-12.5, 40.0);
		assert_eq!(v.css_transform(), "translate(-12.5px, 40px) scale(1.15)");
		assert_eq!(v.zoom_label(), "115%");
		assert_eq!(format_zoom(0.5), "50%");
		assert_eq!(format_zoom(0.1234), "12%");
	}

	#[test]
	fn wheel_delta_direction() {
		assert_eq!(ZoomDirection::from_wheel_delta(120.0), ZoomDirection::Out);
		assert_eq!(ZoomDirection::from_wheel_delta(-3.0), ZoomDirection::In);
		assert_eq!(ZoomDirection::from_wheel_delta(0.0), ZoomDirection::In);
	}
}
