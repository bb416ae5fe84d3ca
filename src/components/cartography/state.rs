use super::viewport::{Size, ViewportState, ZoomDirection};

/// Euclidean distance a press must travel before it counts as a drag.
pub const DRAG_THRESHOLD: f64 = 5.0;
/// Delay after release before clicks are accepted again.
pub const CLICK_SUPPRESSION_MS: u64 = 10;

pub const PRIMARY_BUTTON: i16 = 0;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum PanGesture {
	#[default]
	Idle,
	Dragging {
		start_x: f64,
		start_y: f64,
		pan_start_x: f64,
		pan_start_y: f64,
	},
}

/// Everything the cartography view mutates in response to input.
#[derive(Clone, Debug, Default)]
pub struct CartographyState {
	/// `None` until a diagram has been loaded.
	pub viewport: Option<ViewportState>,
	pub pan: PanGesture,
	/// Set once the current (or just finished) press moved past the drag
	/// threshold; cleared shortly after release.
	pub has_moved: bool,
}

impl CartographyState {
	pub fn load(&mut self, content: Size, container: Size) {
		let fitted = ViewportState::new(content)
			.with_scale(ViewportState::fit_scale(content, container));
		self.viewport = Some(fitted);
		self.pan = PanGesture::Idle;
		self.has_moved = false;
	}

	pub fn is_dragging(&self) -> bool {
		matches!(self.pan, PanGesture::Dragging { .. })
	}

	/// Starts a pan on a primary-button press. Returns whether a drag began.
	pub fn begin_pan(&mut self, button: i16, x: f64, y: f64) -> bool {
		if button != PRIMARY_BUTTON {
			return false;
		}
		let (pan_start_x, pan_start_y) = self
			.viewport
			.map(|v| (v.pan_x, v.pan_y))
			.unwrap_or_default();
		self.pan = PanGesture::Dragging {
			start_x: x,
			start_y: y,
			pan_start_x,
			pan_start_y,
		};
		self.has_moved = false;
		true
	}

	/// Moves the view with the pointer. Returns the updated viewport while a
	/// drag is active.
	pub fn drag_to(&mut self, x: f64, y: f64) -> Option<ViewportState> {
		let PanGesture::Dragging {
			start_x,
			start_y,
			pan_start_x,
			pan_start_y,
		} = self.pan
		else {
			return None;
		};
		let (dx, dy) = (x - start_x, y - start_y);
		if (dx * dx + dy * dy).sqrt() > DRAG_THRESHOLD {
			self.has_moved = true;
		}
		let viewport = self.viewport?.panned_to(pan_start_x + dx, pan_start_y + dy);
		self.viewport = Some(viewport);
		Some(viewport)
	}

	/// Ends the drag. Returns `true` when a drag was active, in which case the
	/// caller schedules [`Self::clear_suppression`].
	pub fn end_pan(&mut self) -> bool {
		let was_dragging = self.is_dragging();
		self.pan = PanGesture::Idle;
		was_dragging
	}

	pub fn clear_suppression(&mut self) {
		self.has_moved = false;
	}

	pub fn click_allowed(&self) -> bool {
		!self.has_moved
	}

	pub fn zoom_at(&mut self, direction: ZoomDirection, x: f64, y: f64) -> Option<ViewportState> {
		let viewport = self.viewport?.zoomed_at(direction, x, y);
		self.viewport = Some(viewport);
		Some(viewport)
	}

	pub fn zoom_at_center(
		&mut self,
		direction: ZoomDirection,
		container: Size,
	) -> Option<ViewportState> {
		let viewport = self.viewport?.zoomed_at_center(direction, container);
		self.viewport = Some(viewport);
		Some(viewport)
	}

	pub fn center(&mut self, container: Size) -> Option<ViewportState> {
		let viewport = self.viewport?.centered_in(container);
		self.viewport = Some(viewport);
		Some(viewport)
	}

	pub fn reset(&mut self, container: Size) -> Option<ViewportState> {
		let viewport = self.viewport?.reset_in(container);
		self.viewport = Some(viewport);
		Some(viewport)
	}
}
