/// Before/after comparison slider state.
///
/// A two-state machine (idle / dragging) driving the split between the
/// original and the processed rendering. The split is kept as an absolute
/// pixel offset inside the comparison container; the "after" panel width
/// and the drag handle offset are both this one value, so they can never
/// drift apart.
/// Rendered width of every comparison container, in logical pixels.
/// The canvas widget and the clipped "after" panel both use this, so the
/// pixel offsets stored in `CompareState` line up with what is on screen.
pub const COMPARE_WIDTH: f32 = 480.0;

/// Rendered height of every comparison container.
pub const COMPARE_HEIGHT: f32 = 320.0;

#[derive(Debug, Clone, PartialEq)]
pub struct CompareState {
    container_width: f32,
    split: f32,
    dragging: bool,
}

impl CompareState {
    /// Mount a fresh comparison: the split starts at 50 % of the container.
    pub fn mount(container_width: f32) -> Self {
        Self {
            container_width,
            split: container_width / 2.0,
            dragging: false,
        }
    }

    /// Pointer-down on the handle: idle -> dragging. The split does not
    /// move until the pointer does.
    pub fn begin_drag(&mut self) {
        self.dragging = true;
    }

    /// Pointer-move while dragging. `pointer_x` is relative to the
    /// container's left edge and gets clamped to `[0, container_width]`.
    /// Moves arriving while idle are ignored.
    pub fn drag_to(&mut self, pointer_x: f32) {
        if !self.dragging {
            return;
        }
        self.split = pointer_x.clamp(0.0, self.container_width);
    }

    /// Pointer-up, or the pointer leaving the container. Both end the
    /// drag identically so the handle can never get stuck mid-drag.
    pub fn end_drag(&mut self) {
        self.dragging = false;
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// The split as an absolute pixel offset.
    pub fn split_px(&self) -> f32 {
        self.split
    }

    pub fn container_width(&self) -> f32 {
        self.container_width
    }

    /// The split as a fraction of the container width (0.0 to 1.0).
    pub fn fraction(&self) -> f32 {
        if self.container_width <= 0.0 {
            0.5
        } else {
            self.split / self.container_width
        }
    }
}
