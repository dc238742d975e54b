//! Pointer dragging of the floating player.

/// A position in viewport units (pixels, or terminal cells).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

/// Where the floating player is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Placement {
    /// Horizontally centered, docked to the bottom of the viewport.
    #[default]
    Docked,
    /// Top-left corner pinned by a drag.
    Absolute(Point),
}

/// Drag tracking: the pinned position (if any) and the grab offset of an
/// in-progress drag.
#[derive(Debug, Clone, Default)]
pub struct DragState {
    position: Option<Point>,
    grab: Option<Point>,
}

impl DragState {
    /// Start tracking a drag that grabbed the widget at `pointer` while its
    /// top-left corner was drawn at `origin`.
    pub fn begin(&mut self, pointer: Point, origin: Point) {
        let origin = self.position.unwrap_or(origin);
        self.grab = Some(Point::new(pointer.x - origin.x, pointer.y - origin.y));
    }

    /// Follow the pointer, keeping the widget inside the viewport.
    ///
    /// Returns the new position, or `None` when no drag is in progress.
    pub fn move_to(&mut self, pointer: Point, viewport: Size, widget: Size) -> Option<Point> {
        let grab = self.grab?;
        let max_x = viewport.width - widget.width;
        let max_y = viewport.height - widget.height;
        let pos = Point::new(
            (pointer.x - grab.x).min(max_x).max(0),
            (pointer.y - grab.y).min(max_y).max(0),
        );
        self.position = Some(pos);
        Some(pos)
    }

    pub fn end(&mut self) {
        self.grab = None;
    }

    /// Forget the pinned position and fall back to the docked layout.
    pub fn reset(&mut self) {
        self.position = None;
        self.grab = None;
    }

    pub fn is_dragging(&self) -> bool {
        self.grab.is_some()
    }

    pub fn placement(&self) -> Placement {
        match self.position {
            Some(p) => Placement::Absolute(p),
            None => Placement::Docked,
        }
    }
}
