//! Small 2D helpers shared by the layout engine and the games.

/// Axis-aligned rectangle, top-left origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// Strict overlap: rectangles that only share an edge do not collide.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.x + other.w
            && self.x + self.w > other.x
            && self.y < other.y + other.h
            && self.y + self.h > other.y
    }

    /// True unless the two rectangles are separated by more than `margin`
    /// on at least one axis.
    pub fn near(&self, other: &Rect, margin: f64) -> bool {
        !(self.x > other.x + other.w + margin
            || self.x + self.w + margin < other.x
            || self.y > other.y + other.h + margin
            || self.y + self.h + margin < other.y)
    }

    /// Inclusive point containment.
    pub fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.x && px <= self.x + self.w && py >= self.y && py <= self.y + self.h
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.w / 2.0, self.y + self.h / 2.0)
    }
}

/// Unit vector in the direction of (x, y); zero stays zero.
pub fn normalize(x: f64, y: f64) -> (f64, f64) {
    let len = (x * x + y * y).sqrt();
    if len == 0.0 { (0.0, 0.0) } else { (x / len, y / len) }
}

pub fn distance(x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    let dx = x2 - x1;
    let dy = y2 - y1;
    (dx * dx + dy * dy).sqrt()
}
