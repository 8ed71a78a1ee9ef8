use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in screen pixels. Y grows downward.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Move the rect so its left edge sits at `x`.
    pub fn set_left(&mut self, x: f32) {
        self.x = x;
    }

    /// Move the rect so its right edge sits at `x`.
    pub fn set_right(&mut self, x: f32) {
        self.x = x - self.width;
    }

    /// Move the rect so its top edge sits at `y`.
    pub fn set_top(&mut self, y: f32) {
        self.y = y;
    }

    /// Move the rect so its bottom edge sits at `y`.
    pub fn set_bottom(&mut self, y: f32) {
        self.y = y - self.height;
    }

    /// Strict overlap test. Rects that only share an edge do not overlap.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }

    /// Grow the rect by `dx` total width and `dy` total height, keeping its centre.
    pub fn inflate(&self, dx: f32, dy: f32) -> Rect {
        Rect {
            x: self.x - dx / 2.0,
            y: self.y - dy / 2.0,
            width: self.width + dx,
            height: self.height + dy,
        }
    }

    /// True if no part of this rect lies inside `bounds`.
    pub fn is_outside(&self, bounds: &Rect) -> bool {
        self.right() < bounds.left()
            || self.left() > bounds.right()
            || self.bottom() < bounds.top()
            || self.top() > bounds.bottom()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edges_derive_from_origin_and_size() {
        let r = Rect::new(10.0, 20.0, 30.0, 40.0);
        assert_eq!(r.left(), 10.0);
        assert_eq!(r.right(), 40.0);
        assert_eq!(r.top(), 20.0);
        assert_eq!(r.bottom(), 60.0);
        assert_eq!(r.center(), (25.0, 40.0));
    }

    #[test]
    fn shared_edge_is_not_overlap() {
        let floor = Rect::new(0.0, 100.0, 200.0, 20.0);
        let resting = Rect::new(50.0, 68.0, 32.0, 32.0);
        assert_eq!(resting.bottom(), floor.top());
        assert!(!resting.overlaps(&floor));

        let sunk = Rect::new(50.0, 69.0, 32.0, 32.0);
        assert!(sunk.overlaps(&floor));
    }

    #[test]
    fn edge_setters_keep_size() {
        let mut r = Rect::new(0.0, 0.0, 32.0, 32.0);
        r.set_bottom(400.0);
        assert_eq!(r.y, 368.0);
        r.set_right(100.0);
        assert_eq!(r.x, 68.0);
        assert_eq!(r.width, 32.0);
        assert_eq!(r.height, 32.0);
    }

    #[test]
    fn inflate_keeps_center() {
        let r = Rect::new(10.0, 10.0, 32.0, 32.0);
        let wide = r.inflate(4.0, 0.0);
        assert_eq!(wide.left(), 8.0);
        assert_eq!(wide.right(), 44.0);
        assert_eq!(wide.center(), r.center());
    }

    #[test]
    fn outside_requires_no_overlap_with_bounds() {
        let bounds = Rect::new(0.0, 0.0, 800.0, 600.0);
        assert!(!Rect::new(795.0, 10.0, 10.0, 6.0).is_outside(&bounds));
        assert!(Rect::new(801.0, 10.0, 10.0, 6.0).is_outside(&bounds));
        assert!(Rect::new(-11.0, 10.0, 10.0, 6.0).is_outside(&bounds));
    }
}
