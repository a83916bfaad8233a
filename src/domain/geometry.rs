/// Axis-aligned rectangles and hitboxes, in world pixel units.
///
/// Rectangles are small `Copy` values: every collision probe builds its
/// own from an origin and a hitbox, nothing is shifted and restored in place.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Rect { x, y, w, h }
    }

    pub fn right(&self) -> i32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.h
    }

    pub fn translated(self, dx: i32, dy: i32) -> Rect {
        Rect { x: self.x + dx, y: self.y + dy, ..self }
    }

    /// Strict overlap: rectangles that only share an edge do not intersect,
    /// and an empty rectangle intersects nothing.
    pub fn intersects(&self, other: &Rect) -> bool {
        if self.w <= 0 || self.h <= 0 || other.w <= 0 || other.h <= 0 {
            return false;
        }
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

/// Hitbox: offset from an origin plus a size. Fixed after construction.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Hitbox {
    pub dx: i32,
    pub dy: i32,
    pub w: i32,
    pub h: i32,
}

impl Hitbox {
    pub const fn new(dx: i32, dy: i32, w: i32, h: i32) -> Self {
        Hitbox { dx, dy, w, h }
    }

    pub const fn full_tile(tile_size: i32) -> Self {
        Hitbox { dx: 0, dy: 0, w: tile_size, h: tile_size }
    }

    /// World rectangle of this hitbox for an origin at (x, y).
    pub fn at(&self, x: i32, y: i32) -> Rect {
        Rect::new(x + self.dx, y + self.dy, self.w, self.h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlapping_rects_intersect() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(5, 5, 10, 10);
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
    }

    #[test]
    fn touching_edges_do_not_intersect() {
        let a = Rect::new(0, 0, 10, 10);
        assert!(!a.intersects(&Rect::new(10, 0, 10, 10)));
        assert!(!a.intersects(&Rect::new(0, 10, 10, 10)));
    }

    #[test]
    fn empty_rect_never_intersects() {
        let a = Rect::new(0, 0, 10, 10);
        assert!(!a.intersects(&Rect::new(2, 2, 0, 5)));
    }

    #[test]
    fn hitbox_applies_offset() {
        let hb = Hitbox::new(8, 16, 32, 32);
        assert_eq!(hb.at(100, 200), Rect::new(108, 216, 32, 32));
        assert_eq!(hb.at(100, 200).translated(-4, 0), Rect::new(104, 216, 32, 32));
    }
}
