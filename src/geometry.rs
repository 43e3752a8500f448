/// Integer geometry shared by every entity: positions, boxes, directions and
/// the overlap test that drives all collision handling.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};

// ── Vectors ──────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: i32,
    pub y: i32,
}

impl Vec2 {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Manhattan distance to `other`.
    pub fn manhattan(self, other: Vec2) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }
}

// ── Direction ────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Unit vector in screen coordinates (y grows downward).
    pub fn unit(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub fn random(rng: &mut impl Rng) -> Direction {
        Direction::ALL[rng.gen_range(0..Direction::ALL.len())]
    }
}

// ── Rectangles ───────────────────────────────────────────────────────────────

/// Axis-aligned box. Every entity's spatial extent is one of these.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    /// Checked constructor; rejects non-positive extents.
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Result<Self> {
        if w <= 0 || h <= 0 {
            return Err(GameError::DegenerateRect { w, h });
        }
        Ok(Self { x, y, w, h })
    }

    /// A box covering the whole playfield.
    pub fn playfield(bounds: Vec2) -> Self {
        Self {
            x: 0,
            y: 0,
            w: bounds.x,
            h: bounds.y,
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.w <= 0 || self.h <= 0
    }

    pub fn origin(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Move by `(dx, dy)`, saturating at the `i32` range.
    pub fn translate(&mut self, dx: i32, dy: i32) {
        self.x = self.x.saturating_add(dx);
        self.y = self.y.saturating_add(dy);
    }

    /// Exclusive right edge.
    pub fn right(&self) -> i32 {
        self.x.saturating_add(self.w)
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> i32 {
        self.y.saturating_add(self.h)
    }

    /// Pull the box back inside `[0, bounds - size]` on both axes.
    pub fn clamp_within(&mut self, bounds: Vec2) {
        self.x = self.x.clamp(0, (bounds.x - self.w).max(0));
        self.y = self.y.clamp(0, (bounds.y - self.h).max(0));
    }

    /// Smallest box containing both `self` and `other`.
    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Rect {
            x,
            y,
            w: self.right().max(other.right()).saturating_sub(x),
            h: self.bottom().max(other.bottom()).saturating_sub(y),
        }
    }

    pub fn is_within(&self, bounds: Vec2) -> bool {
        self.x >= 0 && self.y >= 0 && self.right() <= bounds.x && self.bottom() <= bounds.y
    }
}

/// Strict overlap test: boxes that merely share an edge do not collide.
pub fn intersects(a: &Rect, b: &Rect) -> bool {
    a.x < b.right() && a.right() > b.x && a.y < b.bottom() && a.bottom() > b.y
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(x: i32, y: i32, w: i32, h: i32) -> Rect {
        Rect { x, y, w, h }
    }

    #[test]
    fn identical_boxes_intersect() {
        let a = r(10, 10, 20, 20);
        assert!(intersects(&a, &a));
    }

    #[test]
    fn touching_edges_do_not_intersect() {
        let a = r(0, 0, 20, 20);
        assert!(!intersects(&a, &r(20, 0, 20, 20)));
        assert!(!intersects(&a, &r(0, 20, 20, 20)));
        assert!(!intersects(&a, &r(-20, 0, 20, 20)));
    }

    #[test]
    fn one_unit_overlap_intersects() {
        assert!(intersects(&r(0, 0, 20, 20), &r(19, 19, 20, 20)));
    }

    #[test]
    fn thin_laser_inside_alien() {
        // Up-facing laser rect fired from (390, 550)
        let laser = r(399, 540, 2, 10);
        assert!(intersects(&laser, &r(390, 535, 20, 20)));
    }

    #[test]
    fn new_rejects_degenerate() {
        assert!(matches!(
            Rect::new(0, 0, 0, 5),
            Err(GameError::DegenerateRect { w: 0, h: 5 })
        ));
        assert!(Rect::new(0, 0, 3, -1).is_err());
        assert!(Rect::new(-5, -5, 1, 1).is_ok());
    }

    #[test]
    fn clamp_pulls_back_inside() {
        let bounds = Vec2::new(800, 600);
        let mut a = r(-7, 590, 20, 20);
        a.clamp_within(bounds);
        assert_eq!((a.x, a.y), (0, 580));
        assert!(a.is_within(bounds));
    }

    #[test]
    fn union_covers_both() {
        let u = r(10, 10, 2, 10).union(&r(10, 5, 2, 10));
        assert_eq!(u, r(10, 5, 2, 15));
    }

    #[test]
    fn translate_saturates_at_range_ends() {
        let mut a = r(i32::MAX - 3, i32::MIN + 3, 2, 10);
        a.translate(5, -5);
        assert_eq!((a.x, a.y), (i32::MAX, i32::MIN));
        assert!(!intersects(&a, &Rect::playfield(Vec2::new(800, 600))));
        let u = a.union(&r(0, 0, 2, 10));
        assert_eq!((u.x, u.y), (0, i32::MIN));
    }

    #[test]
    fn direction_units_are_unit_length() {
        for d in Direction::ALL {
            let (dx, dy) = d.unit();
            assert_eq!(dx.abs() + dy.abs(), 1);
        }
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn any_rect() -> impl Strategy<Value = Rect> {
            (-1000i32..1000, -1000i32..1000, 1i32..200, 1i32..200)
                .prop_map(|(x, y, w, h)| Rect { x, y, w, h })
        }

        proptest! {
            #[test]
            fn intersects_is_symmetric(a in any_rect(), b in any_rect()) {
                prop_assert_eq!(intersects(&a, &b), intersects(&b, &a));
            }

            #[test]
            fn separated_on_x_never_intersect(a in any_rect(), gap in 0i32..50, y in -1000i32..1000, w in 1i32..200, h in 1i32..200) {
                let b = Rect { x: a.x + a.w + gap, y, w, h };
                prop_assert!(!intersects(&a, &b));
            }

            #[test]
            fn separated_on_y_never_intersect(a in any_rect(), gap in 0i32..50, x in -1000i32..1000, w in 1i32..200, h in 1i32..200) {
                let b = Rect { x, y: a.y + a.h + gap, w, h };
                prop_assert!(!intersects(&a, &b));
            }

            #[test]
            fn clamp_is_idempotent_and_inside(mut a in any_rect()) {
                let bounds = Vec2::new(800, 600);
                prop_assume!(a.w <= bounds.x && a.h <= bounds.y);
                a.clamp_within(bounds);
                prop_assert!(a.is_within(bounds));
                let before = a;
                a.clamp_within(bounds);
                prop_assert_eq!(a, before);
            }
        }
    }
}
