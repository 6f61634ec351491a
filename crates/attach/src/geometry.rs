use serde::{Deserialize, Serialize};
use std::ops::BitOr;

/// Axis-aligned bounds of a comment or an attachment target
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rectangle {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
    }

    /// Whether the two rectangles overlap. Rectangles that only share an edge don't.
    pub fn intersects(&self, other: &Rectangle) -> bool {
        Outcode::of(self, other) == Outcode::INSIDE
    }
}

/// Region of the plane one rectangle occupies relative to another.
///
/// The eight regions around the reference rectangle are encoded as combinations of
/// `LEFT`, `TOP`, `RIGHT` and `BOTTOM`. Rectangles that exactly touch an edge of the reference
/// count as lying outside of it on that side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Outcode(u8);

impl Outcode {
    pub const INSIDE: Outcode = Outcode(0);
    pub const LEFT: Outcode = Outcode(1);
    pub const TOP: Outcode = Outcode(2);
    pub const RIGHT: Outcode = Outcode(4);
    pub const BOTTOM: Outcode = Outcode(8);

    /// Classify `other` against `reference`.
    pub fn of(reference: &Rectangle, other: &Rectangle) -> Self {
        let mut code = Outcode::INSIDE;

        if other.right() <= reference.x {
            code = code | Outcode::LEFT;
        } else if other.x >= reference.right() {
            code = code | Outcode::RIGHT;
        }

        if other.bottom() <= reference.y {
            code = code | Outcode::TOP;
        } else if other.y >= reference.bottom() {
            code = code | Outcode::BOTTOM;
        }

        code
    }

    pub fn contains(self, flag: Outcode) -> bool {
        flag.0 != 0 && self.0 & flag.0 == flag.0
    }

    /// Separated along the x axis (left or right of the reference).
    pub fn is_horizontal(self) -> bool {
        self.contains(Outcode::LEFT) || self.contains(Outcode::RIGHT)
    }

    /// Separated along the y axis (above or below the reference).
    pub fn is_vertical(self) -> bool {
        self.contains(Outcode::TOP) || self.contains(Outcode::BOTTOM)
    }

    /// Cater-cornered: separated along both axes.
    pub fn is_diagonal(self) -> bool {
        self.is_horizontal() && self.is_vertical()
    }
}

impl BitOr for Outcode {
    type Output = Outcode;

    fn bitor(self, rhs: Outcode) -> Outcode {
        Outcode(self.0 | rhs.0)
    }
}

/// Distance between two rectangles.
///
/// Intersecting and touching rectangles are `0` apart. Rectangles separated along one axis are
/// as far apart as the gap along that axis, and diagonally separated rectangles are as far apart
/// as their nearest corners. Returns `None` if the geometry is not measurable.
pub fn distance(a: &Rectangle, b: &Rectangle) -> Option<f64> {
    if !a.is_finite() || !b.is_finite() {
        return None;
    }

    let code = Outcode::of(a, b);
    if code == Outcode::INSIDE {
        return Some(0.0);
    }

    let dx = if code.contains(Outcode::LEFT) {
        a.x - b.right()
    } else if code.contains(Outcode::RIGHT) {
        b.x - a.right()
    } else {
        0.0
    };

    let dy = if code.contains(Outcode::TOP) {
        a.y - b.bottom()
    } else if code.contains(Outcode::BOTTOM) {
        b.y - a.bottom()
    } else {
        0.0
    };

    Some(dx.hypot(dy))
}

/// Smallest offset by which one rectangle would have to move to be left/right aligned (if the
/// rectangles are stacked) or top/bottom aligned (if they are side by side) with the other.
///
/// Overlapping rectangles may align along either axis. Returns `None` for cater-cornered
/// rectangles, which have no sensible alignment axis, and for unmeasurable geometry.
pub fn alignment_offset(a: &Rectangle, b: &Rectangle) -> Option<f64> {
    if !a.is_finite() || !b.is_finite() {
        return None;
    }

    let horizontal = (b.x - a.x).abs().min((b.right() - a.right()).abs());
    let vertical = (b.y - a.y).abs().min((b.bottom() - a.bottom()).abs());

    let code = Outcode::of(a, b);
    if code == Outcode::INSIDE {
        Some(horizontal.min(vertical))
    } else if code.is_diagonal() {
        None
    } else if code.is_vertical() {
        // stacked on top of each other, so left or right edges should line up
        Some(horizontal)
    } else {
        Some(vertical)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn rect(x: f64, y: f64, w: f64, h: f64) -> Rectangle {
        Rectangle::new(x, y, w, h)
    }

    #[test]
    fn test_outcode_regions() {
        let reference = rect(10.0, 10.0, 10.0, 10.0);

        assert_eq!(Outcode::of(&reference, &rect(12.0, 12.0, 2.0, 2.0)), Outcode::INSIDE);
        assert_eq!(Outcode::of(&reference, &rect(0.0, 12.0, 5.0, 2.0)), Outcode::LEFT);
        assert_eq!(Outcode::of(&reference, &rect(25.0, 12.0, 5.0, 2.0)), Outcode::RIGHT);
        assert_eq!(Outcode::of(&reference, &rect(12.0, 0.0, 2.0, 5.0)), Outcode::TOP);
        assert_eq!(Outcode::of(&reference, &rect(12.0, 25.0, 2.0, 5.0)), Outcode::BOTTOM);

        let corner = Outcode::of(&reference, &rect(25.0, 25.0, 5.0, 5.0));
        assert!(corner.is_diagonal());
        assert!(corner.contains(Outcode::RIGHT));
        assert!(corner.contains(Outcode::BOTTOM));
        assert!(!corner.contains(Outcode::LEFT));
    }

    #[test]
    fn test_touching_counts_as_outside() {
        let reference = rect(0.0, 0.0, 10.0, 10.0);
        let below = rect(0.0, 10.0, 10.0, 10.0);

        assert_eq!(Outcode::of(&reference, &below), Outcode::BOTTOM);
        assert!(!reference.intersects(&below));
    }

    #[test]
    fn test_distance_axis_gap() {
        let a = rect(0.0, 0.0, 10.0, 10.0);
        let b = rect(20.0, 0.0, 10.0, 10.0);
        assert_eq!(distance(&a, &b), Some(10.0));

        let c = rect(0.0, 30.0, 10.0, 10.0);
        assert_eq!(distance(&a, &c), Some(20.0));
    }

    #[test]
    fn test_distance_diagonal_uses_nearest_corners() {
        let a = rect(0.0, 0.0, 10.0, 10.0);
        let b = rect(13.0, 14.0, 5.0, 5.0);
        assert_eq!(distance(&a, &b), Some(5.0));
    }

    #[test]
    fn test_distance_intersecting_and_touching_is_zero() {
        let a = rect(0.0, 0.0, 10.0, 10.0);
        assert_eq!(distance(&a, &rect(5.0, 5.0, 10.0, 10.0)), Some(0.0));
        assert_eq!(distance(&a, &rect(10.0, 0.0, 10.0, 10.0)), Some(0.0));
        assert_eq!(distance(&a, &rect(10.0, 10.0, 10.0, 10.0)), Some(0.0));
    }

    #[test]
    fn test_distance_unmeasurable() {
        let a = rect(0.0, 0.0, 10.0, 10.0);
        assert_eq!(distance(&a, &rect(f64::NAN, 0.0, 1.0, 1.0)), None);
    }

    #[test]
    fn test_alignment_of_stacked_rectangles() {
        // b sits below a, left edges 2 apart, right edges 7 apart
        let a = rect(0.0, 0.0, 10.0, 10.0);
        let b = rect(2.0, 20.0, 15.0, 5.0);
        assert_eq!(alignment_offset(&a, &b), Some(2.0));
    }

    #[test]
    fn test_alignment_of_side_by_side_rectangles() {
        let a = rect(0.0, 0.0, 10.0, 10.0);
        let b = rect(30.0, 4.0, 10.0, 6.0);
        // bottoms line up exactly
        assert_eq!(alignment_offset(&a, &b), Some(0.0));
    }

    #[test]
    fn test_alignment_of_overlapping_rectangles_takes_either_axis() {
        let a = rect(0.0, 0.0, 10.0, 10.0);
        let b = rect(3.0, 1.0, 10.0, 10.0);
        assert_eq!(alignment_offset(&a, &b), Some(1.0));
    }

    #[test]
    fn test_alignment_of_cater_cornered_rectangles() {
        let a = rect(0.0, 0.0, 10.0, 10.0);
        let b = rect(20.0, 20.0, 10.0, 10.0);
        assert_eq!(alignment_offset(&a, &b), None);
    }

    fn any_rect() -> impl Strategy<Value = Rectangle> {
        (-100i32..100, -100i32..100, 0i32..50, 0i32..50)
            .prop_map(|(x, y, w, h)| rect(x as f64, y as f64, w as f64, h as f64))
    }

    proptest! {
        #[test]
        fn proptest_distance_is_symmetric(a in any_rect(), b in any_rect()) {
            prop_assert_eq!(distance(&a, &b), distance(&b, &a));
        }

        #[test]
        fn proptest_alignment_is_symmetric(a in any_rect(), b in any_rect()) {
            prop_assert_eq!(alignment_offset(&a, &b), alignment_offset(&b, &a));
        }

        #[test]
        fn proptest_distance_is_never_negative(a in any_rect(), b in any_rect()) {
            let d = distance(&a, &b).expect("finite geometry");
            prop_assert!(d >= 0.0);
        }
    }
}
