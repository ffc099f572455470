//! Geometric primitives: Point, Size, Rect.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

/// A 2D point in logical surface units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate
    pub x: f32,
    /// Y coordinate
    pub y: f32,
}

impl Point {
    /// Origin point (0, 0)
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0 };

    /// Create a new point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(&self, other: &Self) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Both coordinates are finite (not NaN or infinite).
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Default for Point {
    fn default() -> Self {
        Self::ORIGIN
    }
}

impl Add for Point {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// A 2D size with width and height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    /// Width
    pub width: f32,
    /// Height
    pub height: f32,
}

impl Size {
    /// Zero size
    pub const ZERO: Self = Self {
        width: 0.0,
        height: 0.0,
    };

    /// Create a new size.
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Whether a point lies inside `[0, width] × [0, height]`.
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        (0.0..=self.width).contains(&point.x) && (0.0..=self.height).contains(&point.y)
    }
}

impl Default for Size {
    fn default() -> Self {
        Self::ZERO
    }
}

/// A rectangle defined by position and size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// X position of top-left corner
    pub x: f32,
    /// Y position of top-left corner
    pub y: f32,
    /// Width
    pub width: f32,
    /// Height
    pub height: f32,
}

impl Rect {
    /// Create a new rectangle.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle at the origin covering `size`.
    #[must_use]
    pub const fn from_size(size: Size) -> Self {
        Self::new(0.0, 0.0, size.width, size.height)
    }

    /// Top-left corner.
    #[must_use]
    pub const fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    #[must_use]
    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Center point.
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Shrink by `amount` on all sides, never below zero size.
    #[must_use]
    pub fn inset(&self, amount: f32) -> Self {
        Self::new(
            self.x + amount,
            self.y + amount,
            (self.width - 2.0 * amount).max(0.0),
            (self.height - 2.0 * amount).max(0.0),
        )
    }

    /// Split into `count` equal-width columns separated by `gap`.
    #[must_use]
    pub fn columns(&self, count: usize, gap: f32) -> Vec<Self> {
        if count == 0 {
            return Vec::new();
        }
        let gaps = gap * (count - 1) as f32;
        let width = ((self.width - gaps) / count as f32).max(0.0);
        (0..count)
            .map(|i| Self::new(self.x + i as f32 * (width + gap), self.y, width, self.height))
            .collect()
    }

    /// Split horizontally at `height` from the top, returning (top, rest).
    #[must_use]
    pub fn split_top(&self, height: f32) -> (Self, Self) {
        let h = height.clamp(0.0, self.height);
        (
            Self::new(self.x, self.y, self.width, h),
            Self::new(self.x, self.y + h, self.width, self.height - h),
        )
    }

    /// A rectangle of `size` centered inside this one.
    #[must_use]
    pub fn centered(&self, size: Size) -> Self {
        let w = size.width.min(self.width);
        let h = size.height.min(self.height);
        Self::new(
            self.x + (self.width - w) / 2.0,
            self.y + (self.height - h) / 2.0,
            w,
            h,
        )
    }
}

impl Default for Rect {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_default() {
        assert_eq!(Point::default(), Point::ORIGIN);
    }

    #[test]
    fn test_point_distance() {
        let d = Point::new(0.0, 0.0).distance(&Point::new(3.0, 4.0));
        assert!((d - 5.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_point_is_finite() {
        assert!(Point::new(1.0, 2.0).is_finite());
        assert!(!Point::new(f32::NAN, 2.0).is_finite());
        assert!(!Point::new(1.0, f32::INFINITY).is_finite());
    }

    #[test]
    fn test_point_ops() {
        let p = Point::new(1.0, 2.0) + Point::new(3.0, 4.0);
        assert_eq!(p, Point::new(4.0, 6.0));
        assert_eq!(p - Point::new(4.0, 6.0), Point::ORIGIN);
    }

    #[test]
    fn test_size_contains_edges() {
        let s = Size::new(10.0, 5.0);
        assert!(s.contains(Point::new(0.0, 0.0)));
        assert!(s.contains(Point::new(10.0, 5.0)));
        assert!(!s.contains(Point::new(10.1, 5.0)));
        assert!(!s.contains(Point::new(-0.1, 1.0)));
    }

    #[test]
    fn test_rect_default() {
        let r = Rect::default();
        assert_eq!(r.x, 0.0);
        assert_eq!(r.size(), Size::ZERO);
    }

    #[test]
    fn test_rect_inset_never_negative() {
        let r = Rect::new(0.0, 0.0, 4.0, 4.0).inset(5.0);
        assert_eq!(r.width, 0.0);
        assert_eq!(r.height, 0.0);
    }

    #[test]
    fn test_rect_columns() {
        let cols = Rect::new(0.0, 0.0, 32.0, 10.0).columns(3, 1.0);
        assert_eq!(cols.len(), 3);
        assert_eq!(cols[0].width, 10.0);
        assert_eq!(cols[1].x, 11.0);
        assert_eq!(cols[2].right(), 32.0);
        assert!(Rect::new(0.0, 0.0, 10.0, 10.0).columns(0, 1.0).is_empty());
    }

    #[test]
    fn test_rect_split_top() {
        let (top, rest) = Rect::new(0.0, 0.0, 10.0, 10.0).split_top(3.0);
        assert_eq!(top.height, 3.0);
        assert_eq!(rest.y, 3.0);
        assert_eq!(rest.height, 7.0);
    }

    #[test]
    fn test_rect_centered() {
        let r = Rect::new(0.0, 0.0, 100.0, 50.0).centered(Size::new(20.0, 10.0));
        assert_eq!(r, Rect::new(40.0, 20.0, 20.0, 10.0));
        assert_eq!(r.center(), Point::new(50.0, 25.0));
    }
}
