//! Geometry type aliases and helper functions.
//!
//! Diagram coordinates are always `f64`. Points use `nalgebra` so callers
//! can drop into vector math when they need to; bounds and dimensions are
//! plain structs because the model only ever stores and compares them.

pub use nalgebra;

/// 2D position in diagram coordinates.
pub type Point = nalgebra::Point2<f64>;

/// Tolerance used by [`almost_equals`].
pub const EPSILON: f64 = 1e-3;

/// Shorthand for building a [`Point`].
pub fn point(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

/// Returns `true` if `a` and `b` differ by less than [`EPSILON`].
pub fn almost_equals(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

/// Linear interpolation between two points: `(1 - t) * from + t * to`.
pub fn lerp_point(from: &Point, to: &Point, t: f64) -> Point {
    Point::new(
        (1.0 - t) * from.x + t * to.x,
        (1.0 - t) * from.y + t * to.y,
    )
}

/// Width and height of an element.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Dimension {
    pub width: f64,
    pub height: f64,
}

/// Axis-aligned rectangle in diagram coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    /// Bounds that have not been measured yet. Negative dimensions mark
    /// them as invalid so [`is_valid_dimension`](Self::is_valid_dimension)
    /// fails until a real measurement arrives.
    pub const EMPTY: Self = Self {
        x: 0.0,
        y: 0.0,
        width: -1.0,
        height: -1.0,
    };

    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Top-left corner.
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn dimension(&self) -> Dimension {
        Dimension {
            width: self.width,
            height: self.height,
        }
    }

    /// Centre of the rectangle.
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Returns `true` if both dimensions are non-negative.
    pub fn is_valid_dimension(&self) -> bool {
        self.width >= 0.0 && self.height >= 0.0
    }

    /// Component-wise [`almost_equals`].
    pub fn almost_equals(&self, other: &Bounds) -> bool {
        almost_equals(self.x, other.x)
            && almost_equals(self.y, other.y)
            && almost_equals(self.width, other.width)
            && almost_equals(self.height, other.height)
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::EMPTY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lerp_midpoint() {
        let p = lerp_point(&point(0.0, 0.0), &point(10.0, 10.0), 0.5);
        assert_eq!(p, point(5.0, 5.0));
    }

    #[test]
    fn lerp_endpoints_are_exact() {
        let a = point(1.5, -2.0);
        let b = point(7.25, 3.0);
        assert_eq!(lerp_point(&a, &b, 0.0), a);
        assert_eq!(lerp_point(&a, &b, 1.0), b);
    }

    #[test]
    fn empty_bounds_are_invalid() {
        assert!(!Bounds::EMPTY.is_valid_dimension());
        assert!(Bounds::new(0.0, 0.0, 0.0, 0.0).is_valid_dimension());
    }

    #[test]
    fn bounds_almost_equals_tolerates_jitter() {
        let a = Bounds::new(10.0, 20.0, 300.0, 400.0);
        let b = Bounds::new(10.0004, 20.0, 300.0, 399.9999);
        assert!(a.almost_equals(&b));
        assert!(!a.almost_equals(&Bounds::new(10.0, 20.0, 300.0, 401.0)));
    }

    #[test]
    fn bounds_center() {
        let b = Bounds::new(0.0, 0.0, 40.0, 20.0);
        assert_eq!(b.center(), point(20.0, 10.0));
        assert_eq!(b.position(), Point::origin());
    }
}
