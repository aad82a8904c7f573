//! Fundamental geometric types for trench drawings.

use nalgebra::Vector2;

/// Position in the trench cross-section measured in metres.
///
/// The layout frame has X pointing right and Y pointing down, with the origin at the
/// trench centre on the reference cable level. The ground surface sits at `y = -depth`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    /// Horizontal distance from the trench centre.
    pub x: f64,
    /// Vertical distance below the reference cable level.
    pub y: f64,
}

impl Point {
    /// Create a [`Point`] with explicit coordinates.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Convert the point into an algebraic vector.
    #[must_use]
    pub fn to_vector(self) -> Vector2<f64> {
        Vector2::new(self.x, self.y)
    }
}

impl Default for Point {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

impl From<Vector2<f64>> for Point {
    fn from(value: Vector2<f64>) -> Self {
        Self::new(value.x, value.y)
    }
}

impl From<Point> for Vector2<f64> {
    fn from(value: Point) -> Self {
        value.to_vector()
    }
}

/// Offset of one phase conductor from its circuit origin, in units of the phase spacing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhaseOffset {
    /// Horizontal offset; mirrored for odd circuits.
    pub dx: f64,
    /// Vertical offset; negative values point towards the ground surface.
    pub dy: f64,
}

impl PhaseOffset {
    /// Create a [`PhaseOffset`] with explicit components.
    #[must_use]
    pub const fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }

    /// Convert the offset into an algebraic vector.
    #[must_use]
    pub fn to_vector(self) -> Vector2<f64> {
        Vector2::new(self.dx, self.dy)
    }
}

impl From<PhaseOffset> for Vector2<f64> {
    fn from(value: PhaseOffset) -> Self {
        value.to_vector()
    }
}

/// Convenience helper for creating [`Point`] instances.
///
/// # Examples
/// ```
/// use trenchx::point;
///
/// let origin = point(0.0, -0.8);
/// assert_eq!(origin.y, -0.8);
/// ```
#[must_use]
pub const fn point(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_to_vector_roundtrip() {
        let origin = Point::new(1.0, -2.0);
        let vector: Vector2<f64> = origin.into();
        assert_eq!(vector, Vector2::new(1.0, -2.0));
        assert_eq!(Point::from(vector), origin);
    }

    #[test]
    fn point_defaults_to_origin() {
        assert_eq!(Point::default(), point(0.0, 0.0));
    }

    #[test]
    fn offset_converts_to_vector() {
        let offset = PhaseOffset::new(0.5, -1.0);
        assert_eq!(Vector2::from(offset), Vector2::new(0.5, -1.0));
    }
}
