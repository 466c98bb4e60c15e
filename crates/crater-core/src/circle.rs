use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// A circular feature in pixel space: center `(x, y)` and radius `r`.
///
/// Used both for ground-truth craters and for circles extracted from a
/// prediction mask.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub x: f32,
    pub y: f32,
    pub r: f32,
}

impl Circle {
    pub const fn new(x: f32, y: f32, r: f32) -> Self {
        Self { x, y, r }
    }

    /// Build a circle from a tabular `(x, y, diameter)` record.
    pub fn from_diameter(x: f32, y: f32, diameter: f32) -> Self {
        Self {
            x,
            y,
            r: 0.5 * diameter,
        }
    }

    #[inline]
    pub fn center(&self) -> Point2<f32> {
        Point2::new(self.x, self.y)
    }

    #[inline]
    pub fn diameter(&self) -> f32 {
        2.0 * self.r
    }

    /// Squared distance between the centers of `self` and `other`.
    #[inline]
    pub fn center_dist2(&self, other: &Circle) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn diameter_roundtrip() {
        let c = Circle::from_diameter(10.0, 12.0, 9.0);
        assert_relative_eq!(c.r, 4.5);
        assert_relative_eq!(c.diameter(), 9.0);
        assert_eq!(c.center(), Point2::new(10.0, 12.0));
    }

    #[test]
    fn center_distance_is_symmetric() {
        let a = Circle::new(0.0, 0.0, 3.0);
        let b = Circle::new(3.0, 4.0, 5.0);
        assert_relative_eq!(a.center_dist2(&b), 25.0);
        assert_relative_eq!(b.center_dist2(&a), 25.0);
    }

    #[test]
    fn serializes_with_short_field_names() {
        let json = serde_json::to_string(&Circle::new(1.0, 2.0, 3.0)).expect("json");
        assert_eq!(json, r#"{"x":1.0,"y":2.0,"r":3.0}"#);
    }
}
