//! # Geometry
//!
//! nalgebra point aliases and the clockwise angular sort used to order area
//! vertices before they are sent to the host.
//!
//! The sort key measures the angle from a reference vector (default `(1, 0)`)
//! to the vector `point - origin`, turning clockwise, in `[0, 2π)`. Ties on the
//! angle are broken by distance from the origin. A point that coincides with
//! the origin gets the sentinel key `(-π, 0)` and sorts first.
//!
//! ## Example
//!
//! ```rust
//! use csibot_core::geometry::{default_reference, sort_clockwise, Point2D};
//!
//! let square = [
//!     Point2D::new(0.0, 1.0),
//!     Point2D::new(1.0, 0.0),
//!     Point2D::new(0.0, -1.0),
//!     Point2D::new(-1.0, 0.0),
//! ];
//! let sorted = sort_clockwise(&square, Point2D::origin(), default_reference()).unwrap();
//! assert_eq!(sorted[0], Point2D::new(1.0, 0.0));
//! assert_eq!(sorted[1], Point2D::new(0.0, -1.0));
//! ```

use std::cmp::Ordering;
use std::f64::consts::{PI, TAU};

use nalgebra as na;
use serde::{Deserialize, Serialize};

use crate::errors::{BotError, BotResult};

// ============================================================================
// Points
// ============================================================================

/// A point in the plan, serialized as `[x, y]`
pub type Point2D = na::Point2<f64>;

/// A model-space point, serialized as `[x, y, z]`
pub type Point3D = na::Point3<f64>;

/// A direction in the plan
pub type Vector2D = na::Vector2<f64>;

/// Default zero-angle direction for the clockwise sort, `(1, 0)`
pub fn default_reference() -> Vector2D {
    Vector2D::new(1.0, 0.0)
}

/// True when no coordinate is NaN or infinite
pub fn is_finite<const D: usize>(p: &na::Point<f64, D>) -> bool {
    p.coords.iter().all(|c| c.is_finite())
}

/// `(x, y)`, for messages
pub fn format_point(p: &Point2D) -> String {
    format!("({}, {})", p.x, p.y)
}

// ============================================================================
// Angular sort key
// ============================================================================

/// Clockwise angle and distance of a point about an origin.
///
/// Ordered lexicographically (angle, then distance) with a total order on
/// `f64`, so it can be used directly with `sort_by`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AngleDistanceKey {
    /// Clockwise angle from the reference vector, in `[0, 2π)`, or `-π` at the origin
    pub angle: f64,
    /// Euclidean distance from the origin
    pub distance: f64,
}

impl AngleDistanceKey {
    /// Key reported for a point that coincides with the origin
    pub const AT_ORIGIN: AngleDistanceKey = AngleDistanceKey {
        angle: -PI,
        distance: 0.0,
    };

    /// Compute the key of `point` about `origin`, measured from `ref_vec`.
    ///
    /// `ref_vec` must be finite and non-zero; it is not normalized, and a zero
    /// reference produces a meaningless angle. [`sort_clockwise`] checks this
    /// for you. For finite inputs the angle is always in `[0, 2π)`, even when
    /// the offset or its length overflows; the distance is then `inf`.
    pub fn compute(point: Point2D, origin: Point2D, ref_vec: Vector2D) -> Self {
        let mut vector = point - origin;
        let mut stretch = 1.0;
        if !vector.iter().all(|c| c.is_finite()) {
            // Finite inputs whose difference overflows: halve both first
            vector = point.coords * 0.5 - origin.coords * 0.5;
            stretch = 2.0;
        }
        if vector.iter().all(|c| *c == 0.0) {
            return Self::AT_ORIGIN;
        }
        let distance = vector.norm() * stretch;

        // Scale by the largest component so the direction survives an overflowing norm
        let normalized = (vector / vector.amax()).normalize();
        let dot = normalized.dot(&ref_vec);
        let cross = ref_vec.y * normalized.x - ref_vec.x * normalized.y;
        let angle = cross.atan2(dot);

        let angle = if angle < 0.0 {
            let wrapped = TAU + angle;
            // -1e-17 + 2π rounds to 2π
            if wrapped >= TAU {
                0.0
            } else {
                wrapped
            }
        } else {
            angle
        };

        AngleDistanceKey { angle, distance }
    }

    pub fn is_at_origin(&self) -> bool {
        self.distance == 0.0
    }
}

impl Eq for AngleDistanceKey {}

impl PartialOrd for AngleDistanceKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for AngleDistanceKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.angle
            .total_cmp(&other.angle)
            .then_with(|| self.distance.total_cmp(&other.distance))
    }
}

/// Key of `point` about `origin` using the default reference vector `(1, 0)`.
pub fn clockwise_angle_and_distance(point: Point2D, origin: Point2D) -> AngleDistanceKey {
    AngleDistanceKey::compute(point, origin, default_reference())
}

/// Sort `points` clockwise about `origin`, starting at `ref_vec`.
///
/// The sort is stable: points with identical keys keep their input order.
///
/// # Errors
///
/// `BotError::InvalidInput` if any coordinate is NaN or infinite, if a point's
/// offset from `origin` overflows, or if `ref_vec` is the zero vector.
pub fn sort_clockwise(points: &[Point2D], origin: Point2D, ref_vec: Vector2D) -> BotResult<Vec<Point2D>> {
    if !is_finite(&origin) {
        return Err(BotError::invalid_input("origin", format_point(&origin), "Coordinates must be finite"));
    }
    if !ref_vec.iter().all(|c| c.is_finite()) || ref_vec.iter().all(|c| *c == 0.0) {
        return Err(BotError::invalid_input(
            "ref_vec",
            format!("({}, {})", ref_vec.x, ref_vec.y),
            "Reference vector must be finite and non-zero",
        ));
    }
    for (i, p) in points.iter().enumerate() {
        if !is_finite(p) {
            return Err(BotError::invalid_input(
                format!("points[{i}]"),
                format_point(p),
                "Coordinates must be finite",
            ));
        }
        if !(p - origin).iter().all(|c| c.is_finite()) {
            return Err(BotError::invalid_input(
                format!("points[{i}]"),
                format_point(p),
                "Offset from the origin is too large to represent",
            ));
        }
    }

    let mut keyed: Vec<(AngleDistanceKey, Point2D)> = points
        .iter()
        .map(|&p| (AngleDistanceKey::compute(p, origin, ref_vec), p))
        .collect();
    keyed.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(keyed.into_iter().map(|(_, p)| p).collect())
}

/// Sort `points` clockwise about their own centroid, starting at `(1, 0)`.
///
/// Used to turn an unordered vertex set into a simple polygon boundary.
pub fn sort_clockwise_about_centroid(points: &[Point2D]) -> BotResult<Vec<Point2D>> {
    match centroid(points) {
        Some(c) => sort_clockwise(points, c, default_reference()),
        None => Ok(Vec::new()),
    }
}

/// Arithmetic mean of the points, `None` for an empty slice
pub fn centroid(points: &[Point2D]) -> Option<Point2D> {
    if points.is_empty() {
        return None;
    }
    let sum = points.iter().fold(Vector2D::zeros(), |acc, p| acc + p.coords);
    Some(Point2D::from(sum / points.len() as f64))
}
