use crate::error::{GeometryError, Result};
use crate::math::{Point3, Vector3, TOLERANCE};

use super::Curve3;

/// A straight segment between two points.
///
/// The parametric form is `P(t) = start + t * (end - start)` for `t` in `[0, 1]`.
#[derive(Debug, Clone)]
pub struct Line3 {
    start: Point3,
    end: Point3,
}

impl Line3 {
    /// Creates a new segment between two distinct points.
    ///
    /// # Errors
    ///
    /// Returns an error if the points coincide.
    pub fn new(start: Point3, end: Point3) -> Result<Self> {
        if (end - start).norm() < TOLERANCE {
            return Err(GeometryError::Degenerate("zero-length segment".into()).into());
        }
        Ok(Self { start, end })
    }

    /// Returns the start point.
    #[must_use]
    pub fn start(&self) -> &Point3 {
        &self.start
    }

    /// Returns the end point.
    #[must_use]
    pub fn end(&self) -> &Point3 {
        &self.end
    }

    /// Returns the sub-segment over `[a, b]` of this segment's parameter span.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed segment degenerates.
    pub fn trimmed(&self, a: f64, b: f64) -> Result<Self> {
        let d = self.end - self.start;
        Self::new(self.start + d * a, self.start + d * b)
    }

    /// Returns the segment traversed in the opposite direction.
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self {
            start: self.end,
            end: self.start,
        }
    }
}

impl Curve3 for Line3 {
    fn evaluate(&self, t: f64) -> Result<Point3> {
        Ok(self.start + (self.end - self.start) * t)
    }

    fn derivative(&self, _t: f64) -> Result<Vector3> {
        Ok(self.end - self.start)
    }

    fn is_closed(&self) -> bool {
        false
    }
}
