use crate::error::{GeometryError, Result};
use crate::math::{Point2, Vector2, TOLERANCE};

use super::{Curve2, Envelope, EnvelopeCell};

/// A straight segment in parameter space.
///
/// `P(t) = start + t * (end - start)` for `t` in `[0, 1]`.
#[derive(Debug, Clone)]
pub struct Line2 {
    start: Point2,
    end: Point2,
    cell: EnvelopeCell,
}

impl Line2 {
    /// Creates a new segment between two distinct points.
    ///
    /// # Errors
    ///
    /// Returns an error if the points coincide.
    pub fn new(start: Point2, end: Point2) -> Result<Self> {
        if (end - start).norm() < TOLERANCE {
            return Err(GeometryError::Degenerate("zero-length segment".into()).into());
        }
        Ok(Self {
            start,
            end,
            cell: EnvelopeCell::new(),
        })
    }

    /// Returns the start point.
    #[must_use]
    pub fn start(&self) -> &Point2 {
        &self.start
    }

    /// Returns the end point.
    #[must_use]
    pub fn end(&self) -> &Point2 {
        &self.end
    }

    /// Returns the sub-segment over `[a, b]`.
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
            cell: EnvelopeCell::new(),
        }
    }
}

impl Curve2 for Line2 {
    fn evaluate(&self, t: f64) -> Result<Point2> {
        Ok(self.start + (self.end - self.start) * t)
    }

    fn derivative(&self, _t: f64) -> Result<Vector2> {
        Ok(self.end - self.start)
    }

    fn second_derivative(&self, _t: f64) -> Option<Vector2> {
        Some(Vector2::zeros())
    }

    fn is_closed(&self) -> bool {
        false
    }

    fn envelope_knots(&self) -> Vec<f64> {
        vec![0.0, 1.0]
    }

    fn envelope(&self) -> Result<&Envelope> {
        self.cell.get_or_build(self)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn evaluate_interpolates() {
        let l = Line2::new(Point2::new(1.0, 1.0), Point2::new(3.0, 5.0)).unwrap();
        let p = l.evaluate(0.5).unwrap();
        assert!((p - Point2::new(2.0, 3.0)).norm() < TOLERANCE);
    }

    #[test]
    fn direction_is_unit() {
        let l = Line2::new(Point2::origin(), Point2::new(3.0, 4.0)).unwrap();
        let d = l.direction(0.3).unwrap();
        assert!((d.norm() - 1.0).abs() < TOLERANCE);
        assert!((d - Vector2::new(0.6, 0.8)).norm() < TOLERANCE);
    }

    #[test]
    fn degenerate_rejected() {
        assert!(Line2::new(Point2::origin(), Point2::origin()).is_err());
    }

    #[test]
    fn trimmed_and_reversed() {
        let l = Line2::new(Point2::origin(), Point2::new(4.0, 0.0)).unwrap();
        let t = l.trimmed(0.25, 0.5).unwrap();
        assert!((t.evaluate(0.0).unwrap() - Point2::new(1.0, 0.0)).norm() < TOLERANCE);
        assert!((t.evaluate(1.0).unwrap() - Point2::new(2.0, 0.0)).norm() < TOLERANCE);
        let r = l.reversed();
        assert!((r.evaluate(0.0).unwrap() - Point2::new(4.0, 0.0)).norm() < TOLERANCE);
    }
}
