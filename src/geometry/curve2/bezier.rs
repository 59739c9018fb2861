use crate::error::{GeometryError, Result};
use crate::math::{Point2, Vector2, TOLERANCE};

use super::{Curve2, Envelope, EnvelopeCell};

/// A cubic Bezier curve in parameter space.
///
/// The canonical curve with no closed-form intersection: every geometric
/// query on it goes through the triangulated envelope.
#[derive(Debug, Clone)]
pub struct Bezier2 {
    p0: Point2,
    p1: Point2,
    p2: Point2,
    p3: Point2,
    cell: EnvelopeCell,
}

impl Bezier2 {
    /// Creates a new cubic from its four control points.
    ///
    /// # Errors
    ///
    /// Returns an error if the control polygon has zero extent.
    pub fn new(p0: Point2, p1: Point2, p2: Point2, p3: Point2) -> Result<Self> {
        let extent = (p1 - p0).norm() + (p2 - p1).norm() + (p3 - p2).norm();
        if extent < TOLERANCE {
            return Err(GeometryError::Degenerate("bezier control polygon is a point".into()).into());
        }
        Ok(Self {
            p0,
            p1,
            p2,
            p3,
            cell: EnvelopeCell::new(),
        })
    }

    /// Returns the control points.
    #[must_use]
    pub fn control_points(&self) -> [Point2; 4] {
        [self.p0, self.p1, self.p2, self.p3]
    }

    /// Returns the sub-curve over `[a, b]`, via two de Casteljau splits.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed curve degenerates.
    pub fn trimmed(&self, a: f64, b: f64) -> Result<Self> {
        // Split off [a, 1], then [0, (b-a)/(1-a)] of the remainder.
        let [r0, r1, r2, r3] = self.subdivide(a).1;
        let right = Self {
            p0: r0,
            p1: r1,
            p2: r2,
            p3: r3,
            cell: EnvelopeCell::new(),
        };
        let local = if (1.0 - a).abs() < TOLERANCE {
            0.0
        } else {
            (b - a) / (1.0 - a)
        };
        let [q0, q1, q2, q3] = right.subdivide(local).0;
        Self::new(q0, q1, q2, q3)
    }

    /// Returns the curve traversed in the opposite direction.
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self {
            p0: self.p3,
            p1: self.p2,
            p2: self.p1,
            p3: self.p0,
            cell: EnvelopeCell::new(),
        }
    }

    /// De Casteljau split at `t`, returning both halves' control points.
    fn subdivide(&self, t: f64) -> ([Point2; 4], [Point2; 4]) {
        let lerp = |a: &Point2, b: &Point2| Point2::from(a.coords * (1.0 - t) + b.coords * t);
        let q0 = lerp(&self.p0, &self.p1);
        let q1 = lerp(&self.p1, &self.p2);
        let q2 = lerp(&self.p2, &self.p3);
        let r0 = lerp(&q0, &q1);
        let r1 = lerp(&q1, &q2);
        let s = lerp(&r0, &r1);
        ([self.p0, q0, r0, s], [s, r1, q2, self.p3])
    }
}

impl Curve2 for Bezier2 {
    fn evaluate(&self, t: f64) -> Result<Point2> {
        let s = 1.0 - t;
        let c = self.p0.coords * (s * s * s)
            + self.p1.coords * (3.0 * s * s * t)
            + self.p2.coords * (3.0 * s * t * t)
            + self.p3.coords * (t * t * t);
        Ok(Point2::from(c))
    }

    fn derivative(&self, t: f64) -> Result<Vector2> {
        let s = 1.0 - t;
        Ok((self.p1 - self.p0) * (3.0 * s * s)
            + (self.p2 - self.p1) * (6.0 * s * t)
            + (self.p3 - self.p2) * (3.0 * t * t))
    }

    fn second_derivative(&self, t: f64) -> Option<Vector2> {
        let a = self.p2 - self.p1 * 2.0 + self.p0.coords;
        let b = self.p3 - self.p2 * 2.0 + self.p1.coords;
        Some((b - a) * (6.0 * t) + a * 6.0)
    }

    fn is_closed(&self) -> bool {
        (self.p3 - self.p0).norm() < TOLERANCE
    }

    fn envelope(&self) -> Result<&Envelope> {
        self.cell.get_or_build(self)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample() -> Bezier2 {
        Bezier2::new(
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 2.0),
            Point2::new(2.0, 2.0),
            Point2::new(3.0, 0.0),
        )
        .unwrap()
    }

    #[test]
    fn endpoints_interpolate() {
        let b = sample();
        assert!((b.evaluate(0.0).unwrap() - Point2::origin()).norm() < TOLERANCE);
        assert!((b.evaluate(1.0).unwrap() - Point2::new(3.0, 0.0)).norm() < TOLERANCE);
    }

    #[test]
    fn derivative_matches_finite_difference() {
        let b = sample();
        let h = 1e-7;
        for &t in &[0.2, 0.5, 0.8] {
            let d = b.derivative(t).unwrap();
            let fd = (b.evaluate(t + h).unwrap() - b.evaluate(t - h).unwrap()) / (2.0 * h);
            assert!((d - fd).norm() < 1e-5);
        }
    }

    #[test]
    fn second_derivative_matches_finite_difference() {
        let b = sample();
        let h = 1e-5;
        for &t in &[0.3, 0.6] {
            let d2 = b.second_derivative(t).unwrap();
            let fd = (b.derivative(t + h).unwrap() - b.derivative(t - h).unwrap()) / (2.0 * h);
            assert!((d2 - fd).norm() < 1e-4);
        }
    }

    #[test]
    fn trimmed_matches_parent() {
        let b = sample();
        let sub = b.trimmed(0.25, 0.75).unwrap();
        for k in 0..=8 {
            let s = f64::from(k) / 8.0;
            let expected = b.evaluate(0.25 + 0.5 * s).unwrap();
            assert!((sub.evaluate(s).unwrap() - expected).norm() < 1e-9);
        }
    }

    #[test]
    fn reversed_matches_parent() {
        let b = sample();
        let r = b.reversed();
        for k in 0..=4 {
            let s = f64::from(k) / 4.0;
            assert!((r.evaluate(s).unwrap() - b.evaluate(1.0 - s).unwrap()).norm() < 1e-9);
        }
    }

    #[test]
    fn point_polygon_rejected() {
        let p = Point2::new(1.0, 1.0);
        assert!(Bezier2::new(p, p, p, p).is_err());
    }
}
