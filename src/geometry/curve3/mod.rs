mod arc;
mod line;

pub use arc::Arc3;
pub use line::Line3;

use std::fmt;

use crate::error::{GeometryError, Result};
use crate::math::{Point3, Vector3, TOLERANCE};

/// Trait for bounded parametric curves in 3D space.
///
/// All curves are parameterized over `[0, 1]`. Keeping the three
/// representations of an edge (3D curve, per-face 2D curves) on one shared
/// parameter span is what lets them be trimmed and split consistently.
pub trait Curve3: fmt::Debug {
    /// Evaluates the curve at parameter `t`, returning the 3D point.
    ///
    /// # Errors
    ///
    /// Returns an error if evaluation fails.
    fn evaluate(&self, t: f64) -> Result<Point3>;

    /// Computes the derivative `dP/dt` at parameter `t`.
    ///
    /// # Errors
    ///
    /// Returns an error if evaluation fails.
    fn derivative(&self, t: f64) -> Result<Vector3>;

    /// Computes the unit tangent at parameter `t`.
    ///
    /// # Errors
    ///
    /// Returns an error if the tangent is degenerate.
    fn tangent(&self, t: f64) -> Result<Vector3> {
        let d = self.derivative(t)?;
        let len = d.norm();
        if len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        Ok(d / len)
    }

    /// Returns whether the curve's start and end coincide.
    fn is_closed(&self) -> bool;
}

/// A curve traversed in the opposite direction (`t` maps to `1 - t`).
///
/// Adapter for reversing a curve only known behind a trait object, e.g.
/// the 3D curve inside a projection.
#[derive(Debug, Clone)]
pub struct ReversedCurve3 {
    inner: std::sync::Arc<dyn Curve3>,
}

impl ReversedCurve3 {
    /// Wraps a curve in its reversal.
    #[must_use]
    pub fn new(inner: std::sync::Arc<dyn Curve3>) -> Self {
        Self { inner }
    }
}

impl Curve3 for ReversedCurve3 {
    fn evaluate(&self, t: f64) -> Result<Point3> {
        self.inner.evaluate(1.0 - t)
    }

    fn derivative(&self, t: f64) -> Result<Vector3> {
        Ok(-self.inner.derivative(1.0 - t)?)
    }

    fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }
}
