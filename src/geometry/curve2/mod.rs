mod approximate;
mod arc;
mod bezier;
mod envelope;
mod intersect;
mod line;
mod projected;
mod queries;

pub use approximate::{approximate, Primitive2};
pub use arc::Arc2;
pub use bezier::Bezier2;
pub use envelope::{Envelope, EnvelopeCell};
pub use intersect::{intersect_curves, CurveIntersection};
pub use line::Line2;
pub use projected::ProjectedCurve2;
pub use queries::{
    perpendicular_feet, self_intersections, tangent_points, tangent_points_with_direction,
};

use std::fmt;

use crate::error::{GeometryError, Result};
use crate::math::{Point2, Vector2, TOLERANCE};

/// Trait for bounded parametric curves in a surface's 2D parameter space.
///
/// All curves are parameterized over `[0, 1]`. Implementations provide
/// point and derivative evaluation; every geometric query (intersection,
/// perpendicular feet, tangent search, approximation) is answered by the
/// shared triangulated-envelope machinery, so curves with no closed-form
/// intersection need nothing beyond these methods.
pub trait Curve2: fmt::Debug {
    /// Evaluates the curve at parameter `t`, returning the 2D point.
    ///
    /// # Errors
    ///
    /// Returns an error if evaluation fails.
    fn evaluate(&self, t: f64) -> Result<Point2>;

    /// Computes the derivative `dP/dt` at parameter `t`.
    ///
    /// # Errors
    ///
    /// Returns an error if evaluation fails.
    fn derivative(&self, t: f64) -> Result<Vector2>;

    /// Computes the second derivative at `t`, when the curve can provide it.
    ///
    /// Queries that refine with Newton fall back to bisection when this
    /// returns `None`.
    fn second_derivative(&self, _t: f64) -> Option<Vector2> {
        None
    }

    /// Computes the unit tangent at parameter `t`.
    ///
    /// # Errors
    ///
    /// Returns an error if the tangent is degenerate.
    fn direction(&self, t: f64) -> Result<Vector2> {
        let d = self.derivative(t)?;
        let len = d.norm();
        if len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        Ok(d / len)
    }

    /// Returns whether the curve's start and end coincide.
    fn is_closed(&self) -> bool;

    /// Seed parameters for envelope construction.
    ///
    /// The default five uniform knots suit smooth low-curvature curves;
    /// implementations override this when they know better (a segment needs
    /// two, an arc scales with its sweep).
    fn envelope_knots(&self) -> Vec<f64> {
        vec![0.0, 0.25, 0.5, 0.75, 1.0]
    }

    /// Returns the cached triangulated envelope, building it on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if envelope construction fails.
    fn envelope(&self) -> Result<&Envelope>;
}
