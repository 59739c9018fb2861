mod cylinder;
mod plane;
mod sphere;
mod torus;

pub use cylinder::Cylinder;
pub use plane::Plane;
pub use sphere::Sphere;
pub use torus::Torus;

use std::fmt;

use nalgebra::Matrix3;

use crate::error::{GeometryError, Result};
use crate::math::solve::solve_3x3;
use crate::math::{Point3, Vector2, Vector3, TOLERANCE};

/// Parameter domain for a surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceDomain {
    /// Start of the U parameter range.
    pub u_min: f64,
    /// End of the U parameter range.
    pub u_max: f64,
    /// Start of the V parameter range.
    pub v_min: f64,
    /// End of the V parameter range.
    pub v_max: f64,
}

impl SurfaceDomain {
    /// Creates a new surface domain.
    #[must_use]
    pub fn new(u_min: f64, u_max: f64, v_min: f64, v_max: f64) -> Self {
        Self {
            u_min,
            u_max,
            v_min,
            v_max,
        }
    }
}

/// Trait for parametric surfaces in 3D space.
///
/// This is the narrow contract the curve and topology layers consume.
/// Implementations provide evaluation, the closest-parameter inverse map,
/// first partial derivatives, and periodicity metadata; everything else
/// (intersection, curve reconstruction) is built on top of these.
pub trait Surface: fmt::Debug {
    /// Evaluates the surface at parameters `(u, v)`, returning the 3D point.
    ///
    /// # Errors
    ///
    /// Returns an error if evaluation fails.
    fn evaluate(&self, u: f64, v: f64) -> Result<Point3>;

    /// Computes the unit surface normal at `(u, v)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the normal is degenerate (e.g. at a pole).
    fn normal(&self, u: f64, v: f64) -> Result<Vector3>;

    /// Computes the partial derivative `dP/du` at `(u, v)`.
    ///
    /// # Errors
    ///
    /// Returns an error if evaluation fails.
    fn u_tangent(&self, u: f64, v: f64) -> Result<Vector3>;

    /// Computes the partial derivative `dP/dv` at `(u, v)`.
    ///
    /// # Errors
    ///
    /// Returns an error if evaluation fails.
    fn v_tangent(&self, u: f64, v: f64) -> Result<Vector3>;

    /// Maps a 3D point to the nearest `(u, v)` parameters.
    ///
    /// For points off the surface this is the parameter of the closest
    /// surface point. Periodic parameters land on the principal branch.
    fn uv_of(&self, point: &Point3) -> (f64, f64);

    /// Returns the parameter domain of the surface.
    fn domain(&self) -> SurfaceDomain;

    /// Returns the U period, if the surface wraps in U.
    fn u_period(&self) -> Option<f64> {
        None
    }

    /// Returns the V period, if the surface wraps in V.
    fn v_period(&self) -> Option<f64> {
        None
    }
}

/// Resolves a 3D tangent into the surface's parameter space at `(u, v)`.
///
/// Solves the 3x3 system over the basis `[dP/du, dP/dv, n]`; for a tangent
/// lying in the surface's tangent plane the normal coefficient is near zero
/// and the result is the exact 2D direction `(du, dv)`.
///
/// # Errors
///
/// Returns an error if the tangent basis is degenerate at `(u, v)`.
pub fn uv_direction(
    surface: &dyn Surface,
    u: f64,
    v: f64,
    tangent: &Vector3,
) -> Result<Vector2> {
    let su = surface.u_tangent(u, v)?;
    let sv = surface.v_tangent(u, v)?;
    let n = su.cross(&sv);
    if n.norm() < TOLERANCE {
        return Err(GeometryError::Degenerate("surface tangent basis is singular".into()).into());
    }
    let m = Matrix3::from_columns(&[su, sv, n]);
    let x = solve_3x3(&m, tangent)
        .ok_or_else(|| GeometryError::Degenerate("surface tangent basis is singular".into()))?;
    Ok(Vector2::new(x.x, x.y))
}
