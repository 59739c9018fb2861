use std::f64::consts::{FRAC_PI_2, TAU};

use crate::error::{GeometryError, Result};
use crate::math::{Point3, Vector3, TOLERANCE};

use super::{Surface, SurfaceDomain};

/// A spherical surface in 3D space.
///
/// `P(u, v) = center + r*cos(v)*(cos(u)*ref_dir + sin(u)*binormal) + r*sin(v)*axis`
/// with `u` the longitude (periodic, `2*pi`) and `v` the latitude in
/// `[-pi/2, pi/2]`. The parameterization is singular at the two poles,
/// where the U tangent vanishes; singular pole edges in the topology layer
/// exist precisely for this case.
#[derive(Debug, Clone)]
pub struct Sphere {
    center: Point3,
    radius: f64,
    axis: Vector3,
    ref_dir: Vector3,
}

impl Sphere {
    /// Creates a new sphere from a center, radius, pole axis, and the
    /// equatorial reference direction for `u = 0`.
    ///
    /// # Errors
    ///
    /// Returns an error if the radius is non-positive, the axis is
    /// zero-length, or the reference direction is not perpendicular to the
    /// axis.
    pub fn new(center: Point3, radius: f64, axis: Vector3, ref_dir: Vector3) -> Result<Self> {
        if radius < TOLERANCE {
            return Err(GeometryError::Degenerate("sphere radius must be positive".into()).into());
        }

        let axis_len = axis.norm();
        if axis_len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        let axis = axis / axis_len;

        let ref_len = ref_dir.norm();
        if ref_len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        let ref_dir = ref_dir / ref_len;

        if axis.dot(&ref_dir).abs() > TOLERANCE {
            return Err(GeometryError::Degenerate(
                "reference direction must be perpendicular to axis".into(),
            )
            .into());
        }

        Ok(Self {
            center,
            radius,
            axis,
            ref_dir,
        })
    }

    /// Returns the radius.
    #[must_use]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    fn binormal(&self) -> Vector3 {
        self.axis.cross(&self.ref_dir)
    }
}

impl Surface for Sphere {
    fn evaluate(&self, u: f64, v: f64) -> Result<Point3> {
        let equatorial = self.ref_dir * u.cos() + self.binormal() * u.sin();
        Ok(self.center + (equatorial * v.cos() + self.axis * v.sin()) * self.radius)
    }

    fn normal(&self, u: f64, v: f64) -> Result<Vector3> {
        let equatorial = self.ref_dir * u.cos() + self.binormal() * u.sin();
        Ok(equatorial * v.cos() + self.axis * v.sin())
    }

    fn u_tangent(&self, u: f64, v: f64) -> Result<Vector3> {
        let d_equatorial = self.ref_dir * (-u.sin()) + self.binormal() * u.cos();
        Ok(d_equatorial * (self.radius * v.cos()))
    }

    fn v_tangent(&self, u: f64, v: f64) -> Result<Vector3> {
        let equatorial = self.ref_dir * u.cos() + self.binormal() * u.sin();
        Ok((equatorial * (-v.sin()) + self.axis * v.cos()) * self.radius)
    }

    fn uv_of(&self, point: &Point3) -> (f64, f64) {
        let dp = (point - self.center) / self.radius;
        let v = dp.dot(&self.axis).clamp(-1.0, 1.0).asin();
        let u = dp.dot(&self.binormal()).atan2(dp.dot(&self.ref_dir));
        (u, v)
    }

    fn domain(&self) -> SurfaceDomain {
        SurfaceDomain::new(0.0, TAU, -FRAC_PI_2, FRAC_PI_2)
    }

    fn u_period(&self) -> Option<f64> {
        Some(TAU)
    }
}
