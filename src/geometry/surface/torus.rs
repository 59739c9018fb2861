use std::f64::consts::TAU;

use crate::error::{GeometryError, Result};
use crate::math::{Point3, Vector3, TOLERANCE};

use super::{Surface, SurfaceDomain};

/// A toroidal surface in 3D space.
///
/// `P(u, v) = center + (R + r*cos(v))*(cos(u)*ref_dir + sin(u)*binormal) + r*sin(v)*axis`
/// with `u` the angle around the symmetry axis and `v` the angle around the
/// tube cross-section. Both parameters wrap with period `2*pi`, which makes
/// the torus the stress case for seam-aware uv handling.
#[derive(Debug, Clone)]
pub struct Torus {
    center: Point3,
    major_radius: f64,
    minor_radius: f64,
    axis: Vector3,
    ref_dir: Vector3,
}

impl Torus {
    /// Creates a new torus.
    ///
    /// # Errors
    ///
    /// Returns an error if either radius is non-positive, the minor radius
    /// is not smaller than the major, the axis is zero-length, or the
    /// reference direction is not perpendicular to the axis.
    pub fn new(
        center: Point3,
        major_radius: f64,
        minor_radius: f64,
        axis: Vector3,
        ref_dir: Vector3,
    ) -> Result<Self> {
        if major_radius < TOLERANCE || minor_radius < TOLERANCE {
            return Err(GeometryError::Degenerate("torus radii must be positive".into()).into());
        }
        if minor_radius >= major_radius {
            return Err(GeometryError::Degenerate(
                "torus minor radius must be less than major radius".into(),
            )
            .into());
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
            major_radius,
            minor_radius,
            axis,
            ref_dir,
        })
    }

    /// Returns the major radius (center to tube center).
    #[must_use]
    pub fn major_radius(&self) -> f64 {
        self.major_radius
    }

    /// Returns the minor radius (tube radius).
    #[must_use]
    pub fn minor_radius(&self) -> f64 {
        self.minor_radius
    }

    fn binormal(&self) -> Vector3 {
        self.axis.cross(&self.ref_dir)
    }

    fn radial(&self, u: f64) -> Vector3 {
        self.ref_dir * u.cos() + self.binormal() * u.sin()
    }
}

impl Surface for Torus {
    fn evaluate(&self, u: f64, v: f64) -> Result<Point3> {
        let radial = self.radial(u);
        Ok(self.center
            + radial * (self.major_radius + self.minor_radius * v.cos())
            + self.axis * (self.minor_radius * v.sin()))
    }

    fn normal(&self, u: f64, v: f64) -> Result<Vector3> {
        Ok(self.radial(u) * v.cos() + self.axis * v.sin())
    }

    fn u_tangent(&self, u: f64, v: f64) -> Result<Vector3> {
        let d_radial = self.ref_dir * (-u.sin()) + self.binormal() * u.cos();
        Ok(d_radial * (self.major_radius + self.minor_radius * v.cos()))
    }

    fn v_tangent(&self, u: f64, v: f64) -> Result<Vector3> {
        let radial = self.radial(u);
        Ok((radial * (-v.sin()) + self.axis * v.cos()) * self.minor_radius)
    }

    fn uv_of(&self, point: &Point3) -> (f64, f64) {
        let dp = point - self.center;
        let u = dp.dot(&self.binormal()).atan2(dp.dot(&self.ref_dir));
        let tube_center = self.center + self.radial(u) * self.major_radius;
        let to_tube = point - tube_center;
        let v = to_tube.dot(&self.axis).atan2(to_tube.dot(&self.radial(u)));
        (u, v)
    }

    fn domain(&self) -> SurfaceDomain {
        SurfaceDomain::new(0.0, TAU, 0.0, TAU)
    }

    fn u_period(&self) -> Option<f64> {
        Some(TAU)
    }

    fn v_period(&self) -> Option<f64> {
        Some(TAU)
    }
}
