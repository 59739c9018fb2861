use crate::error::{GeometryError, Result};
use crate::math::{Point3, Vector3, TOLERANCE};

use super::{Surface, SurfaceDomain};

/// An infinite plane in 3D space.
///
/// Parametric form: `P(u, v) = origin + u * u_dir + v * v_dir` with
/// orthonormal `u_dir`/`v_dir`; the normal is their cross product.
#[derive(Debug, Clone)]
pub struct Plane {
    origin: Point3,
    u_dir: Vector3,
    v_dir: Vector3,
    normal: Vector3,
}

impl Plane {
    /// Creates a new plane from an origin and two direction vectors.
    ///
    /// The directions are normalized; `v_dir` is re-orthogonalized against
    /// `u_dir` so the parameterization is isometric.
    ///
    /// # Errors
    ///
    /// Returns an error if a direction is zero-length or the directions are
    /// parallel.
    pub fn new(origin: Point3, u_dir: Vector3, v_dir: Vector3) -> Result<Self> {
        let u_len = u_dir.norm();
        if u_len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        let u_dir = u_dir / u_len;

        let v_dir = v_dir - u_dir * u_dir.dot(&v_dir);
        let v_len = v_dir.norm();
        if v_len < TOLERANCE {
            return Err(GeometryError::Degenerate("plane directions are parallel".into()).into());
        }
        let v_dir = v_dir / v_len;

        Ok(Self {
            origin,
            u_dir,
            v_dir,
            normal: u_dir.cross(&v_dir),
        })
    }

    /// Creates a plane from an origin and a normal vector, choosing the
    /// U and V directions automatically.
    ///
    /// # Errors
    ///
    /// Returns an error if the normal vector is zero-length.
    pub fn from_normal(origin: Point3, normal: Vector3) -> Result<Self> {
        let len = normal.norm();
        if len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        let normal = normal / len;

        let reference = if normal.x.abs() < 0.9 {
            Vector3::x()
        } else {
            Vector3::y()
        };
        let u_dir = normal.cross(&reference).normalize();
        let v_dir = normal.cross(&u_dir);

        Ok(Self {
            origin,
            u_dir,
            v_dir,
            normal,
        })
    }

    /// Returns the origin point.
    #[must_use]
    pub fn origin(&self) -> &Point3 {
        &self.origin
    }

    /// Returns the unit U direction.
    #[must_use]
    pub fn u_dir(&self) -> &Vector3 {
        &self.u_dir
    }

    /// Returns the unit V direction.
    #[must_use]
    pub fn v_dir(&self) -> &Vector3 {
        &self.v_dir
    }
}

impl Surface for Plane {
    fn evaluate(&self, u: f64, v: f64) -> Result<Point3> {
        Ok(self.origin + self.u_dir * u + self.v_dir * v)
    }

    fn normal(&self, _u: f64, _v: f64) -> Result<Vector3> {
        Ok(self.normal)
    }

    fn u_tangent(&self, _u: f64, _v: f64) -> Result<Vector3> {
        Ok(self.u_dir)
    }

    fn v_tangent(&self, _u: f64, _v: f64) -> Result<Vector3> {
        Ok(self.v_dir)
    }

    fn uv_of(&self, point: &Point3) -> (f64, f64) {
        let dp = point - self.origin;
        (dp.dot(&self.u_dir), dp.dot(&self.v_dir))
    }

    fn domain(&self) -> SurfaceDomain {
        SurfaceDomain::new(
            f64::NEG_INFINITY,
            f64::INFINITY,
            f64::NEG_INFINITY,
            f64::INFINITY,
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn uv_roundtrip() {
        let pl = Plane::new(
            Point3::new(1.0, 0.0, 2.0),
            Vector3::new(1.0, 1.0, 0.0),
            Vector3::new(0.0, 0.0, 1.0),
        )
        .unwrap();
        let p = pl.evaluate(0.7, -1.3).unwrap();
        let (u, v) = pl.uv_of(&p);
        assert!((u - 0.7).abs() < 1e-9);
        assert!((v + 1.3).abs() < 1e-9);
    }

    #[test]
    fn off_plane_point_projects() {
        let pl = Plane::new(Point3::origin(), Vector3::x(), Vector3::y()).unwrap();
        let (u, v) = pl.uv_of(&Point3::new(3.0, 4.0, 9.0));
        assert!((u - 3.0).abs() < 1e-12);
        assert!((v - 4.0).abs() < 1e-12);
    }

    #[test]
    fn skewed_v_is_orthogonalized() {
        let pl = Plane::new(
            Point3::origin(),
            Vector3::x(),
            Vector3::new(1.0, 1.0, 0.0),
        )
        .unwrap();
        assert!(pl.u_dir().dot(pl.v_dir()).abs() < 1e-12);
    }

    #[test]
    fn parallel_directions_rejected() {
        let r = Plane::new(Point3::origin(), Vector3::x(), Vector3::x() * 2.0);
        assert!(r.is_err());
    }

    #[test]
    fn normal_is_cross() {
        let pl = Plane::new(Point3::origin(), Vector3::x(), Vector3::y()).unwrap();
        let n = pl.normal(0.0, 0.0).unwrap();
        assert!((n - Vector3::z()).norm() < 1e-12);
    }
}
