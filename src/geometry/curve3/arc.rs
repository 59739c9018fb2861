use crate::error::{GeometryError, Result};
use crate::math::{Point3, Vector3, TOLERANCE};

use super::Curve3;

/// A circular arc in 3D space.
///
/// Defined by a center, radius, plane normal, and a reference direction for
/// angle zero. The parameter `t` in `[0, 1]` sweeps the angle
/// `start_angle + t * sweep` around the normal; a negative `sweep` traverses
/// clockwise with respect to the normal.
#[derive(Debug, Clone)]
pub struct Arc3 {
    center: Point3,
    radius: f64,
    normal: Vector3,
    ref_dir: Vector3,
    start_angle: f64,
    sweep: f64,
}

impl Arc3 {
    /// Creates a new arc.
    ///
    /// # Errors
    ///
    /// Returns an error if the radius is non-positive, the sweep is zero,
    /// the normal is zero-length, or the reference direction is not
    /// perpendicular to the normal.
    pub fn new(
        center: Point3,
        radius: f64,
        normal: Vector3,
        ref_dir: Vector3,
        start_angle: f64,
        sweep: f64,
    ) -> Result<Self> {
        if radius < TOLERANCE {
            return Err(GeometryError::Degenerate("arc radius must be positive".into()).into());
        }
        if sweep.abs() < TOLERANCE {
            return Err(GeometryError::Degenerate("arc sweep must be non-zero".into()).into());
        }

        let normal_len = normal.norm();
        if normal_len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        let normal = normal / normal_len;

        let ref_len = ref_dir.norm();
        if ref_len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        let ref_dir = ref_dir / ref_len;

        if normal.dot(&ref_dir).abs() > TOLERANCE {
            return Err(GeometryError::Degenerate(
                "reference direction must be perpendicular to normal".into(),
            )
            .into());
        }

        Ok(Self {
            center,
            radius,
            normal,
            ref_dir,
            start_angle,
            sweep,
        })
    }

    /// Returns the center of the arc.
    #[must_use]
    pub fn center(&self) -> &Point3 {
        &self.center
    }

    /// Returns the radius of the arc.
    #[must_use]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Returns the signed angular sweep in radians.
    #[must_use]
    pub fn sweep(&self) -> f64 {
        self.sweep
    }

    fn binormal(&self) -> Vector3 {
        self.normal.cross(&self.ref_dir)
    }

    fn angle_at(&self, t: f64) -> f64 {
        self.start_angle + t * self.sweep
    }

    /// Returns the sub-arc over `[a, b]` of this arc's parameter span.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed sweep degenerates.
    pub fn trimmed(&self, a: f64, b: f64) -> Result<Self> {
        Self::new(
            self.center,
            self.radius,
            self.normal,
            self.ref_dir,
            self.angle_at(a),
            (b - a) * self.sweep,
        )
    }

    /// Returns the arc traversed in the opposite direction.
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self {
            start_angle: self.start_angle + self.sweep,
            sweep: -self.sweep,
            ..self.clone()
        }
    }
}

impl Curve3 for Arc3 {
    fn evaluate(&self, t: f64) -> Result<Point3> {
        let angle = self.angle_at(t);
        let binormal = self.binormal();
        let x = self.radius * angle.cos();
        let y = self.radius * angle.sin();
        Ok(self.center + self.ref_dir * x + binormal * y)
    }

    fn derivative(&self, t: f64) -> Result<Vector3> {
        let angle = self.angle_at(t);
        let binormal = self.binormal();
        let dx = -self.radius * angle.sin() * self.sweep;
        let dy = self.radius * angle.cos() * self.sweep;
        Ok(self.ref_dir * dx + binormal * dy)
    }

    fn is_closed(&self) -> bool {
        (self.sweep.abs() - std::f64::consts::TAU).abs() < TOLERANCE
    }
}
