use std::f64::consts::{FRAC_PI_3, TAU};

use crate::error::{GeometryError, Result};
use crate::math::{Point2, Vector2, TOLERANCE};

use super::{Curve2, Envelope, EnvelopeCell};

/// A circular arc in parameter space.
///
/// The parameter `t` in `[0, 1]` sweeps the angle `start_angle + t * sweep`
/// around `center`; a negative `sweep` runs clockwise. A sweep of `2*pi`
/// represents a full circle.
#[derive(Debug, Clone)]
pub struct Arc2 {
    center: Point2,
    radius: f64,
    start_angle: f64,
    sweep: f64,
    cell: EnvelopeCell,
}

impl Arc2 {
    /// Creates a new arc.
    ///
    /// # Errors
    ///
    /// Returns an error if the radius is non-positive or the sweep is zero.
    pub fn new(center: Point2, radius: f64, start_angle: f64, sweep: f64) -> Result<Self> {
        if radius < TOLERANCE {
            return Err(GeometryError::Degenerate("arc radius must be positive".into()).into());
        }
        if sweep.abs() < TOLERANCE {
            return Err(GeometryError::Degenerate("arc sweep must be non-zero".into()).into());
        }
        Ok(Self {
            center,
            radius,
            start_angle,
            sweep,
            cell: EnvelopeCell::new(),
        })
    }

    /// Creates a full counterclockwise circle starting at angle zero.
    ///
    /// # Errors
    ///
    /// Returns an error if the radius is non-positive.
    pub fn full_circle(center: Point2, radius: f64) -> Result<Self> {
        Self::new(center, radius, 0.0, TAU)
    }

    /// Returns the center.
    #[must_use]
    pub fn center(&self) -> &Point2 {
        &self.center
    }

    /// Returns the radius.
    #[must_use]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Returns the start angle in radians.
    #[must_use]
    pub fn start_angle(&self) -> f64 {
        self.start_angle
    }

    /// Returns the signed sweep in radians.
    #[must_use]
    pub fn sweep(&self) -> f64 {
        self.sweep
    }

    fn angle_at(&self, t: f64) -> f64 {
        self.start_angle + t * self.sweep
    }

    /// Returns the sub-arc over `[a, b]`.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed sweep degenerates.
    pub fn trimmed(&self, a: f64, b: f64) -> Result<Self> {
        Self::new(
            self.center,
            self.radius,
            self.angle_at(a),
            (b - a) * self.sweep,
        )
    }

    /// Returns the arc traversed in the opposite direction.
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self {
            center: self.center,
            radius: self.radius,
            start_angle: self.start_angle + self.sweep,
            sweep: -self.sweep,
            cell: EnvelopeCell::new(),
        }
    }

    /// Distance from a point to the arc (nearest point on the swept range).
    #[must_use]
    pub fn distance_to(&self, p: &Point2) -> f64 {
        let dp = p - self.center;
        let angle = dp.y.atan2(dp.x);
        // Offset from the start angle along the sweep direction.
        let mut delta = (angle - self.start_angle) % TAU;
        if self.sweep > 0.0 && delta < 0.0 {
            delta += TAU;
        }
        if self.sweep < 0.0 && delta > 0.0 {
            delta -= TAU;
        }
        let t = delta / self.sweep;
        if (0.0..=1.0).contains(&t) {
            (dp.norm() - self.radius).abs()
        } else {
            let d0 = (p - self.point_at_angle(self.start_angle)).norm();
            let d1 = (p - self.point_at_angle(self.start_angle + self.sweep)).norm();
            d0.min(d1)
        }
    }

    fn point_at_angle(&self, angle: f64) -> Point2 {
        self.center + Vector2::new(angle.cos(), angle.sin()) * self.radius
    }
}

impl Curve2 for Arc2 {
    fn evaluate(&self, t: f64) -> Result<Point2> {
        Ok(self.point_at_angle(self.angle_at(t)))
    }

    fn derivative(&self, t: f64) -> Result<Vector2> {
        let angle = self.angle_at(t);
        Ok(Vector2::new(-angle.sin(), angle.cos()) * (self.radius * self.sweep))
    }

    fn second_derivative(&self, t: f64) -> Option<Vector2> {
        let angle = self.angle_at(t);
        Some(Vector2::new(-angle.cos(), -angle.sin()) * (self.radius * self.sweep * self.sweep))
    }

    fn is_closed(&self) -> bool {
        (self.sweep.abs() - TAU).abs() < TOLERANCE
    }

    fn envelope_knots(&self) -> Vec<f64> {
        // Cap each interval at 60 degrees so every apex exists and stays
        // close to the arc.
        let n = (self.sweep.abs() / FRAC_PI_3).ceil().max(2.0) as usize;
        (0..=n).map(|i| i as f64 / n as f64).collect()
    }

    fn envelope(&self) -> Result<&Envelope> {
        self.cell.get_or_build(self)
    }
}
