use std::sync::Arc;

use crate::error::Result;
use crate::geometry::curve2::{Curve2, Envelope, EnvelopeCell};
use crate::geometry::curve3::Curve3;
use crate::geometry::surface::{uv_direction, Surface};
use crate::math::{Point2, Vector2};

use super::DualSurfaceCurve;

/// Which of a dual-surface curve's two surfaces a projection targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceSide {
    /// The curve's first surface.
    First,
    /// The curve's second surface.
    Second,
}

/// The 2D trace of a dual-surface curve in one surface's parameter space.
///
/// A thin view: points come straight from the shared curve's memoized
/// position solver (both projections and the 3D curve hit one cache), and
/// the 2D direction is the 3D tangent resolved through the surface's
/// tangent basis.
#[derive(Debug, Clone)]
pub struct DualProjection {
    curve: Arc<DualSurfaceCurve>,
    side: SurfaceSide,
    cell: EnvelopeCell,
}

impl DualProjection {
    /// Creates the projection of `curve` onto one of its surfaces.
    #[must_use]
    pub fn new(curve: Arc<DualSurfaceCurve>, side: SurfaceSide) -> Self {
        Self {
            curve,
            side,
            cell: EnvelopeCell::new(),
        }
    }

    /// Returns the projected curve.
    #[must_use]
    pub fn curve(&self) -> &Arc<DualSurfaceCurve> {
        &self.curve
    }

    /// Returns the projection side.
    #[must_use]
    pub fn side(&self) -> SurfaceSide {
        self.side
    }

    fn surface(&self) -> &Arc<dyn Surface> {
        match self.side {
            SurfaceSide::First => self.curve.surface1(),
            SurfaceSide::Second => self.curve.surface2(),
        }
    }
}

impl Curve2 for DualProjection {
    fn evaluate(&self, t: f64) -> Result<Point2> {
        let sp = self.curve.point_at(t)?;
        Ok(match self.side {
            SurfaceSide::First => sp.uv1,
            SurfaceSide::Second => sp.uv2,
        })
    }

    fn derivative(&self, t: f64) -> Result<Vector2> {
        let uv = self.evaluate(t)?;
        let tangent = self.curve.derivative(t)?;
        uv_direction(self.surface().as_ref(), uv.x, uv.y, &tangent)
    }

    fn is_closed(&self) -> bool {
        self.curve.is_closed()
    }

    fn envelope_knots(&self) -> Vec<f64> {
        // The base points are exactly where the curve is known; seed there.
        let n = self.curve.base_points().len();
        (0..n).map(|i| i as f64 / (n - 1) as f64).collect()
    }

    fn envelope(&self) -> Result<&Envelope> {
        self.cell.get_or_build(self)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::curve2::intersect_curves;
    use crate::geometry::curve2::Line2;
    use crate::geometry::surface::{Cylinder, Plane};
    use crate::math::{Point3, Vector3};

    fn quarter_curve() -> Arc<DualSurfaceCurve> {
        let c1 = Cylinder::new(Point3::origin(), 1.0, Vector3::z(), Vector3::x()).unwrap();
        let c2 = Cylinder::new(Point3::origin(), 1.0, Vector3::x(), Vector3::y()).unwrap();
        Arc::new(
            DualSurfaceCurve::between_points(
                Arc::new(c1),
                Arc::new(c2),
                Point3::new(1.0, 0.0, 1.0),
                Point3::new(0.0, 1.0, 0.0),
            )
            .unwrap(),
        )
    }

    #[test]
    fn projection_matches_surface_image() {
        let curve = quarter_curve();
        let proj1 = DualProjection::new(curve.clone(), SurfaceSide::First);
        let proj2 = DualProjection::new(curve.clone(), SurfaceSide::Second);
        for k in 0..=16 {
            let t = f64::from(k) / 16.0;
            let p3 = curve.point_at(t).unwrap().point;
            let uv1 = proj1.evaluate(t).unwrap();
            let uv2 = proj2.evaluate(t).unwrap();
            let img1 = curve.surface1().evaluate(uv1.x, uv1.y).unwrap();
            let img2 = curve.surface2().evaluate(uv2.x, uv2.y).unwrap();
            assert!((img1 - p3).norm() < 1e-6, "surface1 image off at t={t}");
            assert!((img2 - p3).norm() < 1e-6, "surface2 image off at t={t}");
        }
    }

    #[test]
    fn derivative_matches_finite_difference() {
        let curve = quarter_curve();
        let proj = DualProjection::new(curve, SurfaceSide::First);
        let h = 1e-5;
        for &t in &[0.3, 0.5, 0.7] {
            let d = proj.derivative(t).unwrap();
            let fd = (proj.evaluate(t + h).unwrap() - proj.evaluate(t - h).unwrap()) / (2.0 * h);
            assert!(
                (d - fd).norm() < 0.05 * fd.norm().max(1.0),
                "derivative mismatch at t={t}: {d:?} vs {fd:?}"
            );
        }
    }

    #[test]
    fn projection_envelope_intersects_parameter_line() {
        // On the z-cylinder the quarter branch runs from (u=0, v=1) to
        // (u=pi/2, v=0); a straight parameter line crossing that span must
        // intersect the projection once.
        let curve = quarter_curve();
        let proj = DualProjection::new(curve, SurfaceSide::First);
        let line = Line2::new(Point2::new(0.0, 0.5), Point2::new(1.6, 0.5)).unwrap();
        let hits = intersect_curves(&proj, &line).unwrap();
        assert_eq!(hits.len(), 1, "hits: {hits:?}");
        let uv = proj.evaluate(hits[0].t1).unwrap();
        assert!((uv.y - 0.5).abs() < 1e-6);
    }

    #[test]
    fn planar_projection_of_plane_cylinder_curve() {
        let cyl: Arc<dyn Surface> =
            Arc::new(Cylinder::new(Point3::origin(), 1.0, Vector3::z(), Vector3::x()).unwrap());
        let plane: Arc<dyn Surface> =
            Arc::new(Plane::new(Point3::origin(), Vector3::x(), Vector3::y()).unwrap());
        let curve = Arc::new(
            DualSurfaceCurve::between_points(
                cyl,
                plane.clone(),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            )
            .unwrap(),
        );
        let on_plane = DualProjection::new(curve, SurfaceSide::Second);
        // In the plane's uv space the trace is the unit circle arc.
        for k in 0..=12 {
            let uv = on_plane.evaluate(f64::from(k) / 12.0).unwrap();
            assert!((uv.coords.norm() - 1.0).abs() < 1e-6);
        }
    }
}
