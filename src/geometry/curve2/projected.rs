use std::sync::Arc;

use crate::error::Result;
use crate::geometry::curve3::Curve3;
use crate::geometry::surface::{uv_direction, Surface};
use crate::math::{wrap_near, Point2, Vector2};

use super::{Curve2, Envelope, EnvelopeCell};

/// Samples in the seam-unwrap table.
const UNWRAP_SAMPLES: usize = 32;

/// A 3D curve re-projected into a surface's parameter space.
///
/// Evaluation maps `curve(t)` through the surface's inverse; on periodic
/// surfaces the raw inverse jumps across the seam, so construction records
/// an unwrapped uv polyline and every later evaluation is pulled onto the
/// branch the polyline predicts. The table is immutable: trims and
/// reversals build a new projection from the new 3D curve.
#[derive(Debug, Clone)]
pub struct ProjectedCurve2 {
    curve: Arc<dyn Curve3>,
    surface: Arc<dyn Surface>,
    table: Vec<(f64, Point2)>,
    cell: EnvelopeCell,
}

impl ProjectedCurve2 {
    /// Projects `curve` into `surface`'s parameter space.
    ///
    /// # Errors
    ///
    /// Returns an error if curve evaluation fails.
    pub fn new(curve: Arc<dyn Curve3>, surface: Arc<dyn Surface>) -> Result<Self> {
        let mut table = Vec::with_capacity(UNWRAP_SAMPLES + 1);
        let mut prev: Option<Point2> = None;
        for i in 0..=UNWRAP_SAMPLES {
            let t = i as f64 / UNWRAP_SAMPLES as f64;
            let p3 = curve.evaluate(t)?;
            let (mut u, mut v) = surface.uv_of(&p3);
            if let Some(prev) = prev {
                u = wrap_near(u, prev.x, surface.u_period());
                v = wrap_near(v, prev.y, surface.v_period());
            }
            let uv = Point2::new(u, v);
            table.push((t, uv));
            prev = Some(uv);
        }
        Ok(Self {
            curve,
            surface,
            table,
            cell: EnvelopeCell::new(),
        })
    }

    /// Returns the projected 3D curve.
    #[must_use]
    pub fn curve3(&self) -> &Arc<dyn Curve3> {
        &self.curve
    }

    /// Returns the target surface.
    #[must_use]
    pub fn surface(&self) -> &Arc<dyn Surface> {
        &self.surface
    }

    /// Predicted uv at `t` by linear interpolation of the unwrap table.
    fn predicted(&self, t: f64) -> Point2 {
        let n = self.table.len() - 1;
        let x = (t.clamp(0.0, 1.0) * n as f64).min(n as f64 - 1e-9);
        let i = x.floor() as usize;
        let s = x - i as f64;
        let (_, a) = self.table[i];
        let (_, b) = self.table[i + 1];
        Point2::from(a.coords * (1.0 - s) + b.coords * s)
    }
}

impl Curve2 for ProjectedCurve2 {
    fn evaluate(&self, t: f64) -> Result<Point2> {
        let p3 = self.curve.evaluate(t)?;
        let (u, v) = self.surface.uv_of(&p3);
        let guess = self.predicted(t);
        Ok(Point2::new(
            wrap_near(u, guess.x, self.surface.u_period()),
            wrap_near(v, guess.y, self.surface.v_period()),
        ))
    }

    fn derivative(&self, t: f64) -> Result<Vector2> {
        let uv = self.evaluate(t)?;
        let tangent = self.curve.derivative(t)?;
        uv_direction(self.surface.as_ref(), uv.x, uv.y, &tangent)
    }

    fn is_closed(&self) -> bool {
        self.curve.is_closed()
    }

    fn envelope_knots(&self) -> Vec<f64> {
        // The unwrap table already samples the curve; reuse its density
        // at a coarser stride as the seed.
        self.table.iter().step_by(4).map(|&(t, _)| t).collect()
    }

    fn envelope(&self) -> Result<&Envelope> {
        self.cell.get_or_build(self)
    }
}
