use std::cell::OnceCell;

use crate::error::Result;
use crate::math::triangle_2d::line_line_intersect_2d;
use crate::math::{cross_2d, Point2, Vector2, TOLERANCE};

use super::Curve2;

/// Maximum refinement passes while isolating inflections.
const MAX_INFLECTION_PASSES: usize = 8;

/// Bisection iterations when locating an inflection parameter.
const INFLECTION_BISECT_ITERS: usize = 48;

/// A triangulated envelope of a 2D curve.
///
/// Stores curve samples (`points`, `directions`, `parameters`) chosen so
/// that no interval spans more than one inflection, plus one apex per
/// interval: the intersection of the end tangent lines. Each triangle
/// `(points[i], points[i+1], apexes[i])` encloses the curve arc of its
/// interval, which is the soundness property every envelope-based query
/// relies on.
#[derive(Debug, Clone)]
pub struct Envelope {
    points: Vec<Point2>,
    directions: Vec<Vector2>,
    parameters: Vec<f64>,
    apexes: Vec<Point2>,
}

impl Envelope {
    /// Builds the envelope of a curve.
    ///
    /// # Errors
    ///
    /// Returns an error if curve evaluation fails.
    pub fn build(curve: &dyn Curve2) -> Result<Self> {
        let mut parameters = curve.envelope_knots();
        parameters.retain(|t| (0.0..=1.0).contains(t));
        parameters.sort_by(f64::total_cmp);
        parameters.dedup_by(|a, b| (*a - *b).abs() < 1e-12);
        if parameters.first().is_none_or(|&t| t > 1e-12) {
            parameters.insert(0, 0.0);
        }
        if parameters.last().is_none_or(|&t| t < 1.0 - 1e-12) {
            parameters.push(1.0);
        }

        // Split intervals whose end tangents bracket an inflection until
        // every interval is inflection-free.
        for _ in 0..MAX_INFLECTION_PASSES {
            let mut inserted = Vec::new();
            for w in parameters.windows(2) {
                let (t0, t1) = (w[0], w[1]);
                if let Some(t_inf) = bracket_inflection(curve, t0, t1)? {
                    if t_inf - t0 > 1e-9 && t1 - t_inf > 1e-9 {
                        inserted.push(t_inf);
                    }
                }
            }
            if inserted.is_empty() {
                break;
            }
            parameters.extend(inserted);
            parameters.sort_by(f64::total_cmp);
            parameters.dedup_by(|a, b| (*a - *b).abs() < 1e-12);
        }

        let mut points = Vec::with_capacity(parameters.len());
        let mut directions = Vec::with_capacity(parameters.len());
        for &t in &parameters {
            points.push(curve.evaluate(t)?);
            directions.push(curve.direction(t)?);
        }

        let mut apexes = Vec::with_capacity(parameters.len() - 1);
        for i in 0..parameters.len() - 1 {
            apexes.push(apex_for(&points[i], &directions[i], &points[i + 1], &directions[i + 1]));
        }

        Ok(Self {
            points,
            directions,
            parameters,
            apexes,
        })
    }

    /// Number of envelope intervals (triangles).
    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.apexes.len()
    }

    /// Sample points at the envelope knots.
    #[must_use]
    pub fn points(&self) -> &[Point2] {
        &self.points
    }

    /// Unit tangents at the envelope knots.
    #[must_use]
    pub fn directions(&self) -> &[Vector2] {
        &self.directions
    }

    /// Parameters of the envelope knots.
    #[must_use]
    pub fn parameters(&self) -> &[f64] {
        &self.parameters
    }

    /// Triangle apexes, one per interval.
    #[must_use]
    pub fn apexes(&self) -> &[Point2] {
        &self.apexes
    }

    /// The bounding triangle of interval `i`.
    #[must_use]
    pub fn triangle(&self, i: usize) -> [Point2; 3] {
        [self.points[i], self.points[i + 1], self.apexes[i]]
    }

    /// The parameter range of interval `i`.
    #[must_use]
    pub fn param_range(&self, i: usize) -> (f64, f64) {
        (self.parameters[i], self.parameters[i + 1])
    }
}

/// Computes the apex of the bounding triangle for one interval.
///
/// The apex is the intersection of the two end tangent lines when it lies
/// forward of the start and behind the end; near-parallel tangents or a
/// wrong-sided intersection fall back to the chord midpoint (the interval
/// is then flat enough for the degenerate triangle to be sound).
pub(crate) fn apex_for(p0: &Point2, d0: &Vector2, p1: &Point2, d1: &Vector2) -> Point2 {
    let fallback = Point2::from((p0.coords + p1.coords) / 2.0);
    match line_line_intersect_2d(p0, d0, p1, d1) {
        Some((s, u)) if s > TOLERANCE && u < -TOLERANCE => p0 + d0 * s,
        _ => fallback,
    }
}

/// Looks for an inflection inside `(t0, t1)`.
///
/// The end tangents bracket an inflection when their cross products with a
/// non-trivial chord have opposite signs; the parameter is then located by
/// bisection on the sign of the tangent-chord cross product.
fn bracket_inflection(curve: &dyn Curve2, t0: f64, t1: f64) -> Result<Option<f64>> {
    let p0 = curve.evaluate(t0)?;
    let p1 = curve.evaluate(t1)?;
    let chord = p1 - p0;
    if chord.norm() < TOLERANCE {
        return Ok(None);
    }
    let c0 = cross_2d(&curve.direction(t0)?, &chord);
    let c1 = cross_2d(&curve.direction(t1)?, &chord);
    if c0.abs() < TOLERANCE || c1.abs() < TOLERANCE || c0.signum() == c1.signum() {
        return Ok(None);
    }

    let mut lo = t0;
    let mut hi = t1;
    let mut c_lo = c0;
    for _ in 0..INFLECTION_BISECT_ITERS {
        let mid = (lo + hi) / 2.0;
        let c_mid = cross_2d(&curve.direction(mid)?, &chord);
        if c_mid.abs() < TOLERANCE {
            return Ok(Some(mid));
        }
        if c_mid.signum() == c_lo.signum() {
            lo = mid;
            c_lo = c_mid;
        } else {
            hi = mid;
        }
    }
    Ok(Some((lo + hi) / 2.0))
}

/// Lazily-populated envelope cache.
///
/// Curves own one of these per instance; construction-by-value (trims and
/// reversals produce new curves) means a cache can never outlive the
/// geometry it was built from.
#[derive(Debug, Clone, Default)]
pub struct EnvelopeCell(OnceCell<Envelope>);

impl EnvelopeCell {
    /// Creates an empty cell.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached envelope, building it from `curve` on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if envelope construction fails.
    pub fn get_or_build(&self, curve: &dyn Curve2) -> Result<&Envelope> {
        if let Some(e) = self.0.get() {
            return Ok(e);
        }
        let built = Envelope::build(curve)?;
        Ok(self.0.get_or_init(|| built))
    }

    /// Drops the cached envelope.
    pub fn invalidate(&mut self) {
        self.0 = OnceCell::new();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::super::{Arc2, Bezier2, Line2};
    use super::*;
    use crate::math::triangle_2d::point_in_triangle;
    use std::f64::consts::FRAC_PI_2;

    fn assert_sound(curve: &dyn Curve2) {
        let env = curve.envelope().unwrap();
        for i in 0..env.segment_count() {
            let [a, b, apex] = env.triangle(i);
            let (t0, t1) = env.param_range(i);
            for k in 0..=50 {
                let t = t0 + (t1 - t0) * f64::from(k) / 50.0;
                let p = curve.evaluate(t).unwrap();
                assert!(
                    point_in_triangle(&p, &a, &b, &apex)
                        || (p - a).norm() < 1e-7
                        || (p - b).norm() < 1e-7,
                    "point at t={t} escapes triangle {i}"
                );
            }
        }
    }

    #[test]
    fn line_envelope_is_single_degenerate_triangle() {
        let l = Line2::new(Point2::new(0.0, 0.0), Point2::new(3.0, 1.0)).unwrap();
        let env = l.envelope().unwrap();
        assert_eq!(env.segment_count(), 1);
        // Apex falls back to the chord midpoint for parallel tangents.
        assert!((env.apexes()[0] - Point2::new(1.5, 0.5)).norm() < 1e-9);
    }

    #[test]
    fn quarter_arc_envelope_sound() {
        let a = Arc2::new(Point2::origin(), 1.0, 0.0, FRAC_PI_2).unwrap();
        assert_sound(&a);
    }

    #[test]
    fn full_circle_envelope_sound() {
        let c = Arc2::full_circle(Point2::new(1.0, 2.0), 3.0).unwrap();
        assert_sound(&c);
    }

    #[test]
    fn arc_apex_outside_circle() {
        let a = Arc2::new(Point2::origin(), 1.0, 0.0, FRAC_PI_2).unwrap();
        let env = a.envelope().unwrap();
        for apex in env.apexes() {
            assert!(apex.coords.norm() > 1.0 - 1e-9);
        }
    }

    #[test]
    fn s_curve_gets_inflection_knot() {
        // Asymmetric cubic whose inflection falls inside a seed interval.
        let b = Bezier2::new(
            Point2::new(0.0, 0.0),
            Point2::new(2.0, 3.0),
            Point2::new(1.0, -2.0),
            Point2::new(3.0, 0.0),
        )
        .unwrap();
        let env = b.envelope().unwrap();
        // The default five knots must have been refined.
        assert!(env.parameters().len() > 5);
        assert_sound(&b);
    }

    #[test]
    fn convex_bezier_envelope_sound() {
        let b = Bezier2::new(
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 1.5),
            Point2::new(2.0, 1.5),
            Point2::new(3.0, 0.0),
        )
        .unwrap();
        assert_sound(&b);
    }
}
