use crate::error::Result;
use crate::math::{cross_2d, Point2, Vector2, TOLERANCE};

use super::{Arc2, Curve2, Line2};

/// Deviation samples per candidate primitive.
const FIT_SAMPLES: usize = 16;

/// Minimum parameter span; a span this small is emitted as a chord
/// regardless of deviation.
const MIN_SPAN: f64 = 1e-4;

/// One primitive of a curve approximation.
#[derive(Debug, Clone)]
pub enum Primitive2 {
    /// A straight segment.
    Line(Line2),
    /// A circular arc.
    Arc(Arc2),
}

impl Primitive2 {
    /// Start point of the primitive.
    ///
    /// # Errors
    ///
    /// Returns an error if evaluation fails.
    pub fn start(&self) -> Result<Point2> {
        match self {
            Self::Line(l) => l.evaluate(0.0),
            Self::Arc(a) => a.evaluate(0.0),
        }
    }

    /// End point of the primitive.
    ///
    /// # Errors
    ///
    /// Returns an error if evaluation fails.
    pub fn end(&self) -> Result<Point2> {
        match self {
            Self::Line(l) => l.evaluate(1.0),
            Self::Arc(a) => a.evaluate(1.0),
        }
    }

    /// Distance from a point to the primitive.
    #[must_use]
    pub fn distance_to(&self, p: &Point2) -> f64 {
        match self {
            Self::Line(l) => segment_distance(l.start(), l.end(), p),
            Self::Arc(a) => a.distance_to(p),
        }
    }
}

fn segment_distance(a: &Point2, b: &Point2, p: &Point2) -> f64 {
    let ab = b - a;
    let len_sq = ab.norm_squared();
    if len_sq < TOLERANCE * TOLERANCE {
        return (p - a).norm();
    }
    let t = (p - a).dot(&ab) / len_sq;
    (p - (a + ab * t.clamp(0.0, 1.0))).norm()
}

/// Approximates a curve by lines (and, unless `lines_only`, tangent arc
/// pairs) to within `max_error`.
///
/// Each envelope segment is replaced by its chord when flat enough, or by a
/// biarc whose junction gives both sub-arcs equal tangent lengths; segments
/// still out of tolerance are bisected down to a minimum span. A reduction
/// pass then merges adjacent runs back into fewer primitives.
///
/// # Errors
///
/// Returns an error if curve evaluation fails.
pub fn approximate(
    curve: &dyn Curve2,
    lines_only: bool,
    max_error: f64,
) -> Result<Vec<Primitive2>> {
    let env = curve.envelope()?;
    let mut prims = Vec::new();
    for i in 0..env.segment_count() {
        let (t0, t1) = env.param_range(i);
        fit_range(curve, t0, t1, lines_only, max_error, &mut prims)?;
    }
    Ok(reduce(prims, max_error))
}

fn fit_range(
    curve: &dyn Curve2,
    t0: f64,
    t1: f64,
    lines_only: bool,
    max_error: f64,
    out: &mut Vec<Primitive2>,
) -> Result<()> {
    let p0 = curve.evaluate(t0)?;
    let p1 = curve.evaluate(t1)?;

    if let Ok(line) = Line2::new(p0, p1) {
        let candidate = [Primitive2::Line(line)];
        if deviation(curve, t0, t1, &candidate)? <= max_error {
            let [line] = candidate;
            out.push(line);
            return Ok(());
        }
    }

    if !lines_only {
        let d0 = curve.direction(t0)?;
        let d1 = curve.direction(t1)?;
        if let Some(pair) = biarc(&p0, &d0, &p1, &d1) {
            if deviation(curve, t0, t1, &pair)? <= max_error {
                let [first, second] = pair;
                out.push(first);
                out.push(second);
                return Ok(());
            }
        }
    }

    if t1 - t0 < MIN_SPAN {
        // Out of parameter room; the chord is the best remaining answer.
        if let Ok(line) = Line2::new(p0, p1) {
            out.push(Primitive2::Line(line));
        }
        return Ok(());
    }

    let mid = (t0 + t1) / 2.0;
    fit_range(curve, t0, mid, lines_only, max_error, out)?;
    fit_range(curve, mid, t1, lines_only, max_error, out)
}

fn deviation(
    curve: &dyn Curve2,
    t0: f64,
    t1: f64,
    prims: &[Primitive2],
) -> Result<f64> {
    let mut worst: f64 = 0.0;
    for k in 0..=FIT_SAMPLES {
        let t = t0 + (t1 - t0) * k as f64 / FIT_SAMPLES as f64;
        let p = curve.evaluate(t)?;
        let d = prims
            .iter()
            .map(|pr| pr.distance_to(&p))
            .fold(f64::INFINITY, f64::min);
        worst = worst.max(d);
    }
    Ok(worst)
}

/// Builds a tangent-continuous pair of arcs from `p0`/`d0` to `p1`/`d1`.
///
/// The junction is placed so both arcs have equal tangent lengths `d`
/// (solving `|chord - d*(d0+d1)| = 2d`), which makes each sub-arc
/// isosceles: the circle tangent to its corner's two legs touches both at
/// distance `d`. Near-collinear data degrades to line primitives.
fn biarc(p0: &Point2, d0: &Vector2, p1: &Point2, d1: &Vector2) -> Option<[Primitive2; 2]> {
    let chord = p1 - p0;
    let tsum = d0 + d1;
    let a = tsum.norm_squared() - 4.0;
    let b = -2.0 * chord.dot(&tsum);
    let c = chord.norm_squared();

    let d = if a.abs() < 1e-12 {
        // Tangents sum to a unit-2 vector (equal directions): linear case.
        if b.abs() < 1e-12 {
            return None;
        }
        -c / b
    } else {
        let disc = b * b - 4.0 * a * c;
        if disc < 0.0 {
            return None;
        }
        let sq = disc.sqrt();
        let r1 = (-b - sq) / (2.0 * a);
        let r2 = (-b + sq) / (2.0 * a);
        match (r1 > TOLERANCE, r2 > TOLERANCE) {
            (true, true) => r1.min(r2),
            (true, false) => r1,
            (false, true) => r2,
            (false, false) => return None,
        }
    };
    if d <= TOLERANCE {
        return None;
    }

    let q0 = p0 + d0 * d;
    let q1 = p1 - d1 * d;
    let junction = Point2::from((q0.coords + q1.coords) / 2.0);

    let first = arc_or_line(p0, d0, &junction)?;
    let jt = q1 - q0;
    let jt_len = jt.norm();
    let jt = if jt_len < TOLERANCE { *d0 } else { jt / jt_len };
    let second = arc_or_line(&junction, &jt, p1)?;
    Some([first, second])
}

/// Circle through `p` and `q`, tangent to `tangent` at `p`; a segment when
/// the three are collinear.
fn arc_or_line(p: &Point2, tangent: &Vector2, q: &Point2) -> Option<Primitive2> {
    let chord = q - p;
    let chord_len = chord.norm();
    if chord_len < TOLERANCE {
        return None;
    }
    let side = cross_2d(tangent, &chord);
    if side.abs() < 1e-9 * chord_len {
        return Line2::new(*p, *q).ok().map(Primitive2::Line);
    }

    // Center sits on the tangent's normal at p, on the chord's side.
    let normal = Vector2::new(-tangent.y, tangent.x) * side.signum();
    let radius = chord.norm_squared() / (2.0 * chord.dot(&normal));
    let center = p + normal * radius;

    let v0 = p - center;
    let v1 = q - center;
    let start_angle = v0.y.atan2(v0.x);
    let end_angle = v1.y.atan2(v1.x);

    // Sweep sign: the CCW tangent at the start must match the requested one.
    let ccw_tangent = Vector2::new(-v0.y, v0.x);
    let sign = if ccw_tangent.dot(tangent) >= 0.0 { 1.0 } else { -1.0 };
    let mut sweep = (end_angle - start_angle) % std::f64::consts::TAU;
    if sign > 0.0 && sweep <= 0.0 {
        sweep += std::f64::consts::TAU;
    }
    if sign < 0.0 && sweep >= 0.0 {
        sweep -= std::f64::consts::TAU;
    }
    Arc2::new(center, radius.abs(), start_angle, sweep)
        .ok()
        .map(Primitive2::Arc)
}

/// Merges adjacent primitive runs: collinear line chains into one line,
/// co-circular arc chains into one arc.
fn reduce(prims: Vec<Primitive2>, max_error: f64) -> Vec<Primitive2> {
    let mut out: Vec<Primitive2> = Vec::with_capacity(prims.len());
    for prim in prims {
        let merged = match (out.last(), &prim) {
            (Some(Primitive2::Line(prev)), Primitive2::Line(next)) => {
                merge_lines(prev, next, max_error).map(Primitive2::Line)
            }
            (Some(Primitive2::Arc(prev)), Primitive2::Arc(next)) => {
                merge_arcs(prev, next).map(Primitive2::Arc)
            }
            _ => None,
        };
        match merged {
            Some(m) => {
                out.pop();
                out.push(m);
            }
            None => out.push(prim),
        }
    }
    out
}

fn merge_lines(prev: &Line2, next: &Line2, max_error: f64) -> Option<Line2> {
    if (next.start() - prev.end()).norm() > TOLERANCE {
        return None;
    }
    let joined = Line2::new(*prev.start(), *next.end()).ok()?;
    let bend = segment_distance(joined.start(), joined.end(), prev.end());
    (bend <= max_error).then_some(joined)
}

fn merge_arcs(prev: &Arc2, next: &Arc2) -> Option<Arc2> {
    if (prev.center() - next.center()).norm() > 1e-9
        || (prev.radius() - next.radius()).abs() > 1e-9
        || prev.sweep().signum() != next.sweep().signum()
    {
        return None;
    }
    let prev_end = prev.start_angle() + prev.sweep();
    let delta = (next.start_angle() - prev_end) % std::f64::consts::TAU;
    if delta.abs() > 1e-9 && (delta.abs() - std::f64::consts::TAU).abs() > 1e-9 {
        return None;
    }
    let total = prev.sweep() + next.sweep();
    if total.abs() > std::f64::consts::TAU + 1e-9 {
        return None;
    }
    Arc2::new(
        *prev.center(),
        prev.radius(),
        prev.start_angle(),
        total.clamp(-std::f64::consts::TAU, std::f64::consts::TAU),
    )
    .ok()
}
