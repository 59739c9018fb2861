use crate::error::Result;
use crate::math::triangle_2d::triangles_overlap;
use crate::math::{cross_2d, Point2, Vector2, TOLERANCE};

use super::intersect::{dedupe, refine_pair};
use super::{Curve2, CurveIntersection};

/// Iterations for safeguarded Newton / bisection root refinement.
const ROOT_ITERS: usize = 80;

/// Finds the parameters of all perpendicular feet from `point` onto `curve`.
///
/// A foot can exist inside an envelope segment only when the residual
/// `derivative(t) . (point - curve(t))` changes sign between the segment's
/// ends; bracketed segments are refined by damped Newton (using the second
/// derivative when the curve provides one) with a bisection safeguard.
///
/// # Errors
///
/// Returns an error if curve evaluation fails.
pub fn perpendicular_feet(curve: &dyn Curve2, point: &Point2) -> Result<Vec<f64>> {
    let env = curve.envelope()?;
    let mut out: Vec<f64> = Vec::new();
    for i in 0..env.segment_count() {
        let (t0, t1) = env.param_range(i);
        let g0 = foot_residual(curve, t0, point)?;
        let g1 = foot_residual(curve, t1, point)?;
        if g0.abs() < 1e-13 {
            push_root(&mut out, t0);
            continue;
        }
        if g1.abs() >= 1e-13 && g0.signum() == g1.signum() {
            continue;
        }
        let t = refine_foot(curve, t0, t1, g0, point)?;
        push_root(&mut out, t);
    }
    out.sort_by(f64::total_cmp);
    Ok(out)
}

fn foot_residual(curve: &dyn Curve2, t: f64, point: &Point2) -> Result<f64> {
    let p = curve.evaluate(t)?;
    let d = curve.derivative(t)?;
    Ok(d.dot(&(point - p)))
}

fn refine_foot(
    curve: &dyn Curve2,
    t0: f64,
    t1: f64,
    g0: f64,
    point: &Point2,
) -> Result<f64> {
    let mut lo = t0;
    let mut hi = t1;
    let mut g_lo = g0;
    let mut t = (t0 + t1) / 2.0;
    for _ in 0..ROOT_ITERS {
        let g = foot_residual(curve, t, point)?;
        if g.abs() < 1e-13 || hi - lo < 1e-15 {
            break;
        }
        if g.signum() == g_lo.signum() {
            lo = t;
            g_lo = g;
        } else {
            hi = t;
        }
        // Newton when curvature is available and the step stays bracketed;
        // bisection otherwise.
        let next = curve.second_derivative(t).and_then(|dd| {
            let p = curve.evaluate(t).ok()?;
            let d = curve.derivative(t).ok()?;
            let gp = dd.dot(&(point - p)) - d.norm_squared();
            if gp.abs() < TOLERANCE {
                return None;
            }
            let tn = t - g / gp;
            (tn > lo && tn < hi).then_some(tn)
        });
        t = next.unwrap_or((lo + hi) / 2.0);
    }
    Ok(t)
}

/// Finds parameters where the line from `from` to the curve is tangent to it.
///
/// Brackets on the sign of the cross product between the secant and the
/// envelope tangent, then bisects.
///
/// # Errors
///
/// Returns an error if curve evaluation fails.
pub fn tangent_points(curve: &dyn Curve2, from: &Point2) -> Result<Vec<f64>> {
    bracketed_roots(curve, &|c, t| {
        let p = c.evaluate(t)?;
        Ok(cross_2d(&(p - from), &c.direction(t)?))
    })
}

/// Finds parameters where the curve tangent is parallel to `dir`.
///
/// # Errors
///
/// Returns an error if curve evaluation fails.
pub fn tangent_points_with_direction(curve: &dyn Curve2, dir: &Vector2) -> Result<Vec<f64>> {
    bracketed_roots(curve, &|c, t| Ok(cross_2d(dir, &c.direction(t)?)))
}

type Residual<'a> = dyn Fn(&dyn Curve2, f64) -> Result<f64> + 'a;

fn bracketed_roots(curve: &dyn Curve2, residual: &Residual<'_>) -> Result<Vec<f64>> {
    let env = curve.envelope()?;
    let mut out: Vec<f64> = Vec::new();
    for i in 0..env.segment_count() {
        let (t0, t1) = env.param_range(i);
        let g0 = residual(curve, t0)?;
        let g1 = residual(curve, t1)?;
        if g0.abs() < TOLERANCE {
            push_root(&mut out, t0);
            continue;
        }
        if g1.abs() < TOLERANCE || g0.signum() == g1.signum() {
            // The end root is claimed by the next segment's start.
            continue;
        }
        let mut lo = t0;
        let mut hi = t1;
        let mut g_lo = g0;
        for _ in 0..ROOT_ITERS {
            let mid = (lo + hi) / 2.0;
            let g = residual(curve, mid)?;
            if g.abs() < 1e-14 || hi - lo < 1e-15 {
                break;
            }
            if g.signum() == g_lo.signum() {
                lo = mid;
                g_lo = g;
            } else {
                hi = mid;
            }
        }
        push_root(&mut out, (lo + hi) / 2.0);
    }
    // The last knot never opens a segment; test it directly.
    if residual(curve, 1.0)?.abs() < TOLERANCE && !curve.is_closed() {
        push_root(&mut out, 1.0);
    }
    out.sort_by(f64::total_cmp);
    Ok(out)
}

fn push_root(out: &mut Vec<f64>, t: f64) {
    if out.iter().all(|&o| (o - t).abs() > 1e-9) {
        out.push(t);
    }
}

/// Finds self-intersections of a curve.
///
/// Applies the triangle-overlap refinement to all non-adjacent envelope
/// segment pairs (for closed curves the first and last segments count as
/// adjacent through the seam). Each result pairs the two parameters that
/// map to the same point.
///
/// # Errors
///
/// Returns an error if curve evaluation fails.
pub fn self_intersections(curve: &dyn Curve2) -> Result<Vec<CurveIntersection>> {
    let env = curve.envelope()?;
    let n = env.segment_count();
    let mut hits = Vec::new();
    for i in 0..n {
        for j in i + 2..n {
            if curve.is_closed() && i == 0 && j == n - 1 {
                continue;
            }
            if triangles_overlap(&env.triangle(i), &env.triangle(j)) {
                refine_pair(
                    curve,
                    env.param_range(i),
                    curve,
                    env.param_range(j),
                    0,
                    &mut hits,
                )?;
            }
        }
    }
    hits.retain(|h| (h.t1 - h.t2).abs() > 1e-6);
    Ok(dedupe(hits))
}
