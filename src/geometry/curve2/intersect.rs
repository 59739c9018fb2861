use crate::error::Result;
use crate::math::solve::solve_2x2;
use crate::math::triangle_2d::{segment_segment_intersect_2d, triangles_overlap};
use crate::math::{Point2, Vector2, TOLERANCE};

use super::envelope::apex_for;
use super::Curve2;

/// Maximum bisection depth while refining an overlapping triangle pair.
const MAX_DEPTH: usize = 48;

/// Newton iterations per polish attempt.
const NEWTON_ITERS: usize = 30;

/// Parameter width below which a persistently overlapping pair is accepted
/// as an intersection at its midpoint.
const PARAM_FLOOR: f64 = 1e-13;

/// One curve-curve intersection.
#[derive(Debug, Clone, Copy)]
pub struct CurveIntersection {
    /// Intersection point.
    pub point: Point2,
    /// Parameter on the first curve.
    pub t1: f64,
    /// Parameter on the second curve.
    pub t2: f64,
}

/// Intersects two 2D curves through their triangulated envelopes.
///
/// Every pair of envelope triangles is tested for overlap; overlapping
/// pairs are refined by a chord-intersection estimate polished with Newton
/// steps, falling back to recursive bisection of both parameter ranges.
/// Closed curves can legitimately produce zero, one, or several
/// intersections; all are collected, duplicates merged.
///
/// The result is symmetric: swapping the arguments swaps `t1`/`t2` and the
/// point set is unchanged.
///
/// # Errors
///
/// Returns an error if curve evaluation fails.
pub fn intersect_curves(c1: &dyn Curve2, c2: &dyn Curve2) -> Result<Vec<CurveIntersection>> {
    let e1 = c1.envelope()?;
    let e2 = c2.envelope()?;
    let mut out = Vec::new();
    for i in 0..e1.segment_count() {
        for j in 0..e2.segment_count() {
            if triangles_overlap(&e1.triangle(i), &e2.triangle(j)) {
                refine_pair(c1, e1.param_range(i), c2, e2.param_range(j), 0, &mut out)?;
            }
        }
    }
    Ok(dedupe(out))
}

/// Refines one overlapping parameter-range pair down to intersections.
pub(crate) fn refine_pair(
    c1: &dyn Curve2,
    r1: (f64, f64),
    c2: &dyn Curve2,
    r2: (f64, f64),
    depth: usize,
    out: &mut Vec<CurveIntersection>,
) -> Result<()> {
    let (a1, b1) = r1;
    let (a2, b2) = r2;
    let p1a = c1.evaluate(a1)?;
    let p1b = c1.evaluate(b1)?;
    let p2a = c2.evaluate(a2)?;
    let p2b = c2.evaluate(b2)?;

    // Near-coincident endpoints short-circuit to a direct estimate.
    for &(t1, p1, t2, p2) in &[
        (a1, p1a, a2, p2a),
        (a1, p1a, b2, p2b),
        (b1, p1b, a2, p2a),
        (b1, p1b, b2, p2b),
    ] {
        if (p1 - p2).norm() < TOLERANCE {
            out.push(CurveIntersection {
                point: midpoint(&p1, &p2),
                t1,
                t2,
            });
            return Ok(());
        }
    }

    // Chord-chord estimate polished by Newton.
    if let Some((_, s, u)) = segment_segment_intersect_2d(&p1a, &p1b, &p2a, &p2b) {
        let t1 = a1 + s * (b1 - a1);
        let t2 = a2 + u * (b2 - a2);
        if let Some(hit) = newton_polish(c1, c2, t1, t2, r1, r2)? {
            out.push(hit);
            return Ok(());
        }
    }

    // Persistent overlap at machine-width parameters: accept the midpoint.
    if b1 - a1 < PARAM_FLOOR && b2 - a2 < PARAM_FLOOR {
        let t1 = (a1 + b1) / 2.0;
        let t2 = (a2 + b2) / 2.0;
        let p1 = c1.evaluate(t1)?;
        let p2 = c2.evaluate(t2)?;
        if (p1 - p2).norm() < 1e-6 {
            out.push(CurveIntersection {
                point: midpoint(&p1, &p2),
                t1,
                t2,
            });
        }
        return Ok(());
    }
    if depth >= MAX_DEPTH {
        log::trace!("curve intersection refinement hit depth cap");
        return Ok(());
    }

    // Bisect both ranges and recurse into overlapping sub-pairs.
    let m1 = (a1 + b1) / 2.0;
    let m2 = (a2 + b2) / 2.0;
    let halves1 = [(a1, m1), (m1, b1)];
    let halves2 = [(a2, m2), (m2, b2)];
    for &h1 in &halves1 {
        let tri1 = local_triangle(c1, h1)?;
        for &h2 in &halves2 {
            let tri2 = local_triangle(c2, h2)?;
            if triangles_overlap(&tri1, &tri2) {
                refine_pair(c1, h1, c2, h2, depth + 1, out)?;
            }
        }
    }
    Ok(())
}

/// Bounding triangle of a parameter sub-range, built on the fly.
pub(crate) fn local_triangle(c: &dyn Curve2, (a, b): (f64, f64)) -> Result<[Point2; 3]> {
    let p0 = c.evaluate(a)?;
    let p1 = c.evaluate(b)?;
    let d0 = direction_or_chord(c, a, &p0, &p1)?;
    let d1 = direction_or_chord(c, b, &p0, &p1)?;
    Ok([p0, p1, apex_for(&p0, &d0, &p1, &d1)])
}

fn direction_or_chord(c: &dyn Curve2, t: f64, p0: &Point2, p1: &Point2) -> Result<Vector2> {
    match c.direction(t) {
        Ok(d) => Ok(d),
        Err(_) => {
            let chord = p1 - p0;
            let len = chord.norm();
            if len < TOLERANCE {
                Ok(Vector2::x())
            } else {
                Ok(chord / len)
            }
        }
    }
}

/// Newton refinement on the 2x2 tangent system.
///
/// Accepts only when each step strictly shrinks the positional gap while
/// both parameters stay inside their sub-ranges; any other outcome returns
/// `None` so the caller bisects instead.
fn newton_polish(
    c1: &dyn Curve2,
    c2: &dyn Curve2,
    t1_init: f64,
    t2_init: f64,
    (a1, b1): (f64, f64),
    (a2, b2): (f64, f64),
) -> Result<Option<CurveIntersection>> {
    let mut t1 = t1_init;
    let mut t2 = t2_init;
    let mut p1 = c1.evaluate(t1)?;
    let mut p2 = c2.evaluate(t2)?;
    let mut gap = (p1 - p2).norm();

    for _ in 0..NEWTON_ITERS {
        if gap < TOLERANCE {
            return Ok(Some(CurveIntersection {
                point: midpoint(&p1, &p2),
                t1,
                t2,
            }));
        }
        let d1 = c1.derivative(t1)?;
        let d2 = c2.derivative(t2)?;
        let rhs = p2 - p1;
        let Some(step) = solve_2x2(d1.x, -d2.x, d1.y, -d2.y, &rhs) else {
            return Ok(None);
        };
        let n1 = t1 + step.x;
        let n2 = t2 + step.y;
        let eps = TOLERANCE;
        if n1 < a1 - eps || n1 > b1 + eps || n2 < a2 - eps || n2 > b2 + eps {
            return Ok(None);
        }
        let np1 = c1.evaluate(n1)?;
        let np2 = c2.evaluate(n2)?;
        let ngap = (np1 - np2).norm();
        if ngap >= gap {
            return Ok(None);
        }
        t1 = n1.clamp(a1, b1);
        t2 = n2.clamp(a2, b2);
        p1 = np1;
        p2 = np2;
        gap = ngap;
    }
    if gap < TOLERANCE {
        Ok(Some(CurveIntersection {
            point: midpoint(&p1, &p2),
            t1,
            t2,
        }))
    } else {
        Ok(None)
    }
}

fn midpoint(a: &Point2, b: &Point2) -> Point2 {
    Point2::from((a.coords + b.coords) / 2.0)
}

/// Merges duplicate leaves produced by adjacent triangle pairs.
///
/// Deduplication is by position alone: the seam of a closed curve reports
/// the same crossing at both parameter ends, and only one may survive.
pub(crate) fn dedupe(hits: Vec<CurveIntersection>) -> Vec<CurveIntersection> {
    let mut out: Vec<CurveIntersection> = Vec::with_capacity(hits.len());
    for h in hits {
        if !out.iter().any(|o| (o.point - h.point).norm() < 1e-7) {
            out.push(h);
        }
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::super::{Arc2, Bezier2, Line2};
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn crossing_segments() {
        let l1 = Line2::new(Point2::new(0.0, 0.0), Point2::new(2.0, 2.0)).unwrap();
        let l2 = Line2::new(Point2::new(0.0, 2.0), Point2::new(2.0, 0.0)).unwrap();
        let hits = intersect_curves(&l1, &l2).unwrap();
        assert_eq!(hits.len(), 1);
        assert!((hits[0].point - Point2::new(1.0, 1.0)).norm() < 1e-9);
        assert!((hits[0].t1 - 0.5).abs() < 1e-9);
        assert!((hits[0].t2 - 0.5).abs() < 1e-9);
    }

    #[test]
    fn disjoint_segments() {
        let l1 = Line2::new(Point2::new(0.0, 0.0), Point2::new(1.0, 0.0)).unwrap();
        let l2 = Line2::new(Point2::new(0.0, 1.0), Point2::new(1.0, 1.0)).unwrap();
        assert!(intersect_curves(&l1, &l2).unwrap().is_empty());
    }

    #[test]
    fn line_through_circle_twice() {
        let line = Line2::new(Point2::new(-2.0, 0.0), Point2::new(2.0, 0.0)).unwrap();
        let circle = Arc2::full_circle(Point2::origin(), 1.0).unwrap();
        let mut hits = intersect_curves(&line, &circle).unwrap();
        assert_eq!(hits.len(), 2, "hits: {hits:?}");
        hits.sort_by(|a, b| a.point.x.total_cmp(&b.point.x));
        assert!((hits[0].point - Point2::new(-1.0, 0.0)).norm() < 1e-7);
        assert!((hits[1].point - Point2::new(1.0, 0.0)).norm() < 1e-7);
    }

    #[test]
    fn tangent_line_single_touch() {
        let line = Line2::new(Point2::new(-2.0, 1.0), Point2::new(2.0, 1.0)).unwrap();
        let arc = Arc2::new(Point2::origin(), 1.0, 0.0, PI).unwrap();
        let hits = intersect_curves(&line, &arc).unwrap();
        assert_eq!(hits.len(), 1, "hits: {hits:?}");
        assert!((hits[0].point - Point2::new(0.0, 1.0)).norm() < 1e-6);
    }

    #[test]
    fn bezier_bezier_crossing() {
        let b1 = Bezier2::new(
            Point2::new(0.0, -1.0),
            Point2::new(1.0, 1.0),
            Point2::new(2.0, 1.0),
            Point2::new(3.0, -1.0),
        )
        .unwrap();
        let b2 = Bezier2::new(
            Point2::new(0.0, 1.0),
            Point2::new(1.0, -1.0),
            Point2::new(2.0, -1.0),
            Point2::new(3.0, 1.0),
        )
        .unwrap();
        let hits = intersect_curves(&b1, &b2).unwrap();
        assert_eq!(hits.len(), 2, "hits: {hits:?}");
        for h in &hits {
            let p1 = b1.evaluate(h.t1).unwrap();
            let p2 = b2.evaluate(h.t2).unwrap();
            assert!((p1 - p2).norm() < 1e-8);
        }
    }

    #[test]
    fn symmetry_swaps_parameters() {
        let line = Line2::new(Point2::new(-2.0, 0.5), Point2::new(2.0, 0.5)).unwrap();
        let circle = Arc2::full_circle(Point2::origin(), 1.0).unwrap();
        let mut ab = intersect_curves(&line, &circle).unwrap();
        let mut ba = intersect_curves(&circle, &line).unwrap();
        assert_eq!(ab.len(), ba.len());
        ab.sort_by(|a, b| a.point.x.total_cmp(&b.point.x));
        ba.sort_by(|a, b| a.point.x.total_cmp(&b.point.x));
        for (x, y) in ab.iter().zip(ba.iter()) {
            assert!((x.point - y.point).norm() < 1e-7);
            assert!((x.t1 - y.t2).abs() < 1e-6);
            assert!((x.t2 - y.t1).abs() < 1e-6);
        }
    }

    #[test]
    fn circles_crossing_twice() {
        let c1 = Arc2::full_circle(Point2::origin(), 1.0).unwrap();
        let c2 = Arc2::full_circle(Point2::new(1.0, 0.0), 1.0).unwrap();
        let hits = intersect_curves(&c1, &c2).unwrap();
        assert_eq!(hits.len(), 2, "hits: {hits:?}");
        let y: f64 = 3.0_f64.sqrt() / 2.0;
        for h in &hits {
            assert!((h.point.x - 0.5).abs() < 1e-7);
            assert!((h.point.y.abs() - y).abs() < 1e-7);
        }
    }

    #[test]
    fn shared_endpoint_detected() {
        let l1 = Line2::new(Point2::new(0.0, 0.0), Point2::new(1.0, 1.0)).unwrap();
        let l2 = Line2::new(Point2::new(1.0, 1.0), Point2::new(2.0, 0.0)).unwrap();
        let hits = intersect_curves(&l1, &l2).unwrap();
        assert_eq!(hits.len(), 1);
        assert!((hits[0].point - Point2::new(1.0, 1.0)).norm() < 1e-9);
    }
}
