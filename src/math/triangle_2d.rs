use super::{cross_2d, Point2, Vector2, TOLERANCE};

/// Parametric 2D line-line intersection.
///
/// Given lines `p1 + t * d1` and `p2 + u * d2`, returns `(t, u)` if not parallel.
#[must_use]
pub fn line_line_intersect_2d(
    p1: &Point2,
    d1: &Vector2,
    p2: &Point2,
    d2: &Vector2,
) -> Option<(f64, f64)> {
    let cross = cross_2d(d1, d2);
    if cross.abs() < TOLERANCE {
        return None;
    }
    let dx = p2.x - p1.x;
    let dy = p2.y - p1.y;
    let t = (dx * d2.y - dy * d2.x) / cross;
    let u = (dx * d1.y - dy * d1.x) / cross;
    Some((t, u))
}

/// Bounded segment-segment intersection in 2D.
///
/// Returns `(intersection_point, t, u)` where `t` and `u` are in `[0, 1]`.
#[must_use]
pub fn segment_segment_intersect_2d(
    a0: &Point2,
    a1: &Point2,
    b0: &Point2,
    b1: &Point2,
) -> Option<(Point2, f64, f64)> {
    let da = a1 - a0;
    let db = b1 - b0;
    let (t, u) = line_line_intersect_2d(a0, &da, b0, &db)?;

    // Small epsilon so shared endpoints count as intersections.
    let eps = TOLERANCE;
    if t >= -eps && t <= 1.0 + eps && u >= -eps && u <= 1.0 + eps {
        let t_clamped = t.clamp(0.0, 1.0);
        Some((a0 + da * t_clamped, t_clamped, u.clamp(0.0, 1.0)))
    } else {
        None
    }
}

/// Tests whether `p` lies inside (or on the boundary of) triangle `(a, b, c)`.
///
/// Works for either winding; degenerate (collinear) triangles accept only
/// points on the segment.
#[must_use]
pub fn point_in_triangle(p: &Point2, a: &Point2, b: &Point2, c: &Point2) -> bool {
    let eps = TOLERANCE;
    let s1 = cross_2d(&(b - a), &(p - a));
    let s2 = cross_2d(&(c - b), &(p - b));
    let s3 = cross_2d(&(a - c), &(p - c));
    (s1 >= -eps && s2 >= -eps && s3 >= -eps) || (s1 <= eps && s2 <= eps && s3 <= eps)
}

/// Tests whether two triangles overlap.
///
/// Any edge-edge crossing or full containment of one triangle's vertex in
/// the other counts. Degenerate triangles (collinear vertices) reduce to
/// their segments, which the edge tests still cover.
#[must_use]
pub fn triangles_overlap(t1: &[Point2; 3], t2: &[Point2; 3]) -> bool {
    for i in 0..3 {
        let a0 = &t1[i];
        let a1 = &t1[(i + 1) % 3];
        for j in 0..3 {
            let b0 = &t2[j];
            let b1 = &t2[(j + 1) % 3];
            if segment_segment_intersect_2d(a0, a1, b0, b1).is_some() {
                return true;
            }
        }
    }
    t2.iter().all(|p| point_in_triangle(p, &t1[0], &t1[1], &t1[2]))
        || t1.iter().all(|p| point_in_triangle(p, &t2[0], &t2[1], &t2[2]))
}
