use nalgebra::{Matrix3, Matrix6, Vector3 as NVector3, Vector6};

use super::{Vector2, TOLERANCE};

/// Solves the 2x2 system `[a b; c d] * x = rhs` by Cramer's rule.
///
/// Returns `None` when the determinant is below tolerance.
#[must_use]
pub fn solve_2x2(a: f64, b: f64, c: f64, d: f64, rhs: &Vector2) -> Option<Vector2> {
    let det = a * d - b * c;
    if det.abs() < TOLERANCE {
        return None;
    }
    let x = (rhs.x * d - rhs.y * b) / det;
    let y = (a * rhs.y - c * rhs.x) / det;
    Some(Vector2::new(x, y))
}

/// Solves a 3x3 linear system via LU decomposition.
///
/// Returns `None` when the matrix is singular.
#[must_use]
pub fn solve_3x3(m: &Matrix3<f64>, rhs: &NVector3<f64>) -> Option<NVector3<f64>> {
    m.lu().solve(rhs)
}

/// Solves a 6x6 linear system via LU decomposition.
///
/// Returns `None` when the matrix is singular.
#[must_use]
pub fn solve_6x6(m: &Matrix6<f64>, rhs: &Vector6<f64>) -> Option<Vector6<f64>> {
    m.lu().solve(rhs)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn solve_2x2_identity() {
        let rhs = Vector2::new(3.0, -7.0);
        let x = solve_2x2(1.0, 0.0, 0.0, 1.0, &rhs).unwrap();
        assert!((x - rhs).norm() < TOLERANCE);
    }

    #[test]
    fn solve_2x2_general() {
        // 2x + y = 5, x - y = 1  =>  x = 2, y = 1
        let x = solve_2x2(2.0, 1.0, 1.0, -1.0, &Vector2::new(5.0, 1.0)).unwrap();
        assert!((x.x - 2.0).abs() < TOLERANCE);
        assert!((x.y - 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn solve_2x2_singular_returns_none() {
        assert!(solve_2x2(1.0, 2.0, 2.0, 4.0, &Vector2::new(1.0, 2.0)).is_none());
    }

    #[test]
    fn solve_3x3_diagonal() {
        let m = Matrix3::from_diagonal(&NVector3::new(2.0, 4.0, 8.0));
        let x = solve_3x3(&m, &NVector3::new(2.0, 4.0, 8.0)).unwrap();
        assert!((x - NVector3::new(1.0, 1.0, 1.0)).norm() < TOLERANCE);
    }

    #[test]
    fn solve_6x6_roundtrip() {
        let m = Matrix6::from_fn(|i, j| if i == j { 3.0 } else { 0.5 });
        let expected = Vector6::new(1.0, -1.0, 2.0, 0.0, 0.5, -2.0);
        let rhs = m * expected;
        let x = solve_6x6(&m, &rhs).unwrap();
        assert!((x - expected).norm() < 1e-9);
    }
}
