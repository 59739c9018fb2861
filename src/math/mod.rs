pub mod aabb;
pub mod solve;
pub mod triangle_2d;

/// 2D point type.
pub type Point2 = nalgebra::Point2<f64>;

/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// 2D vector type.
pub type Vector2 = nalgebra::Vector2<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// 2D cross product (z component of the 3D cross).
#[must_use]
pub fn cross_2d(a: &Vector2, b: &Vector2) -> f64 {
    a.x * b.y - a.y * b.x
}

/// Wraps `value` onto the branch of a periodic parameter nearest to `anchor`.
///
/// Returns `value` unchanged when `period` is `None`. The result differs
/// from `anchor` by at most half a period.
#[must_use]
pub fn wrap_near(value: f64, anchor: f64, period: Option<f64>) -> f64 {
    let Some(p) = period else {
        return value;
    };
    if p <= 0.0 {
        return value;
    }
    let mut v = value;
    while v - anchor > p / 2.0 {
        v -= p;
    }
    while anchor - v > p / 2.0 {
        v += p;
    }
    v
}
