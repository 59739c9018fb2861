mod projection;

pub use projection::{DualProjection, SurfaceSide};

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;

use nalgebra::{Matrix6, Vector6};

use crate::error::{GeometryError, OperationError, Result};
use crate::geometry::curve3::Curve3;
use crate::geometry::surface::Surface;
use crate::math::aabb::Aabb3;
use crate::math::solve::solve_6x6;
use crate::math::{wrap_near, Point2, Point3, Vector3, TOLERANCE};

/// Minimum resting base-point count.
///
/// Tuned empirically, not derived: enough interior samples that linear
/// interpolation between neighbors is a safe solver seed on the analytic
/// surface pairs this kernel meets.
pub(crate) const BASE_POINT_TARGET: usize = 9;

/// Hard cap on refinement insertions.
pub(crate) const MAX_BASE_POINTS: usize = 48;

/// Base points closer than this fraction of the mean spacing are pruned.
pub(crate) const PRUNE_FRACTION: f64 = 0.1;

/// Below this normal-cross magnitude the surfaces count as tangential and
/// the marching direction comes from the fitted curve instead.
pub(crate) const TANGENTIAL_SIN: f64 = 1e-4;

/// Gap ratio over the widest allowed before refinement keeps splitting.
const GAP_SPREAD: f64 = 1.5;

const NEWTON_MAX: usize = 24;
const DAMPING_RETRIES: usize = 3;
const FIXED_POINT_MAX: usize = 60;

/// An exact sample of a curve lying on two surfaces: one 3D point with its
/// parameter coordinates on each surface.
#[derive(Debug, Clone, Copy)]
pub struct SurfacePoint {
    /// The 3D point.
    pub point: Point3,
    /// Parameters on the first surface.
    pub uv1: Point2,
    /// Parameters on the second surface.
    pub uv2: Point2,
}

/// The intersection curve of two parametric surfaces, represented by a
/// sparse ordered set of exact base points and reconstructed anywhere in
/// between by a cutting-plane Newton search.
///
/// The parameter runs over `[0, 1]` with one uniform span per base-point
/// segment. Solved positions are memoized by parameter, so repeated queries
/// (the per-surface 2D projections ask for the same parameters constantly)
/// are bit-identical and cheap. The memo makes the type deliberately
/// `!Sync`; a curve belongs to one topology graph on one thread.
#[derive(Debug, Clone)]
pub struct DualSurfaceCurve {
    surface1: Arc<dyn Surface>,
    surface2: Arc<dyn Surface>,
    points: Vec<SurfacePoint>,
    forward: bool,
    positions: RefCell<HashMap<u64, SurfacePoint>>,
}

impl DualSurfaceCurve {
    /// Builds the curve from explicit base points.
    ///
    /// At least the two endpoints are required; the set is refined until
    /// [`BASE_POINT_TARGET`] points exist and no gap dominates, then pruned
    /// of near-duplicates, and the orientation is fixed from the mid-curve
    /// surface normals.
    ///
    /// # Errors
    ///
    /// Returns an error if fewer than two base points are given or surface
    /// evaluation fails during refinement.
    pub fn new(
        surface1: Arc<dyn Surface>,
        surface2: Arc<dyn Surface>,
        base_points: Vec<SurfacePoint>,
    ) -> Result<Self> {
        if base_points.len() < 2 {
            return Err(OperationError::InvalidInput(
                "dual-surface curve needs at least two base points".into(),
            )
            .into());
        }
        let mut curve = Self {
            surface1,
            surface2,
            points: base_points,
            forward: true,
            positions: RefCell::new(HashMap::new()),
        };
        curve.normalize_chain();
        curve.refine()?;
        curve.prune();
        curve.fix_orientation()?;
        Ok(curve)
    }

    /// Builds the curve between two 3D points known to lie on both surfaces.
    ///
    /// # Errors
    ///
    /// Returns an error if an endpoint does not lie on both surfaces (no
    /// intersection near the given points) or the endpoints coincide.
    pub fn between_points(
        surface1: Arc<dyn Surface>,
        surface2: Arc<dyn Surface>,
        start: Point3,
        end: Point3,
    ) -> Result<Self> {
        if (end - start).norm() < TOLERANCE {
            return Err(GeometryError::Degenerate(
                "coincident endpoints; provide interior base points for a closed curve".into(),
            )
            .into());
        }
        let sp_start = Self::snap(&surface1, &surface2, &start)?;
        let sp_end = Self::snap(&surface1, &surface2, &end)?;
        Self::new(surface1, surface2, vec![sp_start, sp_end])
    }

    fn snap(s1: &Arc<dyn Surface>, s2: &Arc<dyn Surface>, p: &Point3) -> Result<SurfacePoint> {
        let (u1, v1) = s1.uv_of(p);
        let (u2, v2) = s2.uv_of(p);
        let p1 = s1.evaluate(u1, v1)?;
        let p2 = s2.evaluate(u2, v2)?;
        let scale = 1.0 + p.coords.norm();
        if (p1 - p).norm() > 1e-6 * scale || (p2 - p).norm() > 1e-6 * scale {
            return Err(GeometryError::NoIntersection.into());
        }
        Ok(SurfacePoint {
            point: *p,
            uv1: Point2::new(u1, v1),
            uv2: Point2::new(u2, v2),
        })
    }

    /// Returns the first surface.
    #[must_use]
    pub fn surface1(&self) -> &Arc<dyn Surface> {
        &self.surface1
    }

    /// Returns the second surface.
    #[must_use]
    pub fn surface2(&self) -> &Arc<dyn Surface> {
        &self.surface2
    }

    /// Returns the base points.
    #[must_use]
    pub fn base_points(&self) -> &[SurfacePoint] {
        &self.points
    }

    /// Whether the base-point order agrees with the normal-cross direction.
    #[must_use]
    pub fn forward_oriented(&self) -> bool {
        self.forward
    }

    // --- construction internals ---

    /// Pulls each base point's uv onto the branch nearest its predecessor,
    /// so consecutive points never straddle a periodic seam.
    fn normalize_chain(&mut self) {
        for i in 1..self.points.len() {
            let prev = self.points[i - 1];
            let cur = self.points[i];
            self.points[i] = self.normalized(cur, &prev);
        }
    }

    fn refine(&mut self) -> Result<()> {
        while self.points.len() < MAX_BASE_POINTS {
            let (widest_idx, widest) = self.widest_gap();
            let mean = self.total_chord() / (self.points.len() - 1) as f64;
            if self.points.len() >= BASE_POINT_TARGET && widest <= GAP_SPREAD * mean {
                break;
            }
            let a = self.points[widest_idx];
            let b = self.points[widest_idx + 1];
            let mid = self.solve_between(&a, &b)?;
            if (mid.point - a.point).norm() < TOLERANCE
                || (mid.point - b.point).norm() < TOLERANCE
            {
                // The gap cannot be split further.
                break;
            }
            self.points.insert(widest_idx + 1, mid);
        }
        Ok(())
    }

    fn widest_gap(&self) -> (usize, f64) {
        let mut idx = 0;
        let mut widest = 0.0;
        for (i, w) in self.points.windows(2).enumerate() {
            let d = (w[1].point - w[0].point).norm();
            if d > widest {
                widest = d;
                idx = i;
            }
        }
        (idx, widest)
    }

    fn total_chord(&self) -> f64 {
        self.points
            .windows(2)
            .map(|w| (w[1].point - w[0].point).norm())
            .sum()
    }

    fn prune(&mut self) {
        let mean = self.total_chord() / (self.points.len() - 1) as f64;
        let mut i = 1;
        while i + 1 < self.points.len() {
            let spacing = (self.points[i].point - self.points[i - 1].point).norm();
            let coincident = spacing < TOLERANCE;
            let crowded = spacing < PRUNE_FRACTION * mean;
            if coincident || (crowded && self.points.len() > BASE_POINT_TARGET) {
                self.points.remove(i);
            } else {
                i += 1;
            }
        }
    }

    /// Fixes the orientation flag from the middle of the curve, where the
    /// surfaces are least likely to be tangential or degenerate.
    fn fix_orientation(&mut self) -> Result<()> {
        if self.points.len() < 3 {
            self.forward = true;
            return Ok(());
        }
        let m = self.points.len() / 2;
        let m = m.clamp(1, self.points.len() - 2);
        let sp = self.points[m];
        let n1 = self.surface1.normal(sp.uv1.x, sp.uv1.y)?;
        let n2 = self.surface2.normal(sp.uv2.x, sp.uv2.y)?;
        let cross = n1.cross(&n2);
        let chord = self.points[m + 1].point - self.points[m - 1].point;
        let dir = if cross.norm() < TANGENTIAL_SIN {
            self.tangent_estimate(m)
        } else {
            cross
        };
        self.forward = dir.dot(&chord) >= 0.0;
        Ok(())
    }

    // --- evaluation ---

    /// Solves the curve position at parameter `t`, memoized per parameter.
    ///
    /// # Errors
    ///
    /// Returns an error if surface evaluation fails; numerical
    /// non-convergence never errors, it degrades through the fallback
    /// ladder instead.
    pub fn point_at(&self, t: f64) -> Result<SurfacePoint> {
        let key = t.to_bits();
        if let Some(sp) = self.positions.borrow().get(&key) {
            return Ok(*sp);
        }
        let sp = self.solve_position(t)?;
        self.positions.borrow_mut().insert(key, sp);
        Ok(sp)
    }

    /// Unit tangent at `t`, oriented along increasing parameter.
    ///
    /// Away from tangential regions this is the normalized cross product of
    /// the two surface normals; where that degenerates the direction comes
    /// from the fitted curve through the base points.
    ///
    /// # Errors
    ///
    /// Returns an error if surface evaluation fails.
    pub fn tangent_at(&self, t: f64) -> Result<Vector3> {
        let sp = self.point_at(t)?;
        let n1 = self.surface1.normal(sp.uv1.x, sp.uv1.y)?;
        let n2 = self.surface2.normal(sp.uv2.x, sp.uv2.y)?;
        let cross = n1.cross(&n2);
        if cross.norm() < TANGENTIAL_SIN {
            log::trace!("tangential surfaces at t={t}; using fitted-curve direction");
            let d = self.hermite_derivative(t);
            let len = d.norm();
            if len < TOLERANCE {
                return Err(GeometryError::ZeroVector.into());
            }
            return Ok(d / len);
        }
        let dir = cross / cross.norm();
        Ok(if self.forward { dir } else { -dir })
    }

    fn segment_of(&self, t: f64) -> (usize, f64) {
        let n = self.points.len();
        let x = (t.clamp(0.0, 1.0) * (n - 1) as f64).min((n - 1) as f64);
        let i = (x.floor() as usize).min(n - 2);
        (i, x - i as f64)
    }

    fn solve_position(&self, t: f64) -> Result<SurfacePoint> {
        let (i, s) = self.segment_of(t);
        if s < 1e-12 {
            return Ok(self.points[i]);
        }
        if s > 1.0 - 1e-12 {
            return Ok(self.points[i + 1]);
        }
        let a = self.points[i];
        let b = self.points[i + 1];
        let chord = b.point - a.point;
        let chord_len = chord.norm();
        if chord_len < TOLERANCE {
            return Ok(a);
        }

        // Cutting plane: perpendicular to the segment, positioned (and,
        // when the fitted curve is usable, oriented) by the Hermite fit
        // through the base points.
        let (h_point, h_tan) = self.hermite(i, s);
        let normal = if h_tan.norm() > TOLERANCE {
            h_tan / h_tan.norm()
        } else {
            chord / chord_len
        };

        self.solve_on_plane(&h_point, &normal, &a, &b, s)
    }

    /// Midpoint reconstruction between two base points, used by refinement.
    fn solve_between(&self, a: &SurfacePoint, b: &SurfacePoint) -> Result<SurfacePoint> {
        let chord = b.point - a.point;
        let chord_len = chord.norm();
        if chord_len < TOLERANCE {
            return Ok(*a);
        }
        let origin = Point3::from((a.point.coords + b.point.coords) / 2.0);
        let normal = chord / chord_len;
        self.solve_on_plane(&origin, &normal, a, b, 0.5)
    }

    /// Runs the solver ladder against one cutting plane.
    ///
    /// The ladder is: damped Newton on the six-unknown tangent-plane
    /// system; the point-to-uv round-trip fixed point; linear interpolation
    /// of the neighbors' uv. A rung's answer farther from the neighbors
    /// than their chord is a numerical excursion and falls through to the
    /// next rung, so the caller always receives a bounded answer.
    fn solve_on_plane(
        &self,
        origin: &Point3,
        normal: &Vector3,
        a: &SurfacePoint,
        b: &SurfacePoint,
        s: f64,
    ) -> Result<SurfacePoint> {
        let uv1_guess = lerp_uv(a.uv1, b.uv1, s, self.surface1.as_ref());
        let uv2_guess = lerp_uv(a.uv2, b.uv2, s, self.surface2.as_ref());
        let bound = (b.point - a.point).norm();

        if let Some(sp) = self.newton_solve(origin, normal, uv1_guess, uv2_guess)? {
            if within_bound(&sp, a, b, bound) {
                return Ok(self.normalized(sp, a));
            }
            log::trace!("newton result out of bounds; falling back");
        } else {
            log::trace!("newton stalled; falling back to fixed point");
        }

        if let Some(sp) = self.fixed_point_solve(origin, normal, uv1_guess, uv2_guess)? {
            if within_bound(&sp, a, b, bound) {
                return Ok(self.normalized(sp, a));
            }
            log::debug!("fixed-point result out of bounds; interpolating");
        } else {
            log::debug!("fixed-point iteration stalled; interpolating");
        }

        // Last rung: linear interpolation between the neighbors' uv.
        let p1 = self.surface1.evaluate(uv1_guess.x, uv1_guess.y)?;
        let p2 = self.surface2.evaluate(uv2_guess.x, uv2_guess.y)?;
        Ok(SurfacePoint {
            point: Point3::from((p1.coords + p2.coords) / 2.0),
            uv1: uv1_guess,
            uv2: uv2_guess,
        })
    }

    /// Newton iteration on the six-unknown linear system equating both
    /// surfaces' tangent-plane parameterizations inside the cutting plane.
    ///
    /// Steps are damped; a step that fails to shrink the 3D gap between the
    /// two surface candidates after the retries aborts the method.
    fn newton_solve(
        &self,
        origin: &Point3,
        normal: &Vector3,
        uv1: Point2,
        uv2: Point2,
    ) -> Result<Option<SurfacePoint>> {
        let (e1, e2) = plane_basis(normal);
        let mut u1 = uv1.x;
        let mut v1 = uv1.y;
        let mut u2 = uv2.x;
        let mut v2 = uv2.y;
        let mut p1 = self.surface1.evaluate(u1, v1)?;
        let mut p2 = self.surface2.evaluate(u2, v2)?;
        let mut gap = (p1 - p2).norm();

        for _ in 0..NEWTON_MAX {
            let off_plane =
                ((p1 - origin).dot(normal)).abs().max(((p2 - origin).dot(normal)).abs());
            if gap < TOLERANCE && off_plane < 1e-8 {
                break;
            }
            let su1 = self.surface1.u_tangent(u1, v1)?;
            let sv1 = self.surface1.v_tangent(u1, v1)?;
            let su2 = self.surface2.u_tangent(u2, v2)?;
            let sv2 = self.surface2.v_tangent(u2, v2)?;

            let mut m = Matrix6::zeros();
            let mut rhs = Vector6::zeros();
            let r1 = origin - p1;
            let r2 = origin - p2;
            for k in 0..3 {
                m[(k, 0)] = su1[k];
                m[(k, 1)] = sv1[k];
                m[(k, 4)] = -e1[k];
                m[(k, 5)] = -e2[k];
                rhs[k] = r1[k];

                m[(k + 3, 2)] = su2[k];
                m[(k + 3, 3)] = sv2[k];
                m[(k + 3, 4)] = -e1[k];
                m[(k + 3, 5)] = -e2[k];
                rhs[k + 3] = r2[k];
            }
            let Some(step) = solve_6x6(&m, &rhs) else {
                return Ok(None);
            };

            let mut accepted = false;
            let mut factor = 1.0;
            for _ in 0..=DAMPING_RETRIES {
                let nu1 = u1 + step[0] * factor;
                let nv1 = v1 + step[1] * factor;
                let nu2 = u2 + step[2] * factor;
                let nv2 = v2 + step[3] * factor;
                let np1 = self.surface1.evaluate(nu1, nv1)?;
                let np2 = self.surface2.evaluate(nu2, nv2)?;
                let ngap = (np1 - np2).norm();
                let n_off =
                    ((np1 - origin).dot(normal)).abs().max(((np2 - origin).dot(normal)).abs());
                if ngap < gap || (gap < TOLERANCE && n_off < off_plane) {
                    u1 = nu1;
                    v1 = nv1;
                    u2 = nu2;
                    v2 = nv2;
                    p1 = np1;
                    p2 = np2;
                    gap = ngap;
                    accepted = true;
                    break;
                }
                factor /= 2.0;
            }
            if !accepted {
                return Ok(None);
            }
        }

        if gap > 1e-8 {
            return Ok(None);
        }
        Ok(Some(SurfacePoint {
            point: Point3::from((p1.coords + p2.coords) / 2.0),
            uv1: Point2::new(u1, v1),
            uv2: Point2::new(u2, v2),
        }))
    }

    /// Point-to-uv round-trip fixed-point iteration, the slower fallback
    /// when Newton fails to contract.
    fn fixed_point_solve(
        &self,
        origin: &Point3,
        normal: &Vector3,
        uv1_hint: Point2,
        uv2_hint: Point2,
    ) -> Result<Option<SurfacePoint>> {
        let mut x = *origin;
        let mut prev_gap = f64::INFINITY;
        let mut best: Option<(f64, SurfacePoint)> = None;

        for _ in 0..FIXED_POINT_MAX {
            let (u1, v1) = self.surface1.uv_of(&x);
            let u1 = wrap_near(u1, uv1_hint.x, self.surface1.u_period());
            let v1 = wrap_near(v1, uv1_hint.y, self.surface1.v_period());
            let p1 = self.surface1.evaluate(u1, v1)?;

            let (u2, v2) = self.surface2.uv_of(&p1);
            let u2 = wrap_near(u2, uv2_hint.x, self.surface2.u_period());
            let v2 = wrap_near(v2, uv2_hint.y, self.surface2.v_period());
            let p2 = self.surface2.evaluate(u2, v2)?;

            let gap = (p1 - p2).norm();
            let sp = SurfacePoint {
                point: Point3::from((p1.coords + p2.coords) / 2.0),
                uv1: Point2::new(u1, v1),
                uv2: Point2::new(u2, v2),
            };
            if best.as_ref().is_none_or(|(g, _)| gap < *g) {
                best = Some((gap, sp));
            }
            if gap < TOLERANCE {
                return Ok(Some(sp));
            }
            if gap >= prev_gap * 0.999 {
                break;
            }
            prev_gap = gap;

            // Re-anchor on the midpoint, constrained back onto the plane.
            let mid = Point3::from((p1.coords + p2.coords) / 2.0);
            x = mid - normal * (mid - origin).dot(normal);
        }

        Ok(best.and_then(|(g, sp)| (g < 1e-7).then_some(sp)))
    }

    fn normalized(&self, mut sp: SurfacePoint, anchor: &SurfacePoint) -> SurfacePoint {
        sp.uv1.x = wrap_near(sp.uv1.x, anchor.uv1.x, self.surface1.u_period());
        sp.uv1.y = wrap_near(sp.uv1.y, anchor.uv1.y, self.surface1.v_period());
        sp.uv2.x = wrap_near(sp.uv2.x, anchor.uv2.x, self.surface2.u_period());
        sp.uv2.y = wrap_near(sp.uv2.y, anchor.uv2.y, self.surface2.v_period());
        sp
    }

    // --- fitted approximating curve ---

    /// Catmull-Rom style tangent estimate at base point `i`.
    fn tangent_estimate(&self, i: usize) -> Vector3 {
        let n = self.points.len();
        if i == 0 {
            self.points[1].point - self.points[0].point
        } else if i == n - 1 {
            self.points[n - 1].point - self.points[n - 2].point
        } else {
            (self.points[i + 1].point - self.points[i - 1].point) / 2.0
        }
    }

    /// Cubic Hermite fit over segment `i` at local parameter `s`,
    /// returning the point and the local derivative `dP/ds`.
    fn hermite(&self, i: usize, s: f64) -> (Point3, Vector3) {
        let p0 = self.points[i].point;
        let p1 = self.points[i + 1].point;
        let m0 = self.tangent_estimate(i);
        let m1 = self.tangent_estimate(i + 1);

        let s2 = s * s;
        let s3 = s2 * s;
        let h00 = 2.0 * s3 - 3.0 * s2 + 1.0;
        let h10 = s3 - 2.0 * s2 + s;
        let h01 = -2.0 * s3 + 3.0 * s2;
        let h11 = s3 - s2;
        let point =
            Point3::from(p0.coords * h00 + m0 * h10 + p1.coords * h01 + m1 * h11);

        let d00 = 6.0 * s2 - 6.0 * s;
        let d10 = 3.0 * s2 - 4.0 * s + 1.0;
        let d01 = -6.0 * s2 + 6.0 * s;
        let d11 = 3.0 * s2 - 2.0 * s;
        let deriv = p0.coords * d00 + m0 * d10 + p1.coords * d01 + m1 * d11;
        (point, deriv)
    }

    fn hermite_derivative(&self, t: f64) -> Vector3 {
        let (i, s) = self.segment_of(t);
        let (_, d) = self.hermite(i, s);
        d * (self.points.len() - 1) as f64
    }

    // --- structural operations ---

    /// Returns the sub-curve over `[t0, t1]`.
    ///
    /// Base points are deep-copied; the surfaces stay shared.
    ///
    /// # Errors
    ///
    /// Returns an error if `t0 >= t1` or position solving fails.
    pub fn trimmed(&self, t0: f64, t1: f64) -> Result<Self> {
        if t0 >= t1 {
            return Err(OperationError::InvalidInput(
                "trim parameters must be increasing".into(),
            )
            .into());
        }
        let sp0 = self.point_at(t0)?;
        let sp1 = self.point_at(t1)?;
        let n = self.points.len();
        let mut base = vec![sp0];
        for (i, sp) in self.points.iter().enumerate() {
            let ti = i as f64 / (n - 1) as f64;
            if ti > t0 + 1e-9 && ti < t1 - 1e-9 {
                base.push(*sp);
            }
        }
        base.push(sp1);
        let mut trimmed = Self::new(self.surface1.clone(), self.surface2.clone(), base)?;
        // A trim preserves the parent's traversal direction regardless of
        // what the mid-point normals suggest locally.
        trimmed.forward = self.forward;
        Ok(trimmed)
    }

    /// Splits the curve at the given sorted interior parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameters are not strictly increasing
    /// interior values.
    pub fn split_at(&self, params: &[f64]) -> Result<Vec<Self>> {
        let mut cuts = vec![0.0];
        cuts.extend_from_slice(params);
        cuts.push(1.0);
        let mut parts = Vec::with_capacity(cuts.len() - 1);
        for w in cuts.windows(2) {
            parts.push(self.trimmed(w[0], w[1])?);
        }
        Ok(parts)
    }

    /// Returns the curve traversed in the opposite direction.
    #[must_use]
    pub fn reversed(&self) -> Self {
        let mut points = self.points.clone();
        points.reverse();
        Self {
            surface1: self.surface1.clone(),
            surface2: self.surface2.clone(),
            points,
            forward: !self.forward,
            positions: RefCell::new(HashMap::new()),
        }
    }

    /// Clones the curve onto explicitly provided surfaces.
    ///
    /// The deep-copied base points are kept; callers that need independent
    /// surface instances (rather than the shared ones a plain clone keeps)
    /// state that here. The memo is dropped since it may encode the old
    /// surface identities.
    #[must_use]
    pub fn clone_with_surfaces(
        &self,
        surface1: Arc<dyn Surface>,
        surface2: Arc<dyn Surface>,
    ) -> Self {
        Self {
            surface1,
            surface2,
            points: self.points.clone(),
            forward: self.forward,
            positions: RefCell::new(HashMap::new()),
        }
    }

    /// Axis-aligned bounds of the curve, from solved samples.
    ///
    /// # Errors
    ///
    /// Returns an error if position solving fails.
    pub fn bounding_cube(&self) -> Result<Aabb3> {
        let mut aabb = Aabb3::empty();
        for sp in &self.points {
            aabb.expand(&sp.point);
        }
        for k in 0..=32 {
            let sp = self.point_at(f64::from(k) / 32.0)?;
            aabb.expand(&sp.point);
        }
        Ok(aabb)
    }
}

impl Curve3 for DualSurfaceCurve {
    fn evaluate(&self, t: f64) -> Result<Point3> {
        Ok(self.point_at(t)?.point)
    }

    fn derivative(&self, t: f64) -> Result<Vector3> {
        Ok(self.hermite_derivative(t))
    }

    fn tangent(&self, t: f64) -> Result<Vector3> {
        self.tangent_at(t)
    }

    fn is_closed(&self) -> bool {
        let first = self.points[0].point;
        let last = self.points[self.points.len() - 1].point;
        (last - first).norm() < 1e-9
    }
}

fn lerp_uv(a: Point2, b: Point2, s: f64, surface: &dyn Surface) -> Point2 {
    let bx = wrap_near(b.x, a.x, surface.u_period());
    let by = wrap_near(b.y, a.y, surface.v_period());
    Point2::new(a.x + (bx - a.x) * s, a.y + (by - a.y) * s)
}

fn within_bound(sp: &SurfacePoint, a: &SurfacePoint, b: &SurfacePoint, bound: f64) -> bool {
    let limit = bound + TOLERANCE;
    (sp.point - a.point).norm() <= limit && (sp.point - b.point).norm() <= limit
}

/// An orthonormal basis of the plane perpendicular to `normal`.
fn plane_basis(normal: &Vector3) -> (Vector3, Vector3) {
    let reference = if normal.x.abs() < 0.9 {
        Vector3::x()
    } else {
        Vector3::y()
    };
    let e1 = normal.cross(&reference).normalize();
    let e2 = normal.cross(&e1);
    (e1, e2)
}
