use std::sync::Arc;

use crate::error::{OperationError, Result};
use crate::geometry::curve2::ProjectedCurve2;
use crate::geometry::curve3::Curve3;
use crate::geometry::dual::DualProjection;
use crate::topology::{
    EdgeCurve, EdgeData, EdgeId, FaceAttachment, FaceCurve, TopologyStore, VertexData, VertexId,
};

use super::make_vertices::MakeVertices;

/// Partitions an edge into fragments at sorted interior parameters.
///
/// Each fragment gets its own trim of the 3D curve. Analytic 2D face
/// curves are trimmed over the same parameter span; re-projections are
/// recomputed from the fragment's 3D curve (trimming a projection directly
/// can misbehave at a periodic seam); and when the 3D curve is a
/// surface-surface intersection, the fragment's 3D curve and both 2D
/// traces are derived together from one trimmed intersection curve.
///
/// Both faces' boundary lists and all vertex back-references are rewired
/// to the fragments; the original edge is removed from the store.
pub struct SplitEdge {
    edge: EdgeId,
    params: Vec<f64>,
}

impl SplitEdge {
    /// Creates the operation. Parameters must be strictly increasing and
    /// strictly inside `(0, 1)`.
    #[must_use]
    pub fn new(edge: EdgeId, params: Vec<f64>) -> Self {
        Self { edge, params }
    }

    /// Executes the split, returning the fragments in parameter order.
    ///
    /// # Errors
    ///
    /// Returns an error for an empty or unsorted parameter list, an
    /// out-of-range parameter, or a singular edge (which has no 3D extent
    /// to split).
    pub fn execute(&self, store: &mut TopologyStore) -> Result<Vec<EdgeId>> {
        self.validate_params()?;
        if store.edge(self.edge)?.curve.is_singular() {
            return Err(
                OperationError::InvalidInput("cannot split a singular edge".into()).into(),
            );
        }
        let (v_start, v_end) = MakeVertices::new(self.edge).execute(store)?;
        let edge = store.edge(self.edge)?.clone();

        // Interior split vertices.
        let mut joints: Vec<VertexId> = Vec::with_capacity(self.params.len());
        for &p in &self.params {
            let point = edge.curve.evaluate(p)?;
            joints.push(store.add_vertex(VertexData::new(point)));
        }

        let mut cuts = vec![0.0];
        cuts.extend_from_slice(&self.params);
        cuts.push(1.0);

        let mut fragments: Vec<EdgeId> = Vec::with_capacity(cuts.len() - 1);
        for (k, w) in cuts.windows(2).enumerate() {
            let (a, b) = (w[0], w[1]);
            let (curve, curve3_handle) = trim_curve3(&edge.curve, a, b)?;

            let primary = trim_attachment(edge.primary.as_ref(), &curve, &curve3_handle, a, b)?;
            let secondary =
                trim_attachment(edge.secondary.as_ref(), &curve, &curve3_handle, a, b)?;

            let v1 = if k == 0 { v_start } else { joints[k - 1] };
            let v2 = if k == cuts.len() - 2 {
                v_end
            } else {
                joints[k]
            };

            let id = store.add_edge(EdgeData {
                curve,
                primary,
                secondary,
                v1: Some(v1),
                v2: Some(v2),
                oriented: edge.oriented,
            });
            store.vertex_mut(v1)?.add_edge(id);
            store.vertex_mut(v2)?.add_edge(id);
            fragments.push(id);
        }

        // Rewire face boundaries, respecting each face's traversal order.
        for att in [edge.primary.as_ref(), edge.secondary.as_ref()]
            .into_iter()
            .flatten()
        {
            let run: Vec<EdgeId> = if att.forward {
                fragments.clone()
            } else {
                fragments.iter().rev().copied().collect()
            };
            store
                .face_mut(att.face)?
                .replace_boundary_edge(self.edge, &run);
        }

        // Disconnect and drop the original edge.
        store.vertex_mut(v_start)?.remove_edge(self.edge);
        store.vertex_mut(v_end)?.remove_edge(self.edge);
        store.remove_edge(self.edge);

        Ok(fragments)
    }

    fn validate_params(&self) -> Result<()> {
        if self.params.is_empty() {
            return Err(
                OperationError::InvalidInput("split needs at least one parameter".into()).into(),
            );
        }
        for w in self.params.windows(2) {
            if w[0] >= w[1] {
                return Err(OperationError::InvalidInput(
                    "split parameters must be strictly increasing".into(),
                )
                .into());
            }
        }
        let first = self.params[0];
        let last = self.params[self.params.len() - 1];
        if first <= 0.0 || last >= 1.0 {
            return Err(OperationError::InvalidInput(
                "split parameters must be interior".into(),
            )
            .into());
        }
        Ok(())
    }
}

/// Trims the 3D curve and returns it together with a shareable handle for
/// rebuilding re-projections.
fn trim_curve3(curve: &EdgeCurve, a: f64, b: f64) -> Result<(EdgeCurve, Arc<dyn Curve3>)> {
    Ok(match curve {
        EdgeCurve::Line(c) => {
            let t = c.trimmed(a, b)?;
            (EdgeCurve::Line(t.clone()), Arc::new(t))
        }
        EdgeCurve::Arc(c) => {
            let t = c.trimmed(a, b)?;
            (EdgeCurve::Arc(t.clone()), Arc::new(t))
        }
        EdgeCurve::Intersection(c) => {
            let t = Arc::new(c.trimmed(a, b)?);
            (EdgeCurve::Intersection(t.clone()), t)
        }
        EdgeCurve::Singular => {
            return Err(
                OperationError::InvalidInput("cannot split a singular edge".into()).into(),
            )
        }
    })
}

fn trim_attachment(
    att: Option<&FaceAttachment>,
    fragment: &EdgeCurve,
    curve3_handle: &Arc<dyn Curve3>,
    a: f64,
    b: f64,
) -> Result<Option<FaceAttachment>> {
    let Some(att) = att else {
        return Ok(None);
    };
    let curve = match &att.curve {
        FaceCurve::Line(c) => FaceCurve::Line(c.trimmed(a, b)?),
        FaceCurve::Arc(c) => FaceCurve::Arc(c.trimmed(a, b)?),
        FaceCurve::Bezier(c) => FaceCurve::Bezier(c.trimmed(a, b)?),
        // Recomputed from the fragment's 3D curve rather than trimmed.
        FaceCurve::Projected(p) => FaceCurve::Projected(ProjectedCurve2::new(
            curve3_handle.clone(),
            p.surface().clone(),
        )?),
        FaceCurve::Intersection(p) => {
            let EdgeCurve::Intersection(dual) = fragment else {
                unreachable!("intersection projection on a non-intersection edge")
            };
            FaceCurve::Intersection(DualProjection::new(dual.clone(), p.side()))
        }
    };
    Ok(Some(FaceAttachment {
        face: att.face,
        curve,
        forward: att.forward,
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::curve2::{Curve2, Line2};
    use crate::geometry::curve3::Line3;
    use crate::geometry::dual::{DualSurfaceCurve, SurfaceSide};
    use crate::geometry::surface::{Cylinder, Plane, Surface};
    use crate::math::{Point2, Point3, Vector3};
    use crate::topology::FaceData;

    fn simple_edge(store: &mut TopologyStore) -> EdgeId {
        store.add_edge(EdgeData::new(EdgeCurve::Line(
            Line3::new(Point3::origin(), Point3::new(3.0, 0.0, 0.0)).unwrap(),
        )))
    }

    #[test]
    fn split_roundtrip_reproduces_cut_points() {
        let mut store = TopologyStore::new();
        let e = simple_edge(&mut store);
        let original: Vec<Point3> = [0.0, 1.0 / 3.0, 2.0 / 3.0, 1.0]
            .iter()
            .map(|&t| store.edge(e).unwrap().curve.evaluate(t).unwrap())
            .collect();

        let parts = SplitEdge::new(e, vec![1.0 / 3.0, 2.0 / 3.0])
            .execute(&mut store)
            .unwrap();
        assert_eq!(parts.len(), 3);

        // Re-concatenated fragment endpoints reproduce the cut points.
        for (k, &part) in parts.iter().enumerate() {
            let c = &store.edge(part).unwrap().curve;
            assert!((c.evaluate(0.0).unwrap() - original[k]).norm() < 1e-9);
            assert!((c.evaluate(1.0).unwrap() - original[k + 1]).norm() < 1e-9);
        }
        // The original edge is gone.
        assert!(store.edge(e).is_err());
    }

    #[test]
    fn fragments_share_joint_vertices() {
        let mut store = TopologyStore::new();
        let e = simple_edge(&mut store);
        let parts = SplitEdge::new(e, vec![0.5]).execute(&mut store).unwrap();
        let e1 = store.edge(parts[0]).unwrap();
        let e2 = store.edge(parts[1]).unwrap();
        assert_eq!(e1.v2, e2.v1);
        let joint = e1.v2.unwrap();
        let v = store.vertex(joint).unwrap();
        assert!(v.edges.contains(&parts[0]) && v.edges.contains(&parts[1]));
        assert!((v.point - Point3::new(1.5, 0.0, 0.0)).norm() < 1e-9);
    }

    #[test]
    fn face_boundary_respects_traversal_order() {
        let mut store = TopologyStore::new();
        let plane: Arc<dyn Surface> =
            Arc::new(Plane::new(Point3::origin(), Vector3::x(), Vector3::y()).unwrap());
        let fwd_face = store.add_face(FaceData::new(plane.clone()));
        let rev_face = store.add_face(FaceData::new(plane));

        let mut edge = EdgeData::new(EdgeCurve::Line(
            Line3::new(Point3::origin(), Point3::new(3.0, 0.0, 0.0)).unwrap(),
        ));
        edge.attach(FaceAttachment {
            face: fwd_face,
            curve: FaceCurve::Line(
                Line2::new(Point2::new(0.0, 0.0), Point2::new(3.0, 0.0)).unwrap(),
            ),
            forward: true,
        })
        .unwrap();
        edge.attach(FaceAttachment {
            face: rev_face,
            curve: FaceCurve::Line(
                Line2::new(Point2::new(0.0, 0.0), Point2::new(3.0, 0.0)).unwrap(),
            ),
            forward: false,
        })
        .unwrap();
        let e = store.add_edge(edge);
        store.face_mut(fwd_face).unwrap().boundary.push(e);
        store.face_mut(rev_face).unwrap().boundary.push(e);

        let parts = SplitEdge::new(e, vec![0.5]).execute(&mut store).unwrap();

        assert_eq!(store.face(fwd_face).unwrap().boundary, parts);
        let reversed: Vec<EdgeId> = parts.iter().rev().copied().collect();
        assert_eq!(store.face(rev_face).unwrap().boundary, reversed);
    }

    #[test]
    fn analytic_face_curves_trim_in_step() {
        let mut store = TopologyStore::new();
        let plane: Arc<dyn Surface> =
            Arc::new(Plane::new(Point3::origin(), Vector3::x(), Vector3::y()).unwrap());
        let face = store.add_face(FaceData::new(plane.clone()));
        let mut edge = EdgeData::new(EdgeCurve::Line(
            Line3::new(Point3::origin(), Point3::new(3.0, 0.0, 0.0)).unwrap(),
        ));
        edge.attach(FaceAttachment {
            face,
            curve: FaceCurve::Line(
                Line2::new(Point2::new(0.0, 0.0), Point2::new(3.0, 0.0)).unwrap(),
            ),
            forward: true,
        })
        .unwrap();
        let e = store.add_edge(edge);
        let parts = SplitEdge::new(e, vec![0.25, 0.75]).execute(&mut store).unwrap();

        for &part in &parts {
            let data = store.edge(part).unwrap();
            let att = data.attachment(face).unwrap();
            for &t in &[0.0, 0.5, 1.0] {
                let uv = att.curve.as_curve2().evaluate(t).unwrap();
                let mapped = plane.evaluate(uv.x, uv.y).unwrap();
                let p3 = data.curve.evaluate(t).unwrap();
                assert!((mapped - p3).norm() < 1e-9, "2D/3D drift at t={t}");
            }
        }
    }

    #[test]
    fn intersection_edge_rederives_everything_together() {
        let mut store = TopologyStore::new();
        let cyl1: Arc<dyn Surface> =
            Arc::new(Cylinder::new(Point3::origin(), 1.0, Vector3::z(), Vector3::x()).unwrap());
        let cyl2: Arc<dyn Surface> =
            Arc::new(Cylinder::new(Point3::origin(), 1.0, Vector3::x(), Vector3::y()).unwrap());
        let f1 = store.add_face(FaceData::new(cyl1.clone()));
        let f2 = store.add_face(FaceData::new(cyl2.clone()));

        let dual = Arc::new(
            DualSurfaceCurve::between_points(
                cyl1.clone(),
                cyl2.clone(),
                Point3::new(1.0, 0.0, 1.0),
                Point3::new(0.0, 1.0, 0.0),
            )
            .unwrap(),
        );
        let mut edge = EdgeData::new(EdgeCurve::Intersection(dual.clone()));
        edge.attach(FaceAttachment {
            face: f1,
            curve: FaceCurve::Intersection(DualProjection::new(dual.clone(), SurfaceSide::First)),
            forward: true,
        })
        .unwrap();
        edge.attach(FaceAttachment {
            face: f2,
            curve: FaceCurve::Intersection(DualProjection::new(dual, SurfaceSide::Second)),
            forward: false,
        })
        .unwrap();
        let e = store.add_edge(edge);
        store.face_mut(f1).unwrap().boundary.push(e);
        store.face_mut(f2).unwrap().boundary.push(e);

        let parts = SplitEdge::new(e, vec![0.5]).execute(&mut store).unwrap();
        assert_eq!(parts.len(), 2);

        for &part in &parts {
            let data = store.edge(part).unwrap();
            for &t in &[0.0, 0.25, 0.5, 0.75, 1.0] {
                let p3 = data.curve.evaluate(t).unwrap();
                // Both 2D traces must map back onto the fragment's 3D curve.
                let uv1 = data
                    .attachment(f1)
                    .unwrap()
                    .curve
                    .as_curve2()
                    .evaluate(t)
                    .unwrap();
                let uv2 = data
                    .attachment(f2)
                    .unwrap()
                    .curve
                    .as_curve2()
                    .evaluate(t)
                    .unwrap();
                assert!((cyl1.evaluate(uv1.x, uv1.y).unwrap() - p3).norm() < 1e-6);
                assert!((cyl2.evaluate(uv2.x, uv2.y).unwrap() - p3).norm() < 1e-6);
            }
        }
        // Fragments chain at the former midpoint.
        let end = store.edge(parts[0]).unwrap().curve.evaluate(1.0).unwrap();
        let start = store.edge(parts[1]).unwrap().curve.evaluate(0.0).unwrap();
        assert!((end - start).norm() < 1e-7);
    }

    #[test]
    fn invalid_params_rejected() {
        let mut store = TopologyStore::new();
        let e = simple_edge(&mut store);
        assert!(SplitEdge::new(e, vec![]).execute(&mut store).is_err());
        let e = simple_edge(&mut store);
        assert!(SplitEdge::new(e, vec![0.7, 0.3]).execute(&mut store).is_err());
        let e = simple_edge(&mut store);
        assert!(SplitEdge::new(e, vec![1.5]).execute(&mut store).is_err());
    }
}
