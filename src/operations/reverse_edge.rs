use std::sync::Arc;

use crate::error::Result;
use crate::geometry::curve2::ProjectedCurve2;
use crate::geometry::curve3::ReversedCurve3;
use crate::geometry::dual::DualProjection;
use crate::topology::{EdgeCurve, EdgeId, FaceAttachment, FaceCurve, TopologyStore};

/// Reverses an edge's 3D curve direction.
///
/// The per-face 2D curves are reversed in step (they stay parameterized
/// with the 3D curve), both `forward` flags flip, the endpoint vertices
/// swap, and both adjacent faces' cached areas are invalidated.
pub struct ReverseEdge {
    edge: EdgeId,
}

impl ReverseEdge {
    /// Creates the operation.
    #[must_use]
    pub fn new(edge: EdgeId) -> Self {
        Self { edge }
    }

    /// Executes the reversal.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge is missing or a derived 2D curve
    /// cannot be rebuilt.
    pub fn execute(&self, store: &mut TopologyStore) -> Result<()> {
        let edge = store.edge(self.edge)?.clone();
        let curve = edge.curve.reversed();

        let rebuild = |att: Option<FaceAttachment>| -> Result<Option<FaceAttachment>> {
            let Some(att) = att else {
                return Ok(None);
            };
            let reversed = match att.curve {
                FaceCurve::Line(c) => FaceCurve::Line(c.reversed()),
                FaceCurve::Arc(c) => FaceCurve::Arc(c.reversed()),
                FaceCurve::Bezier(c) => FaceCurve::Bezier(c.reversed()),
                FaceCurve::Projected(p) => {
                    let inner = Arc::new(ReversedCurve3::new(p.curve3().clone()));
                    FaceCurve::Projected(ProjectedCurve2::new(inner, p.surface().clone())?)
                }
                FaceCurve::Intersection(p) => {
                    let EdgeCurve::Intersection(rev) = &curve else {
                        unreachable!("intersection projection on a non-intersection edge")
                    };
                    FaceCurve::Intersection(DualProjection::new(rev.clone(), p.side()))
                }
            };
            Ok(Some(FaceAttachment {
                face: att.face,
                curve: reversed,
                forward: !att.forward,
            }))
        };

        let primary = rebuild(edge.primary.clone())?;
        let secondary = rebuild(edge.secondary.clone())?;

        for att in [&primary, &secondary].into_iter().flatten() {
            store.face_mut(att.face)?.area = None;
        }

        let target = store.edge_mut(self.edge)?;
        target.curve = curve;
        target.primary = primary;
        target.secondary = secondary;
        std::mem::swap(&mut target.v1, &mut target.v2);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::curve2::{Curve2, Line2};
    use crate::geometry::curve3::Line3;
    use crate::geometry::surface::{Plane, Surface};
    use crate::math::{Point2, Point3, Vector3};
    use crate::operations::MakeVertices;
    use crate::topology::{EdgeData, FaceData};

    #[test]
    fn reversal_flips_everything() {
        let mut store = TopologyStore::new();
        let plane: Arc<dyn Surface> =
            Arc::new(Plane::new(Point3::origin(), Vector3::x(), Vector3::y()).unwrap());
        let face = store.add_face(FaceData::new(plane));
        store.face_mut(face).unwrap().area = Some(1.0);

        let mut edge = EdgeData::new(EdgeCurve::Line(
            Line3::new(Point3::origin(), Point3::new(1.0, 0.0, 0.0)).unwrap(),
        ));
        edge.attach(FaceAttachment {
            face,
            curve: FaceCurve::Line(
                Line2::new(Point2::new(0.0, 0.0), Point2::new(1.0, 0.0)).unwrap(),
            ),
            forward: true,
        })
        .unwrap();
        let e = store.add_edge(edge);
        let (v1, v2) = MakeVertices::new(e).execute(&mut store).unwrap();

        ReverseEdge::new(e).execute(&mut store).unwrap();

        let edge = store.edge(e).unwrap();
        assert_eq!(edge.v1, Some(v2));
        assert_eq!(edge.v2, Some(v1));
        let att = edge.attachment(face).unwrap();
        assert!(!att.forward);
        // The 2D curve now starts where it used to end.
        let uv0 = att.curve.as_curve2().evaluate(0.0).unwrap();
        assert!((uv0 - Point2::new(1.0, 0.0)).norm() < 1e-9);
        // The 3D and 2D representations stay parameter-aligned.
        let p0 = edge.curve.evaluate(0.0).unwrap();
        assert!((p0 - Point3::new(1.0, 0.0, 0.0)).norm() < 1e-9);
        // Cached area dropped.
        assert!(store.face(face).unwrap().area.is_none());
    }

    #[test]
    fn double_reversal_roundtrips() {
        let mut store = TopologyStore::new();
        let mut edge = EdgeData::new(EdgeCurve::Line(
            Line3::new(Point3::origin(), Point3::new(1.0, 2.0, 3.0)).unwrap(),
        ));
        edge.v1 = None;
        edge.v2 = None;
        let e = store.add_edge(edge);
        MakeVertices::new(e).execute(&mut store).unwrap();
        let before = store.edge(e).unwrap().curve.evaluate(0.25).unwrap();
        ReverseEdge::new(e).execute(&mut store).unwrap();
        ReverseEdge::new(e).execute(&mut store).unwrap();
        let after = store.edge(e).unwrap().curve.evaluate(0.25).unwrap();
        assert!((before - after).norm() < 1e-12);
    }
}
