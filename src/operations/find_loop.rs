use crate::error::{Result, TopologyError};
use crate::topology::{EdgeId, FaceId, TopologyStore};

/// Traces a closed boundary loop on a face, starting from one edge.
///
/// From the start edge's end vertex (in the face's traversal direction),
/// the tracer repeatedly picks an unused available edge whose start vertex
/// continues the chain, until it returns to the loop's origin. No
/// continuation means the boundary is open; visiting more edges than are
/// available means the candidate set is defective.
pub struct FindLoop {
    start: EdgeId,
    face: FaceId,
    available: Vec<EdgeId>,
}

impl FindLoop {
    /// Creates the operation.
    #[must_use]
    pub fn new(start: EdgeId, face: FaceId, available: Vec<EdgeId>) -> Self {
        Self {
            start,
            face,
            available,
        }
    }

    /// Executes the trace, returning the loop's edges in traversal order
    /// (starting with the start edge).
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::OpenLoop`] when the chain cannot be
    /// continued and [`TopologyError::LoopBoundExceeded`] when the trace
    /// outruns the candidate set. Edges must be oriented and have
    /// materialized vertices.
    pub fn execute(&self, store: &TopologyStore) -> Result<Vec<EdgeId>> {
        let start_edge = store.edge(self.start)?;
        let origin = start_edge.start_vertex(self.face)?;
        let mut current = start_edge.end_vertex(self.face)?;
        let mut loop_edges = vec![self.start];

        while current != origin {
            if loop_edges.len() > self.available.len() {
                return Err(TopologyError::LoopBoundExceeded.into());
            }
            let mut next = None;
            for &cand in &self.available {
                if cand == self.start || loop_edges.contains(&cand) {
                    continue;
                }
                if store.edge(cand)?.start_vertex(self.face)? == current {
                    next = Some(cand);
                    break;
                }
            }
            let Some(next) = next else {
                return Err(TopologyError::OpenLoop.into());
            };
            current = store.edge(next)?.end_vertex(self.face)?;
            loop_edges.push(next);
        }
        Ok(loop_edges)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::CurvisError;
    use crate::geometry::curve2::Line2;
    use crate::geometry::curve3::Line3;
    use crate::geometry::surface::{Plane, Surface};
    use crate::math::{Point2, Point3, Vector3};
    use crate::operations::MakeVertices;
    use crate::topology::{EdgeCurve, EdgeData, FaceAttachment, FaceCurve, FaceData};
    use std::sync::Arc;

    /// Builds a unit-square boundary on a plane face. Edges 0 and 2 run
    /// forward along the counterclockwise boundary; edges 1 and 3 are
    /// stored reversed so their flags exercise the orientation handling.
    fn square(store: &mut TopologyStore) -> (FaceId, Vec<EdgeId>) {
        let plane: Arc<dyn Surface> =
            Arc::new(Plane::new(Point3::origin(), Vector3::x(), Vector3::y()).unwrap());
        let face = store.add_face(FaceData::new(plane));

        let corners = [
            Point3::origin(),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let mut edges = Vec::new();
        for k in 0..4 {
            let a = corners[k];
            let b = corners[(k + 1) % 4];
            // Odd edges are stored running backwards.
            let (from, to, forward) = if k % 2 == 0 { (a, b, true) } else { (b, a, false) };
            let mut edge = EdgeData::new(EdgeCurve::Line(Line3::new(from, to).unwrap()));
            edge.attach(FaceAttachment {
                face,
                curve: FaceCurve::Line(
                    Line2::new(
                        Point2::new(from.x, from.y),
                        Point2::new(to.x, to.y),
                    )
                    .unwrap(),
                ),
                forward,
            })
            .unwrap();
            let id = store.add_edge(edge);
            MakeVertices::new(id).execute(store).unwrap();
            edges.push(id);
        }
        (face, edges)
    }

    #[test]
    fn traces_full_square() {
        let mut store = TopologyStore::new();
        let (face, edges) = square(&mut store);
        let found = FindLoop::new(edges[0], face, edges.clone())
            .execute(&store)
            .unwrap();
        assert_eq!(found, edges);
    }

    #[test]
    fn start_anywhere() {
        let mut store = TopologyStore::new();
        let (face, edges) = square(&mut store);
        let found = FindLoop::new(edges[2], face, edges.clone())
            .execute(&store)
            .unwrap();
        assert_eq!(found.len(), 4);
        assert_eq!(found[0], edges[2]);
    }

    #[test]
    fn missing_edge_means_open_loop() {
        let mut store = TopologyStore::new();
        let (face, edges) = square(&mut store);
        let partial = vec![edges[0], edges[1], edges[3]];
        let result = FindLoop::new(edges[0], face, partial).execute(&store);
        assert!(matches!(
            result,
            Err(CurvisError::Topology(TopologyError::OpenLoop))
        ));
    }

    #[test]
    fn extra_unrelated_edges_ignored() {
        let mut store = TopologyStore::new();
        let (face, edges) = square(&mut store);
        // A detached edge attached to the same face elsewhere.
        let mut stray = EdgeData::new(EdgeCurve::Line(
            Line3::new(Point3::new(5.0, 5.0, 0.0), Point3::new(6.0, 5.0, 0.0)).unwrap(),
        ));
        stray
            .attach(FaceAttachment {
                face,
                curve: FaceCurve::Line(
                    Line2::new(Point2::new(5.0, 5.0), Point2::new(6.0, 5.0)).unwrap(),
                ),
                forward: true,
            })
            .unwrap();
        let stray = store.add_edge(stray);
        MakeVertices::new(stray).execute(&mut store).unwrap();

        let mut available = edges.clone();
        available.push(stray);
        let found = FindLoop::new(edges[0], face, available).execute(&store).unwrap();
        assert_eq!(found, edges);
    }
}
