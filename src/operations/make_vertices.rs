use crate::error::{Result, TopologyError};
use crate::geometry::curve2::Curve2;
use crate::geometry::surface::Surface;
use crate::math::Point3;
use crate::topology::{EdgeCurve, EdgeId, TopologyStore, VertexData, VertexId};

use super::merge_vertices::MergeVertices;

/// Default distance under which endpoint positions share a vertex.
///
/// Tuned for model-scale coordinates; callers working at other scales pass
/// their own tolerance.
pub(crate) const VERTEX_TOLERANCE: f64 = 1e-8;

/// Lazily materializes an edge's endpoint vertices.
///
/// Endpoints are taken from the 3D curve (or, for a singular edge, from its
/// 2D curve's start mapped through the face surface), matched against
/// existing vertices within the tolerance before a new one is created, and
/// then spread: any other materialized endpoint coinciding with a fresh
/// vertex is merged into it, to a fixed point, so vertex identity stays
/// unique across the graph.
pub struct MakeVertices {
    edge: EdgeId,
    tolerance: f64,
}

impl MakeVertices {
    /// Creates the operation with the default tolerance.
    #[must_use]
    pub fn new(edge: EdgeId) -> Self {
        Self {
            edge,
            tolerance: VERTEX_TOLERANCE,
        }
    }

    /// Overrides the vertex-matching tolerance.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Executes the operation, returning the (possibly pre-existing)
    /// endpoint vertices.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge is missing, or a singular edge has no
    /// face to take its position from.
    pub fn execute(&self, store: &mut TopologyStore) -> Result<(VertexId, VertexId)> {
        let edge = store.edge(self.edge)?;
        if let (Some(a), Some(b)) = (edge.v1, edge.v2) {
            return Ok((a, b));
        }

        let (start, end) = self.endpoints(store)?;
        let v1 = self.bind(store, &start);
        let v2 = self.bind(store, &end);

        let edge = store.edge_mut(self.edge)?;
        edge.v1 = Some(v1);
        edge.v2 = Some(v2);
        store.vertex_mut(v1)?.add_edge(self.edge);
        store.vertex_mut(v2)?.add_edge(self.edge);

        self.spread(store, v1)?;
        self.spread(store, v2)?;
        Ok(store.edge(self.edge)?.vertices()?)
    }

    fn endpoints(&self, store: &TopologyStore) -> Result<(Point3, Point3)> {
        let edge = store.edge(self.edge)?;
        if let EdgeCurve::Singular = edge.curve {
            let att = edge
                .primary
                .as_ref()
                .or(edge.secondary.as_ref())
                .ok_or_else(|| {
                    TopologyError::InvalidTopology(
                        "singular edge needs a face to locate its vertex".into(),
                    )
                })?;
            let uv = att.curve.as_curve2().evaluate(0.0)?;
            let surface = store.face(att.face)?.surface.clone();
            let p = surface.evaluate(uv.x, uv.y)?;
            return Ok((p, p));
        }
        Ok((edge.curve.evaluate(0.0)?, edge.curve.evaluate(1.0)?))
    }

    fn bind(&self, store: &mut TopologyStore, point: &Point3) -> VertexId {
        match store.vertex_near(point, self.tolerance) {
            Some(v) => v,
            None => store.add_vertex(VertexData::new(*point)),
        }
    }

    /// Merges every other materialized endpoint coinciding with `keep`.
    fn spread(&self, store: &mut TopologyStore, keep: VertexId) -> Result<()> {
        loop {
            let anchor = store.vertex(keep)?.point;
            let mut coincident: Option<VertexId> = None;
            for (vid, v) in store.vertices() {
                if vid != keep && (v.point - anchor).norm() <= self.tolerance {
                    coincident = Some(vid);
                    break;
                }
            }
            let Some(drop) = coincident else {
                return Ok(());
            };
            MergeVertices::new(keep, drop).execute(store)?;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::curve3::Line3;
    use crate::topology::EdgeData;

    fn line_edge(store: &mut TopologyStore, a: Point3, b: Point3) -> EdgeId {
        store.add_edge(EdgeData::new(EdgeCurve::Line(Line3::new(a, b).unwrap())))
    }

    #[test]
    fn creates_two_vertices() {
        let mut store = TopologyStore::new();
        let e = line_edge(
            &mut store,
            Point3::origin(),
            Point3::new(1.0, 0.0, 0.0),
        );
        let (v1, v2) = MakeVertices::new(e).execute(&mut store).unwrap();
        assert_ne!(v1, v2);
        assert!(store.vertex(v1).unwrap().edges.contains(&e));
        assert!(store.vertex(v2).unwrap().edges.contains(&e));
    }

    #[test]
    fn is_lazy_and_idempotent() {
        let mut store = TopologyStore::new();
        let e = line_edge(
            &mut store,
            Point3::origin(),
            Point3::new(1.0, 0.0, 0.0),
        );
        let first = MakeVertices::new(e).execute(&mut store).unwrap();
        let second = MakeVertices::new(e).execute(&mut store).unwrap();
        assert_eq!(first, second);
        assert_eq!(store.vertices().count(), 2);
    }

    #[test]
    fn triangle_shares_corners() {
        let mut store = TopologyStore::new();
        let a = Point3::origin();
        let b = Point3::new(1.0, 0.0, 0.0);
        let c = Point3::new(0.0, 1.0, 0.0);
        let e1 = line_edge(&mut store, a, b);
        let e2 = line_edge(&mut store, b, c);
        let e3 = line_edge(&mut store, c, a);
        for e in [e1, e2, e3] {
            MakeVertices::new(e).execute(&mut store).unwrap();
        }
        // Three corners, each shared by two edges.
        assert_eq!(store.vertices().count(), 3);
        for (_, v) in store.vertices() {
            assert_eq!(v.edges.len(), 2);
        }
    }

    #[test]
    fn nearby_endpoints_merge() {
        let mut store = TopologyStore::new();
        let e1 = line_edge(
            &mut store,
            Point3::origin(),
            Point3::new(1.0, 0.0, 0.0),
        );
        // Slightly perturbed shared corner, inside the tolerance.
        let e2 = line_edge(
            &mut store,
            Point3::new(1.0 + 1e-10, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        );
        MakeVertices::new(e1).execute(&mut store).unwrap();
        let (v1, _) = MakeVertices::new(e2).execute(&mut store).unwrap();
        assert_eq!(store.vertices().count(), 3);
        assert_eq!(store.edge(e1).unwrap().v2, Some(v1));
    }

    #[test]
    fn closed_curve_shares_single_vertex() {
        use crate::geometry::curve3::Arc3;
        use crate::math::Vector3;
        let mut store = TopologyStore::new();
        let circle = Arc3::new(
            Point3::origin(),
            1.0,
            Vector3::z(),
            Vector3::x(),
            0.0,
            std::f64::consts::TAU,
        )
        .unwrap();
        let e = store.add_edge(EdgeData::new(EdgeCurve::Arc(circle)));
        let (v1, v2) = MakeVertices::new(e).execute(&mut store).unwrap();
        assert_eq!(v1, v2);
        assert_eq!(store.vertices().count(), 1);
    }

    #[test]
    fn singular_edge_without_face_fails() {
        let mut store = TopologyStore::new();
        let e = store.add_edge(EdgeData::new(EdgeCurve::Singular));
        assert!(MakeVertices::new(e).execute(&mut store).is_err());
    }
}
