use crate::error::Result;
use crate::topology::{TopologyStore, VertexId};

/// Unifies two vertices into one.
///
/// Every edge referencing the dropped vertex is redirected to the kept one
/// and the back-reference sets are unioned. Callers are responsible for
/// checking that the two positions coincide within their tolerance; vertex
/// spreading does exactly that before delegating here.
pub struct MergeVertices {
    keep: VertexId,
    drop: VertexId,
}

impl MergeVertices {
    /// Creates a new merge of `drop` into `keep`.
    #[must_use]
    pub fn new(keep: VertexId, drop: VertexId) -> Self {
        Self { keep, drop }
    }

    /// Executes the merge.
    ///
    /// # Errors
    ///
    /// Returns an error if either vertex is not in the store.
    pub fn execute(&self, store: &mut TopologyStore) -> Result<()> {
        if self.keep == self.drop {
            return Ok(());
        }
        store.vertex(self.keep)?;
        let edges = store.vertex(self.drop)?.edges.clone();

        for edge_id in &edges {
            let edge = store.edge_mut(*edge_id)?;
            if edge.v1 == Some(self.drop) {
                edge.v1 = Some(self.keep);
            }
            if edge.v2 == Some(self.drop) {
                edge.v2 = Some(self.keep);
            }
        }
        let keep = store.vertex_mut(self.keep)?;
        for edge_id in edges {
            keep.add_edge(edge_id);
        }
        store.remove_vertex(self.drop);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Point3;
    use crate::topology::{EdgeCurve, EdgeData, VertexData};
    use crate::geometry::curve3::Line3;

    #[test]
    fn merge_redirects_edges() {
        let mut store = TopologyStore::new();
        let a = store.add_vertex(VertexData::new(Point3::origin()));
        let b = store.add_vertex(VertexData::new(Point3::new(1e-12, 0.0, 0.0)));
        let c = store.add_vertex(VertexData::new(Point3::new(1.0, 0.0, 0.0)));

        let mut edge = EdgeData::new(EdgeCurve::Line(
            Line3::new(Point3::origin(), Point3::new(1.0, 0.0, 0.0)).unwrap(),
        ));
        edge.v1 = Some(b);
        edge.v2 = Some(c);
        let e = store.add_edge(edge);
        store.vertex_mut(b).unwrap().add_edge(e);
        store.vertex_mut(c).unwrap().add_edge(e);

        MergeVertices::new(a, b).execute(&mut store).unwrap();

        assert_eq!(store.edge(e).unwrap().v1, Some(a));
        assert!(store.vertex(a).unwrap().edges.contains(&e));
        assert!(store.vertex(b).is_err());
    }

    #[test]
    fn merge_self_is_noop() {
        let mut store = TopologyStore::new();
        let a = store.add_vertex(VertexData::new(Point3::origin()));
        MergeVertices::new(a, a).execute(&mut store).unwrap();
        assert!(store.vertex(a).is_ok());
    }
}
