use crate::error::{OperationError, Result};
use crate::math::Point3;
use crate::topology::{EdgeId, TopologyStore, VertexId};

/// Re-binds an edge's endpoints to vertices from a candidate pool.
///
/// Used during topology repair after import, when edges arrive with
/// duplicated or missing corner vertices. The plain form re-binds only when
/// a candidate lies within the tolerance; the forced form always takes the
/// nearest candidate. Vertex-edge back-references are updated on both
/// sides.
pub struct UseVertices {
    edge: EdgeId,
    candidates: Vec<VertexId>,
    tolerance: f64,
    force: bool,
}

impl UseVertices {
    /// Creates the tolerance-gated operation.
    #[must_use]
    pub fn new(edge: EdgeId, candidates: Vec<VertexId>, tolerance: f64) -> Self {
        Self {
            edge,
            candidates,
            tolerance,
            force: false,
        }
    }

    /// Creates the unconditional variant: each endpoint takes the nearest
    /// candidate regardless of distance.
    #[must_use]
    pub fn force(edge: EdgeId, candidates: Vec<VertexId>) -> Self {
        Self {
            edge,
            candidates,
            tolerance: f64::INFINITY,
            force: true,
        }
    }

    /// Executes the re-binding, returning the final endpoint vertices.
    ///
    /// # Errors
    ///
    /// Returns an error if the candidate pool is empty in forced mode, or
    /// an endpoint has neither a current vertex nor a candidate within the
    /// tolerance.
    pub fn execute(&self, store: &mut TopologyStore) -> Result<(VertexId, VertexId)> {
        if self.force && self.candidates.is_empty() {
            return Err(
                OperationError::InvalidInput("forced re-bind needs candidates".into()).into(),
            );
        }
        let edge = store.edge(self.edge)?.clone();
        let start = self.endpoint_position(store, edge.v1, 0.0)?;
        let end = self.endpoint_position(store, edge.v2, 1.0)?;

        let v1 = self.rebind(store, edge.v1, &start)?;
        let v2 = self.rebind(store, edge.v2, &end)?;

        let target = store.edge_mut(self.edge)?;
        target.v1 = Some(v1);
        target.v2 = Some(v2);
        store.vertex_mut(v1)?.add_edge(self.edge);
        store.vertex_mut(v2)?.add_edge(self.edge);
        Ok((v1, v2))
    }

    fn endpoint_position(
        &self,
        store: &TopologyStore,
        current: Option<VertexId>,
        t: f64,
    ) -> Result<Point3> {
        if let Some(v) = current {
            return Ok(store.vertex(v)?.point);
        }
        store.edge(self.edge)?.curve.evaluate(t)
    }

    fn rebind(
        &self,
        store: &mut TopologyStore,
        current: Option<VertexId>,
        position: &Point3,
    ) -> Result<VertexId> {
        let mut nearest: Option<(VertexId, f64)> = None;
        for &cand in &self.candidates {
            let d = (store.vertex(cand)?.point - position).norm();
            if nearest.is_none_or(|(_, nd)| d < nd) {
                nearest = Some((cand, d));
            }
        }
        let chosen = match nearest {
            Some((cand, d)) if self.force || d <= self.tolerance => Some(cand),
            _ => None,
        };
        match (chosen, current) {
            (Some(new), old) => {
                if let Some(old) = old {
                    if old != new {
                        store.vertex_mut(old)?.remove_edge(self.edge);
                    }
                }
                Ok(new)
            }
            (None, Some(old)) => Ok(old),
            (None, None) => Err(OperationError::InvalidInput(
                "no candidate vertex within tolerance for an unbound endpoint".into(),
            )
            .into()),
        }
    }
}
