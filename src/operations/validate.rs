use crate::error::{Result, TopologyError};
use crate::geometry::surface::Surface;
use crate::topology::{EdgeCurve, TopologyStore};

/// One consistency pass over a whole topology store.
///
/// Collects the invariant checks that would otherwise be scattered through
/// the mutating operations: face-slot orientation duality, singular-edge
/// vertex identity, vertex-edge back-reference symmetry, and base-point
/// fidelity of intersection curves. Intended to be called from tests and
/// after repair passes.
pub struct Validate {
    tolerance: f64,
}

impl Validate {
    /// Creates the check with the default fidelity tolerance.
    #[must_use]
    pub fn new() -> Self {
        Self { tolerance: 1e-6 }
    }

    /// Executes all checks, failing on the first violation.
    ///
    /// # Errors
    ///
    /// Returns a [`TopologyError`] describing the first violated invariant.
    pub fn execute(&self, store: &TopologyStore) -> Result<()> {
        for (id, edge) in store.edges() {
            if let (Some(p), Some(s)) = (&edge.primary, &edge.secondary) {
                if edge.oriented && p.forward == s.forward {
                    return Err(TopologyError::InconsistentOrientation.into());
                }
                if p.face == s.face {
                    return Err(TopologyError::InvalidTopology(
                        "edge lists the same face twice".into(),
                    )
                    .into());
                }
            }

            if edge.curve.is_singular() {
                if let (Some(a), Some(b)) = (edge.v1, edge.v2) {
                    if a != b {
                        return Err(TopologyError::InvalidTopology(
                            "singular edge with two distinct vertices".into(),
                        )
                        .into());
                    }
                }
            }

            for v in [edge.v1, edge.v2].into_iter().flatten() {
                let vertex = store.vertex(v)?;
                if !vertex.edges.contains(&id) {
                    return Err(TopologyError::InvalidTopology(
                        "vertex misses an edge back-reference".into(),
                    )
                    .into());
                }
            }

            for att in [edge.primary.as_ref(), edge.secondary.as_ref()]
                .into_iter()
                .flatten()
            {
                store.face(att.face)?;
            }

            if let EdgeCurve::Intersection(dual) = &edge.curve {
                for sp in dual.base_points() {
                    let p1 = dual.surface1().evaluate(sp.uv1.x, sp.uv1.y)?;
                    let p2 = dual.surface2().evaluate(sp.uv2.x, sp.uv2.y)?;
                    if (p1 - sp.point).norm() > self.tolerance
                        || (p2 - sp.point).norm() > self.tolerance
                    {
                        return Err(TopologyError::InvalidTopology(
                            "intersection base point off its surfaces".into(),
                        )
                        .into());
                    }
                }
            }
        }

        for (vid, vertex) in store.vertices() {
            for &e in &vertex.edges {
                let edge = store.edge(e)?;
                if edge.v1 != Some(vid) && edge.v2 != Some(vid) {
                    return Err(TopologyError::InvalidTopology(
                        "edge misses a vertex back-reference".into(),
                    )
                    .into());
                }
            }
        }
        Ok(())
    }
}

impl Default for Validate {
    fn default() -> Self {
        Self::new()
    }
}
