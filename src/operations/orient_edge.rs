use crate::error::{Result, TopologyError};
use crate::geometry::curve2::Curve2;
use crate::geometry::surface::Surface;
use crate::topology::{EdgeCurve, EdgeId, TopologyStore};

/// Computes an edge's `forward` flags: whether the 3D curve's direction
/// agrees with each adjacent face's boundary direction.
///
/// The decision compares curve samples mapped through the face surface
/// against the 3D curve. Open curves compare at the endpoints; closed
/// curves sample at 33% and 66% instead, because a closed curve's
/// endpoints coincide and tell nothing apart.
///
/// Postcondition for a properly stitched interior edge: the two flags
/// differ. A violation is reported as an error, never silently repaired.
pub struct OrientEdge {
    edge: EdgeId,
}

impl OrientEdge {
    /// Creates the operation.
    #[must_use]
    pub fn new(edge: EdgeId) -> Self {
        Self { edge }
    }

    /// Executes the orientation.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::InconsistentOrientation`] when both faces
    /// turn out to traverse the edge in the same direction (a stitching
    /// defect); the computed flags are still stored for inspection.
    pub fn execute(&self, store: &mut TopologyStore) -> Result<()> {
        let edge = store.edge(self.edge)?;
        if edge.oriented {
            return Ok(());
        }
        if edge.curve.is_singular() {
            store.edge_mut(self.edge)?.oriented = true;
            return Ok(());
        }

        let mut flags = [None, None];
        for (i, att) in [edge.primary.as_ref(), edge.secondary.as_ref()]
            .into_iter()
            .enumerate()
        {
            if let Some(att) = att {
                let surface = store.face(att.face)?.surface.clone();
                flags[i] = Some(forward_flag(
                    &edge.curve,
                    att.curve.as_curve2(),
                    surface.as_ref(),
                )?);
            }
        }

        let edge = store.edge_mut(self.edge)?;
        if let (Some(f), Some(att)) = (flags[0], edge.primary.as_mut()) {
            att.forward = f;
        }
        if let (Some(f), Some(att)) = (flags[1], edge.secondary.as_mut()) {
            att.forward = f;
        }
        edge.oriented = true;

        if let (Some(a), Some(b)) = (flags[0], flags[1]) {
            if a == b {
                log::warn!("edge traversed in the same direction by both faces");
                return Err(TopologyError::InconsistentOrientation.into());
            }
        }
        Ok(())
    }
}

fn forward_flag(
    curve3: &EdgeCurve,
    curve2: &dyn Curve2,
    surface: &dyn Surface,
) -> Result<bool> {
    if curve3.is_closed() {
        // Endpoints of a closed curve are degenerate; compare interior
        // samples at one and two thirds instead.
        let uv = curve2.evaluate(1.0 / 3.0)?;
        let q = surface.evaluate(uv.x, uv.y)?;
        let p_fwd = curve3.evaluate(1.0 / 3.0)?;
        let p_rev = curve3.evaluate(2.0 / 3.0)?;
        Ok((q - p_fwd).norm() < (q - p_rev).norm())
    } else {
        let uv = curve2.evaluate(0.0)?;
        let q = surface.evaluate(uv.x, uv.y)?;
        let p_start = curve3.evaluate(0.0)?;
        let p_end = curve3.evaluate(1.0)?;
        Ok((q - p_start).norm() <= (q - p_end).norm())
    }
}
