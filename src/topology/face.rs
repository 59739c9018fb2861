use std::sync::Arc;

use crate::geometry::surface::Surface;

use super::edge::EdgeId;

slotmap::new_key_type! {
    /// Unique identifier for a face in the topology store.
    pub struct FaceId;
}

/// Data associated with a topological face.
///
/// The kernel's minimal view of a face: the surface it lies on and the
/// boundary edges. The cached area is owned here so edge mutations that
/// change the boundary geometry can invalidate it explicitly.
#[derive(Debug, Clone)]
pub struct FaceData {
    /// The surface this face lies on.
    pub surface: Arc<dyn Surface>,
    /// Boundary edges, in loop order where known.
    pub boundary: Vec<EdgeId>,
    /// Cached surface area, cleared by any boundary mutation.
    pub area: Option<f64>,
}

impl FaceData {
    /// Creates a new face on a surface with an empty boundary.
    #[must_use]
    pub fn new(surface: Arc<dyn Surface>) -> Self {
        Self {
            surface,
            boundary: Vec::new(),
            area: None,
        }
    }

    /// Replaces one boundary edge by a run of fragments, in place.
    pub fn replace_boundary_edge(&mut self, old: EdgeId, fragments: &[EdgeId]) {
        if let Some(pos) = self.boundary.iter().position(|&e| e == old) {
            self.boundary.splice(pos..=pos, fragments.iter().copied());
        }
        self.area = None;
    }
}
