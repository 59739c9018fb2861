use std::sync::Arc;

use crate::error::{Result, TopologyError};
use crate::geometry::curve2::{Arc2, Bezier2, Curve2, Line2, ProjectedCurve2};
use crate::geometry::curve3::{Arc3, Curve3, Line3};
use crate::geometry::dual::{DualProjection, DualSurfaceCurve};
use crate::math::Point3;

use super::face::FaceId;
use super::vertex::VertexId;

slotmap::new_key_type! {
    /// Unique identifier for an edge in the topology store.
    pub struct EdgeId;
}

/// The 3D curve carried by an edge.
///
/// A closed set of variants, decided at construction: the kernel never
/// re-inspects concrete curve types at query time. `Singular` is the
/// point-edge at a parametric pole (a sphere pole, a cone apex), which has
/// no 3D extent; its geometry lives entirely in the per-face 2D curves.
#[derive(Debug, Clone)]
pub enum EdgeCurve {
    /// A straight segment.
    Line(Line3),
    /// A circular arc.
    Arc(Arc3),
    /// A surface-surface intersection curve.
    Intersection(Arc<DualSurfaceCurve>),
    /// A degenerate point-edge at a surface pole.
    Singular,
}

impl EdgeCurve {
    /// Evaluates the curve at parameter `t`.
    ///
    /// # Errors
    ///
    /// Returns an error for singular edges, which have no 3D curve.
    pub fn evaluate(&self, t: f64) -> Result<Point3> {
        match self {
            Self::Line(c) => c.evaluate(t),
            Self::Arc(c) => c.evaluate(t),
            Self::Intersection(c) => c.evaluate(t),
            Self::Singular => {
                Err(TopologyError::InvalidTopology("singular edge has no 3D curve".into()).into())
            }
        }
    }

    /// Returns whether the curve's start and end coincide.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        match self {
            Self::Line(c) => c.is_closed(),
            Self::Arc(c) => c.is_closed(),
            Self::Intersection(c) => c.is_closed(),
            Self::Singular => true,
        }
    }

    /// Returns whether this is a singular point-edge.
    #[must_use]
    pub fn is_singular(&self) -> bool {
        matches!(self, Self::Singular)
    }

    /// Returns the curve traversed in the opposite direction.
    #[must_use]
    pub fn reversed(&self) -> Self {
        match self {
            Self::Line(c) => Self::Line(c.reversed()),
            Self::Arc(c) => Self::Arc(c.reversed()),
            Self::Intersection(c) => Self::Intersection(Arc::new(c.reversed())),
            Self::Singular => Self::Singular,
        }
    }
}

/// A 2D curve in one face's parameter space.
///
/// Analytic variants trim in place; `Projected` and `Intersection` are
/// derived from the 3D curve and are recomputed rather than trimmed, so a
/// periodic seam can never leave the 2D and 3D representations disagreeing.
#[derive(Debug, Clone)]
pub enum FaceCurve {
    /// A straight parameter-space segment.
    Line(Line2),
    /// A circular parameter-space arc.
    Arc(Arc2),
    /// A cubic parameter-space curve.
    Bezier(Bezier2),
    /// A re-projection of the edge's 3D curve.
    Projected(ProjectedCurve2),
    /// The trace of a surface-surface intersection curve.
    Intersection(DualProjection),
}

impl FaceCurve {
    /// Borrows the curve as a generic 2D curve.
    #[must_use]
    pub fn as_curve2(&self) -> &dyn Curve2 {
        match self {
            Self::Line(c) => c,
            Self::Arc(c) => c,
            Self::Bezier(c) => c,
            Self::Projected(c) => c,
            Self::Intersection(c) => c,
        }
    }

    /// Returns whether this curve is derived from the 3D curve (and must be
    /// recomputed, not trimmed, when the edge is cut).
    #[must_use]
    pub fn is_derived(&self) -> bool {
        matches!(self, Self::Projected(_) | Self::Intersection(_))
    }
}

/// One face's view of an edge.
#[derive(Debug, Clone)]
pub struct FaceAttachment {
    /// The face.
    pub face: FaceId,
    /// The edge's 2D curve in the face's parameter space, parameterized in
    /// step with the 3D curve.
    pub curve: FaceCurve,
    /// Whether the 3D curve's direction agrees with the face's
    /// counterclockwise boundary direction. Valid once the edge is oriented.
    pub forward: bool,
}

/// Data associated with a topological edge.
///
/// An edge carries up to three redundant representations of one curve: the
/// 3D curve and a 2D curve per adjacent face. The operations in
/// `crate::operations` keep them consistent. Endpoint vertices are
/// materialized lazily; `None` means not yet made.
#[derive(Debug, Clone)]
pub struct EdgeData {
    /// The 3D curve.
    pub curve: EdgeCurve,
    /// First face slot.
    pub primary: Option<FaceAttachment>,
    /// Second face slot.
    pub secondary: Option<FaceAttachment>,
    /// Start vertex (in the 3D curve's own direction), if materialized.
    pub v1: Option<VertexId>,
    /// End vertex, if materialized.
    pub v2: Option<VertexId>,
    /// Whether `forward` flags have been computed.
    pub oriented: bool,
}

impl EdgeData {
    /// Creates a detached edge around a 3D curve.
    #[must_use]
    pub fn new(curve: EdgeCurve) -> Self {
        Self {
            curve,
            primary: None,
            secondary: None,
            v1: None,
            v2: None,
            oriented: false,
        }
    }

    /// Number of faces sharing this edge.
    #[must_use]
    pub fn face_count(&self) -> usize {
        usize::from(self.primary.is_some()) + usize::from(self.secondary.is_some())
    }

    /// Whether this edge is interior (shared by two faces).
    #[must_use]
    pub fn is_interior(&self) -> bool {
        self.face_count() == 2
    }

    /// Assigns a face to the free slot.
    ///
    /// # Errors
    ///
    /// Fails when both slots are already occupied; an edge never bounds
    /// more than two faces and a third assignment is a builder bug.
    pub fn attach(&mut self, attachment: FaceAttachment) -> Result<()> {
        if self.primary.is_none() {
            self.primary = Some(attachment);
            Ok(())
        } else if self.secondary.is_none() {
            self.secondary = Some(attachment);
            Ok(())
        } else {
            Err(TopologyError::FaceSlotsOccupied.into())
        }
    }

    /// The attachment for a given face, if that face is adjacent.
    #[must_use]
    pub fn attachment(&self, face: FaceId) -> Option<&FaceAttachment> {
        [self.primary.as_ref(), self.secondary.as_ref()]
            .into_iter()
            .flatten()
            .find(|a| a.face == face)
    }

    /// Mutable variant of [`EdgeData::attachment`].
    pub fn attachment_mut(&mut self, face: FaceId) -> Option<&mut FaceAttachment> {
        [self.primary.as_mut(), self.secondary.as_mut()]
            .into_iter()
            .flatten()
            .find(|a| a.face == face)
    }

    /// The other face sharing this edge, when the edge is interior.
    ///
    /// Degrades silently: `None` both for a boundary edge and when `face`
    /// is not adjacent at all.
    #[must_use]
    pub fn other_face(&self, face: FaceId) -> Option<FaceId> {
        [self.primary.as_ref(), self.secondary.as_ref()]
            .into_iter()
            .flatten()
            .map(|a| a.face)
            .find(|&f| f != face)
    }

    /// Rebinds an attachment to a different face, keeping its curve.
    ///
    /// # Errors
    ///
    /// Fails when `old` is not adjacent to this edge.
    pub fn replace_face(&mut self, old: FaceId, new: FaceId) -> Result<()> {
        match self.attachment_mut(old) {
            Some(att) => {
                att.face = new;
                Ok(())
            }
            None => Err(TopologyError::FaceNotAdjacent.into()),
        }
    }

    /// Start vertex of this edge as traversed along `face`'s boundary.
    ///
    /// # Errors
    ///
    /// Fails hard when the face is not adjacent or vertices have not been
    /// materialized; both are builder contract violations.
    pub fn start_vertex(&self, face: FaceId) -> Result<VertexId> {
        let att = self
            .attachment(face)
            .ok_or(TopologyError::FaceNotAdjacent)?;
        let (v1, v2) = self.vertices()?;
        Ok(if att.forward { v1 } else { v2 })
    }

    /// End vertex of this edge as traversed along `face`'s boundary.
    ///
    /// # Errors
    ///
    /// Fails hard when the face is not adjacent or vertices have not been
    /// materialized.
    pub fn end_vertex(&self, face: FaceId) -> Result<VertexId> {
        let att = self
            .attachment(face)
            .ok_or(TopologyError::FaceNotAdjacent)?;
        let (v1, v2) = self.vertices()?;
        Ok(if att.forward { v2 } else { v1 })
    }

    /// Both endpoint vertices, requiring them to be materialized.
    ///
    /// # Errors
    ///
    /// Fails when the vertices have not been made yet.
    pub fn vertices(&self) -> Result<(VertexId, VertexId)> {
        match (self.v1, self.v2) {
            (Some(a), Some(b)) => Ok((a, b)),
            _ => Err(TopologyError::VerticesNotMade.into()),
        }
    }
}
