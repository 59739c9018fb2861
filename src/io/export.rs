use std::collections::HashMap;

use crate::error::Result;
use crate::geometry::curve3::Curve3;
use crate::math::Point3;
use crate::topology::{EdgeCurve, EdgeId, TopologyStore, VertexId};

/// Samples written for curves with no analytic record.
const CURVE_SAMPLES: usize = 16;

/// A stable reference handle allocated by an [`ExportContext`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExportRef(pub u32);

/// The geometric payload of an exported curve.
#[derive(Debug, Clone)]
pub enum CurveRecord {
    /// A straight segment between two points.
    Line {
        /// Start point.
        start: Point3,
        /// End point.
        end: Point3,
    },
    /// A sampled polyline standing in for a curve with no analytic form.
    Points(Vec<Point3>),
}

/// One exported entity.
#[derive(Debug, Clone)]
pub enum ExportRecord {
    /// A vertex position.
    Vertex(Point3),
    /// A curve payload.
    Curve(CurveRecord),
    /// An edge: two vertex references and a curve reference.
    Edge {
        /// Start vertex reference.
        v1: ExportRef,
        /// End vertex reference.
        v2: ExportRef,
        /// Curve reference.
        curve: ExportRef,
    },
}

/// Accumulates export records with stable references.
///
/// The context deduplicates vertices, so two edges meeting at a corner
/// share one vertex record. What file syntax the records become is the
/// consuming exporter's concern; this side only guarantees reference
/// stability and completeness.
#[derive(Debug, Default)]
pub struct ExportContext {
    next: u32,
    vertex_refs: HashMap<VertexId, ExportRef>,
    records: Vec<(ExportRef, ExportRecord)>,
}

impl ExportContext {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn alloc(&mut self, record: ExportRecord) -> ExportRef {
        let r = ExportRef(self.next);
        self.next += 1;
        self.records.push((r, record));
        r
    }

    /// All records written so far, in allocation order.
    #[must_use]
    pub fn records(&self) -> &[(ExportRef, ExportRecord)] {
        &self.records
    }

    /// Exports one vertex, reusing the existing record when already seen.
    ///
    /// # Errors
    ///
    /// Returns an error if the vertex is not in the store.
    pub fn export_vertex(
        &mut self,
        store: &TopologyStore,
        vertex: VertexId,
    ) -> Result<ExportRef> {
        if let Some(&r) = self.vertex_refs.get(&vertex) {
            return Ok(r);
        }
        let point = store.vertex(vertex)?.point;
        let r = self.alloc(ExportRecord::Vertex(point));
        self.vertex_refs.insert(vertex, r);
        Ok(r)
    }

    /// Exports one edge: its vertex pair plus a curve record, returning the
    /// edge's reference for the caller to build oriented boundary
    /// references from.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge's vertices have not been materialized.
    pub fn export_edge(&mut self, store: &TopologyStore, edge: EdgeId) -> Result<ExportRef> {
        let data = store.edge(edge)?;
        let (v1, v2) = data.vertices()?;
        let r1 = self.export_vertex(store, v1)?;
        let r2 = self.export_vertex(store, v2)?;

        let curve = match &data.curve {
            EdgeCurve::Line(c) => CurveRecord::Line {
                start: c.evaluate(0.0)?,
                end: c.evaluate(1.0)?,
            },
            EdgeCurve::Arc(_) | EdgeCurve::Intersection(_) => {
                let mut points = Vec::with_capacity(CURVE_SAMPLES + 1);
                for k in 0..=CURVE_SAMPLES {
                    points.push(data.curve.evaluate(k as f64 / CURVE_SAMPLES as f64)?);
                }
                CurveRecord::Points(points)
            }
            EdgeCurve::Singular => {
                let point = store.vertex(v1)?.point;
                CurveRecord::Points(vec![point])
            }
        };
        let curve_ref = self.alloc(ExportRecord::Curve(curve));
        Ok(self.alloc(ExportRecord::Edge {
            v1: r1,
            v2: r2,
            curve: curve_ref,
        }))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::curve3::Line3;
    use crate::operations::MakeVertices;
    use crate::topology::EdgeData;

    fn line_edge(store: &mut TopologyStore, a: Point3, b: Point3) -> EdgeId {
        let e = store.add_edge(EdgeData::new(EdgeCurve::Line(Line3::new(a, b).unwrap())));
        MakeVertices::new(e).execute(store).unwrap();
        e
    }

    #[test]
    fn edge_export_writes_vertices_curve_edge() {
        let mut store = TopologyStore::new();
        let e = line_edge(&mut store, Point3::origin(), Point3::new(1.0, 0.0, 0.0));
        let mut ctx = ExportContext::new();
        let r = ctx.export_edge(&store, e).unwrap();
        // Two vertices, one curve, one edge.
        assert_eq!(ctx.records().len(), 4);
        let (last_ref, last) = &ctx.records()[3];
        assert_eq!(*last_ref, r);
        assert!(matches!(last, ExportRecord::Edge { .. }));
    }

    #[test]
    fn shared_vertices_deduplicated() {
        let mut store = TopologyStore::new();
        let e1 = line_edge(&mut store, Point3::origin(), Point3::new(1.0, 0.0, 0.0));
        let e2 = line_edge(
            &mut store,
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        );
        let mut ctx = ExportContext::new();
        ctx.export_edge(&store, e1).unwrap();
        ctx.export_edge(&store, e2).unwrap();
        let vertex_count = ctx
            .records()
            .iter()
            .filter(|(_, r)| matches!(r, ExportRecord::Vertex(_)))
            .count();
        // Three distinct corners, not four.
        assert_eq!(vertex_count, 3);
    }

    #[test]
    fn references_are_stable_and_monotonic() {
        let mut store = TopologyStore::new();
        let e = line_edge(&mut store, Point3::origin(), Point3::new(1.0, 0.0, 0.0));
        let mut ctx = ExportContext::new();
        let r1 = ctx.export_edge(&store, e).unwrap();
        let v1 = store.edge(e).unwrap().v1.unwrap();
        let again = ctx.export_vertex(&store, v1).unwrap();
        assert!(again.0 < r1.0, "vertex reference must be reused");
    }

    #[test]
    fn unmade_vertices_rejected() {
        let mut store = TopologyStore::new();
        let e = store.add_edge(EdgeData::new(EdgeCurve::Line(
            Line3::new(Point3::origin(), Point3::new(1.0, 0.0, 0.0)).unwrap(),
        )));
        let mut ctx = ExportContext::new();
        assert!(ctx.export_edge(&store, e).is_err());
    }
}
