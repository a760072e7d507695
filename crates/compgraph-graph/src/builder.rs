//! Graph builder for constructing a store from imported records.
//!
//! The builder works in two passes: first every vertex is added, then the
//! queued arcs are resolved against the finished vertex set. Any failure
//! aborts the build, so a half-imported store is never handed out.

use crate::graph::{DigraphStore, ReverseArcs};
use compgraph_core::{Arc, ArcId, StoreError, Vertex, VertexId};
use std::collections::HashSet;
use tracing::debug;

/// An arc waiting for the second pass. A missing id gets one generated.
#[derive(Debug, Clone)]
pub struct PendingArc {
    pub id: Option<ArcId>,
    pub from: VertexId,
    pub to: VertexId,
}

/// Builds a DigraphStore from vertex and arc records.
pub struct GraphBuilder {
    store: DigraphStore,
    pending: Vec<PendingArc>,
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new(ReverseArcs::default())
    }
}

impl GraphBuilder {
    /// Creates a builder whose store enforces `reverse_arcs`.
    pub fn new(reverse_arcs: ReverseArcs) -> Self {
        Self {
            store: DigraphStore::with_policy(reverse_arcs),
            pending: Vec::new(),
        }
    }

    /// Adds vertices. Duplicate ids fail immediately.
    pub fn add_vertices(
        &mut self,
        vertices: impl IntoIterator<Item = Vertex>,
    ) -> Result<(), StoreError> {
        for vertex in vertices {
            self.store.add_vertex(vertex)?;
        }
        Ok(())
    }

    /// Queues arcs for resolution in [`build`](Self::build).
    pub fn add_arcs(&mut self, arcs: impl IntoIterator<Item = PendingArc>) {
        self.pending.extend(arcs);
    }

    /// Resolves queued arcs and returns the finished store.
    pub fn build(mut self) -> Result<DigraphStore, StoreError> {
        let pending = std::mem::take(&mut self.pending);
        let reserved: HashSet<ArcId> = pending.iter().filter_map(|arc| arc.id.clone()).collect();
        let mut seq = 0u64;

        for arc in pending {
            let id = match arc.id {
                Some(id) => id,
                None => loop {
                    seq += 1;
                    let candidate = ArcId::generate(arc.from, arc.to, seq);
                    if !reserved.contains(&candidate) && self.store.get_arc(&candidate).is_none() {
                        break candidate;
                    }
                },
            };
            self.store.add_arc(Arc {
                id,
                from: arc.from,
                to: arc.to,
            })?;
        }

        debug!(
            "Built store: {} vertices, {} arcs",
            self.store.vertex_count(),
            self.store.arc_count()
        );
        Ok(self.store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending(id: Option<&str>, from: u64, to: u64) -> PendingArc {
        PendingArc {
            id: id.map(ArcId::new),
            from: VertexId(from),
            to: VertexId(to),
        }
    }

    #[test]
    fn test_builder_adds_vertices_then_arcs() {
        let mut builder = GraphBuilder::default();
        // arcs may be queued before their endpoints exist
        builder.add_arcs(vec![pending(Some("a"), 1, 2)]);
        builder
            .add_vertices(vec![Vertex::new(1, "v1"), Vertex::new(2, "v2")])
            .unwrap();

        let store = builder.build().unwrap();
        assert_eq!(store.vertex_count(), 2);
        assert_eq!(store.arc_count(), 1);
        assert!(store.get_arc(&ArcId::new("a")).is_some());
    }

    #[test]
    fn test_builder_generates_missing_ids() {
        let mut builder = GraphBuilder::default();
        builder
            .add_vertices(vec![Vertex::new(1, "v1"), Vertex::new(2, "v2")])
            .unwrap();
        builder.add_arcs(vec![pending(None, 1, 2), pending(None, 2, 1)]);

        let store = builder.build().unwrap();
        let ids: Vec<String> = store.arcs().iter().map(|a| a.id.to_string()).collect();
        assert_eq!(ids, vec!["edge-1-2-1", "edge-2-1-2"]);
    }

    #[test]
    fn test_generated_ids_skip_explicit_ones() {
        let mut builder = GraphBuilder::default();
        builder
            .add_vertices(vec![
                Vertex::new(1, "v1"),
                Vertex::new(2, "v2"),
                Vertex::new(3, "v3"),
            ])
            .unwrap();
        builder.add_arcs(vec![pending(None, 1, 2), pending(Some("edge-1-2-1"), 2, 3)]);

        let store = builder.build().unwrap();
        let ids: Vec<String> = store.arcs().iter().map(|a| a.id.to_string()).collect();
        assert_eq!(ids, vec!["edge-1-2-2", "edge-1-2-1"]);
        assert_eq!(
            store.get_arc(&ArcId::new("edge-1-2-1")).map(|a| a.from),
            Some(VertexId(2))
        );
    }

    #[test]
    fn test_builder_rejects_invalid_arcs() {
        let mut builder = GraphBuilder::default();
        builder.add_vertices(vec![Vertex::new(1, "v1")]).unwrap();
        builder.add_arcs(vec![pending(None, 1, 7)]);
        assert_eq!(
            builder.build().err(),
            Some(StoreError::UnknownVertex { id: VertexId(7) })
        );

        let mut builder = GraphBuilder::new(ReverseArcs::Reject);
        builder
            .add_vertices(vec![Vertex::new(1, "v1"), Vertex::new(2, "v2")])
            .unwrap();
        builder.add_arcs(vec![pending(None, 1, 2), pending(None, 2, 1)]);
        assert!(matches!(
            builder.build(),
            Err(StoreError::DuplicateArc { .. })
        ));
    }

    #[test]
    fn test_builder_rejects_duplicate_vertices() {
        let mut builder = GraphBuilder::default();
        let result = builder.add_vertices(vec![Vertex::new(4, "a"), Vertex::new(4, "b")]);
        assert_eq!(result, Err(StoreError::DuplicateVertex { id: VertexId(4) }));
    }
}
