//! Out- and in-neighbor maps built from an arc list.
//!
//! The index is rebuilt from scratch for every rule invocation. It is
//! never patched in place, so it can never drift from the arc list it
//! was built from.

use crate::model::{Arc, Vertex, VertexId};
use std::collections::{BTreeSet, HashMap};

/// Set of neighbor vertices, ordered for deterministic iteration.
pub type NeighborSet = BTreeSet<VertexId>;

static EMPTY: NeighborSet = BTreeSet::new();

/// Out-neighbor and in-neighbor maps of a digraph.
#[derive(Debug, Clone, Default)]
pub struct AdjacencyIndex {
    outgoing: HashMap<VertexId, NeighborSet>,
    incoming: HashMap<VertexId, NeighborSet>,
}

impl AdjacencyIndex {
    /// Builds both maps in one pass over the arcs.
    ///
    /// Every vertex gets an entry, even when it has no arcs.
    pub fn build(vertices: &[Vertex], arcs: &[Arc]) -> Self {
        let mut outgoing: HashMap<VertexId, NeighborSet> = HashMap::with_capacity(vertices.len());
        let mut incoming: HashMap<VertexId, NeighborSet> = HashMap::with_capacity(vertices.len());

        for vertex in vertices {
            outgoing.entry(vertex.id).or_default();
            incoming.entry(vertex.id).or_default();
        }

        for arc in arcs {
            outgoing.entry(arc.from).or_default().insert(arc.to);
            incoming.entry(arc.to).or_default().insert(arc.from);
        }

        Self { outgoing, incoming }
    }

    /// Vertices `v` has an arc to.
    pub fn outgoing(&self, v: VertexId) -> &NeighborSet {
        self.outgoing.get(&v).unwrap_or(&EMPTY)
    }

    /// Vertices that have an arc to `v`.
    pub fn incoming(&self, v: VertexId) -> &NeighborSet {
        self.incoming.get(&v).unwrap_or(&EMPTY)
    }

    /// Returns true if the arc `from -> to` exists.
    pub fn has_arc(&self, from: VertexId, to: VertexId) -> bool {
        self.outgoing(from).contains(&to)
    }

    /// Number of out-neighbors shared by `a` and `b`.
    pub fn common_out_count(&self, a: VertexId, b: VertexId) -> usize {
        self.outgoing(a).intersection(self.outgoing(b)).count()
    }

    /// Returns true if `a` and `b` share at least one out-neighbor.
    pub fn share_out(&self, a: VertexId, b: VertexId) -> bool {
        !self.outgoing(a).is_disjoint(self.outgoing(b))
    }

    /// Returns true if `a` and `b` share at least one in-neighbor.
    pub fn share_in(&self, a: VertexId, b: VertexId) -> bool {
        !self.incoming(a).is_disjoint(self.incoming(b))
    }
}
