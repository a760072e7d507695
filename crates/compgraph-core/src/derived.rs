//! The derived undirected graph.

use crate::model::{EdgeId, UndirectedEdge, Vertex, VertexId};
use crate::rules::Rule;
use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};

/// Output of a derivation rule: the input vertices and one edge per
/// joined pair.
///
/// Edges are keyed by their normalized [`EdgeId`], so inserting the same
/// pair twice is a no-op and iteration order is stable.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DerivedGraph {
    rule: Rule,
    vertices: Vec<Vertex>,
    #[serde(serialize_with = "edge_list")]
    edges: BTreeMap<EdgeId, UndirectedEdge>,
}

fn edge_list<S: Serializer>(
    edges: &BTreeMap<EdgeId, UndirectedEdge>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(edges.values())
}

impl DerivedGraph {
    /// Creates a derived graph with the given vertices and no edges.
    pub fn empty(rule: Rule, vertices: Vec<Vertex>) -> Self {
        Self {
            rule,
            vertices,
            edges: BTreeMap::new(),
        }
    }

    /// Joins `a` and `b`. Returns false if the pair was already joined.
    pub(crate) fn insert_edge(&mut self, a: VertexId, b: VertexId) -> bool {
        let edge = UndirectedEdge::new(a, b);
        if self.edges.contains_key(&edge.id) {
            return false;
        }
        self.edges.insert(edge.id, edge);
        true
    }

    /// The rule this graph was derived with.
    pub fn rule(&self) -> Rule {
        self.rule
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Iterates over edges in `EdgeId` order.
    pub fn edges(&self) -> impl Iterator<Item = &UndirectedEdge> {
        self.edges.values()
    }

    pub fn edge_ids(&self) -> BTreeSet<EdgeId> {
        self.edges.keys().copied().collect()
    }

    pub fn get_edge(&self, id: &EdgeId) -> Option<&UndirectedEdge> {
        self.edges.get(id)
    }

    /// Returns true if `a` and `b` are joined, in either order.
    pub fn contains_edge(&self, a: VertexId, b: VertexId) -> bool {
        self.edges.contains_key(&EdgeId::new(a, b))
    }

    /// Vertices joined to `v`, in ascending order.
    pub fn neighbors(&self, v: VertexId) -> Vec<VertexId> {
        let mut result: Vec<VertexId> = self
            .edges
            .keys()
            .filter(|id| id.touches(v))
            .map(|id| if id.lo() == v { id.hi() } else { id.lo() })
            .collect();
        result.sort_unstable();
        result
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Vertices with no derived edge.
    pub fn isolated(&self) -> Vec<VertexId> {
        self.vertices
            .iter()
            .map(|v| v.id)
            .filter(|&id| !self.edges.keys().any(|e| e.touches(id)))
            .collect()
    }
}
