//! Source digraph storage.
//!
//! The DigraphStore wraps a petgraph stable graph and adds indexes for
//! vertex and arc ids. It is the single source of truth for the digraph;
//! the rule engine only ever sees owned snapshots of it.

use compgraph_core::{Arc, ArcId, Position, StoreError, Vertex, VertexId};
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

type StoreResult<T> = std::result::Result<T, StoreError>;

/// Whether an arc may be added when the reverse arc already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReverseArcs {
    /// A→B and B→A may coexist.
    #[default]
    Allow,
    /// B→A is rejected as a duplicate of A→B.
    Reject,
}

/// The directed graph being edited.
#[derive(Debug, Clone, Default)]
pub struct DigraphStore {
    /// The underlying petgraph graph. Edge weights are arc ids.
    graph: StableDiGraph<Vertex, ArcId>,

    /// Maps vertex ids to graph node indexes.
    vertex_index: HashMap<VertexId, NodeIndex>,

    /// Maps arc ids to graph edge indexes.
    arc_index: HashMap<ArcId, EdgeIndex>,

    /// Vertex ids in insertion order.
    vertex_order: Vec<VertexId>,

    /// Arc ids in insertion order.
    arc_order: Vec<ArcId>,

    reverse_arcs: ReverseArcs,
}

impl DigraphStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store with the given reverse-arc policy.
    pub fn with_policy(reverse_arcs: ReverseArcs) -> Self {
        Self {
            reverse_arcs,
            ..Self::default()
        }
    }

    pub fn reverse_arcs(&self) -> ReverseArcs {
        self.reverse_arcs
    }

    /// Adds a vertex. Fails if the id is taken.
    pub fn add_vertex(&mut self, vertex: Vertex) -> StoreResult<()> {
        let id = vertex.id;
        if self.vertex_index.contains_key(&id) {
            return Err(StoreError::DuplicateVertex { id });
        }

        let index = self.graph.add_node(vertex);
        self.vertex_index.insert(id, index);
        self.vertex_order.push(id);
        Ok(())
    }

    /// Removes a vertex and every arc touching it.
    ///
    /// Returns the vertex and the removed arcs.
    pub fn remove_vertex(&mut self, id: VertexId) -> StoreResult<(Vertex, Vec<Arc>)> {
        let index = self.node(id)?;

        let incident: Vec<EdgeIndex> = self
            .graph
            .edges_directed(index, Direction::Outgoing)
            .chain(self.graph.edges_directed(index, Direction::Incoming))
            .map(|edge_ref| edge_ref.id())
            .collect();

        let mut removed = Vec::with_capacity(incident.len());
        for edge in incident {
            if let Some(arc) = self.detach_arc(edge) {
                removed.push(arc);
            }
        }

        let vertex = self
            .graph
            .remove_node(index)
            .ok_or(StoreError::UnknownVertex { id })?;
        self.vertex_index.remove(&id);
        self.vertex_order.retain(|&v| v != id);

        Ok((vertex, removed))
    }

    /// Adds an arc after checking endpoints, self-loops and duplicates.
    pub fn add_arc(&mut self, arc: Arc) -> StoreResult<()> {
        if self.arc_index.contains_key(&arc.id) {
            return Err(StoreError::ArcIdInUse { id: arc.id });
        }
        let (from, to) = self.check_endpoints(arc.from, arc.to, None)?;

        let edge = self.graph.add_edge(from, to, arc.id.clone());
        self.arc_index.insert(arc.id.clone(), edge);
        self.arc_order.push(arc.id);
        Ok(())
    }

    /// Removes an arc by id.
    pub fn remove_arc(&mut self, id: &ArcId) -> StoreResult<Arc> {
        let edge = self.edge(id)?;
        self.detach_arc(edge)
            .ok_or_else(|| StoreError::UnknownArc { id: id.clone() })
    }

    /// Points an existing arc at new endpoints, keeping its id and position
    /// in the arc order.
    ///
    /// Returns the arc as it was before the update.
    pub fn update_arc(&mut self, id: &ArcId, from: VertexId, to: VertexId) -> StoreResult<Arc> {
        let edge = self.edge(id)?;
        let before = self
            .arc_at(edge)
            .ok_or_else(|| StoreError::UnknownArc { id: id.clone() })?;
        let (from_idx, to_idx) = self.check_endpoints(from, to, Some(edge))?;

        self.graph.remove_edge(edge);
        let replacement = self.graph.add_edge(from_idx, to_idx, id.clone());
        self.arc_index.insert(id.clone(), replacement);
        Ok(before)
    }

    /// Moves a vertex on the canvas.
    pub fn move_vertex(&mut self, id: VertexId, position: Position) -> StoreResult<()> {
        self.vertex_mut(id)?.position = position;
        Ok(())
    }

    /// Changes a vertex label.
    pub fn relabel_vertex(&mut self, id: VertexId, label: impl Into<String>) -> StoreResult<()> {
        self.vertex_mut(id)?.label = label.into();
        Ok(())
    }

    /// Gets a vertex by id.
    pub fn get_vertex(&self, id: VertexId) -> Option<&Vertex> {
        let index = self.vertex_index.get(&id)?;
        self.graph.node_weight(*index)
    }

    /// Gets an arc by id.
    pub fn get_arc(&self, id: &ArcId) -> Option<Arc> {
        let edge = self.arc_index.get(id)?;
        self.arc_at(*edge)
    }

    /// Finds the arc `from -> to`, if present.
    pub fn find_arc(&self, from: VertexId, to: VertexId) -> Option<Arc> {
        let from = *self.vertex_index.get(&from)?;
        let to = *self.vertex_index.get(&to)?;
        let edge = self.graph.find_edge(from, to)?;
        self.arc_at(edge)
    }

    pub fn contains_vertex(&self, id: VertexId) -> bool {
        self.vertex_index.contains_key(&id)
    }

    /// Vertices `id` has an arc to, in ascending id order.
    pub fn successors(&self, id: VertexId) -> Vec<VertexId> {
        self.neighbors(id, Direction::Outgoing)
    }

    /// Vertices with an arc to `id`, in ascending id order.
    pub fn predecessors(&self, id: VertexId) -> Vec<VertexId> {
        self.neighbors(id, Direction::Incoming)
    }

    /// Snapshot of all vertices in insertion order.
    pub fn vertices(&self) -> Vec<Vertex> {
        self.vertex_order
            .iter()
            .filter_map(|id| self.get_vertex(*id))
            .cloned()
            .collect()
    }

    /// Snapshot of all arcs in insertion order.
    pub fn arcs(&self) -> Vec<Arc> {
        self.arc_order
            .iter()
            .filter_map(|id| self.get_arc(id))
            .collect()
    }

    /// Vertex ids in insertion order.
    pub fn vertex_ids(&self) -> &[VertexId] {
        &self.vertex_order
    }

    /// Returns the number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns the number of arcs.
    pub fn arc_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.vertex_count() == 0
    }

    /// Removes all vertices and arcs. The reverse-arc policy is kept.
    pub fn clear(&mut self) {
        self.graph.clear();
        self.vertex_index.clear();
        self.arc_index.clear();
        self.vertex_order.clear();
        self.arc_order.clear();
    }

    /// Returns graph statistics.
    pub fn stats(&self) -> GraphStats {
        GraphStats {
            vertex_count: self.vertex_count(),
            arc_count: self.arc_count(),
            sources: self
                .vertex_order
                .iter()
                .filter(|&&id| self.predecessors(id).is_empty())
                .count(),
            sinks: self
                .vertex_order
                .iter()
                .filter(|&&id| self.successors(id).is_empty())
                .count(),
        }
    }

    fn node(&self, id: VertexId) -> StoreResult<NodeIndex> {
        self.vertex_index
            .get(&id)
            .copied()
            .ok_or(StoreError::UnknownVertex { id })
    }

    fn edge(&self, id: &ArcId) -> StoreResult<EdgeIndex> {
        self.arc_index
            .get(id)
            .copied()
            .ok_or_else(|| StoreError::UnknownArc { id: id.clone() })
    }

    fn vertex_mut(&mut self, id: VertexId) -> StoreResult<&mut Vertex> {
        let index = self.node(id)?;
        self.graph
            .node_weight_mut(index)
            .ok_or(StoreError::UnknownVertex { id })
    }

    fn neighbors(&self, id: VertexId, direction: Direction) -> Vec<VertexId> {
        let Some(&index) = self.vertex_index.get(&id) else {
            return Vec::new();
        };
        let mut result: Vec<VertexId> = self
            .graph
            .neighbors_directed(index, direction)
            .filter_map(|n| self.graph.node_weight(n))
            .map(|v| v.id)
            .collect();
        result.sort_unstable();
        result
    }

    /// Validates a prospective arc `from -> to`. `ignore` is the edge being
    /// replaced by an update, which does not count as a duplicate.
    fn check_endpoints(
        &self,
        from: VertexId,
        to: VertexId,
        ignore: Option<EdgeIndex>,
    ) -> StoreResult<(NodeIndex, NodeIndex)> {
        if from == to {
            return Err(StoreError::SelfLoop { vertex: from });
        }
        let from_idx = self.node(from)?;
        let to_idx = self.node(to)?;

        let clashes = |a: NodeIndex, b: NodeIndex| {
            self.graph
                .edges_directed(a, Direction::Outgoing)
                .any(|edge_ref| edge_ref.target() == b && Some(edge_ref.id()) != ignore)
        };

        if clashes(from_idx, to_idx)
            || (self.reverse_arcs == ReverseArcs::Reject && clashes(to_idx, from_idx))
        {
            return Err(StoreError::DuplicateArc { from, to });
        }

        Ok((from_idx, to_idx))
    }

    fn arc_at(&self, edge: EdgeIndex) -> Option<Arc> {
        let (from, to) = self.graph.edge_endpoints(edge)?;
        Some(Arc {
            id: self.graph.edge_weight(edge)?.clone(),
            from: self.graph.node_weight(from)?.id,
            to: self.graph.node_weight(to)?.id,
        })
    }

    /// Removes an edge from the graph and both arc indexes.
    fn detach_arc(&mut self, edge: EdgeIndex) -> Option<Arc> {
        let arc = self.arc_at(edge)?;
        self.graph.remove_edge(edge);
        self.arc_index.remove(&arc.id);
        self.arc_order.retain(|a| a != &arc.id);
        Some(arc)
    }
}

/// Graph statistics for status output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    pub vertex_count: usize,
    pub arc_count: usize,
    /// Vertices with no incoming arc.
    pub sources: usize,
    /// Vertices with no outgoing arc.
    pub sinks: usize,
}
