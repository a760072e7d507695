//! Bounded path checks and exact-step reachability.
//!
//! These are evaluated fresh for every vertex pair. Nothing is memoized
//! between calls.

use crate::adjacency::{AdjacencyIndex, NeighborSet};
use crate::model::VertexId;

/// Length of a path checked by [`AdjacencyIndex::has_path`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathLength {
    /// A direct arc.
    One,
    /// Two arcs through one intermediate vertex.
    Two,
}

impl AdjacencyIndex {
    /// Checks for a path of exactly `length` arcs from `start` to `end`.
    ///
    /// For two-arc paths the intermediate vertex must not be in `avoid`.
    /// A direct arc has no intermediate, so `avoid` does not apply to it.
    pub fn has_path(
        &self,
        start: VertexId,
        end: VertexId,
        length: PathLength,
        avoid: &[VertexId],
    ) -> bool {
        match length {
            PathLength::One => self.has_arc(start, end),
            PathLength::Two => self
                .outgoing(start)
                .iter()
                .filter(|&&mid| !avoid.contains(&mid))
                .any(|&mid| self.has_arc(mid, end)),
        }
    }

    /// Checks for a path of one or two arcs from `start` to `end`.
    pub fn has_path_within_two(&self, start: VertexId, end: VertexId, avoid: &[VertexId]) -> bool {
        self.has_path(start, end, PathLength::One, avoid)
            || self.has_path(start, end, PathLength::Two, avoid)
    }

    /// Returns the vertices reachable from `start` by walks of exactly
    /// `steps` arcs.
    ///
    /// The frontier advances level by level and only the final level is
    /// returned; earlier levels are not accumulated. Advancing stops as
    /// soon as a level is empty.
    pub fn reachable_in_exactly_steps(&self, start: VertexId, steps: usize) -> NeighborSet {
        let mut frontier = NeighborSet::new();
        frontier.insert(start);

        for _ in 0..steps {
            let next: NeighborSet = frontier
                .iter()
                .flat_map(|&v| self.outgoing(v).iter().copied())
                .collect();
            frontier = next;
            if frontier.is_empty() {
                break;
            }
        }

        frontier
    }
}
