//! Compgraph Core - Digraph model and derivation rules
//!
//! This crate holds everything that turns a directed graph into its
//! companion undirected graph: the vertex and arc types, the adjacency
//! index, bounded path and exact-step reachability checks, and the rule
//! engine itself.
//!
//! Nothing here owns state between calls. Rules take vertex and arc
//! slices and return a fresh [`DerivedGraph`]; the editing session that
//! keeps the two in sync lives in `compgraph-graph`.
//!
//! # Example
//!
//! ```
//! use compgraph_core::{Arc, Rule, Vertex, VertexId};
//!
//! let vertices = vec![Vertex::new(1, "v1"), Vertex::new(2, "v2"), Vertex::new(3, "v3")];
//! let arcs = vec![Arc::new("a", 1, 3), Arc::new("b", 2, 3)];
//!
//! let derived = Rule::Comp.derive(&vertices, &arcs);
//! assert!(derived.contains_edge(VertexId(1), VertexId(2)));
//! assert_eq!(derived.edge_count(), 1);
//! ```

mod adjacency;
mod derived;
mod error;
mod model;
mod paths;
mod rules;

pub use adjacency::{AdjacencyIndex, NeighborSet};
pub use derived::DerivedGraph;
pub use error::{Error, Result, RuleError, StoreError};
pub use model::{Arc, ArcId, EdgeId, ParseEdgeIdError, Position, UndirectedEdge, Vertex, VertexId};
pub use paths::PathLength;
pub use rules::{Param, Rule, RuleKind, RuleParams};
