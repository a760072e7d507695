//! Compgraph Graph - Editing sessions over a source digraph
//!
//! This crate owns the mutable side of Compgraph: the digraph store, the
//! editing session that recomputes the derived graph after every edit,
//! configuration, and import/export.
//!
//! # Architecture
//!
//! The store uses petgraph internally with additional indexes for:
//! - Vertex id lookups
//! - Arc id lookups
//! - Insertion order, so snapshots and exports are stable
//!
//! # Example
//!
//! ```
//! use compgraph_core::{Position, RuleKind};
//! use compgraph_graph::Session;
//!
//! let mut session = Session::new();
//! let a = session.add_vertex(Position::new(0.0, 0.0)).unwrap();
//! let b = session.add_vertex(Position::new(1.0, 0.0)).unwrap();
//! let prey = session.add_vertex(Position::new(0.5, 1.0)).unwrap();
//!
//! session.add_arc(a, prey).unwrap();
//! session.add_arc(b, prey).unwrap();
//! assert!(session.derived().contains_edge(a, b));
//!
//! session.select_rule(RuleKind::Ce).unwrap();
//! assert_eq!(session.derived().edge_count(), 0);
//! ```

mod builder;
mod config;
mod graph;
mod interchange;
mod session;

pub use builder::{GraphBuilder, PendingArc};
pub use config::{ConfigError, EditorConfig, CONFIG_DIR, CONFIG_FILE};
pub use graph::{DigraphStore, GraphStats, ReverseArcs};
pub use interchange::{
    parse_adjacency_csv, read_adjacency_csv, read_document, write_adjacency_csv, write_document,
    EdgeRecord, GraphDocument, ImportedGraph, InterchangeError,
};
pub use session::Session;
