//! Import and export of whole graphs.
//!
//! Two formats are supported:
//!
//! - A JSON document `{nodes, edges, rule}` carrying the digraph and the
//!   selected rule, with optional `p` and `m`.
//! - A square 0/1 adjacency matrix as headerless CSV. Importing builds
//!   vertices `0..n-1` and one arc per `1` cell.
//!
//! Imports are fully validated before anything is returned, so callers
//! can swap the result in without touching their current state on error.

use crate::builder::{GraphBuilder, PendingArc};
use crate::graph::{DigraphStore, ReverseArcs};
use compgraph_core::{ArcId, RuleError, RuleKind, RuleParams, StoreError, Vertex, VertexId};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{Read, Write};
use std::path::Path;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum InterchangeError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("matrix is not square: row {row} has {found} cells, expected {expected}")]
    NotSquare {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("matrix cell ({row}, {col}) must be 0 or 1, found '{value}'")]
    BadCell {
        row: usize,
        col: usize,
        value: String,
    },

    #[error("invalid graph: {0}")]
    Invalid(#[from] StoreError),

    #[error(transparent)]
    Rule(#[from] RuleError),
}

pub type Result<T> = std::result::Result<T, InterchangeError>;

/// An arc as written in a graph document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ArcId>,
    pub from: VertexId,
    pub to: VertexId,
}

fn default_rule() -> String {
    RuleKind::Comp.as_str().to_string()
}

/// The JSON exchange document.
///
/// Unknown fields (such as styling attributes written by other tools) are
/// ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphDocument {
    pub nodes: Vec<Vertex>,
    #[serde(default)]
    pub edges: Vec<EdgeRecord>,
    #[serde(default = "default_rule")]
    pub rule: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub m: Option<u32>,
}

/// A validated document, ready to be swapped into a session.
#[derive(Debug, Clone)]
pub struct ImportedGraph {
    pub store: DigraphStore,
    pub rule: RuleKind,
    pub params: RuleParams,
}

impl GraphDocument {
    /// Captures a store together with the rule selection.
    pub fn from_store(store: &DigraphStore, rule: RuleKind, params: RuleParams) -> Self {
        Self {
            nodes: store.vertices(),
            edges: store
                .arcs()
                .into_iter()
                .map(|arc| EdgeRecord {
                    id: Some(arc.id),
                    from: arc.from,
                    to: arc.to,
                })
                .collect(),
            rule: rule.as_str().to_string(),
            p: Some(params.p),
            m: Some(params.m),
        }
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validates the document into a fresh store.
    ///
    /// Parameters missing from the document fall back to `defaults`.
    pub fn validate(
        &self,
        reverse_arcs: ReverseArcs,
        defaults: RuleParams,
    ) -> Result<ImportedGraph> {
        let rule: RuleKind = self.rule.parse()?;
        let params = RuleParams {
            p: self.p.unwrap_or(defaults.p),
            m: self.m.unwrap_or(defaults.m),
        };
        params.validate()?;

        let mut builder = GraphBuilder::new(reverse_arcs);
        builder.add_vertices(self.nodes.iter().cloned())?;
        builder.add_arcs(self.edges.iter().map(|edge| PendingArc {
            id: edge.id.clone(),
            from: edge.from,
            to: edge.to,
        }));
        let store = builder.build()?;

        Ok(ImportedGraph {
            store,
            rule,
            params,
        })
    }
}

/// Reads a graph document from disk.
pub fn read_document(path: &Path) -> Result<GraphDocument> {
    let text = fs::read_to_string(path)?;
    let document = GraphDocument::from_json(&text)?;
    info!(
        "Read {} ({} nodes, {} edges)",
        path.display(),
        document.nodes.len(),
        document.edges.len()
    );
    Ok(document)
}

/// Writes a graph document to disk as pretty JSON.
pub fn write_document(path: &Path, document: &GraphDocument) -> Result<()> {
    fs::write(path, document.to_json()?)?;
    Ok(())
}

/// Parses a headerless square 0/1 adjacency matrix.
///
/// Row `i`, column `j` set to 1 becomes the arc `i -> j`. A 1 on the
/// diagonal is a self-loop and is rejected when the document is validated.
pub fn parse_adjacency_csv<R: Read>(reader: R) -> Result<GraphDocument> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows: Vec<Vec<bool>> = Vec::new();
    for (row, record) in csv_reader.records().enumerate() {
        let record = record?;
        let cells = record
            .iter()
            .enumerate()
            .map(|(col, cell)| match cell {
                "0" => Ok(false),
                "1" => Ok(true),
                other => Err(InterchangeError::BadCell {
                    row,
                    col,
                    value: other.to_string(),
                }),
            })
            .collect::<Result<Vec<bool>>>()?;
        rows.push(cells);
    }

    let n = rows.len();
    if let Some((row, cells)) = rows.iter().enumerate().find(|(_, cells)| cells.len() != n) {
        return Err(InterchangeError::NotSquare {
            row,
            expected: n,
            found: cells.len(),
        });
    }

    let nodes = (0..n as u64)
        .map(|i| Vertex::new(i, format!("v{}", i)))
        .collect();
    let edges = rows
        .iter()
        .enumerate()
        .flat_map(|(i, cells)| {
            cells
                .iter()
                .enumerate()
                .filter(|&(_, &set)| set)
                .map(move |(j, _)| EdgeRecord {
                    id: None,
                    from: VertexId(i as u64),
                    to: VertexId(j as u64),
                })
        })
        .collect();

    Ok(GraphDocument {
        nodes,
        edges,
        rule: default_rule(),
        p: None,
        m: None,
    })
}

/// Reads an adjacency matrix file.
pub fn read_adjacency_csv(path: &Path) -> Result<GraphDocument> {
    let file = fs::File::open(path)?;
    parse_adjacency_csv(file)
}

/// Writes the store's adjacency matrix in vertex insertion order.
pub fn write_adjacency_csv<W: Write>(store: &DigraphStore, writer: W) -> Result<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    let ids = store.vertex_ids();
    for &from in ids {
        let successors = store.successors(from);
        let row: Vec<&str> = ids
            .iter()
            .map(|to| if successors.contains(to) { "1" } else { "0" })
            .collect();
        csv_writer.write_record(&row)?;
    }
    csv_writer.flush()?;
    Ok(())
}
