//! Error types for graph edits and rule selection.

use crate::model::{ArcId, VertexId};
use thiserror::Error;

/// Errors raised while resolving a rule or its parameter.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    #[error("unknown rule: {name}")]
    UnknownRule { name: String },

    #[error("unknown rule parameter: {name}")]
    UnknownParameter { name: String },

    #[error("invalid value '{value}' for parameter {param} of rule {rule}: {reason}")]
    InvalidParameter {
        rule: String,
        param: String,
        value: String,
        reason: &'static str,
    },
}

/// Errors raised by graph store mutations.
///
/// A mutation that fails leaves the store exactly as it was.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("cannot create an arc from vertex {vertex} to itself")]
    SelfLoop { vertex: VertexId },

    #[error("an arc between {from} and {to} already exists")]
    DuplicateArc { from: VertexId, to: VertexId },

    #[error("vertex {id} already exists")]
    DuplicateVertex { id: VertexId },

    #[error("arc id {id} is already in use")]
    ArcIdInUse { id: ArcId },

    #[error("no unused vertex id is left")]
    VertexIdsExhausted,

    #[error("vertex not found: {id}")]
    UnknownVertex { id: VertexId },

    #[error("arc not found: {id}")]
    UnknownArc { id: ArcId },
}

/// Any failure an editing operation can report.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error(transparent)]
    Rule(#[from] RuleError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, Error>;
