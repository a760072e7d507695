//! Vertex, arc and undirected edge types.
//!
//! These are the values that flow between the graph store, the rule
//! engine and the interchange layer. They carry no behavior beyond
//! identity handling.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Unique identifier for a vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VertexId(pub u64);

impl VertexId {
    /// Returns the raw integer key.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for VertexId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for VertexId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u64>().map(VertexId)
    }
}

/// Unique identifier for an arc.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArcId(String);

impl ArcId {
    /// Wraps an existing identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Builds the identifier used for interactively created arcs.
    ///
    /// The sequence number keeps ids unique when the same ordered pair is
    /// removed and added again.
    pub fn generate(from: VertexId, to: VertexId, seq: u64) -> Self {
        Self(format!("edge-{}-{}-{}", from, to, seq))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArcId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ArcId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ArcId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Canvas position of a vertex. Irrelevant to every derivation rule.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A vertex of the source digraph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub id: VertexId,
    pub label: String,
    #[serde(flatten)]
    pub position: Position,
}

impl Vertex {
    /// Creates a vertex at the origin.
    pub fn new(id: u64, label: impl Into<String>) -> Self {
        Self {
            id: VertexId(id),
            label: label.into(),
            position: Position::default(),
        }
    }

    /// Places the vertex at a canvas position.
    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.position = Position::new(x, y);
        self
    }
}

/// A directed edge of the source digraph.
///
/// Self-loops and repeated ordered pairs are rejected by the store, not
/// by this type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Arc {
    pub id: ArcId,
    pub from: VertexId,
    pub to: VertexId,
}

impl Arc {
    pub fn new(id: impl Into<ArcId>, from: u64, to: u64) -> Self {
        Self {
            id: id.into(),
            from: VertexId(from),
            to: VertexId(to),
        }
    }

    /// Returns true if the arc joins `a` and `b` in either direction.
    pub fn joins(&self, a: VertexId, b: VertexId) -> bool {
        (self.from == a && self.to == b) || (self.from == b && self.to == a)
    }
}

/// Identity of an undirected edge.
///
/// Always normalized so that `lo <= hi`; deriving the same pair in either
/// order produces the same id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId {
    lo: VertexId,
    hi: VertexId,
}

impl EdgeId {
    pub fn new(a: VertexId, b: VertexId) -> Self {
        if a <= b {
            Self { lo: a, hi: b }
        } else {
            Self { lo: b, hi: a }
        }
    }

    pub fn lo(&self) -> VertexId {
        self.lo
    }

    pub fn hi(&self) -> VertexId {
        self.hi
    }

    /// Returns true if `v` is one of the endpoints.
    pub fn touches(&self, v: VertexId) -> bool {
        self.lo == v || self.hi == v
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "graph-{}-{}", self.lo, self.hi)
    }
}

/// Error returned when a string is not of the form `graph-{a}-{b}`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed edge id: {0}")]
pub struct ParseEdgeIdError(String);

impl FromStr for EdgeId {
    type Err = ParseEdgeIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || ParseEdgeIdError(s.to_string());
        let rest = s.strip_prefix("graph-").ok_or_else(malformed)?;
        let (a, b) = rest.split_once('-').ok_or_else(malformed)?;
        let a = a.parse::<VertexId>().map_err(|_| malformed())?;
        let b = b.parse::<VertexId>().map_err(|_| malformed())?;
        Ok(EdgeId::new(a, b))
    }
}

impl Serialize for EdgeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for EdgeId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// An edge of the derived undirected graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UndirectedEdge {
    pub id: EdgeId,
    /// The smaller endpoint.
    pub from: VertexId,
    /// The larger endpoint.
    pub to: VertexId,
}

impl UndirectedEdge {
    pub fn new(a: VertexId, b: VertexId) -> Self {
        let id = EdgeId::new(a, b);
        Self {
            id,
            from: id.lo(),
            to: id.hi(),
        }
    }
}
