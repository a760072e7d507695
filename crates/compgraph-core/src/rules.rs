//! Competition-graph derivation rules.
//!
//! A rule maps a digraph to an undirected graph on the same vertex set.
//! For every unordered pair {A, B} of distinct vertices the rule decides
//! whether the pair is joined:
//!
//! | Rule | Pair is joined when |
//! |---|---|
//! | `comp` | A and B share an out-neighbor |
//! | `p-comp` | A and B share at least `p` out-neighbors |
//! | `ce` | A and B share an in-neighbor |
//! | `cce` | both `comp` and `ce` hold |
//! | `niche` | `comp` or `ce` holds |
//! | `phy` | `comp` holds or an arc joins A and B |
//! | `one-two-step` | one reaches some z in one step, the other in one or two |
//! | `m-step` | A and B reach a common vertex in exactly `m` steps |
//!
//! [`RuleKind`] is the closed set of rule names. [`Rule`] is a resolved
//! selection that carries the parameter its kind needs, so dispatch is an
//! exhaustive match and can never hit an unknown name.

use crate::adjacency::AdjacencyIndex;
use crate::derived::DerivedGraph;
use crate::error::RuleError;
use crate::model::{Arc, Vertex, VertexId};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

// ─────────────────────────────────────────────────────────────────────────────
// Rule names
// ─────────────────────────────────────────────────────────────────────────────

/// The name of a derivation rule, without its parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RuleKind {
    /// Common out-neighbor (competition graph).
    #[default]
    Comp,
    /// At least `p` common out-neighbors.
    PComp,
    /// Common in-neighbor (common enemy graph).
    Ce,
    /// Common out-neighbor and common in-neighbor.
    Cce,
    /// Common out-neighbor or common in-neighbor.
    Niche,
    /// Common out-neighbor or an arc between the pair.
    Phy,
    /// (1,2)-step competition.
    OneTwoStep,
    /// Common vertex reachable in exactly `m` steps.
    MStep,
}

impl RuleKind {
    pub const ALL: [RuleKind; 8] = [
        RuleKind::Comp,
        RuleKind::PComp,
        RuleKind::Ce,
        RuleKind::Cce,
        RuleKind::Niche,
        RuleKind::Phy,
        RuleKind::OneTwoStep,
        RuleKind::MStep,
    ];

    /// Canonical wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleKind::Comp => "comp",
            RuleKind::PComp => "p-comp",
            RuleKind::Ce => "ce",
            RuleKind::Cce => "cce",
            RuleKind::Niche => "niche",
            RuleKind::Phy => "phy",
            RuleKind::OneTwoStep => "one-two-step",
            RuleKind::MStep => "m-step",
        }
    }

    /// Human-readable edge condition for the pair {A, B}.
    pub fn condition(&self) -> &'static str {
        match self {
            RuleKind::Comp => "out(A) ∩ out(B) ≠ ∅",
            RuleKind::PComp => "|out(A) ∩ out(B)| ≥ p",
            RuleKind::Ce => "in(A) ∩ in(B) ≠ ∅",
            RuleKind::Cce => "out(A) ∩ out(B) ≠ ∅ and in(A) ∩ in(B) ≠ ∅",
            RuleKind::Niche => "out(A) ∩ out(B) ≠ ∅ or in(A) ∩ in(B) ≠ ∅",
            RuleKind::Phy => "out(A) ∩ out(B) ≠ ∅ or A→B or B→A",
            RuleKind::OneTwoStep => {
                "some z is reached by one of A, B in 1 step and by the other in 1 or 2 steps"
            }
            RuleKind::MStep => "reach_m(A) ∩ reach_m(B) ≠ ∅ (exactly m steps)",
        }
    }

    /// The parameter this rule reads, if any.
    pub fn parameter(&self) -> Option<Param> {
        match self {
            RuleKind::PComp => Some(Param::P),
            RuleKind::MStep => Some(Param::M),
            _ => None,
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuleKind {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = match s.trim().to_ascii_lowercase().as_str() {
            "comp" => RuleKind::Comp,
            "p-comp" | "pcomp" => RuleKind::PComp,
            "ce" => RuleKind::Ce,
            "cce" => RuleKind::Cce,
            "niche" => RuleKind::Niche,
            "phy" => RuleKind::Phy,
            "one-two-step" | "(1,2)-step" | "12-step" => RuleKind::OneTwoStep,
            "m-step" | "mstep" => RuleKind::MStep,
            _ => {
                return Err(RuleError::UnknownRule {
                    name: s.to_string(),
                })
            }
        };
        Ok(kind)
    }
}

impl Serialize for RuleKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RuleKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Parameters
// ─────────────────────────────────────────────────────────────────────────────

/// A numeric rule parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Param {
    /// Minimum number of shared out-neighbors for `p-comp`.
    P,
    /// Exact step count for `m-step`.
    M,
}

impl Param {
    pub fn as_str(&self) -> &'static str {
        match self {
            Param::P => "p",
            Param::M => "m",
        }
    }

    /// The rule that reads this parameter.
    pub fn rule(&self) -> RuleKind {
        match self {
            Param::P => RuleKind::PComp,
            Param::M => RuleKind::MStep,
        }
    }

    fn invalid(&self, value: impl fmt::Display, reason: &'static str) -> RuleError {
        RuleError::InvalidParameter {
            rule: self.rule().to_string(),
            param: self.as_str().to_string(),
            value: value.to_string(),
            reason,
        }
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Param {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "p" => Ok(Param::P),
            "m" => Ok(Param::M),
            _ => Err(RuleError::UnknownParameter {
                name: s.trim().to_string(),
            }),
        }
    }
}

/// Current parameter inputs, read whenever a rule is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleParams {
    pub p: u32,
    pub m: u32,
}

impl Default for RuleParams {
    fn default() -> Self {
        Self { p: 1, m: 2 }
    }
}

impl RuleParams {
    /// Largest accepted value of `m`.
    pub const MAX_STEPS: u32 = 256;

    pub fn get(&self, param: Param) -> u32 {
        match param {
            Param::P => self.p,
            Param::M => self.m,
        }
    }

    /// Validates `value` and stores it.
    pub fn set(&mut self, param: Param, value: u32) -> Result<(), RuleError> {
        Self::check(param, value)?;
        match param {
            Param::P => self.p = value,
            Param::M => self.m = value,
        }
        Ok(())
    }

    /// Validates both parameters.
    pub fn validate(&self) -> Result<(), RuleError> {
        Self::check(Param::P, self.p)?;
        Self::check(Param::M, self.m)
    }

    /// Parses raw user input for `param`.
    pub fn parse_value(param: Param, raw: &str) -> Result<u32, RuleError> {
        let value: i64 = raw
            .trim()
            .parse()
            .map_err(|_| param.invalid(raw.trim(), "not an integer"))?;
        if value < 1 {
            return Err(param.invalid(value, "must be at least 1"));
        }
        let value = u32::try_from(value).map_err(|_| param.invalid(value, "out of range"))?;
        Self::check(param, value)?;
        Ok(value)
    }

    fn check(param: Param, value: u32) -> Result<(), RuleError> {
        if value < 1 {
            return Err(param.invalid(value, "must be at least 1"));
        }
        if param == Param::M && value > Self::MAX_STEPS {
            return Err(param.invalid(value, "must be at most 256"));
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Resolved rules
// ─────────────────────────────────────────────────────────────────────────────

/// A rule together with the parameter it reads.
///
/// Deserialized rules go through [`Rule::p_comp`] and [`Rule::m_step`], so
/// an out-of-range parameter is rejected on the way in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "kebab-case", try_from = "RuleRepr")]
pub enum Rule {
    #[default]
    Comp,
    PComp {
        p: u32,
    },
    Ce,
    Cce,
    Niche,
    Phy,
    OneTwoStep,
    MStep {
        m: u32,
    },
}

/// Unchecked wire form of [`Rule`].
#[derive(Deserialize)]
#[serde(tag = "name", rename_all = "kebab-case")]
enum RuleRepr {
    Comp,
    PComp { p: u32 },
    Ce,
    Cce,
    Niche,
    Phy,
    OneTwoStep,
    MStep { m: u32 },
}

impl TryFrom<RuleRepr> for Rule {
    type Error = RuleError;

    fn try_from(repr: RuleRepr) -> Result<Self, Self::Error> {
        let rule = match repr {
            RuleRepr::Comp => Rule::Comp,
            RuleRepr::PComp { p } => Rule::p_comp(p)?,
            RuleRepr::Ce => Rule::Ce,
            RuleRepr::Cce => Rule::Cce,
            RuleRepr::Niche => Rule::Niche,
            RuleRepr::Phy => Rule::Phy,
            RuleRepr::OneTwoStep => Rule::OneTwoStep,
            RuleRepr::MStep { m } => Rule::m_step(m)?,
        };
        Ok(rule)
    }
}

impl Rule {
    /// Builds the rule for `kind`, reading its parameter from `params`.
    pub fn resolve(kind: RuleKind, params: &RuleParams) -> Result<Self, RuleError> {
        let rule = match kind {
            RuleKind::Comp => Rule::Comp,
            RuleKind::PComp => Rule::p_comp(params.p)?,
            RuleKind::Ce => Rule::Ce,
            RuleKind::Cce => Rule::Cce,
            RuleKind::Niche => Rule::Niche,
            RuleKind::Phy => Rule::Phy,
            RuleKind::OneTwoStep => Rule::OneTwoStep,
            RuleKind::MStep => Rule::m_step(params.m)?,
        };
        Ok(rule)
    }

    pub fn p_comp(p: u32) -> Result<Self, RuleError> {
        RuleParams::check(Param::P, p)?;
        Ok(Rule::PComp { p })
    }

    pub fn m_step(m: u32) -> Result<Self, RuleError> {
        RuleParams::check(Param::M, m)?;
        Ok(Rule::MStep { m })
    }

    pub fn kind(&self) -> RuleKind {
        match self {
            Rule::Comp => RuleKind::Comp,
            Rule::PComp { .. } => RuleKind::PComp,
            Rule::Ce => RuleKind::Ce,
            Rule::Cce => RuleKind::Cce,
            Rule::Niche => RuleKind::Niche,
            Rule::Phy => RuleKind::Phy,
            Rule::OneTwoStep => RuleKind::OneTwoStep,
            Rule::MStep { .. } => RuleKind::MStep,
        }
    }

    /// Derives the undirected graph of `vertices` and `arcs` under this rule.
    ///
    /// Every input vertex appears in the output. Each unordered pair is
    /// tested once, so the output never holds more than one edge per pair.
    /// A hand-built parameter outside the accepted range is clamped into it.
    pub fn derive(&self, vertices: &[Vertex], arcs: &[Arc]) -> DerivedGraph {
        let index = AdjacencyIndex::build(vertices, arcs);
        let mut derived = DerivedGraph::empty(*self, vertices.to_vec());

        for (i, a) in vertices.iter().enumerate() {
            for b in &vertices[i + 1..] {
                if a.id != b.id && self.connects(&index, vertices, a.id, b.id) {
                    derived.insert_edge(a.id, b.id);
                }
            }
        }

        debug!(
            "Derived {} graph: {} vertices, {} edges",
            self,
            derived.vertex_count(),
            derived.edge_count()
        );

        derived
    }

    /// Decides whether `a` and `b` are joined in the derived graph.
    fn connects(
        &self,
        index: &AdjacencyIndex,
        vertices: &[Vertex],
        a: VertexId,
        b: VertexId,
    ) -> bool {
        match *self {
            Rule::Comp => index.share_out(a, b),
            Rule::PComp { p } => index.common_out_count(a, b) >= p.max(1) as usize,
            Rule::Ce => index.share_in(a, b),
            Rule::Cce => index.share_out(a, b) && index.share_in(a, b),
            Rule::Niche => index.share_out(a, b) || index.share_in(a, b),
            Rule::Phy => index.share_out(a, b) || index.has_arc(a, b) || index.has_arc(b, a),
            Rule::OneTwoStep => one_two_step(index, vertices, a, b),
            Rule::MStep { m } => {
                let steps = m.clamp(1, RuleParams::MAX_STEPS) as usize;
                let from_a = index.reachable_in_exactly_steps(a, steps);
                let from_b = index.reachable_in_exactly_steps(b, steps);
                !from_a.is_disjoint(&from_b)
            }
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::PComp { p } => write!(f, "p-comp(p={})", p),
            Rule::MStep { m } => write!(f, "m-step(m={})", m),
            other => f.write_str(other.kind().as_str()),
        }
    }
}

/// Some z outside the pair is reached by one member in exactly one step
/// and by the other in one or two steps. Two-step walks may not pass
/// through either pair member.
fn one_two_step(index: &AdjacencyIndex, vertices: &[Vertex], a: VertexId, b: VertexId) -> bool {
    let pair = [a, b];
    vertices
        .iter()
        .map(|v| v.id)
        .filter(|&z| z != a && z != b)
        .any(|z| {
            let a_direct = index.has_arc(a, z);
            let b_direct = index.has_arc(b, z);
            (a_direct && index.has_path_within_two(b, z, &pair))
                || (b_direct && index.has_path_within_two(a, z, &pair))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EdgeId;
    use std::collections::BTreeSet;

    fn graph(ids: &[u64], arcs: &[(u64, u64)]) -> (Vec<Vertex>, Vec<Arc>) {
        let vertices = ids
            .iter()
            .map(|&id| Vertex::new(id, format!("v{}", id)))
            .collect();
        let arcs = arcs
            .iter()
            .enumerate()
            .map(|(i, &(from, to))| Arc::new(format!("edge-{}", i), from, to))
            .collect();
        (vertices, arcs)
    }

    fn edges(rule: Rule, g: &(Vec<Vertex>, Vec<Arc>)) -> BTreeSet<EdgeId> {
        rule.derive(&g.0, &g.1).edge_ids()
    }

    fn pairs(list: &[(u64, u64)]) -> BTreeSet<EdgeId> {
        list.iter()
            .map(|&(a, b)| EdgeId::new(VertexId(a), VertexId(b)))
            .collect()
    }

    /// A small family of digraphs with different shapes.
    fn family() -> Vec<(Vec<Vertex>, Vec<Arc>)> {
        vec![
            graph(&[1, 2, 3], &[(1, 3), (2, 3)]),
            graph(&[1, 2, 3], &[(3, 1), (3, 2)]),
            graph(&[1, 2, 3], &[(1, 3), (3, 2)]),
            graph(&[1, 2, 3], &[(1, 2), (2, 3), (3, 1)]),
            graph(&[1, 2, 3, 4], &[(1, 2), (1, 3), (1, 4), (2, 3), (2, 4), (3, 4)]),
            graph(&[1, 2, 3, 4], &[(1, 2), (2, 1), (3, 4), (4, 3), (1, 3)]),
            graph(
                &[1, 2, 3, 4, 5, 6],
                &[(1, 4), (2, 4), (2, 5), (3, 5), (3, 6), (6, 1), (5, 1), (4, 6)],
            ),
            graph(&[1, 2, 3, 4, 5], &[]),
            graph(&[], &[]),
        ]
    }

    fn all_rules() -> Vec<Rule> {
        vec![
            Rule::Comp,
            Rule::PComp { p: 1 },
            Rule::PComp { p: 2 },
            Rule::Ce,
            Rule::Cce,
            Rule::Niche,
            Rule::Phy,
            Rule::OneTwoStep,
            Rule::MStep { m: 1 },
            Rule::MStep { m: 2 },
            Rule::MStep { m: 3 },
        ]
    }

    #[test]
    fn test_comp_common_out_neighbor() {
        let g = graph(&[1, 2, 3], &[(1, 3), (2, 3)]);
        assert_eq!(edges(Rule::Comp, &g), pairs(&[(1, 2)]));
    }

    #[test]
    fn test_ce_common_in_neighbor() {
        let g = graph(&[1, 2, 3], &[(3, 1), (3, 2)]);
        assert_eq!(edges(Rule::Ce, &g), pairs(&[(1, 2)]));
        assert!(edges(Rule::Comp, &g).is_empty());
    }

    #[test]
    fn test_path_graph_has_no_competition() {
        // 1 -> 3 -> 2
        let g = graph(&[1, 2, 3], &[(1, 3), (3, 2)]);
        assert!(edges(Rule::PComp { p: 1 }, &g).is_empty());
        // reach_2(1) = {2}, reach_2(2) = {}, reach_2(3) = {}
        assert!(edges(Rule::MStep { m: 2 }, &g).is_empty());
    }

    #[test]
    fn test_p_comp_threshold() {
        // 1 and 2 share out-neighbors 3 and 4; 1 and 5 share only 3
        let g = graph(&[1, 2, 3, 4, 5], &[(1, 3), (1, 4), (2, 3), (2, 4), (5, 3)]);
        assert_eq!(edges(Rule::PComp { p: 1 }, &g), pairs(&[(1, 2), (1, 5), (2, 5)]));
        assert_eq!(edges(Rule::PComp { p: 2 }, &g), pairs(&[(1, 2)]));
        assert!(edges(Rule::PComp { p: 3 }, &g).is_empty());
    }

    #[test]
    fn test_cce_and_niche() {
        // 1 and 2 share out-neighbor 3 and in-neighbor 4; 5 shares in-neighbor 4
        let g = graph(&[1, 2, 3, 4, 5], &[(1, 3), (2, 3), (4, 1), (4, 2), (4, 5)]);
        assert_eq!(edges(Rule::Cce, &g), pairs(&[(1, 2)]));
        assert_eq!(edges(Rule::Niche, &g), pairs(&[(1, 2), (1, 5), (2, 5)]));
    }

    #[test]
    fn test_phy_includes_direct_arcs() {
        let g = graph(&[1, 2, 3, 4], &[(1, 3), (2, 3), (4, 1)]);
        assert_eq!(edges(Rule::Phy, &g), pairs(&[(1, 2), (1, 3), (2, 3), (1, 4)]));
    }

    #[test]
    fn test_reverse_arcs_yield_one_edge() {
        let g = graph(&[1, 2], &[(1, 2), (2, 1)]);
        let derived = Rule::Phy.derive(&g.0, &g.1);
        assert_eq!(derived.edge_count(), 1);
        assert!(derived.contains_edge(VertexId(2), VertexId(1)));
    }

    #[test]
    fn test_one_two_step() {
        // 1 -> 3 directly, 2 -> 4 -> 3
        let g = graph(&[1, 2, 3, 4], &[(1, 3), (2, 4), (4, 3)]);
        assert_eq!(edges(Rule::OneTwoStep, &g), pairs(&[(1, 2), (1, 4)]));
    }

    #[test]
    fn test_one_two_step_avoids_pair_as_intermediate() {
        // 2 -> 3 directly; 1 reaches 3 only through 2
        let g = graph(&[1, 2, 3], &[(1, 2), (2, 3)]);
        assert!(edges(Rule::OneTwoStep, &g).is_empty());
    }

    #[test]
    fn test_m_step_exact_levels() {
        // 1 -> 2 -> 4, 3 -> 4: reach_2(1) = {4}, reach_1(3) = {4} but reach_2(3) = {}
        let g = graph(&[1, 2, 3, 4], &[(1, 2), (2, 4), (3, 4)]);
        assert!(edges(Rule::MStep { m: 2 }, &g).is_empty());
        assert_eq!(edges(Rule::MStep { m: 1 }, &g), pairs(&[(2, 3)]));

        // 1 -> 2 -> 4, 3 -> 5 -> 4
        let g = graph(&[1, 2, 3, 4, 5], &[(1, 2), (2, 4), (3, 5), (5, 4)]);
        assert_eq!(edges(Rule::MStep { m: 2 }, &g), pairs(&[(1, 3)]));
    }

    #[test]
    fn test_output_preserves_vertices() {
        for g in family() {
            for rule in all_rules() {
                let derived = rule.derive(&g.0, &g.1);
                assert_eq!(derived.vertices(), g.0.as_slice(), "rule {}", rule);
            }
        }
    }

    #[test]
    fn test_edges_are_normalized_pairs() {
        for g in family() {
            for rule in all_rules() {
                for edge in rule.derive(&g.0, &g.1).edges() {
                    assert!(edge.from < edge.to);
                    assert_eq!(edge.id, EdgeId::new(edge.to, edge.from));
                }
            }
        }
    }

    #[test]
    fn test_derivation_is_idempotent() {
        for g in family() {
            for rule in all_rules() {
                assert_eq!(rule.derive(&g.0, &g.1), rule.derive(&g.0, &g.1));
            }
        }
    }

    #[test]
    fn test_rule_relationships() {
        for g in family() {
            let comp = edges(Rule::Comp, &g);
            let ce = edges(Rule::Ce, &g);
            let cce = edges(Rule::Cce, &g);
            let niche = edges(Rule::Niche, &g);
            let phy = edges(Rule::Phy, &g);

            assert!(cce.is_subset(&comp));
            assert!(cce.is_subset(&ce));
            assert_eq!(niche, comp.union(&ce).copied().collect::<BTreeSet<_>>());
            assert!(comp.is_subset(&phy));
            assert_eq!(edges(Rule::MStep { m: 1 }, &g), comp);
            assert_eq!(edges(Rule::PComp { p: 1 }, &g), comp);
            assert!(edges(Rule::PComp { p: 2 }, &g).is_subset(&comp));
        }
    }

    #[test]
    fn test_parse_rule_names() {
        assert_eq!("comp".parse::<RuleKind>().unwrap(), RuleKind::Comp);
        assert_eq!("P-COMP".parse::<RuleKind>().unwrap(), RuleKind::PComp);
        assert_eq!("(1,2)-step".parse::<RuleKind>().unwrap(), RuleKind::OneTwoStep);
        assert_eq!(" m-step ".parse::<RuleKind>().unwrap(), RuleKind::MStep);
        for kind in RuleKind::ALL {
            assert_eq!(kind.as_str().parse::<RuleKind>().unwrap(), kind);
        }
        assert_eq!(
            "food-web".parse::<RuleKind>(),
            Err(RuleError::UnknownRule {
                name: "food-web".to_string()
            })
        );
    }

    #[test]
    fn test_parse_parameter_values() {
        assert_eq!(RuleParams::parse_value(Param::P, " 3 "), Ok(3));
        assert!(matches!(
            RuleParams::parse_value(Param::M, "two"),
            Err(RuleError::InvalidParameter { reason: "not an integer", .. })
        ));
        assert!(matches!(
            RuleParams::parse_value(Param::P, "0"),
            Err(RuleError::InvalidParameter { reason: "must be at least 1", .. })
        ));
        assert!(matches!(
            RuleParams::parse_value(Param::M, "-4"),
            Err(RuleError::InvalidParameter { .. })
        ));
        assert!(RuleParams::parse_value(Param::M, "257").is_err());
        assert!(RuleParams::parse_value(Param::M, "1.5").is_err());
    }

    #[test]
    fn test_resolve_reads_params() {
        let params = RuleParams { p: 2, m: 5 };
        assert_eq!(Rule::resolve(RuleKind::PComp, &params), Ok(Rule::PComp { p: 2 }));
        assert_eq!(Rule::resolve(RuleKind::MStep, &params), Ok(Rule::MStep { m: 5 }));
        assert_eq!(Rule::resolve(RuleKind::Ce, &params), Ok(Rule::Ce));

        let bad = RuleParams { p: 0, m: 5 };
        assert!(Rule::resolve(RuleKind::PComp, &bad).is_err());
        assert!(Rule::resolve(RuleKind::MStep, &bad).is_ok());
    }

    #[test]
    fn test_rule_serde() {
        let json = serde_json::to_value(Rule::MStep { m: 3 }).unwrap();
        assert_eq!(json, serde_json::json!({"name": "m-step", "m": 3}));
        let rule: Rule = serde_json::from_str(r#"{"name": "one-two-step"}"#).unwrap();
        assert_eq!(rule, Rule::OneTwoStep);

        let kind: RuleKind = serde_json::from_str(r#""niche""#).unwrap();
        assert_eq!(kind, RuleKind::Niche);
        assert!(serde_json::from_str::<RuleKind>(r#""nope""#).is_err());
    }

    #[test]
    fn test_rule_deserialize_checks_parameter() {
        let rule: Rule = serde_json::from_str(r#"{"name": "p-comp", "p": 2}"#).unwrap();
        assert_eq!(rule, Rule::PComp { p: 2 });

        assert!(serde_json::from_str::<Rule>(r#"{"name": "p-comp", "p": 0}"#).is_err());
        assert!(serde_json::from_str::<Rule>(r#"{"name": "m-step", "m": 0}"#).is_err());
        assert!(serde_json::from_str::<Rule>(r#"{"name": "m-step", "m": 4294967295}"#).is_err());
    }

    #[test]
    fn test_hand_built_parameters_are_clamped() {
        let star = graph(&[1, 2, 3, 4], &[(1, 4), (2, 4)]);
        assert_eq!(
            edges(Rule::PComp { p: 0 }, &star),
            edges(Rule::PComp { p: 1 }, &star)
        );

        // a directed cycle never runs out of walks
        let cycle = graph(&[1, 2, 3], &[(1, 2), (2, 3), (3, 1)]);
        assert_eq!(
            edges(Rule::MStep { m: u32::MAX }, &cycle),
            edges(Rule::MStep { m: RuleParams::MAX_STEPS }, &cycle)
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(Rule::PComp { p: 2 }.to_string(), "p-comp(p=2)");
        assert_eq!(Rule::Cce.to_string(), "cce");
        assert_eq!(RuleKind::OneTwoStep.to_string(), "one-two-step");
    }
}
