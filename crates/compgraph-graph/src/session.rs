//! Editing session.
//!
//! A Session owns the source digraph, the active rule with its
//! parameters, and the derived graph. Every successful edit ends with a
//! full, synchronous recomputation of the derived graph; a failed edit
//! changes nothing and recomputes nothing.

use crate::config::EditorConfig;
use crate::graph::{DigraphStore, ReverseArcs};
use crate::interchange::{GraphDocument, ImportedGraph, InterchangeError};
use compgraph_core::{
    Arc, ArcId, DerivedGraph, Param, Position, Result, Rule, RuleKind, RuleParams, StoreError,
    Vertex, VertexId,
};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};

/// The source digraph, the rule selection and the derived graph, kept in
/// sync.
#[derive(Debug, Clone)]
pub struct Session {
    store: DigraphStore,
    rule: RuleKind,
    params: RuleParams,
    derived: DerivedGraph,

    label_prefix: String,
    /// Number used for the next generated label.
    label_counter: u64,
    /// Last vertex id handed out by `add_vertex`.
    last_vertex_id: u64,
    /// Sequence for generated arc ids.
    arc_seq: u64,
    /// Bumped by every recomputation.
    revision: u64,
}

impl Default for Session {
    fn default() -> Self {
        Self::from_parts(
            DigraphStore::new(),
            RuleKind::default(),
            RuleParams::default(),
            "v".to_string(),
        )
    }
}

impl Session {
    /// Creates an empty session with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty session from a configuration.
    pub fn with_config(config: &EditorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_parts(
            DigraphStore::with_policy(config.reverse_arcs),
            config.rule,
            config.params(),
            config.label_prefix.clone(),
        ))
    }

    fn from_parts(
        store: DigraphStore,
        rule: RuleKind,
        params: RuleParams,
        label_prefix: String,
    ) -> Self {
        let mut session = Self {
            store,
            rule,
            params,
            derived: DerivedGraph::default(),
            label_prefix,
            label_counter: 1,
            last_vertex_id: 0,
            arc_seq: 0,
            revision: 0,
        };
        session.refresh();
        session
    }

    // ─────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────

    pub fn store(&self) -> &DigraphStore {
        &self.store
    }

    pub fn derived(&self) -> &DerivedGraph {
        &self.derived
    }

    pub fn rule_kind(&self) -> RuleKind {
        self.rule
    }

    pub fn params(&self) -> RuleParams {
        self.params
    }

    /// The resolved rule the derived graph was computed with.
    pub fn rule(&self) -> Rule {
        self.derived.rule()
    }

    pub fn reverse_arcs(&self) -> ReverseArcs {
        self.store.reverse_arcs()
    }

    /// Number of recomputations so far.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    // ─────────────────────────────────────────────────────────────────────
    // Vertex edits
    // ─────────────────────────────────────────────────────────────────────

    /// Adds a vertex with a fresh id and the next generated label.
    pub fn add_vertex(&mut self, position: Position) -> Result<VertexId> {
        let label = format!("{}{}", self.label_prefix, self.label_counter);
        let id = self.push_vertex(label, position)?;
        self.label_counter += 1;
        Ok(id)
    }

    /// Adds a vertex with a fresh id and the given label.
    ///
    /// Generated label numbering is not advanced.
    pub fn add_vertex_labeled(
        &mut self,
        label: impl Into<String>,
        position: Position,
    ) -> Result<VertexId> {
        self.push_vertex(label.into(), position)
    }

    fn push_vertex(&mut self, label: String, position: Position) -> Result<VertexId> {
        let id = self.next_vertex_id()?;
        self.insert_vertex(Vertex {
            id,
            label,
            position,
        })
    }

    /// Adds a vertex with a caller-chosen id.
    pub fn insert_vertex(&mut self, vertex: Vertex) -> Result<VertexId> {
        let id = vertex.id;
        self.store.add_vertex(vertex)?;
        self.last_vertex_id = self.last_vertex_id.max(id.get());
        debug!("Added vertex {}", id);
        self.recompute()?;
        Ok(id)
    }

    /// Removes a vertex and every arc touching it.
    pub fn remove_vertex(&mut self, id: VertexId) -> Result<Vertex> {
        let (vertex, arcs) = self.store.remove_vertex(id)?;
        debug!("Removed vertex {} and {} arcs", id, arcs.len());
        self.recompute()?;
        Ok(vertex)
    }

    /// Moves a vertex. The derived graph is regenerated so it picks up the
    /// new position.
    pub fn move_vertex(&mut self, id: VertexId, position: Position) -> Result<()> {
        self.store.move_vertex(id, position)?;
        self.recompute()
    }

    pub fn relabel_vertex(&mut self, id: VertexId, label: impl Into<String>) -> Result<()> {
        self.store.relabel_vertex(id, label)?;
        self.recompute()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Arc edits
    // ─────────────────────────────────────────────────────────────────────

    /// Adds the arc `from -> to` with a generated id.
    ///
    /// Self-loops and duplicate arcs are rejected and leave the session
    /// unchanged.
    pub fn add_arc(&mut self, from: VertexId, to: VertexId) -> Result<ArcId> {
        let id = self.next_arc_id(from, to);
        self.insert_arc(Arc { id, from, to })
    }

    /// Adds an arc with a caller-chosen id.
    pub fn insert_arc(&mut self, arc: Arc) -> Result<ArcId> {
        let id = arc.id.clone();
        let (from, to) = (arc.from, arc.to);
        if let Err(err) = self.store.add_arc(arc) {
            warn!("Rejected arc {} -> {}: {}", from, to, err);
            return Err(err.into());
        }
        debug!("Added arc {} ({} -> {})", id, from, to);
        self.recompute()?;
        Ok(id)
    }

    pub fn remove_arc(&mut self, id: &ArcId) -> Result<Arc> {
        let arc = self.store.remove_arc(id)?;
        debug!("Removed arc {}", id);
        self.recompute()?;
        Ok(arc)
    }

    /// Re-points an arc. Returns the arc as it was before.
    pub fn update_arc(&mut self, id: &ArcId, from: VertexId, to: VertexId) -> Result<Arc> {
        let before = match self.store.update_arc(id, from, to) {
            Ok(before) => before,
            Err(err) => {
                warn!("Rejected update of arc {}: {}", id, err);
                return Err(err.into());
            }
        };
        debug!("Updated arc {} to {} -> {}", id, from, to);
        self.recompute()?;
        Ok(before)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Rule selection
    // ─────────────────────────────────────────────────────────────────────

    /// Makes `kind` the active rule and recomputes.
    pub fn select_rule(&mut self, kind: RuleKind) -> Result<()> {
        let rule = Rule::resolve(kind, &self.params)?;
        self.rule = kind;
        info!("Rule changed to: {}", rule);
        self.recompute()
    }

    /// Parses and selects a rule by name.
    pub fn select_rule_by_name(&mut self, name: &str) -> Result<()> {
        let kind: RuleKind = name.parse()?;
        self.select_rule(kind)
    }

    /// Sets a rule parameter and recomputes.
    ///
    /// An out-of-range value is rejected and the previous value kept.
    pub fn set_param(&mut self, param: Param, value: u32) -> Result<()> {
        let mut params = self.params;
        params.set(param, value)?;
        self.params = params;
        debug!("Parameter {} set to {}", param, value);
        self.recompute()
    }

    /// Parses raw user input for a rule parameter and applies it.
    pub fn set_param_str(&mut self, param: Param, raw: &str) -> Result<()> {
        let value = RuleParams::parse_value(param, raw)?;
        self.set_param(param, value)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Whole-graph operations
    // ─────────────────────────────────────────────────────────────────────

    /// Removes every vertex and arc and restarts label numbering.
    pub fn clear(&mut self) -> Result<()> {
        self.store.clear();
        self.label_counter = 1;
        info!("Graphs cleared");
        self.recompute()
    }

    /// Swaps in a validated import.
    pub fn replace(&mut self, imported: ImportedGraph) -> Result<()> {
        let ImportedGraph {
            store,
            rule,
            params,
        } = imported;
        // check first so a bad selection leaves the session untouched
        params.validate()?;
        Rule::resolve(rule, &params)?;

        self.last_vertex_id = store
            .vertex_ids()
            .iter()
            .map(|id| id.get())
            .max()
            .unwrap_or(0)
            .max(self.last_vertex_id);
        self.label_counter = store.vertex_count() as u64 + 1;
        self.store = store;
        self.rule = rule;
        self.params = params;
        info!(
            "Loaded graph: {} vertices, {} arcs, rule {}",
            self.store.vertex_count(),
            self.store.arc_count(),
            self.rule
        );
        self.recompute()
    }

    /// Validates a document and swaps it in. On error the session is
    /// unchanged.
    pub fn load_document(&mut self, document: &GraphDocument) -> crate::interchange::Result<()> {
        let imported = document.validate(self.store.reverse_arcs(), self.params)?;
        self.replace(imported).map_err(|err| match err {
            compgraph_core::Error::Rule(e) => InterchangeError::from(e),
            compgraph_core::Error::Store(e) => InterchangeError::from(e),
        })
    }

    /// Captures the session as an exchange document.
    pub fn to_document(&self) -> GraphDocument {
        GraphDocument::from_store(&self.store, self.rule, self.params)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Recomputation
    // ─────────────────────────────────────────────────────────────────────

    /// Recomputes the derived graph from scratch under the active rule.
    ///
    /// The rule and its parameter are read now, never cached.
    pub fn recompute(&mut self) -> Result<()> {
        let rule = Rule::resolve(self.rule, &self.params)?;
        self.derived = rule.derive(&self.store.vertices(), &self.store.arcs());
        self.revision += 1;
        debug!(
            "Undirected graph data updated: {} vertices, {} edges",
            self.derived.vertex_count(),
            self.derived.edge_count()
        );
        Ok(())
    }

    /// Recompute used at construction, where the selection is already
    /// known to be valid.
    fn refresh(&mut self) {
        if let Err(err) = self.recompute() {
            warn!("Initial recompute failed: {}", err);
        }
    }

    /// Picks an id above every id handed out so far, or the lowest free id
    /// once the top of the range is taken.
    fn next_vertex_id(&mut self) -> Result<VertexId> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);

        let above = self
            .last_vertex_id
            .checked_add(1)
            .and_then(|next| self.free_vertex_id(next.max(now)));
        if let Some(id) = above {
            self.last_vertex_id = id.get();
            return Ok(id);
        }

        self.free_vertex_id(0)
            .ok_or_else(|| StoreError::VertexIdsExhausted.into())
    }

    fn free_vertex_id(&self, start: u64) -> Option<VertexId> {
        (start..=u64::MAX)
            .map(VertexId)
            .find(|id| !self.store.contains_vertex(*id))
    }

    fn next_arc_id(&mut self, from: VertexId, to: VertexId) -> ArcId {
        loop {
            self.arc_seq += 1;
            let id = ArcId::generate(from, to, self.arc_seq);
            if self.store.get_arc(&id).is_none() {
                return id;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interchange::parse_adjacency_csv;
    use compgraph_core::{EdgeId, Error, RuleError, StoreError};

    fn session_with(ids: &[u64], arcs: &[(u64, u64)]) -> Session {
        let mut session = Session::new();
        for &id in ids {
            session.insert_vertex(Vertex::new(id, format!("v{}", id))).unwrap();
        }
        for &(from, to) in arcs {
            session.add_arc(VertexId(from), VertexId(to)).unwrap();
        }
        session
    }

    fn edge_pairs(session: &Session) -> Vec<(u64, u64)> {
        session
            .derived()
            .edges()
            .map(|e| (e.from.get(), e.to.get()))
            .collect()
    }

    #[test]
    fn test_every_edit_recomputes() {
        let mut session = session_with(&[1, 2, 3], &[]);
        assert!(edge_pairs(&session).is_empty());

        session.add_arc(VertexId(1), VertexId(3)).unwrap();
        assert!(edge_pairs(&session).is_empty());

        let revision = session.revision();
        session.add_arc(VertexId(2), VertexId(3)).unwrap();
        assert_eq!(edge_pairs(&session), vec![(1, 2)]);
        assert_eq!(session.revision(), revision + 1);
    }

    #[test]
    fn test_generated_vertices() {
        let mut session = Session::new();
        let a = session.add_vertex(Position::new(1.0, 2.0)).unwrap();
        let b = session.add_vertex(Position::default()).unwrap();

        assert!(b > a);
        assert_eq!(session.store().get_vertex(a).unwrap().label, "v1");
        assert_eq!(session.store().get_vertex(b).unwrap().label, "v2");
        assert_eq!(session.derived().vertex_count(), 2);
    }

    #[test]
    fn test_rejected_arc_changes_nothing() {
        let mut session = session_with(&[1, 2, 3], &[(1, 3), (2, 3)]);
        let revision = session.revision();
        let derived = session.derived().clone();

        assert_eq!(
            session.add_arc(VertexId(1), VertexId(3)),
            Err(Error::Store(StoreError::DuplicateArc {
                from: VertexId(1),
                to: VertexId(3)
            }))
        );
        assert!(matches!(
            session.add_arc(VertexId(2), VertexId(2)),
            Err(Error::Store(StoreError::SelfLoop { .. }))
        ));

        assert_eq!(session.revision(), revision);
        assert_eq!(session.derived(), &derived);
        assert_eq!(session.store().arc_count(), 2);
    }

    #[test]
    fn test_remove_vertex_regenerates() {
        let mut session = session_with(&[1, 2, 3, 4], &[(1, 3), (2, 3), (4, 3)]);
        assert_eq!(edge_pairs(&session), vec![(1, 2), (1, 4), (2, 4)]);

        session.remove_vertex(VertexId(2)).unwrap();
        assert_eq!(session.store().arc_count(), 2);
        assert_eq!(edge_pairs(&session), vec![(1, 4)]);
        assert!(session
            .derived()
            .vertices()
            .iter()
            .all(|v| v.id != VertexId(2)));

        session.remove_vertex(VertexId(3)).unwrap();
        assert!(edge_pairs(&session).is_empty());
        assert_eq!(session.store().arc_count(), 0);
    }

    #[test]
    fn test_update_and_remove_arc() {
        let mut session = session_with(&[1, 2, 3, 4], &[(1, 3), (2, 4)]);
        assert!(edge_pairs(&session).is_empty());

        let id = session.store().find_arc(VertexId(2), VertexId(4)).unwrap().id;
        session.update_arc(&id, VertexId(2), VertexId(3)).unwrap();
        assert_eq!(edge_pairs(&session), vec![(1, 2)]);

        session.remove_arc(&id).unwrap();
        assert!(edge_pairs(&session).is_empty());
    }

    #[test]
    fn test_select_rule() {
        let mut session = session_with(&[1, 2, 3], &[(3, 1), (3, 2)]);
        assert!(edge_pairs(&session).is_empty());

        session.select_rule(RuleKind::Ce).unwrap();
        assert_eq!(session.rule(), Rule::Ce);
        assert_eq!(edge_pairs(&session), vec![(1, 2)]);

        assert!(matches!(
            session.select_rule_by_name("food-web"),
            Err(Error::Rule(RuleError::UnknownRule { .. }))
        ));
        assert_eq!(session.rule_kind(), RuleKind::Ce);
    }

    #[test]
    fn test_params_read_at_recompute() {
        // 1 -> 2 -> 4, 3 -> 5 -> 4
        let mut session = session_with(&[1, 2, 3, 4, 5], &[(1, 2), (2, 4), (3, 5), (5, 4)]);
        session.select_rule(RuleKind::MStep).unwrap();
        assert_eq!(session.rule(), Rule::MStep { m: 2 });
        assert_eq!(edge_pairs(&session), vec![(1, 3)]);

        session.set_param(Param::M, 1).unwrap();
        assert_eq!(edge_pairs(&session), vec![(2, 5)]);

        session.set_param_str(Param::M, "3").unwrap();
        assert!(edge_pairs(&session).is_empty());
    }

    #[test]
    fn test_bad_param_keeps_previous_state() {
        let mut session = session_with(&[1, 2, 3], &[(1, 3), (2, 3)]);
        session.select_rule(RuleKind::PComp).unwrap();
        let revision = session.revision();

        assert!(matches!(
            session.set_param_str(Param::P, "lots"),
            Err(Error::Rule(RuleError::InvalidParameter { .. }))
        ));
        assert!(session.set_param(Param::P, 0).is_err());

        assert_eq!(session.params().p, 1);
        assert_eq!(session.revision(), revision);
        assert_eq!(edge_pairs(&session), vec![(1, 2)]);
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let mut session = session_with(&[1, 2, 3, 4], &[(1, 2), (2, 3), (3, 4), (4, 1), (1, 3)]);
        for kind in RuleKind::ALL {
            session.select_rule(kind).unwrap();
            let first = session.derived().edge_ids();
            session.recompute().unwrap();
            assert_eq!(session.derived().edge_ids(), first);
        }
    }

    #[test]
    fn test_reverse_arc_policy_from_config() {
        let config = EditorConfig {
            reverse_arcs: ReverseArcs::Reject,
            ..EditorConfig::default()
        };
        let mut session = Session::with_config(&config).unwrap();
        session.insert_vertex(Vertex::new(1, "a")).unwrap();
        session.insert_vertex(Vertex::new(2, "b")).unwrap();
        session.add_arc(VertexId(1), VertexId(2)).unwrap();
        assert!(matches!(
            session.add_arc(VertexId(2), VertexId(1)),
            Err(Error::Store(StoreError::DuplicateArc { .. }))
        ));
    }

    #[test]
    fn test_with_config_validates() {
        let config = EditorConfig {
            m: 0,
            ..EditorConfig::default()
        };
        assert!(Session::with_config(&config).is_err());

        let config = EditorConfig {
            rule: RuleKind::PComp,
            p: 2,
            label_prefix: "s".to_string(),
            ..EditorConfig::default()
        };
        let mut session = Session::with_config(&config).unwrap();
        assert_eq!(session.rule(), Rule::PComp { p: 2 });
        let id = session.add_vertex(Position::default()).unwrap();
        assert_eq!(session.store().get_vertex(id).unwrap().label, "s1");
    }

    #[test]
    fn test_clear_resets_labels() {
        let mut session = Session::new();
        session.add_vertex(Position::default()).unwrap();
        session.add_vertex(Position::default()).unwrap();
        session.clear().unwrap();

        assert!(session.store().is_empty());
        assert_eq!(session.derived().vertex_count(), 0);
        let id = session.add_vertex(Position::default()).unwrap();
        assert_eq!(session.store().get_vertex(id).unwrap().label, "v1");
    }

    #[test]
    fn test_document_round_trip() {
        let mut session = session_with(&[1, 2, 3], &[(1, 3), (2, 3)]);
        session.select_rule(RuleKind::Niche).unwrap();
        session.set_param(Param::P, 3).unwrap();
        let document = session.to_document();

        let mut other = Session::new();
        other.load_document(&document).unwrap();
        assert_eq!(other.rule_kind(), RuleKind::Niche);
        assert_eq!(other.params().p, 3);
        assert_eq!(other.store().arcs(), session.store().arcs());
        assert_eq!(other.derived().edge_ids(), session.derived().edge_ids());

        // new vertices never collide with loaded ids
        let id = other.add_vertex(Position::default()).unwrap();
        assert!(id > VertexId(3));
    }

    #[test]
    fn test_failed_import_leaves_session_untouched() {
        let mut session = session_with(&[1, 2, 3], &[(1, 3), (2, 3)]);
        let revision = session.revision();

        let bad = parse_adjacency_csv("0,1\n1,1\n".as_bytes()).unwrap();
        assert!(session.load_document(&bad).is_err());
        assert!(parse_adjacency_csv("0,1\n1\n".as_bytes()).is_err());

        assert_eq!(session.revision(), revision);
        assert_eq!(session.store().vertex_count(), 3);
        assert!(session
            .derived()
            .contains_edge(VertexId(1), VertexId(2)));
    }

    #[test]
    fn test_csv_import_derives() {
        let mut session = Session::new();
        let document = parse_adjacency_csv("0,0,1\n0,0,1\n0,0,0\n".as_bytes()).unwrap();
        session.load_document(&document).unwrap();

        assert_eq!(session.store().vertex_count(), 3);
        assert_eq!(
            session.derived().edge_ids().into_iter().collect::<Vec<_>>(),
            vec![EdgeId::new(VertexId(0), VertexId(1))]
        );
    }

    #[test]
    fn test_add_vertex_after_max_id() {
        let document = GraphDocument::from_json(
            r#"{"nodes": [{"id": 18446744073709551615, "label": "top"}], "edges": []}"#,
        )
        .unwrap();
        let mut session = Session::new();
        session.load_document(&document).unwrap();

        let a = session.add_vertex(Position::default()).unwrap();
        let b = session.add_vertex(Position::default()).unwrap();
        assert_eq!(a, VertexId(0));
        assert_eq!(b, VertexId(1));
        assert_eq!(session.store().vertex_count(), 3);
    }

    #[test]
    fn test_add_vertex_labeled_is_one_edit() {
        let mut session = Session::new();
        let revision = session.revision();
        let id = session
            .add_vertex_labeled("grass", Position::new(3.0, 4.0))
            .unwrap();

        assert_eq!(session.revision(), revision + 1);
        let vertex = session.store().get_vertex(id).unwrap();
        assert_eq!(vertex.label, "grass");
        assert_eq!(vertex.position, Position::new(3.0, 4.0));

        // generated numbering is untouched
        let next = session.add_vertex(Position::default()).unwrap();
        assert_eq!(session.store().get_vertex(next).unwrap().label, "v1");
    }

    #[test]
    fn test_vertex_and_whole_graph_edits_recompute() {
        let mut session = session_with(&[1, 2, 3], &[(1, 3), (2, 3)]);

        let revision = session.revision();
        session
            .move_vertex(VertexId(1), Position::new(5.0, 6.0))
            .unwrap();
        assert_eq!(session.revision(), revision + 1);
        assert_eq!(
            session.derived().vertices()[0].position,
            Position::new(5.0, 6.0)
        );

        session.relabel_vertex(VertexId(2), "wolf").unwrap();
        assert_eq!(session.revision(), revision + 2);
        assert_eq!(session.derived().vertices()[1].label, "wolf");

        let imported = session
            .to_document()
            .validate(ReverseArcs::Allow, RuleParams::default())
            .unwrap();
        session.clear().unwrap();
        assert_eq!(session.revision(), revision + 3);
        assert_eq!(session.derived().vertex_count(), 0);

        session.replace(imported).unwrap();
        assert_eq!(session.revision(), revision + 4);
        assert!(session.derived().contains_edge(VertexId(1), VertexId(2)));
    }

    #[test]
    fn test_replace_rejects_bad_selection() {
        let mut session = session_with(&[1, 2, 3], &[(1, 3), (2, 3)]);
        let revision = session.revision();
        let derived = session.derived().clone();

        let bad_params = ImportedGraph {
            store: DigraphStore::new(),
            rule: RuleKind::Comp,
            params: RuleParams { p: 0, m: 2 },
        };
        assert!(matches!(
            session.replace(bad_params),
            Err(Error::Rule(RuleError::InvalidParameter { .. }))
        ));

        let bad_rule = ImportedGraph {
            store: DigraphStore::new(),
            rule: RuleKind::MStep,
            params: RuleParams {
                p: 1,
                m: RuleParams::MAX_STEPS + 1,
            },
        };
        assert!(session.replace(bad_rule).is_err());

        assert_eq!(session.revision(), revision);
        assert_eq!(session.derived(), &derived);
        assert_eq!(session.store().vertex_count(), 3);
        assert_eq!(session.params(), RuleParams::default());
    }
}
