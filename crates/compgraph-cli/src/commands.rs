//! CLI command implementations.

use crate::repl::Repl;
use colored::Colorize;
use compgraph_core::{RuleKind, VertexId};
use compgraph_graph::{
    read_adjacency_csv, read_document, write_adjacency_csv, write_document, EditorConfig,
    GraphDocument, Session,
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Finds the config for the current directory.
pub fn load_config(explicit: Option<&Path>) -> Result<EditorConfig> {
    let cwd = std::env::current_dir()?;
    let config = EditorConfig::discover(explicit, &cwd)?;
    debug!("Using rule {} with p={} m={}", config.rule, config.p, config.m);
    Ok(config)
}

/// Opens a graph document in a new session.
pub fn open_session(config: &EditorConfig, file: &Path) -> Result<Session> {
    let mut session = Session::with_config(config)?;
    let document = read_document(file)?;
    session.load_document(&document)?;
    Ok(session)
}

/// Initialize Compgraph in a directory.
pub fn init(path: &Path) -> Result<()> {
    let config_path = EditorConfig::local_path(path);

    if config_path.exists() {
        println!("{} Already initialized", "✓".green());
        return Ok(());
    }

    EditorConfig::default().save(&config_path)?;

    println!("{} Initialized Compgraph in {}", "✓".green(), path.display());
    println!("  Edit {} to change the default rule", config_path.display());
    println!("  Run {} to start editing", "compgraph edit".cyan());

    Ok(())
}

/// List every rule with its edge condition.
pub fn rules() -> Result<()> {
    println!("{}", "Rules:".bold());
    for kind in RuleKind::ALL {
        let name = match kind.parameter() {
            Some(param) => format!("{}({})", kind, param),
            None => kind.to_string(),
        };
        println!("  {:<14} {}", name.cyan(), kind.condition());
    }
    Ok(())
}

/// Print the derived graph of a saved digraph.
pub fn derive(
    config: Option<&Path>,
    file: &Path,
    rule: Option<&str>,
    param: Option<u32>,
    json: bool,
) -> Result<()> {
    let config = load_config(config)?;
    let mut session = open_session(&config, file)?;

    if let Some(name) = rule {
        session.select_rule_by_name(name)?;
    }
    if let Some(value) = param {
        let kind = session.rule_kind();
        match kind.parameter() {
            Some(p) => session.set_param(p, value)?,
            None => return Err(format!("rule '{}' takes no parameter", kind).into()),
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(session.derived())?);
    } else {
        print_derived(&session);
    }

    Ok(())
}

/// Show how many edges every rule derives from the same digraph.
pub fn compare(config: Option<&Path>, file: &Path) -> Result<()> {
    let config = load_config(config)?;
    let mut session = open_session(&config, file)?;
    let stats = session.store().stats();

    println!(
        "{} ({} vertices, {} arcs)\n",
        file.display().to_string().cyan(),
        stats.vertex_count,
        stats.arc_count
    );

    for kind in RuleKind::ALL {
        session.select_rule(kind)?;
        let derived = session.derived();
        println!(
            "  {:<14} {:>5} edges  {}",
            derived.rule().to_string().yellow(),
            derived.edge_count(),
            format!("({} isolated)", derived.isolated().len()).dimmed()
        );
    }

    Ok(())
}

/// Convert an adjacency matrix into a graph document.
pub fn import_csv(
    config: Option<&Path>,
    input: &Path,
    output: &Path,
    rule: Option<&str>,
) -> Result<()> {
    let config = load_config(config)?;
    let mut document = read_adjacency_csv(input)?;
    document.rule = match rule {
        Some(name) => name.parse::<RuleKind>()?.as_str().to_string(),
        None => config.rule.as_str().to_string(),
    };

    let imported = document.validate(config.reverse_arcs, config.params())?;
    let document = GraphDocument::from_store(&imported.store, imported.rule, imported.params);
    write_document(output, &document)?;

    println!(
        "{} Imported {} vertices and {} arcs into {}",
        "✓".green(),
        document.nodes.len().to_string().cyan(),
        document.edges.len().to_string().cyan(),
        output.display()
    );

    Ok(())
}

/// Write a graph document's adjacency matrix.
pub fn export_csv(config: Option<&Path>, file: &Path, output: &Path) -> Result<()> {
    let config = load_config(config)?;
    let session = open_session(&config, file)?;

    let out = fs::File::create(output)?;
    write_adjacency_csv(session.store(), out)?;

    println!(
        "{} Exported {}x{} matrix to {}",
        "✓".green(),
        session.store().vertex_count(),
        session.store().vertex_count(),
        output.display()
    );

    Ok(())
}

/// Start the interactive editor.
pub fn edit(config: Option<&Path>, file: Option<PathBuf>) -> Result<()> {
    let config = load_config(config)?;
    let session = match &file {
        Some(path) if path.exists() => open_session(&config, path)?,
        _ => Session::with_config(&config)?,
    };

    Repl::new(session, file).run()
}

// ─────────────────────────────────────────────────────────────────────────────
// Output helpers
// ─────────────────────────────────────────────────────────────────────────────

fn label(session: &Session, id: VertexId) -> String {
    session
        .store()
        .get_vertex(id)
        .map(|v| v.label.clone())
        .unwrap_or_else(|| id.to_string())
}

/// Print the source digraph.
pub fn print_digraph(session: &Session) {
    let stats = session.store().stats();
    println!(
        "{} {} vertices, {} arcs ({} sources, {} sinks)",
        "Digraph:".bold(),
        stats.vertex_count,
        stats.arc_count,
        stats.sources,
        stats.sinks
    );

    for vertex in session.store().vertices() {
        println!(
            "  {} {} {}",
            vertex.id.to_string().yellow(),
            vertex.label.cyan(),
            format!("({:.1}, {:.1})", vertex.position.x, vertex.position.y).dimmed()
        );
    }
    for arc in session.store().arcs() {
        println!(
            "  {} {} -> {}",
            arc.id.to_string().dimmed(),
            label(session, arc.from).cyan(),
            label(session, arc.to).cyan()
        );
    }
}

/// Print the derived graph.
pub fn print_derived(session: &Session) {
    let derived = session.derived();
    println!(
        "{} {}: {} vertices, {} edges",
        "Rule".bold(),
        derived.rule().to_string().yellow(),
        derived.vertex_count(),
        derived.edge_count()
    );

    if derived.edge_count() == 0 {
        println!("  No edges");
    }
    for edge in derived.edges() {
        println!(
            "  {} {} -- {}",
            edge.id.to_string().dimmed(),
            label(session, edge.from).cyan(),
            label(session, edge.to).cyan()
        );
    }

    let isolated = derived.isolated();
    if !isolated.is_empty() {
        let names: Vec<String> = isolated.into_iter().map(|id| label(session, id)).collect();
        println!("  {} {}", "isolated:".dimmed(), names.join(", "));
    }
}
