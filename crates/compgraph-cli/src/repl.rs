//! Interactive editor.
//!
//! Each line is one command; the first word picks the handler. Every
//! successful edit recomputes the derived graph, so `derived` always shows
//! the current result.

use crate::commands::{self, print_derived, print_digraph};
use colored::Colorize;
use compgraph_core::{ArcId, Param, Position, RuleKind, VertexId};
use compgraph_graph::{read_adjacency_csv, read_document, write_document, Session};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Result of a REPL command execution.
#[derive(Debug, PartialEq)]
pub enum CommandResult {
    Continue,
    Quit,
    Error(String),
}

impl From<Result<(), String>> for CommandResult {
    fn from(result: Result<(), String>) -> Self {
        match result {
            Ok(()) => CommandResult::Continue,
            Err(msg) => CommandResult::Error(msg),
        }
    }
}

type CmdResult = Result<(), String>;

pub struct Repl {
    session: Session,
    /// File used by `save` when no path is given.
    path: Option<PathBuf>,
}

impl Repl {
    pub fn new(session: Session, path: Option<PathBuf>) -> Self {
        Self { session, path }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Runs the read-eval-print loop until `quit` or end of input.
    pub fn run(mut self) -> commands::Result<()> {
        let mut editor = DefaultEditor::new()?;

        println!(
            "{} {}",
            "compgraph".cyan().bold(),
            env!("CARGO_PKG_VERSION").dimmed()
        );
        println!(
            "Rule {}. Type {} for commands, {} to exit.\n",
            self.session.rule().to_string().yellow(),
            "help".cyan(),
            "quit".cyan()
        );

        loop {
            match editor.readline("compgraph> ") {
                Ok(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    let _ = editor.add_history_entry(line);

                    match self.handle_command(line) {
                        CommandResult::Continue => {}
                        CommandResult::Quit => break,
                        CommandResult::Error(msg) => {
                            eprintln!("{} {}", "error:".red().bold(), msg)
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("Use {} to exit", "quit".cyan());
                }
                Err(ReadlineError::Eof) => break,
                Err(err) => return Err(err.into()),
            }
        }

        Ok(())
    }

    /// Handles one command line.
    pub fn handle_command(&mut self, line: &str) -> CommandResult {
        let parts: Vec<&str> = line.split_whitespace().collect();
        let cmd = parts.first().map(|s| s.to_lowercase()).unwrap_or_default();

        match cmd.as_str() {
            "quit" | "exit" | "q" => CommandResult::Quit,
            "help" | "h" | "?" => {
                print_help();
                CommandResult::Continue
            }
            "vertex" | "v" => self.cmd_vertex(&parts).into(),
            "arc" | "a" => self.cmd_arc(&parts).into(),
            "rm-vertex" => self.cmd_remove_vertex(&parts).into(),
            "rm-arc" => self.cmd_remove_arc(&parts).into(),
            "update-arc" => self.cmd_update_arc(&parts).into(),
            "move" => self.cmd_move(&parts).into(),
            "rule" => self.cmd_rule(&parts).into(),
            "set" => self.cmd_set(&parts).into(),
            "show" => {
                print_digraph(&self.session);
                CommandResult::Continue
            }
            "derived" | "d" => {
                print_derived(&self.session);
                CommandResult::Continue
            }
            "save" => self.cmd_save(&parts).into(),
            "load" => self.cmd_load(&parts).into(),
            "import-csv" => self.cmd_import_csv(&parts).into(),
            "clear" => self.session.clear().map_err(|e| e.to_string()).into(),
            _ => CommandResult::Error(format!("Unknown command: {cmd}")),
        }
    }

    fn cmd_vertex(&mut self, parts: &[&str]) -> CmdResult {
        let added = match parts.get(1..).filter(|rest| !rest.is_empty()) {
            Some(rest) => self
                .session
                .add_vertex_labeled(rest.join(" "), Position::default()),
            None => self.session.add_vertex(Position::default()),
        };
        let id = added.map_err(|e| e.to_string())?;
        let label = self
            .session
            .store()
            .get_vertex(id)
            .map(|v| v.label.clone())
            .unwrap_or_default();
        println!("{} Added vertex {} ({})", "✓".green(), id, label.cyan());
        Ok(())
    }

    fn cmd_arc(&mut self, parts: &[&str]) -> CmdResult {
        const USAGE: &str = "arc <from> <to>";
        let from: VertexId = arg(parts, 1, USAGE)?;
        let to: VertexId = arg(parts, 2, USAGE)?;
        let id = self.session.add_arc(from, to).map_err(|e| e.to_string())?;
        println!("{} Added arc {}", "✓".green(), id);
        Ok(())
    }

    fn cmd_remove_vertex(&mut self, parts: &[&str]) -> CmdResult {
        let id: VertexId = arg(parts, 1, "rm-vertex <id>")?;
        let vertex = self.session.remove_vertex(id).map_err(|e| e.to_string())?;
        println!("{} Removed vertex {}", "✓".green(), vertex.label);
        Ok(())
    }

    fn cmd_remove_arc(&mut self, parts: &[&str]) -> CmdResult {
        let id: String = arg(parts, 1, "rm-arc <id>")?;
        let arc = self
            .session
            .remove_arc(&ArcId::new(id))
            .map_err(|e| e.to_string())?;
        println!("{} Removed arc {} -> {}", "✓".green(), arc.from, arc.to);
        Ok(())
    }

    fn cmd_update_arc(&mut self, parts: &[&str]) -> CmdResult {
        const USAGE: &str = "update-arc <id> <from> <to>";
        let id: String = arg(parts, 1, USAGE)?;
        let from: VertexId = arg(parts, 2, USAGE)?;
        let to: VertexId = arg(parts, 3, USAGE)?;
        let before = self
            .session
            .update_arc(&ArcId::new(id), from, to)
            .map_err(|e| e.to_string())?;
        println!(
            "{} Arc {} now {} -> {} (was {} -> {})",
            "✓".green(),
            before.id,
            from,
            to,
            before.from,
            before.to
        );
        Ok(())
    }

    fn cmd_move(&mut self, parts: &[&str]) -> CmdResult {
        const USAGE: &str = "move <id> <x> <y>";
        let id: VertexId = arg(parts, 1, USAGE)?;
        let x: f64 = arg(parts, 2, USAGE)?;
        let y: f64 = arg(parts, 3, USAGE)?;
        self.session
            .move_vertex(id, Position::new(x, y))
            .map_err(|e| e.to_string())
    }

    fn cmd_rule(&mut self, parts: &[&str]) -> CmdResult {
        if parts.len() < 2 {
            println!("Rule is {}", self.session.rule().to_string().yellow());
            return Ok(());
        }
        let kind: RuleKind = arg(parts, 1, "rule <name>")?;
        self.session.select_rule(kind).map_err(|e| e.to_string())?;
        println!(
            "{} Rule {}: {} edges",
            "✓".green(),
            self.session.rule().to_string().yellow(),
            self.session.derived().edge_count()
        );
        Ok(())
    }

    fn cmd_set(&mut self, parts: &[&str]) -> CmdResult {
        const USAGE: &str = "set p|m <n>";
        let param: Param = arg(parts, 1, USAGE)?;
        let raw = parts.get(2).ok_or_else(|| format!("Usage: {USAGE}"))?;
        self.session
            .set_param_str(param, raw)
            .map_err(|e| e.to_string())?;
        println!("{} {} = {}", "✓".green(), param, self.session.params().get(param));
        Ok(())
    }

    fn cmd_save(&mut self, parts: &[&str]) -> CmdResult {
        let path = match parts.get(1) {
            Some(raw) => PathBuf::from(raw),
            None => self
                .path
                .clone()
                .ok_or_else(|| "Usage: save <file>".to_string())?,
        };
        write_document(&path, &self.session.to_document()).map_err(|e| e.to_string())?;
        println!("{} Saved to {}", "✓".green(), path.display());
        self.path = Some(path);
        Ok(())
    }

    fn cmd_load(&mut self, parts: &[&str]) -> CmdResult {
        let raw: String = arg(parts, 1, "load <file>")?;
        let path = PathBuf::from(raw);
        let document = read_document(&path).map_err(|e| e.to_string())?;
        self.session
            .load_document(&document)
            .map_err(|e| e.to_string())?;
        self.report_loaded(&path);
        self.path = Some(path);
        Ok(())
    }

    fn cmd_import_csv(&mut self, parts: &[&str]) -> CmdResult {
        let raw: String = arg(parts, 1, "import-csv <file>")?;
        let path = PathBuf::from(raw);
        let mut document = read_adjacency_csv(&path).map_err(|e| e.to_string())?;
        document.rule = self.session.rule_kind().as_str().to_string();
        document.p = Some(self.session.params().p);
        document.m = Some(self.session.params().m);
        self.session
            .load_document(&document)
            .map_err(|e| e.to_string())?;
        self.report_loaded(&path);
        Ok(())
    }

    fn report_loaded(&self, path: &Path) {
        println!(
            "{} Loaded {}: {} vertices, {} arcs",
            "✓".green(),
            path.display(),
            self.session.store().vertex_count(),
            self.session.store().arc_count()
        );
    }
}

/// Parses the argument at `index`.
fn arg<T: FromStr>(parts: &[&str], index: usize, usage: &str) -> Result<T, String> {
    let raw = parts.get(index).ok_or_else(|| format!("Usage: {usage}"))?;
    raw.parse()
        .map_err(|_| format!("Invalid value '{raw}'. Usage: {usage}"))
}

fn print_help() {
    println!("{}", "Commands:".bold());
    let rows = [
        ("vertex [label]", "add a vertex"),
        ("arc <from> <to>", "add an arc"),
        ("rm-vertex <id>", "remove a vertex and its arcs"),
        ("rm-arc <id>", "remove an arc"),
        ("update-arc <id> <from> <to>", "re-point an arc"),
        ("move <id> <x> <y>", "move a vertex"),
        ("rule [name]", "show or select the rule"),
        ("set p|m <n>", "set a rule parameter"),
        ("show", "print the digraph"),
        ("derived", "print the derived graph"),
        ("save [file]", "write a graph document"),
        ("load <file>", "read a graph document"),
        ("import-csv <file>", "read an adjacency matrix"),
        ("clear", "remove everything"),
        ("quit", "exit"),
    ];
    for (usage, what) in rows {
        println!("  {:<30} {}", usage.cyan(), what);
    }
    println!();
}
