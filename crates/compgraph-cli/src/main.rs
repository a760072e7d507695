//! Compgraph CLI - Command-line interface for Compgraph
//!
//! This is the main entry point for users interacting with Compgraph.
//! It provides commands for deriving competition-style graphs from saved
//! digraphs, converting between formats, and editing interactively.

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod repl;

#[derive(Parser)]
#[command(name = "compgraph")]
#[command(author = "Compgraph Contributors")]
#[command(version)]
#[command(about = "Derive competition graphs and their relatives from a digraph", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file to use instead of the discovered one
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default config into the given directory
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// List the derivation rules
    Rules,

    /// Print the derived graph of a saved digraph
    Derive {
        /// Graph document (JSON)
        file: PathBuf,

        /// Rule to apply instead of the one stored in the document
        #[arg(short, long)]
        rule: Option<String>,

        /// Value for the rule's parameter (p or m)
        #[arg(short, long)]
        param: Option<u32>,

        /// Output as JSON instead of formatted text
        #[arg(long)]
        json: bool,
    },

    /// Show the derived edge count under every rule
    Compare {
        /// Graph document (JSON)
        file: PathBuf,
    },

    /// Convert an adjacency matrix into a graph document
    ImportCsv {
        /// Square 0/1 matrix without a header row
        input: PathBuf,

        /// Output graph document
        #[arg(short, long)]
        output: PathBuf,

        /// Rule to store in the document
        #[arg(short, long)]
        rule: Option<String>,
    },

    /// Write a graph document's adjacency matrix
    ExportCsv {
        /// Graph document (JSON)
        file: PathBuf,

        /// Output CSV file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Edit a digraph interactively
    Edit {
        /// Graph document to open
        file: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(tracing_subscriber::EnvFilter::new(filter))
        .init();

    let config = cli.config.as_deref();
    let result = match cli.command {
        Commands::Init { path } => commands::init(&path),
        Commands::Rules => commands::rules(),
        Commands::Derive {
            file,
            rule,
            param,
            json,
        } => commands::derive(config, &file, rule.as_deref(), param, json),
        Commands::Compare { file } => commands::compare(config, &file),
        Commands::ImportCsv {
            input,
            output,
            rule,
        } => commands::import_csv(config, &input, &output, rule.as_deref()),
        Commands::ExportCsv { file, output } => commands::export_csv(config, &file, &output),
        Commands::Edit { file } => commands::edit(config, file),
    };

    if let Err(e) = result {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}
