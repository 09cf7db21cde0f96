mod commands;
mod config;
mod diagnostics;
mod document;
mod error;
mod hasher;
mod rename;
mod resolver;
mod rewriter;
mod scanner;
mod store;
mod transaction;
mod types;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use crate::commands::OutputFormat;

#[derive(Parser)]
#[command(
    name = "hashattach",
    version,
    about = "Rename markdown attachments to content fingerprints and rewrite their links"
)]
/// Top-level CLI arguments.
struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    command: Commands,
    /// Output format for the per-link report.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
    /// Vault root directory.
    #[arg(long, global = true, default_value = ".")]
    vault: PathBuf,
}

#[derive(Subcommand)]
/// Available subcommands.
enum Commands {
    /// Report attachments that are not fingerprint-named yet (exit 0/1/2)
    Check {
        /// Markdown note to inspect.
        note: PathBuf,
    },
    /// Rename a note's attachments to their MD5 fingerprint and rewrite its links
    Rename {
        /// Markdown note whose attachments are renamed.
        note: PathBuf,
    },
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Check { note } => commands::check(&cli.vault, note, cli.format),
        Commands::Rename { note } => commands::rename(&cli.vault, note, cli.format),
    };

    return match result {
        Ok(code) => code,
        Err(e) => {
            diagnostics::print_error(&e);
            ExitCode::from(3_u8)
        },
    };
}

/// Diagnostics go to stderr; `RUST_LOG` overrides the default `warn` level.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_err| return tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
