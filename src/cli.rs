// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, Subcommand, ValueEnum};

/// Command-line arguments for `procdock`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "procdock",
    version,
    about = "Run and supervise shell commands declared in a manifest.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the manifest file (TOML).
    ///
    /// Default: `Procdock.toml` in the current working directory.
    #[arg(long, value_name = "PATH", default_value = "Procdock.toml")]
    pub manifest: String,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `PROCDOCK_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Clone, Subcommand)]
pub enum CliCommand {
    /// List the commands declared in the manifest.
    List,

    /// Run one command by alias, bridging its IO to this terminal.
    Run {
        /// Alias of the command to run.
        alias: String,

        /// Answer for a placeholder parameter; repeat the flag to fill
        /// several placeholders, in descriptor order.
        #[arg(long = "answer", value_name = "VALUE")]
        answers: Vec<String>,
    },
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
