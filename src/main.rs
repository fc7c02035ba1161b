// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//
//! Schemaroute CLI - which schema owns a file, and how to connect to it

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use schemaroute::commands::{self, Context};
use schemaroute::config;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "schemaroute")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Configuration file path
    #[arg(short, long, env = "SCHEMAROUTE_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Workspace root
    #[arg(short, long, env = "SCHEMAROUTE_ROOT", default_value = ".", global = true)]
    root: PathBuf,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR", global = true)]
    no_color: bool,

    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the normalized project configuration
    Resolve {
        /// Read the configuration as seen from this file
        file: Option<PathBuf>,
    },

    /// Check the project configuration
    Validate,

    /// Show the schema owning each file
    Classify {
        /// Files, relative to the workspace root
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Schema for files outside the folder layout
        #[arg(short, long)]
        schema: Option<String>,
    },

    /// Print the connection for a file
    Connect {
        /// File, relative to the workspace root
        file: PathBuf,

        /// Schema for files outside the folder layout
        #[arg(short, long)]
        schema: Option<String>,

        /// Print the password instead of ***
        #[arg(long)]
        show_password: bool,
    },

    /// Print the environment for compiling a file
    Env {
        /// File, relative to the workspace root
        file: PathBuf,

        /// Schema for files outside the folder layout
        #[arg(short, long)]
        schema: Option<String>,

        /// Print passwords instead of ***
        #[arg(long)]
        show_secrets: bool,
    },

    /// Route every file of the workspace
    Scan {
        /// Only look three levels deep
        #[arg(long)]
        shallow: bool,

        /// Follow symbolic links
        #[arg(long)]
        follow_symlinks: bool,

        /// Schema for files outside the folder layout
        #[arg(short, long)]
        schema: Option<String>,

        /// Only list files that could not be routed
        #[arg(long)]
        failures: bool,
    },

    /// Show the trigger scripts compiling a file would run
    Triggers {
        /// File, relative to the workspace root
        file: PathBuf,

        /// Schema for files outside the folder layout
        #[arg(short, long)]
        schema: Option<String>,
    },

    /// Get or set configuration
    Config {
        /// Configuration key
        key: Option<String>,

        /// Value to set (omit to get)
        value: Option<String>,

        /// Write to the workspace's .schemaroute.toml
        #[arg(long)]
        project: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell type (bash, zsh, fish, powershell)
        shell: clap_complete::Shell,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = if matches!(cli.command, Commands::Completions { .. }) {
        config::Settings::default()
    } else {
        config::load(&cli.root, cli.config.as_deref())?
    };

    // Initialize logging
    let configured = settings
        .log_level
        .parse::<tracing::Level>()
        .unwrap_or(tracing::Level::INFO);
    let log_level = match cli.verbose {
        0 if cli.quiet => tracing::Level::ERROR,
        0 => configured,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .with_ansi(!cli.no_color)
        .with_writer(std::io::stderr);
    if std::env::var_os("RUST_LOG").is_some() {
        subscriber.with_env_filter(EnvFilter::from_default_env()).init();
    } else {
        subscriber.init();
    }

    if let Commands::Completions { shell } = cli.command {
        return commands::completions::run(shell, Cli::command());
    }

    let ctx = Context::new(&cli.root, settings, cli.json, !cli.no_color)?;

    // Execute command
    match cli.command {
        Commands::Resolve { file } => commands::resolve::run(&ctx, file),
        Commands::Validate => commands::validate::run(&ctx),
        Commands::Classify { files, schema } => commands::classify::run(&ctx, files, schema),
        Commands::Connect {
            file,
            schema,
            show_password,
        } => commands::connect::run(&ctx, file, schema, show_password),
        Commands::Env {
            file,
            schema,
            show_secrets,
        } => commands::env::run(&ctx, file, schema, show_secrets),
        Commands::Scan {
            shallow,
            follow_symlinks,
            schema,
            failures,
        } => commands::scan::run(&ctx, shallow, follow_symlinks, schema, failures),
        Commands::Triggers { file, schema } => commands::triggers::run(&ctx, file, schema),
        Commands::Config {
            key,
            value,
            project,
        } => commands::config::run(&ctx, key, value, project),
        Commands::Completions { .. } => Ok(()),
    }
}
