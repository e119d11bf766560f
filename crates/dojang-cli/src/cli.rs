//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::CONFIG_ENV;

/// Dojang - athlete scorecards with spreadsheet-backed history
#[derive(Parser, Debug)]
#[command(name = "dojang", author, version, about, long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long, global = true, env = CONFIG_ENV)]
    pub config: Option<PathBuf>,

    /// Command to run
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate, score and store one assessment
    Submit {
        /// Assessment file (TOML, or JSON with a .json extension)
        file: PathBuf,

        /// Write the radar chart SVG here
        #[arg(long)]
        chart: Option<PathBuf>,
    },

    /// Print the form catalogue as JSON
    Form {
        /// Print a TOML input template instead
        #[arg(long)]
        template: bool,
    },

    /// Show stored history
    History {
        /// Number of recent rows to show
        #[arg(short = 'n', long, default_value_t = 10)]
        limit: usize,

        /// Number of leading columns to show per row
        #[arg(long, default_value_t = 3)]
        width: usize,
    },

    /// Run the HTTP API
    Serve {
        /// Override the configured host
        #[arg(long)]
        host: Option<String>,

        /// Override the configured port
        #[arg(long)]
        port: Option<u16>,
    },

    /// Manage the configuration file
    Config {
        /// Config action
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// `dojang config` actions.
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the config file path
    Path,
    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the effective configuration
    Show,
}
