//! CLI argument parsing types using `clap`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use wsdash_core::export::ExportFormat;

/// `wsdash` command-line interface for monitoring live WebSocket data
#[derive(Parser)]
#[command(name = "wsdash")]
#[command(author, version, about = "Live WebSocket data monitor")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the configuration directory
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase output verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress log output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// List saved endpoints
    #[command(about = "List all saved endpoints")]
    List {
        /// Output format for the endpoint list
        #[arg(short, long, default_value = "table", value_enum)]
        format: OutputFormat,
    },

    /// Add a new endpoint and select it
    #[command(about = "Add a new endpoint and select it")]
    Add {
        /// Display name
        #[arg(short, long)]
        name: String,

        /// WebSocket address (ws://host[:port][/path] or wss://...)
        #[arg(short, long)]
        address: String,
    },

    /// Change the name or address of an endpoint
    #[command(about = "Update an existing endpoint")]
    Update {
        /// Endpoint index, name or address
        target: String,

        /// New display name
        #[arg(short, long)]
        name: Option<String>,

        /// New WebSocket address
        #[arg(short, long)]
        address: Option<String>,
    },

    /// Remove an endpoint
    #[command(about = "Delete an endpoint")]
    Delete {
        /// Endpoint index, name or address
        target: String,
    },

    /// Make an endpoint the active one
    #[command(about = "Select the endpoint used by watch")]
    Select {
        /// Endpoint index, name or address
        target: String,
    },

    /// Show endpoint details
    #[command(about = "Show details of an endpoint")]
    Show {
        /// Endpoint index, name or address
        target: String,
    },

    /// Stream readings from the selected endpoint
    #[command(about = "Connect and stream readings, reconnecting on drops")]
    Watch(WatchArgs),

    /// Generate shell completions
    #[command(about = "Generate shell completion scripts")]
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Options for `watch`
#[derive(Args, Debug, Clone, Default)]
pub struct WatchArgs {
    /// Endpoint to select before connecting (defaults to the active one)
    pub target: Option<String>,

    /// Only print entries containing this text (case-insensitive)
    #[arg(short, long)]
    pub filter: Option<String>,

    /// Stop at the first close instead of reconnecting
    #[arg(long)]
    pub no_reconnect: bool,

    /// Delay before reconnecting, in milliseconds
    #[arg(long, value_name = "MS", value_parser = clap::value_parser!(u64).range(1..))]
    pub retry_delay_ms: Option<u64>,

    /// Number of log entries kept in memory
    #[arg(long, value_name = "N")]
    pub max_entries: Option<usize>,

    /// Stop after this many readings
    #[arg(short = 'n', long, value_name = "N")]
    pub count: Option<u64>,

    /// Export the collected readings on exit
    #[arg(short, long, value_enum)]
    pub export: Option<ExportFormatArg>,

    /// Export file or directory (defaults to the current directory)
    #[arg(short, long, requires = "export")]
    pub output: Option<PathBuf>,
}

/// Output format for list commands
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format for scripting
    Json,
    /// CSV format for spreadsheets
    Csv,
}

/// Export format argument
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ExportFormatArg {
    /// Pretty-printed JSON array
    Json,
    /// Semicolon-separated values
    Csv,
}

impl From<ExportFormatArg> for ExportFormat {
    fn from(arg: ExportFormatArg) -> Self {
        match arg {
            ExportFormatArg::Json => Self::Json,
            ExportFormatArg::Csv => Self::Csv,
        }
    }
}
