//! CLI surface for Lese.

pub mod commands;
mod output;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Lese - Document Q&A and Summarization
///
/// A self-hosted backend for asking questions about your documents and videos.
/// The name "Lese" comes from the Norwegian/Scandinavian word for "read."
#[derive(Parser, Debug)]
#[command(name = "lese")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Use an alternate configuration file
    #[arg(short, long, global = true, env = "LESE_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize Lese and verify configuration
    Init,

    /// Start the HTTP API server
    Serve {
        /// Host to bind to (overrides the [server] section)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (overrides the [server] section)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Inspect or edit the configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,

    /// Open the configuration file in $EDITOR
    Edit,

    /// Print the configuration file location
    Path,
}
