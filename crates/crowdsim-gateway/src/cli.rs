use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "crowdsim-gateway")]
#[command(about = "Synthetic focus-group simulation: personas react to a product over an LLM.")]
pub(crate) struct Cli {
    /// Override config directory (user settings home).
    #[arg(long, global = true)]
    pub(crate) conf: Option<PathBuf>,

    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Run HTTP server (POST /simulation). Default bind: 0.0.0.0:8080
    Gateway {
        /// Listen address (e.g. 0.0.0.0:8080)
        #[arg(long, default_value = "0.0.0.0:8080")]
        bind: String,

        /// Inter-turn delay in milliseconds (default from settings: 500)
        #[arg(long)]
        turn_delay_ms: Option<u64>,
    },
    /// Run one simulation from a JSON request file and print the conversation.
    Run {
        /// Path to the request JSON file.
        #[arg(long)]
        file: PathBuf,

        /// Inter-turn delay in milliseconds (default from settings: 500)
        #[arg(long)]
        turn_delay_ms: Option<u64>,
    },
}
