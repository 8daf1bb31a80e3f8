//! crowdsim-gateway CLI: HTTP gateway or one-shot file run.
//!
//! Logging: set `RUST_LOG=crowdsim_gateway=info` (or `warn`, `debug`) to see
//! logs on stderr.

mod cli;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crowdsim_gateway::{
    LlmClient, SimulationConfig, SimulationRequest, SimulationRunner, SimulationStore,
    load_runtime_settings, run_http, set_config_home_override,
};

use crate::cli::{Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    if let Some(conf_dir) = cli.conf.clone() {
        set_config_home_override(conf_dir);
    }
    let settings = load_runtime_settings();

    // Initialize tracing: RUST_LOG overrides; else info.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("crowdsim_gateway=info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let config = SimulationConfig::from_settings(&settings);
    match cli.command {
        Command::Gateway {
            bind,
            turn_delay_ms,
        } => {
            let runner = build_runner(&config, turn_delay_ms)?;
            run_http(runner, config.model.clone(), &bind).await
        }
        Command::Run {
            file,
            turn_delay_ms,
        } => {
            let runner = build_runner(&config, turn_delay_ms)?;
            let raw = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read request file {}", file.display()))?;
            let request: SimulationRequest = serde_json::from_str(&raw)
                .with_context(|| format!("invalid request file {}", file.display()))?;
            let outcome = runner.run(request).await?;
            for entry in &outcome.conversation {
                println!("{}: {}", entry.sender, entry.content);
            }
            println!("simulation id: {}", outcome.simulation.id);
            Ok(())
        }
    }
}

fn build_runner(
    config: &SimulationConfig,
    turn_delay_ms: Option<u64>,
) -> anyhow::Result<SimulationRunner> {
    let store = SimulationStore::new()?;
    let model = Arc::new(LlmClient::from_config(config));
    let delay = Duration::from_millis(turn_delay_ms.unwrap_or(config.turn_delay_ms));
    Ok(SimulationRunner::new(model, store, delay))
}
