//! Agent runtime entry point for RescueBot.
//!
//! The runner connects one RescueBot decision core to the simulated world.
//! It receives tick envelopes over NATS, lets the agent decide, publishes
//! the action and chat messages back, and persists the trust beliefs after
//! every tick.
//!
//! # Architecture
//!
//! ```text
//! NATS (tick) --> RescueAgent::tick --> NATS (action, beliefs)
//!                        |
//!                        +--> PostgreSQL or JSON-lines belief log
//! ```

mod config;
mod error;
mod nats;
mod runner;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use rescuebot_agent::{AgentConfig, AgentError, RescueAgent, StraightLineNavigator};

use crate::config::RunnerConfig;
use crate::nats::NatsClient;
use crate::runner::{AgentRunner, BeliefSink};

/// Application entry point.
///
/// Initializes logging, loads configuration from environment variables,
/// opens the belief store, connects to NATS, then runs the tick loop until
/// the subscription ends or the process is interrupted.
///
/// # Errors
///
/// Returns an error if initialization or the main loop fails.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .init();

    info!("rescuebot-runner starting");

    let config = RunnerConfig::from_env().context("loading runner configuration")?;
    info!(
        nats_url = config.nats_url,
        agent = config.agent_name,
        teammate = %config.teammate,
        beliefs = ?config.beliefs,
        "configuration loaded"
    );

    let agent_config = match &config.agent_config {
        Some(path) => AgentConfig::from_file(path)
            .map_err(AgentError::from)
            .with_context(|| format!("loading agent configuration from {}", path.display()))?,
        None => AgentConfig::default(),
    };

    let sink = BeliefSink::open(&config.beliefs).await.context("opening belief store")?;
    let records = sink.load(&config.teammate).await.context("loading persisted beliefs")?;
    let agent = RescueAgent::new(agent_config, config.teammate, StraightLineNavigator::new(), &records);

    let nats = NatsClient::connect(&config.nats_url).await?;

    info!("agent runner initialized, entering tick loop");
    AgentRunner::new(nats, config.agent_name, agent, sink).run().await?;

    Ok(())
}
