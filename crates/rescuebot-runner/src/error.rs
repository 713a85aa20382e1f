//! Error types for the agent runner.
//!
//! Uses `thiserror` for typed errors that surface through the runner:
//! NATS connectivity, envelope decoding, configuration, and belief storage.

use rescuebot_agent::AgentError;
use rescuebot_db::DbError;

/// Errors that can occur during agent runner operation.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// Failed to connect to or communicate with the NATS server.
    #[error("NATS error: {0}")]
    Nats(String),

    /// An inbound payload could not be decoded.
    #[error("envelope parse error: {0}")]
    Parse(String),

    /// Configuration is invalid or missing.
    #[error("config error: {0}")]
    Config(String),

    /// The agent core failed to load its config or file-backed beliefs.
    #[error("agent error: {0}")]
    Agent(#[from] AgentError),

    /// The belief database failed.
    #[error("database error: {0}")]
    Db(#[from] DbError),
}
