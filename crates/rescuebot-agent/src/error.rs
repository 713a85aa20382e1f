//! Error types for the rescuebot-agent crate.
//!
//! Nothing on the per-tick decision path returns an error: malformed
//! messages and missing logs degrade to "skip and log". Errors only come
//! from the edges of the crate: reading configuration and talking to a
//! belief store.

use std::path::PathBuf;

use crate::config::ConfigError;

/// Errors raised by belief stores and agent construction.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// A belief store file could not be read or written.
    #[error("belief store I/O failed for {path}: {source}")]
    StoreIo {
        /// Path of the store file.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A belief row could not be serialized.
    #[error("failed to serialize belief row: {source}")]
    Serialize {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },

    /// The agent configuration could not be loaded.
    #[error("agent configuration error: {source}")]
    Config {
        /// The underlying configuration error.
        #[from]
        source: ConfigError,
    },
}
