//! Configuration types for the agent runner.
//!
//! All runner configuration is loaded from environment variables. The
//! decision core's own tuning lives in an optional YAML file named by
//! `AGENT_CONFIG`.

use std::path::PathBuf;

use rescuebot_types::TeammateId;

use crate::error::RunnerError;

/// Agent name used in NATS subjects when `AGENT_NAME` is unset.
const DEFAULT_AGENT_NAME: &str = "rescuebot";

/// Teammate name used when `TEAMMATE_NAME` is unset.
const DEFAULT_TEAMMATE_NAME: &str = "human";

/// Belief log used when neither `DATABASE_URL` nor `BELIEF_FILE` is set.
const DEFAULT_BELIEF_FILE: &str = "beliefs.jsonl";

/// Complete runner configuration loaded from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerConfig {
    /// NATS server URL (e.g. `nats://localhost:4222`).
    pub nats_url: String,
    /// Agent name, the `<agent>` segment of every subject.
    pub agent_name: String,
    /// The human teammate whose messages are trusted and scored.
    pub teammate: TeammateId,
    /// Where beliefs are kept between episodes.
    pub beliefs: BeliefBackend,
    /// Optional YAML file with agent tuning.
    pub agent_config: Option<PathBuf>,
}

/// Where trust beliefs are persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BeliefBackend {
    /// `PostgreSQL` at the given URL.
    Postgres(String),
    /// Append-only JSON-lines file.
    File(PathBuf),
}

impl RunnerConfig {
    /// Load configuration from environment variables.
    ///
    /// Required variables:
    /// - `NATS_URL` -- NATS server connection string
    ///
    /// Optional variables:
    /// - `AGENT_NAME` -- subject prefix for this agent (default `rescuebot`)
    /// - `TEAMMATE_NAME` -- the human teammate's name (default `human`)
    /// - `DATABASE_URL` -- persist beliefs in `PostgreSQL`
    /// - `BELIEF_FILE` -- persist beliefs in a JSON-lines file (default
    ///   `beliefs.jsonl`, ignored when `DATABASE_URL` is set)
    /// - `AGENT_CONFIG` -- YAML file with agent tuning
    pub fn from_env() -> Result<Self, RunnerError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, RunnerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let nats_url = var("NATS_URL")
            .ok_or_else(|| RunnerError::Config("missing required env var NATS_URL".to_owned()))?;

        let agent_name = var("AGENT_NAME").unwrap_or_else(|| DEFAULT_AGENT_NAME.to_owned());
        if agent_name.contains(['.', '*', '>', ' ']) {
            return Err(RunnerError::Config(format!(
                "AGENT_NAME must be a single subject token, got {agent_name:?}"
            )));
        }

        let teammate = TeammateId::from(var("TEAMMATE_NAME").unwrap_or_else(|| DEFAULT_TEAMMATE_NAME.to_owned()));

        let beliefs = match var("DATABASE_URL") {
            Some(url) => BeliefBackend::Postgres(url),
            None => BeliefBackend::File(PathBuf::from(
                var("BELIEF_FILE").unwrap_or_else(|| DEFAULT_BELIEF_FILE.to_owned()),
            )),
        };

        Ok(Self {
            nats_url,
            agent_name,
            teammate,
            beliefs,
            agent_config: var("AGENT_CONFIG").map(PathBuf::from),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_to_belief_file() {
        let config = RunnerConfig::from_lookup(lookup(&[("NATS_URL", "nats://localhost:4222")])).unwrap();
        assert_eq!(config.agent_name, "rescuebot");
        assert_eq!(config.teammate, TeammateId::from("human"));
        assert_eq!(config.beliefs, BeliefBackend::File(PathBuf::from("beliefs.jsonl")));
        assert_eq!(config.agent_config, None);
    }

    #[test]
    fn database_url_wins_over_file() {
        let config = RunnerConfig::from_lookup(lookup(&[
            ("NATS_URL", "nats://localhost:4222"),
            ("DATABASE_URL", "postgresql://localhost/rescuebot"),
            ("BELIEF_FILE", "/tmp/beliefs.jsonl"),
            ("TEAMMATE_NAME", "alice"),
        ]))
        .unwrap();
        assert_eq!(
            config.beliefs,
            BeliefBackend::Postgres("postgresql://localhost/rescuebot".to_owned())
        );
        assert_eq!(config.teammate, TeammateId::from("alice"));
    }

    #[test]
    fn missing_nats_url_is_an_error() {
        let result = RunnerConfig::from_lookup(lookup(&[("AGENT_NAME", "bot")]));
        assert!(matches!(result, Err(RunnerError::Config(_))));
    }

    #[test]
    fn blank_values_count_as_unset() {
        let config =
            RunnerConfig::from_lookup(lookup(&[("NATS_URL", "nats://localhost:4222"), ("DATABASE_URL", "  ")])).unwrap();
        assert!(matches!(config.beliefs, BeliefBackend::File(_)));
    }

    #[test]
    fn agent_name_must_be_one_token() {
        let result = RunnerConfig::from_lookup(lookup(&[("NATS_URL", "nats://x"), ("AGENT_NAME", "a.b")]));
        assert!(result.is_err());
    }
}
