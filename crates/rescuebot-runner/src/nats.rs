//! NATS pub/sub integration for tick intake and action submission.
//!
//! The environment publishes one [`TickEnvelope`] per tick on
//! `rescue.{agent}.tick`. The runner answers on `rescue.{agent}.action`
//! with an [`ActionEnvelope`] and mirrors the agent's beliefs on
//! `rescue.{agent}.beliefs`.

use rescuebot_types::{ActionEnvelope, BeliefSet, TickEnvelope};
use tracing::{debug, info, warn};

use crate::error::RunnerError;

/// Build the subject `rescue.{agent}.{kind}`.
pub fn subject(agent: &str, kind: &str) -> String {
    format!("rescue.{agent}.{kind}")
}

/// NATS client wrapper for the agent runner.
pub struct NatsClient {
    client: async_nats::Client,
}

impl NatsClient {
    /// Connect to a NATS server.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Nats`] if the connection cannot be established.
    pub async fn connect(url: &str) -> Result<Self, RunnerError> {
        info!(url = url, "connecting to NATS server");
        let client = async_nats::connect(url)
            .await
            .map_err(|e| RunnerError::Nats(format!("failed to connect to {url}: {e}")))?;
        info!("NATS connection established");
        Ok(Self { client })
    }

    /// Subscribe to the tick subject of one agent.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Nats`] if the subscription fails.
    pub async fn subscribe_ticks(&self, agent: &str) -> Result<async_nats::Subscriber, RunnerError> {
        let subject = subject(agent, "tick");
        let subscriber = self
            .client
            .subscribe(subject.clone())
            .await
            .map_err(|e| RunnerError::Nats(format!("failed to subscribe to {subject}: {e}")))?;
        info!(subject = subject, "subscribed to tick subject");
        Ok(subscriber)
    }

    /// Publish the decision for one tick.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Nats`] if serialization or publishing fails.
    pub async fn publish_action(&self, agent: &str, envelope: &ActionEnvelope) -> Result<(), RunnerError> {
        let subject = subject(agent, "action");
        let payload = serde_json::to_vec(envelope)
            .map_err(|e| RunnerError::Nats(format!("failed to serialize action: {e}")))?;
        debug!(
            subject = subject,
            tick = envelope.tick,
            action = ?envelope.action,
            messages = envelope.messages.len(),
            "publishing action"
        );
        self.client
            .publish(subject.clone(), payload.into())
            .await
            .map_err(|e| RunnerError::Nats(format!("failed to publish to {subject}: {e}")))?;
        Ok(())
    }

    /// Publish the current beliefs for observability (fire-and-forget).
    ///
    /// Failures are logged and never block the tick loop.
    pub fn publish_beliefs(&self, agent: &str, beliefs: &BeliefSet) {
        let subject = subject(agent, "beliefs");
        match serde_json::to_vec(beliefs) {
            Ok(payload) => {
                let client = self.client.clone();
                tokio::spawn(async move {
                    if let Err(e) = client.publish(subject.clone(), payload.into()).await {
                        warn!(subject = subject, error = %e, "failed to publish beliefs");
                    }
                });
            }
            Err(e) => {
                warn!(subject = subject, error = %e, "failed to serialize beliefs");
            }
        }
    }

    /// Deserialize a NATS message payload into a [`TickEnvelope`].
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Parse`] if deserialization fails.
    pub fn deserialize_tick(data: &[u8]) -> Result<TickEnvelope, RunnerError> {
        serde_json::from_slice(data).map_err(|e| RunnerError::Parse(format!("failed to deserialize tick: {e}")))
    }
}

impl std::fmt::Debug for NatsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NatsClient").field("connected", &true).finish()
    }
}
