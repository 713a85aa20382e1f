//! The tick loop: receive a tick envelope, let the agent decide, publish
//! the decision, persist beliefs.
//!
//! Every tick is handled to completion before the next one is read, so the
//! agent never sees two ticks at once. A malformed or stale envelope is
//! logged and skipped; a failed belief save is logged and retried with the
//! next tick's beliefs.

use futures::StreamExt;
use tracing::{debug, info, warn};

use rescuebot_agent::{BeliefStore, JsonlBeliefStore, RescueAgent};
use rescuebot_db::BeliefDatabase;
use rescuebot_types::{ActionEnvelope, BeliefRecord, BeliefSet, TeammateId, TickEnvelope};

use crate::config::BeliefBackend;
use crate::error::RunnerError;
use crate::nats::NatsClient;

/// Where beliefs are loaded from and saved to.
#[derive(Debug)]
pub enum BeliefSink {
    /// `PostgreSQL` `trust_beliefs` table.
    Postgres(BeliefDatabase),
    /// Append-only JSON-lines file.
    File(JsonlBeliefStore),
}

impl BeliefSink {
    /// Open the configured backend, running migrations for `PostgreSQL`.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Db`] if the database is unreachable or a
    /// migration fails.
    pub async fn open(backend: &BeliefBackend) -> Result<Self, RunnerError> {
        match backend {
            BeliefBackend::Postgres(url) => Ok(Self::Postgres(BeliefDatabase::open(url).await?)),
            BeliefBackend::File(path) => {
                info!(path = %path.display(), "persisting beliefs to file");
                Ok(Self::File(JsonlBeliefStore::new(path)))
            }
        }
    }

    /// The latest persisted rows for `teammate`.
    ///
    /// # Errors
    ///
    /// Returns the backend's error if the rows cannot be read.
    pub async fn load(&self, teammate: &TeammateId) -> Result<Vec<BeliefRecord>, RunnerError> {
        let records = match self {
            Self::Postgres(db) => {
                let rows = db.rows();
                if let Some(last) = rows.history(teammate, 1).await?.first() {
                    info!(
                        %teammate,
                        save_id = %last.save_id,
                        recorded_at = %last.recorded_at,
                        "resuming from last belief save"
                    );
                }
                rows.latest_for(teammate).await?
            }
            Self::File(store) => store.latest(teammate)?,
        };
        info!(%teammate, rows = records.len(), "loaded persisted beliefs");
        Ok(records)
    }

    /// Append one save's worth of rows.
    ///
    /// # Errors
    ///
    /// Returns the backend's error if the rows cannot be written.
    pub async fn save(&mut self, beliefs: &BeliefSet) -> Result<(), RunnerError> {
        let records = beliefs.to_records();
        match self {
            Self::Postgres(db) => {
                db.rows().save(&records).await?;
            }
            Self::File(store) => store.save(&records)?,
        }
        Ok(())
    }

    /// Release the backend.
    pub async fn close(&self) {
        if let Self::Postgres(db) = self {
            db.close().await;
        }
    }
}

/// Run the agent on one tick and build the outbound envelope.
///
/// Returns the envelope and the beliefs after the tick.
pub fn decide(agent: &mut RescueAgent, envelope: &TickEnvelope) -> (ActionEnvelope, BeliefSet) {
    let tick = envelope.snapshot.tick;
    let outcome = agent.tick(&envelope.snapshot, &envelope.messages);
    for event in &outcome.events {
        debug!(tick, kind = ?event.kind, subject = ?event.subject, "confirmed observation");
    }
    let action = ActionEnvelope {
        tick,
        action: outcome.action,
        messages: outcome.outbox,
    };
    (action, outcome.beliefs)
}

/// Drives one [`RescueAgent`] from NATS tick envelopes.
#[derive(Debug)]
pub struct AgentRunner {
    nats: NatsClient,
    agent_name: String,
    agent: RescueAgent,
    sink: BeliefSink,
    last_tick: Option<u64>,
}

impl AgentRunner {
    /// Create a runner.
    pub const fn new(nats: NatsClient, agent_name: String, agent: RescueAgent, sink: BeliefSink) -> Self {
        Self {
            nats,
            agent_name,
            agent,
            sink,
            last_tick: None,
        }
    }

    /// Process ticks until the subscription ends or Ctrl-C is received.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Nats`] if the subscription cannot be set up.
    pub async fn run(mut self) -> Result<(), RunnerError> {
        let mut subscriber = self.nats.subscribe_ticks(&self.agent_name).await?;
        info!(agent = self.agent_name, "agent runner started, awaiting ticks");

        loop {
            tokio::select! {
                message = subscriber.next() => {
                    let Some(message) = message else {
                        info!("NATS subscription ended, runner shutting down");
                        break;
                    };
                    self.handle(&message.payload).await;
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("shutdown requested");
                    break;
                }
            }
        }

        self.sink.close().await;
        Ok(())
    }

    async fn handle(&mut self, payload: &[u8]) {
        let envelope = match NatsClient::deserialize_tick(payload) {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!(error = %e, payload_size = payload.len(), "failed to deserialize tick, skipping");
                return;
            }
        };

        let tick = envelope.snapshot.tick;
        if self.last_tick.is_some_and(|last| tick <= last) {
            warn!(tick, last_tick = ?self.last_tick, "stale tick, skipping");
            return;
        }
        self.last_tick = Some(tick);

        let (action, beliefs) = decide(&mut self.agent, &envelope);
        debug!(tick, phase = ?self.agent.phase(), "tick decided");

        if let Err(e) = self.nats.publish_action(&self.agent_name, &action).await {
            warn!(tick, error = %e, "failed to publish action");
        }
        self.nats.publish_beliefs(&self.agent_name, &beliefs);

        if let Err(e) = self.sink.save(&beliefs).await {
            warn!(tick, error = %e, "failed to persist beliefs");
        }
    }
}
