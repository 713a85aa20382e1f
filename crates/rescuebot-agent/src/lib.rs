//! Decision core of the RescueBot teammate.
//!
//! This crate holds everything that decides what the agent does each tick,
//! without touching the network or a database. It sits between
//! `rescuebot-types` (the data model) and the runner (transport and
//! persistence).
//!
//! # Modules
//!
//! - [`message`] -- Parser for the human's chat grammar ([`ParsedMessage`])
//! - [`knowledge`] -- Victims, rooms and search logs ([`KnowledgeStore`])
//! - [`wait_timer`] -- How long to wait for the human ([`wait_ticks`])
//! - [`trust`] -- Rule-based trust revision and silence decay ([`TrustModel`])
//! - [`belief_store`] -- Durable belief rows ([`BeliefStore`])
//! - [`world`] -- Queries over the world snapshot ([`WorldQuery`])
//! - [`navigation`] -- Waypoint following ([`Navigator`])
//! - [`machine`] -- The mission state machine ([`RescueAgent`])
//! - [`config`] -- Tunable parameters ([`AgentConfig`])
//! - [`error`] -- Error types ([`AgentError`])

pub mod belief_store;
pub mod config;
pub mod error;
pub mod knowledge;
pub mod machine;
pub mod message;
pub mod navigation;
pub mod trust;
pub mod wait_timer;
pub mod world;

pub use belief_store::{BeliefStore, JsonlBeliefStore, MemoryBeliefStore};
pub use config::{AgentConfig, ConfigError, DecayConfig, MissionConfig, TrustConfig, WaitConfig};
pub use error::AgentError;
pub use knowledge::{FoundEntry, Interpreted, KnowledgeStore, SearchEntry, VictimRecord};
pub use machine::{Phase, RescueAgent, TickOutcome};
pub use message::{ParsedMessage, Reply};
pub use navigation::{Navigator, StraightLineNavigator};
pub use trust::TrustModel;
pub use wait_timer::{WaitWindow, wait_ticks};
pub use world::WorldQuery;
