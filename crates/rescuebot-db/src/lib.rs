//! Data layer for RescueBot (`PostgreSQL`).
//!
//! Trust beliefs outlive a single episode. The agent core only knows the
//! synchronous `BeliefStore` trait; this crate is the asynchronous
//! `PostgreSQL` backend the runner uses when a database is configured.
//!
//! # Modules
//!
//! - [`postgres`] -- Opening and migrating the belief database
//! - [`belief_store`] -- Append-only belief rows and latest-per-task reads
//! - [`error`] -- Shared error types

pub mod belief_store;
pub mod error;
pub mod postgres;

// Re-export primary types for convenience.
pub use belief_store::{BeliefRow, BeliefRowStore};
pub use error::DbError;
pub use postgres::BeliefDatabase;
