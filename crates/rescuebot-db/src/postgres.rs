//! The `PostgreSQL` database that holds trust beliefs.
//!
//! One runner drives one agent and saves at most once per tick, so the
//! pool is small and its settings are fixed. Opening the database runs
//! the migrations and checks that `trust_beliefs` is in place before the
//! first tick is read.

use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};

use crate::belief_store::BeliefRowStore;
use crate::error::DbError;

/// Connections kept for the tick loop and the startup reads.
const MAX_CONNECTIONS: u32 = 2;

/// How long a save may wait for a free connection.
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Connections idle for longer than this are closed. Ticks arrive far
/// more often, so this only matters once the episode has ended.
const IDLE_TIMEOUT: Duration = Duration::from_secs(300);

/// An open, migrated belief database.
#[derive(Debug, Clone)]
pub struct BeliefDatabase {
    pool: PgPool,
}

impl BeliefDatabase {
    /// Connect to `url`, apply pending migrations and check that the
    /// `trust_beliefs` table exists.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::InvalidUrl`] for a malformed URL,
    /// [`DbError::Connect`] if the server is unreachable,
    /// [`DbError::Migration`] if a migration fails and
    /// [`DbError::MissingTable`] if the table is still absent afterwards.
    pub async fn open(url: &str) -> Result<Self, DbError> {
        let options: PgConnectOptions = url.parse().map_err(DbError::InvalidUrl)?;
        let pool = PgPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .idle_timeout(IDLE_TIMEOUT)
            .connect_with(options)
            .await
            .map_err(DbError::Connect)?;
        tracing::info!(max_connections = MAX_CONNECTIONS, "Connected to belief database");

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    async fn migrate(&self) -> Result<(), DbError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        let (present,): (bool,) = sqlx::query_as("SELECT to_regclass('trust_beliefs') IS NOT NULL")
            .fetch_one(&self.pool)
            .await?;
        if !present {
            return Err(DbError::MissingTable);
        }
        tracing::info!("Belief table ready");
        Ok(())
    }

    /// Row access bound to this database.
    pub const fn rows(&self) -> BeliefRowStore<'_> {
        BeliefRowStore::new(&self.pool)
    }

    /// Close all connections, waiting for in-flight saves.
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!("Belief database closed");
    }
}
