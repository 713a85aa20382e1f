//! Belief persistence in the `trust_beliefs` table.
//!
//! Every save appends one row per task, tagged with a shared `save_id`
//! (UUID v7, so saves sort by creation time). Loading picks the newest
//! row per task for a teammate. Rows are handed back as raw
//! [`BeliefRecord`]s; validating labels and ranges is the agent's job.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use rescuebot_types::{BeliefRecord, TeammateId};

use crate::error::DbError;

/// Operations on the `trust_beliefs` table.
pub struct BeliefRowStore<'a> {
    pool: &'a PgPool,
}

impl<'a> BeliefRowStore<'a> {
    /// Create a new belief store bound to a connection pool.
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Append one save's worth of rows in a single transaction.
    ///
    /// Returns the `save_id` shared by the inserted rows. An empty slice
    /// writes nothing.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Query`] if any insert fails; the whole save is
    /// rolled back.
    pub async fn save(&self, records: &[BeliefRecord]) -> Result<Uuid, DbError> {
        let save_id = Uuid::now_v7();
        if records.is_empty() {
            return Ok(save_id);
        }

        let mut tx = self.pool.begin().await?;
        for record in records {
            sqlx::query(
                r"INSERT INTO trust_beliefs (save_id, teammate, task, competence, willingness)
                  VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(save_id)
            .bind(record.teammate.as_str())
            .bind(&record.task)
            .bind(record.competence)
            .bind(record.willingness)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        tracing::debug!(%save_id, rows = records.len(), "Saved trust beliefs");
        Ok(save_id)
    }

    /// The newest row per task for `teammate`, ordered by task label.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Query`] if the query fails.
    pub async fn latest_for(&self, teammate: &TeammateId) -> Result<Vec<BeliefRecord>, DbError> {
        let rows = sqlx::query_as::<_, BeliefRow>(
            r"SELECT DISTINCT ON (task)
                     save_id, teammate, task, competence, willingness, recorded_at
              FROM trust_beliefs
              WHERE teammate = $1
              ORDER BY task, id DESC",
        )
        .bind(teammate.as_str())
        .fetch_all(self.pool)
        .await?;

        tracing::debug!(%teammate, rows = rows.len(), "Loaded trust beliefs");
        Ok(rows.into_iter().map(BeliefRow::into_record).collect())
    }

    /// The most recent `count` rows for `teammate`, newest first. The
    /// runner reads the newest one at startup to report which save it
    /// resumes from.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Query`] if the query fails.
    pub async fn history(&self, teammate: &TeammateId, count: i64) -> Result<Vec<BeliefRow>, DbError> {
        let rows = sqlx::query_as::<_, BeliefRow>(
            r"SELECT save_id, teammate, task, competence, willingness, recorded_at
              FROM trust_beliefs
              WHERE teammate = $1
              ORDER BY id DESC
              LIMIT $2",
        )
        .bind(teammate.as_str())
        .bind(count)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }
}

/// A row read back from the `trust_beliefs` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BeliefRow {
    /// Save the row belongs to.
    pub save_id: Uuid,
    /// Teammate the row is about.
    pub teammate: String,
    /// Task label.
    pub task: String,
    /// Competence scalar.
    pub competence: f64,
    /// Willingness scalar.
    pub willingness: f64,
    /// When the row was written.
    pub recorded_at: DateTime<Utc>,
}

impl BeliefRow {
    /// Strip the bookkeeping columns.
    pub fn into_record(self) -> BeliefRecord {
        BeliefRecord {
            teammate: TeammateId::from(self.teammate),
            task: self.task,
            competence: self.competence,
            willingness: self.willingness,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_converts_to_record() {
        let row = BeliefRow {
            save_id: Uuid::now_v7(),
            teammate: "human".to_owned(),
            task: "rescue".to_owned(),
            competence: 0.25,
            willingness: -0.5,
            recorded_at: Utc::now(),
        };
        let record = row.into_record();
        assert_eq!(record.teammate, TeammateId::from("human"));
        assert_eq!(record.task, "rescue");
        assert!((record.competence - 0.25).abs() < f64::EPSILON);
        assert!((record.willingness + 0.5).abs() < f64::EPSILON);
    }
}
