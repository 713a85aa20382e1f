//! Error types for belief persistence.

/// Errors raised while opening the belief database or reading and writing
/// belief rows.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// `DATABASE_URL` is not a valid `PostgreSQL` connection string.
    #[error("invalid database URL: {0}")]
    InvalidUrl(#[source] sqlx::Error),

    /// The pool could not reach the server.
    #[error("cannot connect to PostgreSQL: {0}")]
    Connect(#[source] sqlx::Error),

    /// Creating or upgrading the `trust_beliefs` table failed.
    #[error("belief table migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Migrations ran but `trust_beliefs` is not visible to this role.
    #[error("table trust_beliefs is missing after migration")]
    MissingTable,

    /// A read or write of belief rows failed.
    #[error("belief query failed: {0}")]
    Query(#[from] sqlx::Error),
}
