//! lodebook Postgres persistence
//!
//! Member and event storage behind the [`RosterStore`] adapter trait:
//! one row per tracked character in `fc_members` (the ledger as JSONB),
//! an append-only event log in `fc_events`, and embedded migrations.
//!
//! [`RosterStore`]: lodebook_core::traits::RosterStore

pub mod models;
pub mod store;

pub use store::PgRosterStore;

/// Embedded schema migrations.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Run pending migrations against the pool.
pub async fn run_migrations(pool: &sqlx::PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    MIGRATOR.run(pool).await
}
