//! Event row model.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use lodebook_core::event::FcEvent;

/// A row of the append-only `fc_events` log.
#[derive(Debug, Clone, FromRow)]
pub struct FcEventRow {
    pub id: Uuid,
    pub kind: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl FcEventRow {
    /// Record one event.
    pub async fn insert(
        executor: impl sqlx::PgExecutor<'_>,
        event: &FcEvent,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r"
            INSERT INTO fc_events (id, kind, text, created_at)
            VALUES ($1, $2, $3, $4)
            ",
        )
        .bind(event.id)
        .bind(event.kind.to_string())
        .bind(&event.text)
        .bind(event.timestamp)
        .execute(executor)
        .await?;
        Ok(())
    }
}
