//! Postgres implementation of the roster store.

use async_trait::async_trait;
use sqlx::PgPool;

use lodebook_core::error::{SyncError, SyncResult};
use lodebook_core::event::FcEvent;
use lodebook_core::member::{FreeCompanyMember, MemberPatch, RosterSnapshot};
use lodebook_core::traits::RosterStore;

use crate::models::{FcEventRow, FcMemberRow};

/// Member and event persistence over a shared connection pool.
#[derive(Debug, Clone)]
pub struct PgRosterStore {
    pool: PgPool,
}

impl PgRosterStore {
    /// Create a store over the pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RosterStore for PgRosterStore {
    async fn load_snapshot(&self) -> SyncResult<RosterSnapshot> {
        let rows = FcMemberRow::find_all(&self.pool)
            .await
            .map_err(|e| SyncError::archive_load(e.to_string()))?;

        let members = rows
            .into_iter()
            .map(FcMemberRow::into_member)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| SyncError::archive_load(format!("corrupt member row: {e}")))?;

        Ok(RosterSnapshot::from_members(members))
    }

    async fn apply_patches(&self, patches: &[MemberPatch]) -> SyncResult<()> {
        if patches.is_empty() {
            return Ok(());
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| SyncError::persistence_write(e.to_string()))?;
        for patch in patches {
            FcMemberRow::apply_patch(&mut *tx, patch).await.map_err(|e| {
                SyncError::persistence_write(format!(
                    "patch for {} failed: {e}",
                    patch.character_id
                ))
            })?;
        }
        tx.commit()
            .await
            .map_err(|e| SyncError::persistence_write(e.to_string()))?;

        tracing::debug!(count = patches.len(), "Member patch batch committed");
        Ok(())
    }

    async fn insert_members(&self, members: &[FreeCompanyMember]) -> SyncResult<()> {
        if members.is_empty() {
            return Ok(());
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| SyncError::persistence_write(e.to_string()))?;
        for member in members {
            FcMemberRow::insert(&mut *tx, member).await.map_err(|e| {
                SyncError::persistence_write(format!(
                    "insert of {} failed: {e}",
                    member.character_id
                ))
            })?;
        }
        tx.commit()
            .await
            .map_err(|e| SyncError::persistence_write(e.to_string()))?;

        tracing::debug!(count = members.len(), "Member insert batch committed");
        Ok(())
    }

    async fn insert_events(&self, events: &[FcEvent]) -> SyncResult<()> {
        if events.is_empty() {
            return Ok(());
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| SyncError::persistence_write(e.to_string()))?;
        for event in events {
            FcEventRow::insert(&mut *tx, event).await.map_err(|e| {
                SyncError::persistence_write(format!("event insert failed: {e}"))
            })?;
        }
        tx.commit()
            .await
            .map_err(|e| SyncError::persistence_write(e.to_string()))?;

        tracing::debug!(count = events.len(), "Event batch committed");
        Ok(())
    }
}
