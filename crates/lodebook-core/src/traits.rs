//! Adapter traits consumed by the sync engine.
//!
//! The engine owns the reconciliation semantics; fetching, persistence and
//! notification are injected behind these traits so transports can be
//! swapped (and mocked) without touching the core.

use async_trait::async_trait;

use crate::error::SyncResult;
use crate::event::FcEvent;
use crate::member::{FreeCompanyMember, MemberPatch, RosterEntry, RosterSnapshot};

/// Source of the live roster.
#[async_trait]
pub trait RosterSource: Send + Sync {
    /// Fetch the complete current roster from the upstream source.
    ///
    /// Pagination, rate limiting and transport concerns live behind this
    /// call; failures surface as [`SyncError::SourceFetch`].
    ///
    /// [`SyncError::SourceFetch`]: crate::error::SyncError::SourceFetch
    async fn fetch_roster(&self) -> SyncResult<Vec<RosterEntry>>;
}

/// Persistence for member records and events.
#[async_trait]
pub trait RosterStore: Send + Sync {
    /// Load the archived snapshot: every tracked member, active or not.
    async fn load_snapshot(&self) -> SyncResult<RosterSnapshot>;

    /// Apply one logical batch of per-member partial updates.
    ///
    /// The batch is atomic within itself; no transactionality is promised
    /// across separate batches of the same cycle.
    async fn apply_patches(&self, patches: &[MemberPatch]) -> SyncResult<()>;

    /// Insert brand-new member records.
    async fn insert_members(&self, members: &[FreeCompanyMember]) -> SyncResult<()>;

    /// Durably record the cycle's events.
    async fn insert_events(&self, events: &[FcEvent]) -> SyncResult<()>;
}

/// Best-effort downstream event delivery.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish the cycle's events.
    ///
    /// Callers treat failures as log-and-continue; delivery runs only after
    /// the same events were durably recorded.
    async fn publish(&self, events: &[FcEvent]) -> SyncResult<()>;
}
