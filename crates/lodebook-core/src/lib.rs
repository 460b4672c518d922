//! lodebook Core Library
//!
//! Domain model and reconciliation logic for tracking a Free Company roster
//! over time: snapshot diffing, membership-history ledgers, the rank
//! promotion policy, and event derivation.
//!
//! # Modules
//!
//! - [`member`] - Member records, raw roster entries, and keyed snapshots
//! - [`ledger`] - Append-only membership stint ledger
//! - [`rank`] - Ordered rank table and promotion predicate
//! - [`diff`] - Fresh-vs-archived roster partitioning
//! - [`event`] - Domain events and event derivation
//! - [`error`] - Cycle error taxonomy
//! - [`traits`] - Adapter traits consumed by the sync engine

pub mod diff;
pub mod error;
pub mod event;
pub mod ledger;
pub mod member;
pub mod rank;
pub mod traits;

// Re-export main types for convenient access
pub use diff::{diff_rosters, FieldChanges, MemberUpdate, Rejoin, RosterDiff};
pub use error::{SyncError, SyncResult};
pub use event::{EventDeriver, FcEvent, FcEventKind};
pub use ledger::{MembershipLedger, Stint};
pub use member::{FreeCompanyMember, MemberPatch, RosterEntry, RosterSnapshot};
pub use rank::RankTable;
pub use traits::{EventPublisher, RosterSource, RosterStore};
