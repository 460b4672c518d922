//! lodebook Sync Engine
//!
//! Sequences one reconciliation cycle: fetch the live roster, load the
//! archived snapshot, diff, apply the per-partition write batches, record
//! events durably, then publish them best-effort.
//!
//! # Modules
//!
//! - [`engine`] - The cycle state machine and write-set planning
//! - [`report`] - Per-cycle outcome counts
//! - [`webhook`] - HTTP event publisher

pub mod engine;
pub mod report;
pub mod webhook;

pub use engine::{CycleStage, SyncConfig, SyncEngine};
pub use report::CycleReport;
pub use webhook::{WebhookConfig, WebhookPublisher};
