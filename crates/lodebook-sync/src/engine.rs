//! The reconciliation cycle state machine.
//!
//! One cycle runs the stages strictly in order, with no backtracking:
//! fetch fresh → load archive → validate → diff → apply departures → apply
//! joins → apply updates → record events → publish. Everything up to the
//! first write is side-effect free; each `Applying*` stage is one logical
//! batch over a disjoint member partition.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, NaiveDate, Utc};

use lodebook_core::diff::{diff_rosters, MemberUpdate, Rejoin};
use lodebook_core::error::SyncError;
use lodebook_core::event::EventDeriver;
use lodebook_core::member::{FreeCompanyMember, MemberPatch, RosterSnapshot};
use lodebook_core::rank::RankTable;
use lodebook_core::traits::{EventPublisher, RosterSource, RosterStore};

use crate::report::CycleReport;

/// Stage of the reconciliation cycle, for logging and error context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleStage {
    Idle,
    FetchingFresh,
    FetchingArchive,
    Validating,
    Diffing,
    ApplyingLeft,
    ApplyingJoins,
    ApplyingUpdates,
    Done,
    Aborted,
}

impl fmt::Display for CycleStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::FetchingFresh => write!(f, "fetching_fresh"),
            Self::FetchingArchive => write!(f, "fetching_archive"),
            Self::Validating => write!(f, "validating"),
            Self::Diffing => write!(f, "diffing"),
            Self::ApplyingLeft => write!(f, "applying_left"),
            Self::ApplyingJoins => write!(f, "applying_joins"),
            Self::ApplyingUpdates => write!(f, "applying_updates"),
            Self::Done => write!(f, "done"),
            Self::Aborted => write!(f, "aborted"),
        }
    }
}

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Minimum fresh-roster size before a diff is attempted.
    pub min_roster_size: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            min_roster_size: 10,
        }
    }
}

/// Runs reconciliation cycles against injected adapters.
pub struct SyncEngine {
    source: Arc<dyn RosterSource>,
    store: Arc<dyn RosterStore>,
    publisher: Arc<dyn EventPublisher>,
    deriver: EventDeriver,
    config: SyncConfig,
}

impl SyncEngine {
    /// Create an engine with default configuration.
    pub fn new(
        source: Arc<dyn RosterSource>,
        store: Arc<dyn RosterStore>,
        publisher: Arc<dyn EventPublisher>,
        ranks: RankTable,
    ) -> Self {
        Self {
            source,
            store,
            publisher,
            deriver: EventDeriver::new(ranks),
            config: SyncConfig::default(),
        }
    }

    /// Replace the configuration.
    #[must_use]
    pub fn with_config(mut self, config: SyncConfig) -> Self {
        self.config = config;
        self
    }

    /// Run one full reconciliation cycle.
    ///
    /// Returns the cycle report on success. On failure the cycle is
    /// aborted at its current stage; whether any writes happened is
    /// captured by [`SyncError::aborts_before_mutation`].
    pub async fn run_cycle(&self) -> Result<CycleReport, SyncError> {
        let started = Instant::now();
        match self.drive_cycle().await {
            Ok(mut report) => {
                report.duration_ms = started.elapsed().as_millis() as u64;
                tracing::info!(
                    members_seen = report.members_seen,
                    left = report.left,
                    joined = report.joined,
                    rejoined = report.rejoined,
                    updated = report.updated,
                    unchanged = report.unchanged,
                    events = report.events_emitted,
                    duration_ms = report.duration_ms,
                    "Reconciliation cycle completed"
                );
                Ok(report)
            }
            Err((stage, error)) => {
                tracing::error!(
                    stage = %stage,
                    code = error.error_code(),
                    error = %error,
                    pre_mutation = error.aborts_before_mutation(),
                    "Reconciliation cycle aborted"
                );
                Err(error)
            }
        }
    }

    async fn drive_cycle(&self) -> Result<CycleReport, (CycleStage, SyncError)> {
        let now = Utc::now();
        let today = now.date_naive();

        let mut stage = CycleStage::FetchingFresh;
        tracing::debug!(stage = %stage, "Fetching live roster");
        let entries = self
            .source
            .fetch_roster()
            .await
            .map_err(|e| (stage, e))?;
        let fresh = RosterSnapshot::from_members(
            entries
                .into_iter()
                .map(|entry| FreeCompanyMember::from_entry(entry, now)),
        );

        stage = CycleStage::FetchingArchive;
        tracing::debug!(stage = %stage, "Loading archived snapshot");
        let archived = self
            .store
            .load_snapshot()
            .await
            .map_err(|e| (stage, e))?;

        stage = CycleStage::Validating;
        tracing::debug!(stage = %stage, fresh = fresh.len(), archived = archived.len(), "Validating fresh roster");
        if fresh.len() < self.config.min_roster_size {
            return Err((
                stage,
                SyncError::DataQuality {
                    observed: fresh.len(),
                    required: self.config.min_roster_size,
                },
            ));
        }

        stage = CycleStage::Diffing;
        let diff = diff_rosters(&fresh, &archived, self.config.min_roster_size)
            .map_err(|e| (stage, e))?;

        stage = CycleStage::ApplyingLeft;
        let left_patches = plan_departures(&diff.left, today, now);
        if !left_patches.is_empty() {
            tracing::info!(stage = %stage, count = left_patches.len(), "Applying departures");
            self.store
                .apply_patches(&left_patches)
                .await
                .map_err(|e| (stage, e))?;
        }

        stage = CycleStage::ApplyingJoins;
        if !diff.joined.is_empty() {
            tracing::info!(stage = %stage, count = diff.joined.len(), "Inserting new members");
            self.store
                .insert_members(&diff.joined)
                .await
                .map_err(|e| (stage, e))?;
        }
        let rejoin_patches = plan_rejoins(&diff.rejoined, today, now);
        if !rejoin_patches.is_empty() {
            tracing::info!(stage = %stage, count = rejoin_patches.len(), "Applying rejoins");
            self.store
                .apply_patches(&rejoin_patches)
                .await
                .map_err(|e| (stage, e))?;
        }

        stage = CycleStage::ApplyingUpdates;
        let update_patches = plan_updates(&diff.updated, self.deriver.ranks(), now);
        if !update_patches.is_empty() {
            tracing::info!(stage = %stage, count = update_patches.len(), "Applying field updates");
            self.store
                .apply_patches(&update_patches)
                .await
                .map_err(|e| (stage, e))?;
        }

        // Durable recording must succeed; delivery is best-effort and runs
        // strictly after the write.
        let events = self.deriver.derive(&diff, now);
        let mut events_published = false;
        if !events.is_empty() {
            self.store
                .insert_events(&events)
                .await
                .map_err(|e| (stage, e))?;

            match self.publisher.publish(&events).await {
                Ok(()) => events_published = true,
                Err(error) => {
                    tracing::warn!(
                        code = error.error_code(),
                        error = %error,
                        events = events.len(),
                        "Event delivery failed; events remain recorded"
                    );
                }
            }
        }

        Ok(CycleReport {
            members_seen: fresh.len(),
            left: diff.left.len(),
            joined: diff.joined.len(),
            rejoined: diff.rejoined.len(),
            updated: diff.updated.len(),
            unchanged: diff.unchanged,
            events_emitted: events.len(),
            events_published,
            duration_ms: 0,
        })
    }
}

/// Write-set for departed members: deactivate and close the ledger.
fn plan_departures(
    left: &[FreeCompanyMember],
    today: NaiveDate,
    now: DateTime<Utc>,
) -> Vec<MemberPatch> {
    left.iter()
        .map(|member| {
            let mut ledger = member.ledger.clone();
            ledger.close(today);
            let mut patch = MemberPatch::new(&member.character_id, now);
            patch.active = Some(false);
            patch.ledger = Some(ledger);
            patch
        })
        .collect()
}

/// Write-set for returning members: refresh display fields, reactivate, and
/// open a new ledger stint.
fn plan_rejoins(rejoined: &[Rejoin], today: NaiveDate, now: DateTime<Utc>) -> Vec<MemberPatch> {
    rejoined
        .iter()
        .map(|rejoin| {
            let mut ledger = rejoin.archived.ledger.clone();
            ledger.reopen(today);
            let mut patch = MemberPatch::new(&rejoin.archived.character_id, now);
            patch.name = Some(rejoin.current.name.clone());
            patch.rank = Some(rejoin.current.rank.clone());
            patch.rank_icon = Some(rejoin.current.rank_icon.clone());
            patch.avatar = Some(rejoin.current.avatar.clone());
            patch.active = Some(true);
            patch.ledger = Some(ledger);
            patch
        })
        .collect()
}

/// Write-set for still-active members with field changes. A rank change
/// that qualifies as a promotion also stamps the promotion date.
fn plan_updates(
    updated: &[MemberUpdate],
    ranks: &RankTable,
    now: DateTime<Utc>,
) -> Vec<MemberPatch> {
    updated
        .iter()
        .map(|update| {
            let mut patch = MemberPatch::new(&update.archived.character_id, now);
            patch.name = update.changes.name.clone();
            patch.rank = update.changes.rank.clone();
            patch.rank_icon = update.changes.rank_icon.clone();
            patch.avatar = update.changes.avatar.clone();
            if let Some(new_rank) = &update.changes.rank {
                if ranks.is_promotion(&update.archived.rank, new_rank) {
                    patch.promotion_date = Some(now);
                }
            }
            patch
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::Days;
    use lodebook_core::diff::FieldChanges;
    use lodebook_core::ledger::MembershipLedger;
    use lodebook_core::member::RosterEntry;

    use super::*;

    fn member(id: &str, name: &str, rank: &str) -> FreeCompanyMember {
        FreeCompanyMember::from_entry(
            RosterEntry {
                character_id: id.to_string(),
                name: name.to_string(),
                rank: rank.to_string(),
                rank_icon: "icon".to_string(),
                avatar: "avatar".to_string(),
            },
            Utc::now(),
        )
    }

    fn ranks() -> RankTable {
        RankTable::from_ordered(["Mandragora", "Coeurl Hunter"])
    }

    #[test]
    fn test_departure_plan_closes_ledger() {
        let now = Utc::now();
        let today = now.date_naive();
        let leaver = member("1", "Leaver", "Mandragora");

        let patches = plan_departures(&[leaver.clone()], today, now);
        assert_eq!(patches.len(), 1);

        let patch = &patches[0];
        assert_eq!(patch.character_id, "1");
        assert_eq!(patch.active, Some(false));
        assert!(patch.name.is_none());

        let ledger = patch.ledger.as_ref().unwrap();
        assert!(!ledger.is_open());
        assert!(ledger.extends(&leaver.ledger));
        assert_eq!(ledger.stints().last().unwrap().left, Some(today));
    }

    #[test]
    fn test_rejoin_plan_opens_new_stint() {
        let now = Utc::now();
        let today = now.date_naive();

        let mut archived = member("1", "Returner", "Mandragora");
        archived.active = false;
        archived.ledger = {
            let mut l = MembershipLedger::opened(today - Days::new(90));
            l.close(today - Days::new(30));
            l
        };
        let current = member("1", "Returner Renamed", "Coeurl Hunter");

        let patches = plan_rejoins(
            &[Rejoin {
                archived: archived.clone(),
                current,
            }],
            today,
            now,
        );
        let patch = &patches[0];
        assert_eq!(patch.active, Some(true));
        assert_eq!(patch.name.as_deref(), Some("Returner Renamed"));
        assert_eq!(patch.rank.as_deref(), Some("Coeurl Hunter"));

        let ledger = patch.ledger.as_ref().unwrap();
        assert_eq!(ledger.len(), 2);
        assert!(ledger.is_open());
        assert!(ledger.extends(&archived.ledger));
    }

    #[test]
    fn test_update_plan_stamps_promotion_date() {
        let now = Utc::now();
        let archived = member("1", "Climber", "Mandragora");

        let promotion = MemberUpdate {
            archived: archived.clone(),
            changes: FieldChanges {
                rank: Some("Coeurl Hunter".to_string()),
                ..FieldChanges::default()
            },
        };
        let patches = plan_updates(&[promotion], &ranks(), now);
        assert_eq!(patches[0].promotion_date, Some(now));
        assert_eq!(patches[0].rank.as_deref(), Some("Coeurl Hunter"));
        assert!(patches[0].ledger.is_none());

        let demotion = MemberUpdate {
            archived: member("2", "Slider", "Coeurl Hunter"),
            changes: FieldChanges {
                rank: Some("Mandragora".to_string()),
                ..FieldChanges::default()
            },
        };
        let patches = plan_updates(&[demotion], &ranks(), now);
        assert!(patches[0].promotion_date.is_none());
        // The field change itself still applies.
        assert_eq!(patches[0].rank.as_deref(), Some("Mandragora"));
    }
}
