//! Fresh-vs-archived roster partitioning.
//!
//! Classifies every member of two snapshots into disjoint transition sets,
//! keyed by `character_id`. Lookups go through the snapshot hash index, so a
//! diff of N fresh and M archived members is O(N+M).

use crate::error::{SyncError, SyncResult};
use crate::member::{FreeCompanyMember, RosterSnapshot};

/// Field-level delta for a still-active member. `Some` holds the observed
/// new value for a field that differs from the archive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldChanges {
    pub name: Option<String>,
    pub rank: Option<String>,
    pub rank_icon: Option<String>,
    pub avatar: Option<String>,
}

impl FieldChanges {
    /// Compare the compared display fields of an archived record against the
    /// freshly observed one.
    pub fn between(archived: &FreeCompanyMember, fresh: &FreeCompanyMember) -> Self {
        let differs = |a: &str, b: &str| (a != b).then(|| b.to_string());
        Self {
            name: differs(&archived.name, &fresh.name),
            rank: differs(&archived.rank, &fresh.rank),
            rank_icon: differs(&archived.rank_icon, &fresh.rank_icon),
            avatar: differs(&archived.avatar, &fresh.avatar),
        }
    }

    /// Whether no compared field differs.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.rank.is_none()
            && self.rank_icon.is_none()
            && self.avatar.is_none()
    }
}

/// A still-active member with at least one changed display field.
#[derive(Debug, Clone)]
pub struct MemberUpdate {
    /// The archived record, including the previous rank and the ledger.
    pub archived: FreeCompanyMember,
    /// The fields that changed, with their new values.
    pub changes: FieldChanges,
}

/// A previously departed member observed in the fresh roster again.
#[derive(Debug, Clone)]
pub struct Rejoin {
    /// The archived (inactive) record whose ledger is extended.
    pub archived: FreeCompanyMember,
    /// The freshly observed record carrying the current display fields.
    pub current: FreeCompanyMember,
}

/// The disjoint transition partitions of one reconciliation cycle.
///
/// Every member key of either snapshot lands in exactly one of: `left`,
/// `joined`, `rejoined`, `updated`, the `unchanged` count, or (for members
/// inactive in the archive and absent from fresh) nowhere at all.
#[derive(Debug, Clone, Default)]
pub struct RosterDiff {
    /// Archived-active members absent from the fresh roster.
    pub left: Vec<FreeCompanyMember>,
    /// Fresh members with no archived record at all.
    pub joined: Vec<FreeCompanyMember>,
    /// Fresh members whose archived record is inactive.
    pub rejoined: Vec<Rejoin>,
    /// Archived-active members present in fresh with field changes.
    pub updated: Vec<MemberUpdate>,
    /// Archived-active members present in fresh with no field changes.
    pub unchanged: usize,
}

impl RosterDiff {
    /// Total number of members with a transition this cycle.
    pub fn transition_count(&self) -> usize {
        self.left.len() + self.joined.len() + self.rejoined.len() + self.updated.len()
    }

    /// Whether the cycle found nothing to do.
    pub fn is_quiet(&self) -> bool {
        self.transition_count() == 0
    }
}

/// Partition `fresh` against `archived`.
///
/// The fresh snapshot must clear `min_roster_size` first: a degraded or
/// partially failed fetch would otherwise read as a mass exodus and close
/// ledgers that should stay open. Violations abort with
/// [`SyncError::DataQuality`] before any classification.
pub fn diff_rosters(
    fresh: &RosterSnapshot,
    archived: &RosterSnapshot,
    min_roster_size: usize,
) -> SyncResult<RosterDiff> {
    if fresh.len() < min_roster_size {
        return Err(SyncError::DataQuality {
            observed: fresh.len(),
            required: min_roster_size,
        });
    }

    let mut diff = RosterDiff::default();

    for member in archived.members() {
        if member.active && !fresh.contains(&member.character_id) {
            diff.left.push(member.clone());
        }
    }

    for current in fresh.members() {
        match archived.get(&current.character_id) {
            None => diff.joined.push(current.clone()),
            Some(prior) if !prior.active => diff.rejoined.push(Rejoin {
                archived: prior.clone(),
                current: current.clone(),
            }),
            Some(prior) => {
                let changes = FieldChanges::between(prior, current);
                if changes.is_empty() {
                    diff.unchanged += 1;
                } else {
                    diff.updated.push(MemberUpdate {
                        archived: prior.clone(),
                        changes,
                    });
                }
            }
        }
    }

    Ok(diff)
}
