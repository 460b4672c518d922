//! Member records and keyed roster snapshots.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ledger::MembershipLedger;

/// A raw roster entry as observed at the source, before it becomes a
/// tracked member record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    /// Stable external character identifier.
    pub character_id: String,
    /// Character name.
    pub name: String,
    /// Free Company rank name.
    pub rank: String,
    /// URL of the rank icon.
    pub rank_icon: String,
    /// URL of the character avatar.
    pub avatar: String,
}

/// A tracked Free Company member.
///
/// Records are created the first time a character is observed and never
/// physically deleted: departure flips `active` and closes the ledger,
/// preserving the full history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreeCompanyMember {
    /// Stable external character identifier, unique within a snapshot and
    /// never reused for a different physical character.
    pub character_id: String,
    /// Character name.
    pub name: String,
    /// Free Company rank name.
    pub rank: String,
    /// URL of the rank icon.
    pub rank_icon: String,
    /// URL of the character avatar.
    pub avatar: String,
    /// Whether the character currently belongs to the Free Company.
    pub active: bool,
    /// Set on every mutation.
    pub last_updated: DateTime<Utc>,
    /// Append-only history of membership stints.
    pub ledger: MembershipLedger,
    /// Last known promotion time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promotion_date: Option<DateTime<Utc>>,
}

impl FreeCompanyMember {
    /// Map a raw roster entry into a member record.
    ///
    /// Freshly observed entries are active with a newly opened ledger stint;
    /// the differ decides whether the record is actually inserted or whether
    /// an archived record absorbs the observed fields instead.
    pub fn from_entry(entry: RosterEntry, observed_at: DateTime<Utc>) -> Self {
        Self {
            character_id: entry.character_id,
            name: entry.name,
            rank: entry.rank,
            rank_icon: entry.rank_icon,
            avatar: entry.avatar,
            active: true,
            last_updated: observed_at,
            ledger: MembershipLedger::opened(observed_at.date_naive()),
            promotion_date: None,
        }
    }
}

/// A per-member partial update, applied by the persistence adapter keyed on
/// `character_id`. Only `Some` fields are written; `last_updated` is always
/// written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberPatch {
    /// Key of the member to update.
    pub character_id: String,
    pub name: Option<String>,
    pub rank: Option<String>,
    pub rank_icon: Option<String>,
    pub avatar: Option<String>,
    pub active: Option<bool>,
    pub ledger: Option<MembershipLedger>,
    pub promotion_date: Option<DateTime<Utc>>,
    /// New mutation timestamp.
    pub last_updated: DateTime<Utc>,
}

impl MemberPatch {
    /// Create an empty patch for a member.
    pub fn new(character_id: impl Into<String>, last_updated: DateTime<Utc>) -> Self {
        Self {
            character_id: character_id.into(),
            name: None,
            rank: None,
            rank_icon: None,
            avatar: None,
            active: None,
            ledger: None,
            promotion_date: None,
            last_updated,
        }
    }
}

/// The complete set of member records as known at one point in time, keyed
/// by `character_id`.
#[derive(Debug, Clone, Default)]
pub struct RosterSnapshot {
    members: HashMap<String, FreeCompanyMember>,
}

impl RosterSnapshot {
    /// Create an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a snapshot from member records.
    ///
    /// `character_id` is unique within a snapshot; a duplicate key keeps the
    /// later record.
    pub fn from_members(members: impl IntoIterator<Item = FreeCompanyMember>) -> Self {
        Self {
            members: members
                .into_iter()
                .map(|m| (m.character_id.clone(), m))
                .collect(),
        }
    }

    /// Look up a member by character id.
    pub fn get(&self, character_id: &str) -> Option<&FreeCompanyMember> {
        self.members.get(character_id)
    }

    /// Whether a character id is present.
    pub fn contains(&self, character_id: &str) -> bool {
        self.members.contains_key(character_id)
    }

    /// Iterate over the member records, in no particular order.
    pub fn members(&self) -> impl Iterator<Item = &FreeCompanyMember> {
        self.members.values()
    }

    /// Number of member records.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the snapshot has no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}
