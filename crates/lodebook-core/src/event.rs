//! Domain events and event derivation.
//!
//! Events are transient per cycle: derived from the diff partitions, handed
//! to persistence and notification, and not tracked further.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::diff::RosterDiff;
use crate::rank::RankTable;

/// Kind of roster event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FcEventKind {
    /// A character joined for the first time.
    MemberJoined,
    /// A previously departed character returned.
    MemberRejoined,
    /// A rank change that strictly increases rank level.
    RankPromoted,
    /// A character name change.
    NameChanged,
}

impl fmt::Display for FcEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MemberJoined => write!(f, "member_joined"),
            Self::MemberRejoined => write!(f, "member_rejoined"),
            Self::RankPromoted => write!(f, "rank_promoted"),
            Self::NameChanged => write!(f, "name_changed"),
        }
    }
}

impl std::str::FromStr for FcEventKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "member_joined" => Ok(Self::MemberJoined),
            "member_rejoined" => Ok(Self::MemberRejoined),
            "rank_promoted" => Ok(Self::RankPromoted),
            "name_changed" => Ok(Self::NameChanged),
            _ => Err(format!("Unknown event kind: {s}")),
        }
    }
}

/// A roster event derived from one reconciliation cycle.
///
/// Serializes to the downstream wire shape `{id, type, text, timestamp}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FcEvent {
    /// Opaque unique token.
    pub id: Uuid,
    /// Event kind, `type` on the wire.
    #[serde(rename = "type")]
    pub kind: FcEventKind,
    /// Human-readable message.
    pub text: String,
    /// When the event was derived.
    pub timestamp: DateTime<Utc>,
}

impl FcEvent {
    /// Create a new event with a fresh id.
    pub fn new(kind: FcEventKind, text: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            text: text.into(),
            timestamp,
        }
    }
}

/// Turns diff partitions into a flat ordered event sequence.
#[derive(Debug, Clone)]
pub struct EventDeriver {
    ranks: RankTable,
}

impl EventDeriver {
    /// Create a deriver over the configured rank table.
    pub fn new(ranks: RankTable) -> Self {
        Self { ranks }
    }

    /// The rank table in use.
    pub fn ranks(&self) -> &RankTable {
        &self.ranks
    }

    /// Derive the cycle's events from its diff.
    ///
    /// Joins first, then rejoins, then per-update name changes and
    /// qualifying promotions. Departures produce no event; their ledger
    /// close is the only record.
    pub fn derive(&self, diff: &RosterDiff, now: DateTime<Utc>) -> Vec<FcEvent> {
        let mut events = Vec::new();

        for member in &diff.joined {
            events.push(FcEvent::new(
                FcEventKind::MemberJoined,
                format!("{} has joined the Free Company!", member.name),
                now,
            ));
        }

        for rejoin in &diff.rejoined {
            events.push(FcEvent::new(
                FcEventKind::MemberRejoined,
                format!("{} has rejoined the Free Company!", rejoin.current.name),
                now,
            ));
        }

        for update in &diff.updated {
            let current_name = update
                .changes
                .name
                .as_deref()
                .unwrap_or(&update.archived.name);

            if let Some(new_name) = &update.changes.name {
                events.push(FcEvent::new(
                    FcEventKind::NameChanged,
                    format!("{} is now known as {}", update.archived.name, new_name),
                    now,
                ));
            }

            if let Some(new_rank) = &update.changes.rank {
                if self.ranks.is_promotion(&update.archived.rank, new_rank) {
                    events.push(FcEvent::new(
                        FcEventKind::RankPromoted,
                        format!("{current_name} has been promoted to {new_rank}!"),
                        now,
                    ));
                }
            }
        }

        events
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::diff::diff_rosters;
    use crate::member::{FreeCompanyMember, RosterEntry, RosterSnapshot};

    fn member(id: &str, name: &str, rank: &str, active: bool) -> FreeCompanyMember {
        let mut m = FreeCompanyMember::from_entry(
            RosterEntry {
                character_id: id.to_string(),
                name: name.to_string(),
                rank: rank.to_string(),
                rank_icon: "icon".to_string(),
                avatar: "avatar".to_string(),
            },
            Utc::now(),
        );
        m.active = active;
        m
    }

    fn deriver() -> EventDeriver {
        EventDeriver::new(RankTable::from_ordered([
            "Sprout",
            "Mandragora",
            "Coeurl Hunter",
        ]))
    }

    #[test]
    fn test_promotion_emits_single_event() {
        let archived =
            RosterSnapshot::from_members(vec![member("a", "Puk Waddle", "Mandragora", true)]);
        let fresh =
            RosterSnapshot::from_members(vec![member("a", "Puk Waddle", "Coeurl Hunter", true)]);
        let diff = diff_rosters(&fresh, &archived, 1).unwrap();

        let events = deriver().derive(&diff, Utc::now());
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, FcEventKind::RankPromoted);
        assert_eq!(
            events[0].text,
            "Puk Waddle has been promoted to Coeurl Hunter!"
        );
    }

    #[test]
    fn test_demotion_and_unknown_rank_emit_nothing() {
        let archived =
            RosterSnapshot::from_members(vec![member("a", "A", "Coeurl Hunter", true)]);
        let fresh = RosterSnapshot::from_members(vec![member("a", "A", "Mandragora", true)]);
        let diff = diff_rosters(&fresh, &archived, 1).unwrap();
        assert!(deriver().derive(&diff, Utc::now()).is_empty());

        let archived = RosterSnapshot::from_members(vec![member("a", "A", "Mandragora", true)]);
        let fresh =
            RosterSnapshot::from_members(vec![member("a", "A", "Moogle Knight", true)]);
        let diff = diff_rosters(&fresh, &archived, 1).unwrap();
        assert!(deriver().derive(&diff, Utc::now()).is_empty());
    }

    #[test]
    fn test_join_rejoin_and_rename() {
        let archived = RosterSnapshot::from_members(vec![
            member("returner", "Returner", "Mandragora", false),
            member("renamer", "Old Name", "Mandragora", true),
        ]);
        let fresh = RosterSnapshot::from_members(vec![
            member("newbie", "Newbie", "Sprout", true),
            member("returner", "Returner", "Mandragora", true),
            member("renamer", "New Name", "Mandragora", true),
        ]);
        let diff = diff_rosters(&fresh, &archived, 1).unwrap();

        let events = deriver().derive(&diff, Utc::now());
        let kinds: Vec<_> = events.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                FcEventKind::MemberJoined,
                FcEventKind::MemberRejoined,
                FcEventKind::NameChanged,
            ]
        );
        assert_eq!(events[2].text, "Old Name is now known as New Name");
    }

    #[test]
    fn test_departure_emits_no_event() {
        let archived = RosterSnapshot::from_members(vec![
            member("leaver", "Leaver", "Mandragora", true),
            member("stayer", "Stayer", "Mandragora", true),
        ]);
        let fresh = RosterSnapshot::from_members(vec![member("stayer", "Stayer", "Mandragora", true)]);
        let diff = diff_rosters(&fresh, &archived, 1).unwrap();

        assert_eq!(diff.left.len(), 1);
        assert!(deriver().derive(&diff, Utc::now()).is_empty());
    }

    #[test]
    fn test_wire_shape() {
        let event = FcEvent::new(FcEventKind::MemberJoined, "hi", Utc::now());
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "member_joined");
        assert!(value.get("kind").is_none());
        assert!(value["id"].is_string());
        assert!(value["timestamp"].is_string());
    }
}
