//! Append-only membership stint ledger.
//!
//! Each member carries a ledger of the intervals they have belonged to the
//! Free Company. The ledger is an audit trail, not a queryable index: stints
//! are only ever appended or closed, never rewritten, so a member's full
//! tenure history survives every reconciliation cycle.
//!
//! This is a structured replacement for the legacy date-string format
//! (`5/1/2024-6/2/2024+7/1/2024-`); [`MembershipLedger::to_compact_string`]
//! still renders that shape for human-facing output.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One contiguous interval of membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stint {
    /// Date the member joined (or rejoined).
    pub joined: NaiveDate,
    /// Date the member left. `None` while the stint is still open.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left: Option<NaiveDate>,
}

impl Stint {
    /// Whether this stint has no end date yet.
    pub fn is_open(&self) -> bool {
        self.left.is_none()
    }
}

/// Append-only history of a member's stints.
///
/// Invariant: across cycles a ledger is a strict prefix-extension of its
/// earlier self. Closing sets the end date of the open stint; rejoining
/// appends a new open stint; nothing is ever removed or reordered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipLedger {
    stints: Vec<Stint>,
}

impl MembershipLedger {
    /// Create a ledger with a single open stint, for a newly seen member.
    pub fn opened(joined: NaiveDate) -> Self {
        Self {
            stints: vec![Stint { joined, left: None }],
        }
    }

    /// Close the currently open stint.
    ///
    /// If no stint is open the call is a warned no-op: the differ never
    /// produces a departure for an already-inactive member, so this only
    /// fires on corrupted rows, and those must not cascade into history
    /// rewrites.
    pub fn close(&mut self, left: NaiveDate) {
        match self.stints.last_mut() {
            Some(stint) if stint.is_open() => stint.left = Some(left),
            _ => {
                tracing::warn!(
                    stints = self.stints.len(),
                    "ledger close requested but no stint is open"
                );
            }
        }
    }

    /// Append a new open stint, for a returning member.
    ///
    /// A warned no-op if the last stint is still open.
    pub fn reopen(&mut self, joined: NaiveDate) {
        if self.stints.last().is_some_and(Stint::is_open) {
            tracing::warn!(
                stints = self.stints.len(),
                "ledger reopen requested but a stint is already open"
            );
            return;
        }
        self.stints.push(Stint {
            joined,
            left: None,
        });
    }

    /// Whether the member is currently in an open stint.
    pub fn is_open(&self) -> bool {
        self.stints.last().is_some_and(Stint::is_open)
    }

    /// The recorded stints, oldest first.
    pub fn stints(&self) -> &[Stint] {
        &self.stints
    }

    /// Number of recorded stints.
    pub fn len(&self) -> usize {
        self.stints.len()
    }

    /// Whether the ledger has no stints at all.
    pub fn is_empty(&self) -> bool {
        self.stints.is_empty()
    }

    /// Whether `self` extends `earlier` without rewriting it: every stint of
    /// `earlier` is present unchanged, except that its last stint may have
    /// gained an end date.
    pub fn extends(&self, earlier: &MembershipLedger) -> bool {
        if self.stints.len() < earlier.stints.len() {
            return false;
        }
        for (i, prior) in earlier.stints.iter().enumerate() {
            let current = &self.stints[i];
            if current.joined != prior.joined {
                return false;
            }
            let last_of_earlier = i == earlier.stints.len() - 1;
            match (prior.left, current.left) {
                (Some(a), Some(b)) if a == b => {}
                (None, _) if last_of_earlier => {}
                (None, None) => {}
                _ => return false,
            }
        }
        true
    }

    /// Render the legacy compact form: `joined-left` per stint, stints
    /// separated by `+`, an open stint ending in a bare `-`.
    pub fn to_compact_string(&self) -> String {
        self.stints
            .iter()
            .map(|s| match s.left {
                Some(left) => format!("{}-{}", short_date(s.joined), short_date(left)),
                None => format!("{}-", short_date(s.joined)),
            })
            .collect::<Vec<_>>()
            .join("+")
    }
}

/// US short date without zero padding, matching the legacy rendering.
fn short_date(d: NaiveDate) -> String {
    use chrono::Datelike;
    format!("{}/{}/{}", d.month(), d.day(), d.year())
}
