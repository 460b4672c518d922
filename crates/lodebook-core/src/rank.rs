//! Ordered rank table and promotion predicate.
//!
//! The table is configuration data, not a hardcoded literal: deployments
//! supply the ordered rank list (lowest to highest) so new in-game titles
//! can be added without a rebuild.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Total order over the known Free Company rank names.
///
/// Unknown ranks are deliberately non-events: an unrecognized rank string
/// must not crash reconciliation or spuriously fire a promotion, only leave
/// a warning behind for table maintenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct RankTable {
    ordered: Vec<String>,
    levels: HashMap<String, usize>,
}

impl RankTable {
    /// Build a table from an ordered list of rank names, lowest first.
    pub fn from_ordered(ranks: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let ordered: Vec<String> = ranks.into_iter().map(Into::into).collect();
        let levels = ordered
            .iter()
            .enumerate()
            .map(|(level, rank)| (rank.clone(), level))
            .collect();
        Self { ordered, levels }
    }

    /// The level of a rank, 0 for the lowest. `None` for unknown ranks.
    pub fn level(&self, rank: &str) -> Option<usize> {
        self.levels.get(rank).copied()
    }

    /// Whether the rank is in the table.
    pub fn contains(&self, rank: &str) -> bool {
        self.levels.contains_key(rank)
    }

    /// Whether moving from `previous` to `current` is a promotion.
    ///
    /// True iff both ranks are known and the level strictly increases.
    /// Lateral moves, demotions, and any comparison involving an unknown
    /// rank return false; unknown ranks are logged at warn level.
    pub fn is_promotion(&self, previous: &str, current: &str) -> bool {
        let Some(previous_level) = self.level(previous) else {
            tracing::warn!(rank = previous, "rank not in the configured table");
            return false;
        };
        let Some(current_level) = self.level(current) else {
            tracing::warn!(rank = current, "rank not in the configured table");
            return false;
        };
        current_level > previous_level
    }

    /// The configured rank names, lowest first.
    pub fn ranks(&self) -> &[String] {
        &self.ordered
    }

    /// Number of configured ranks.
    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    /// Whether the table has no ranks.
    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }
}

impl From<Vec<String>> for RankTable {
    fn from(ordered: Vec<String>) -> Self {
        Self::from_ordered(ordered)
    }
}

impl From<RankTable> for Vec<String> {
    fn from(table: RankTable) -> Self {
        table.ordered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> RankTable {
        RankTable::from_ordered(["Sprout", "Mandragora", "Coeurl Hunter", "Grand Master"])
    }

    #[test]
    fn test_levels_follow_list_order() {
        let table = table();
        assert_eq!(table.level("Sprout"), Some(0));
        assert_eq!(table.level("Grand Master"), Some(3));
        assert_eq!(table.level("Moogle Knight"), None);
    }

    #[test]
    fn test_promotion_is_strict_increase() {
        let table = table();
        assert!(table.is_promotion("Mandragora", "Coeurl Hunter"));
        assert!(table.is_promotion("Sprout", "Grand Master"));

        // Lateral and downward moves are not promotions.
        assert!(!table.is_promotion("Mandragora", "Mandragora"));
        assert!(!table.is_promotion("Coeurl Hunter", "Mandragora"));
    }

    #[test]
    fn test_unknown_ranks_never_promote() {
        let table = table();
        assert!(!table.is_promotion("Moogle Knight", "Grand Master"));
        assert!(!table.is_promotion("Sprout", "Moogle Knight"));
        assert!(!table.is_promotion("Moogle Knight", "Moogle Knight"));
    }

    #[test]
    fn test_serde_as_ordered_list() {
        let table = table();
        let json = serde_json::to_string(&table).unwrap();
        assert_eq!(
            json,
            r#"["Sprout","Mandragora","Coeurl Hunter","Grand Master"]"#
        );

        let back: RankTable = serde_json::from_str(&json).unwrap();
        assert_eq!(back.level("Coeurl Hunter"), Some(2));
    }
}
