//! Member row model.
//!
//! One row per tracked character; the stint ledger is stored as JSONB so
//! its append-only structure survives round-trips unchanged.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use lodebook_core::ledger::MembershipLedger;
use lodebook_core::member::{FreeCompanyMember, MemberPatch};

/// A row of `fc_members`.
#[derive(Debug, Clone, FromRow)]
pub struct FcMemberRow {
    /// Stable external character identifier (primary key).
    pub character_id: String,
    pub name: String,
    pub rank: String,
    pub rank_icon: String,
    pub avatar: String,
    pub active: bool,
    pub last_updated: DateTime<Utc>,
    /// Stint ledger, serialized [`MembershipLedger`].
    pub ledger: serde_json::Value,
    pub promotion_date: Option<DateTime<Utc>>,
}

impl FcMemberRow {
    /// Fetch every tracked member, active or not.
    pub async fn find_all(pool: &sqlx::PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM fc_members")
            .fetch_all(pool)
            .await
    }

    /// Insert a brand-new member record.
    pub async fn insert(
        executor: impl sqlx::PgExecutor<'_>,
        member: &FreeCompanyMember,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r"
            INSERT INTO fc_members
                (character_id, name, rank, rank_icon, avatar, active,
                 last_updated, ledger, promotion_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ",
        )
        .bind(&member.character_id)
        .bind(&member.name)
        .bind(&member.rank)
        .bind(&member.rank_icon)
        .bind(&member.avatar)
        .bind(member.active)
        .bind(member.last_updated)
        .bind(ledger_json(&member.ledger)?)
        .bind(member.promotion_date)
        .execute(executor)
        .await?;
        Ok(())
    }

    /// Apply a partial update keyed by `character_id`. Unset fields keep
    /// their stored value.
    pub async fn apply_patch(
        executor: impl sqlx::PgExecutor<'_>,
        patch: &MemberPatch,
    ) -> Result<(), sqlx::Error> {
        let ledger = patch.ledger.as_ref().map(ledger_json).transpose()?;

        sqlx::query(
            r"
            UPDATE fc_members
            SET
                name = COALESCE($2, name),
                rank = COALESCE($3, rank),
                rank_icon = COALESCE($4, rank_icon),
                avatar = COALESCE($5, avatar),
                active = COALESCE($6, active),
                ledger = COALESCE($7, ledger),
                promotion_date = COALESCE($8, promotion_date),
                last_updated = $9
            WHERE character_id = $1
            ",
        )
        .bind(&patch.character_id)
        .bind(&patch.name)
        .bind(&patch.rank)
        .bind(&patch.rank_icon)
        .bind(&patch.avatar)
        .bind(patch.active)
        .bind(ledger)
        .bind(patch.promotion_date)
        .bind(patch.last_updated)
        .execute(executor)
        .await?;
        Ok(())
    }

    /// Convert into the domain record, deserializing the ledger.
    pub fn into_member(self) -> Result<FreeCompanyMember, serde_json::Error> {
        let ledger: MembershipLedger = serde_json::from_value(self.ledger)?;
        Ok(FreeCompanyMember {
            character_id: self.character_id,
            name: self.name,
            rank: self.rank,
            rank_icon: self.rank_icon,
            avatar: self.avatar,
            active: self.active,
            last_updated: self.last_updated,
            ledger,
            promotion_date: self.promotion_date,
        })
    }
}

fn ledger_json(ledger: &MembershipLedger) -> Result<serde_json::Value, sqlx::Error> {
    serde_json::to_value(ledger).map_err(|e| sqlx::Error::Encode(Box::new(e)))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn test_row_into_member_round_trips_ledger() {
        let joined = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let mut ledger = MembershipLedger::opened(joined);
        ledger.close(NaiveDate::from_ymd_opt(2024, 6, 2).unwrap());
        ledger.reopen(NaiveDate::from_ymd_opt(2024, 7, 1).unwrap());

        let row = FcMemberRow {
            character_id: "123".to_string(),
            name: "Puk Waddle".to_string(),
            rank: "Mandragora".to_string(),
            rank_icon: "icon".to_string(),
            avatar: "avatar".to_string(),
            active: true,
            last_updated: Utc::now(),
            ledger: serde_json::to_value(&ledger).unwrap(),
            promotion_date: None,
        };

        let member = row.into_member().unwrap();
        assert_eq!(member.ledger, ledger);
        assert!(member.ledger.is_open());
        assert_eq!(member.ledger.len(), 2);
    }

    #[test]
    fn test_row_with_corrupt_ledger_fails_conversion() {
        let row = FcMemberRow {
            character_id: "123".to_string(),
            name: "Puk Waddle".to_string(),
            rank: "Mandragora".to_string(),
            rank_icon: "icon".to_string(),
            avatar: "avatar".to_string(),
            active: true,
            last_updated: Utc::now(),
            ledger: serde_json::json!({"stints": "not-a-list"}),
            promotion_date: None,
        };

        assert!(row.into_member().is_err());
    }
}
