//! Loyalty ledger entries. Transactions are append-only: once written with
//! a terminal status they are never mutated. This engine always writes
//! entries pre-approved.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Earn,
    Redeem,
    Bonus,
    Penalty,
    Transfer,
    Expire,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TransactionSource {
    Purchase,
    Bonus,
    Referral,
    Review,
    Social,
    Birthday,
    Welcome,
    Manual,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Pending,
    Approved,
    Cancelled,
    Expired,
}

/// Free-form correlation fields linking a ledger entry to the rest of
/// the ERP (orders, campaigns, referred customers).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactionMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub campaign_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referral_id: Option<String>,
    /// Tier the customer held when the entry was written. `current_tier`
    /// is mutable, so this is the audit record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier_at_time: Option<String>,
}

/// One immutable ledger entry per processed action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoyaltyTransaction {
    pub id: String,
    pub customer_id: String,
    pub tx_type: TransactionType,
    /// Signed: positive for earn/bonus, negative for redeem.
    pub points: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description_ar: Option<String>,
    pub source: TransactionSource,
    #[serde(default)]
    pub metadata: TransactionMetadata,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl LoyaltyTransaction {
    /// New approved entry stamped with the current time.
    pub fn approved(
        customer_id: &str,
        tx_type: TransactionType,
        points: i64,
        source: TransactionSource,
        description: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            customer_id: customer_id.to_string(),
            tx_type,
            points,
            amount: None,
            description: description.into(),
            description_ar: None,
            source,
            metadata: TransactionMetadata::default(),
            status: TransactionStatus::Approved,
            created_at: now,
            processed_at: Some(now),
            expires_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn approved_entries_are_stamped() {
        let tx = LoyaltyTransaction::approved(
            "CUST-1",
            TransactionType::Earn,
            150,
            TransactionSource::Purchase,
            "Earned points",
        );
        assert_eq!(tx.status, TransactionStatus::Approved);
        assert!(tx.processed_at.is_some());
        assert_eq!(tx.points, 150);
    }

    #[test]
    fn serde_uses_snake_case_tags() {
        let tx = LoyaltyTransaction::approved(
            "CUST-1",
            TransactionType::Redeem,
            -100,
            TransactionSource::Manual,
            "Redeemed",
        );
        let v = serde_json::to_value(&tx).unwrap();
        assert_eq!(v["tx_type"], "redeem");
        assert_eq!(v["source"], "manual");
        assert_eq!(v["status"], "approved");
    }
}
