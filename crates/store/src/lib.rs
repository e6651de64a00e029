//! In-memory loyalty store backed by DashMap.
//!
//! Production: replace with PostgreSQL (sqlx) or similar ACID store.
//! This provides the same API surface for development and testing.

use chrono::Utc;
use dashmap::DashMap;
use rewards_core::error::{LoyaltyError, LoyaltyResult};
use rewards_core::profile::CustomerProfile;
use rewards_core::store::{LoyaltyStore, ProgramTotals};
use rewards_core::transaction::LoyaltyTransaction;
use tracing::info;

/// Thread-safe in-memory store for profiles and the transaction ledger.
pub struct InMemoryStore {
    profiles: DashMap<String, CustomerProfile>,
    ledger: DashMap<String, LoyaltyTransaction>,
}

impl InMemoryStore {
    /// Empty store, for tests and embedding.
    pub fn empty() -> Self {
        Self {
            profiles: DashMap::new(),
            ledger: DashMap::new(),
        }
    }

    /// Store seeded with demo customers for development mode.
    pub fn new() -> Self {
        info!("Loyalty store initialized (in-memory, development mode)");
        let store = Self::empty();
        store.seed_demo_data();
        store
    }

    fn seed_demo_data(&self) {
        // Demo customers across the tier ladder.
        let seeds = [
            // (customer_id, tier, available, lifetime, period_spend, tx_count, referrals)
            ("CUST-1001", "gold", 3_250u64, 18_400u64, 9_800.0, 17u32, 1u32),
            ("CUST-1002", "bronze", 240, 240, 1_150.0, 3, 0),
            ("CUST-1003", "platinum", 12_500, 61_000, 28_500.0, 41, 4),
            ("CUST-1004", "silver", 980, 2_100, 3_600.0, 8, 0),
        ];
        for (id, tier, available, lifetime, period, tx_count, referrals) in seeds {
            let mut p = CustomerProfile::new(id);
            p.current_tier = tier.to_string();
            p.points.total = lifetime;
            p.points.available = available;
            p.points.lifetime = lifetime;
            p.spending.current_period = period;
            p.spending.total_lifetime = period * 2.0;
            p.spending.transaction_count = tx_count;
            if tx_count > 0 {
                p.spending.average_order_value =
                    p.spending.total_lifetime / f64::from(tx_count);
                p.spending.last_purchase = Some(Utc::now());
            }
            p.referrals.successful_referrals = referrals;
            p.referrals.total_referred = referrals;
            p.engagement_score = 40 + (tx_count as u8).min(50);
            self.profiles.insert(id.to_string(), p);
        }
    }
}

impl LoyaltyStore for InMemoryStore {
    fn get_profile(&self, customer_id: &str) -> Option<CustomerProfile> {
        self.profiles.get(customer_id).map(|r| r.value().clone())
    }

    fn save_profile(&self, profile: CustomerProfile) {
        self.profiles.insert(profile.customer_id.clone(), profile);
    }

    fn merge_profile(
        &self,
        customer_id: &str,
        patch: &serde_json::Map<String, serde_json::Value>,
    ) -> LoyaltyResult<CustomerProfile> {
        let mut entry = self
            .profiles
            .get_mut(customer_id)
            .ok_or_else(|| LoyaltyError::ProfileNotFound(customer_id.to_string()))?;

        let mut value = serde_json::to_value(entry.value())?;
        let Some(obj) = value.as_object_mut() else {
            return Err(LoyaltyError::InvalidRequest(
                "profile did not serialize to an object".to_string(),
            ));
        };
        for (key, val) in patch {
            // Identity and provenance fields are not patchable.
            if key == "customer_id" || key == "created_at" {
                continue;
            }
            obj.insert(key.clone(), val.clone());
        }

        let mut updated: CustomerProfile = serde_json::from_value(value)
            .map_err(|e| LoyaltyError::InvalidRequest(format!("profile merge: {e}")))?;
        updated.updated_at = Utc::now();
        *entry.value_mut() = updated.clone();
        Ok(updated)
    }

    fn append_transaction(&self, tx: LoyaltyTransaction) {
        self.ledger.insert(tx.id.clone(), tx);
    }

    fn transactions_for(&self, customer_id: &str) -> Vec<LoyaltyTransaction> {
        let mut txs: Vec<LoyaltyTransaction> = self
            .ledger
            .iter()
            .filter(|r| r.value().customer_id == customer_id)
            .map(|r| r.value().clone())
            .collect();
        txs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        txs
    }

    fn totals(&self) -> ProgramTotals {
        ProgramTotals {
            members: self.profiles.len() as u64,
            active_members: self
                .profiles
                .iter()
                .filter(|r| r.value().status.is_active)
                .count() as u64,
            ledger_entries: self.ledger.len() as u64,
            points_issued: self.profiles.iter().map(|r| r.value().points.lifetime).sum(),
            points_outstanding: self
                .profiles
                .iter()
                .map(|r| r.value().points.available)
                .sum(),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rewards_core::transaction::{TransactionSource, TransactionType};

    #[test]
    fn demo_data_is_seeded() {
        let store = InMemoryStore::new();
        let gold = store.get_profile("CUST-1001").unwrap();
        assert_eq!(gold.current_tier, "gold");
        assert!(store.totals().members >= 4);
    }

    #[test]
    fn save_then_get_round_trips() {
        let store = InMemoryStore::empty();
        let p = CustomerProfile::new("CUST-9");
        store.save_profile(p);
        assert_eq!(store.get_profile("CUST-9").unwrap().current_tier, "bronze");
        assert!(store.get_profile("CUST-404").is_none());
    }

    #[test]
    fn merge_patches_top_level_fields_only() {
        let store = InMemoryStore::empty();
        store.save_profile(CustomerProfile::new("CUST-9"));

        let patch = serde_json::json!({
            "engagement_score": 85,
            "customer_id": "CUST-FORGED",
            "achievements": ["first_purchase"],
        });
        let updated = store
            .merge_profile("CUST-9", patch.as_object().unwrap())
            .unwrap();
        assert_eq!(updated.engagement_score, 85);
        assert_eq!(updated.customer_id, "CUST-9");
        assert_eq!(updated.achievements, vec!["first_purchase"]);
        assert!(updated.updated_at >= updated.created_at);
    }

    #[test]
    fn merge_rejects_invalid_shapes() {
        let store = InMemoryStore::empty();
        store.save_profile(CustomerProfile::new("CUST-9"));

        let patch = serde_json::json!({"points": "not-an-object"});
        let err = store
            .merge_profile("CUST-9", patch.as_object().unwrap())
            .unwrap_err();
        assert!(matches!(err, LoyaltyError::InvalidRequest(_)));
        // Original record untouched.
        assert_eq!(store.get_profile("CUST-9").unwrap().points.available, 0);
    }

    #[test]
    fn merge_missing_profile_is_not_found() {
        let store = InMemoryStore::empty();
        let patch = serde_json::json!({"engagement_score": 1});
        assert!(matches!(
            store.merge_profile("CUST-404", patch.as_object().unwrap()),
            Err(LoyaltyError::ProfileNotFound(_))
        ));
    }

    #[test]
    fn ledger_filters_and_sorts_per_customer() {
        let store = InMemoryStore::empty();
        for (cust, pts) in [("A", 10), ("B", 20), ("A", 30)] {
            store.append_transaction(LoyaltyTransaction::approved(
                cust,
                TransactionType::Earn,
                pts,
                TransactionSource::Purchase,
                "test",
            ));
        }
        let txs = store.transactions_for("A");
        assert_eq!(txs.len(), 2);
        assert!(txs[0].created_at >= txs[1].created_at);
    }
}
