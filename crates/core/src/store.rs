//! Storage seam for profiles and the transaction ledger.
//!
//! The processor is written against this trait so the in-memory
//! development store and a future database-backed store are
//! interchangeable. Implementations must be thread-safe; serializing
//! concurrent writes for the same customer is the caller's concern.

use crate::error::LoyaltyResult;
use crate::profile::CustomerProfile;
use crate::transaction::LoyaltyTransaction;
use serde::Serialize;

/// Aggregate counters for the program-summary endpoint.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProgramTotals {
    pub members: u64,
    pub active_members: u64,
    pub ledger_entries: u64,
    pub points_issued: u64,
    pub points_outstanding: u64,
}

pub trait LoyaltyStore: Send + Sync {
    fn get_profile(&self, customer_id: &str) -> Option<CustomerProfile>;

    /// Upsert the full profile. The single write per processed action.
    fn save_profile(&self, profile: CustomerProfile);

    /// Shallow-merge top-level JSON fields into a stored profile and
    /// refresh `updated_at`. `customer_id` and `created_at` are protected.
    /// Returns `ProfileNotFound` if absent, `InvalidRequest` if the merge
    /// no longer deserializes into a valid profile.
    fn merge_profile(
        &self,
        customer_id: &str,
        patch: &serde_json::Map<String, serde_json::Value>,
    ) -> LoyaltyResult<CustomerProfile>;

    fn append_transaction(&self, tx: LoyaltyTransaction);

    /// Ledger entries for one customer, newest first.
    fn transactions_for(&self, customer_id: &str) -> Vec<LoyaltyTransaction>;

    fn totals(&self) -> ProgramTotals;
}
