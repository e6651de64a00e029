//! Customer loyalty profile — the mutable aggregate the transaction
//! processor operates on. One per customer, created at enrollment.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Complete loyalty state for one customer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerProfile {
    pub customer_id: String,
    /// Tier id. May reference a tier missing from the catalog (stale data);
    /// consumers must handle that defensively.
    pub current_tier: String,
    pub points: PointsBalance,
    pub spending: SpendingStats,
    pub status: MembershipStatus,
    /// Append-only achievement badges.
    #[serde(default)]
    pub achievements: Vec<String>,
    pub referrals: ReferralStats,
    pub preferences: Preferences,
    /// 0-100 composite engagement signal maintained by the CRM.
    pub engagement_score: u8,
    pub monthly_cashback: MonthlyCashback,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Points counters. `available` is the only counter that decreases
/// (on redemption); the rest accumulate monotonically.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PointsBalance {
    pub total: u64,
    pub available: u64,
    pub pending: u64,
    pub expired: u64,
    pub lifetime: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpendingStats {
    /// Lifetime spending in AED.
    pub total_lifetime: f64,
    /// Spending within the current qualifying period.
    pub current_period: f64,
    pub average_order_value: f64,
    pub last_purchase: Option<DateTime<Utc>>,
    pub transaction_count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MembershipStatus {
    pub is_active: bool,
    pub next_tier: Option<String>,
    pub progress: TierProgress,
    pub tier_expiry: Option<DateTime<Utc>>,
    pub last_activity: DateTime<Utc>,
}

/// Remaining distance to the next tier, for progress displays.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TierProgress {
    pub spending_needed: f64,
    pub transactions_needed: u32,
    /// Overall progress toward the next tier, 0.0-100.0.
    pub percentage: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReferralStats {
    pub total_referred: u32,
    pub successful_referrals: u32,
    /// Total points granted through referral bonuses.
    pub referral_bonus: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preferences {
    pub language: String,
    pub marketing_opt_in: bool,
    #[serde(default)]
    pub preferred_categories: Vec<String>,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            marketing_opt_in: true,
            preferred_categories: Vec::new(),
        }
    }
}

/// Per-month cashback accumulator. The monthly cap is enforced against
/// `max_monthly - accrued` for the month in `month` ("YYYY-MM").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyCashback {
    pub month: String,
    pub accrued: f64,
}

impl MonthlyCashback {
    pub fn for_month(now: DateTime<Utc>) -> Self {
        Self {
            month: now.format("%Y-%m").to_string(),
            accrued: 0.0,
        }
    }

    /// Reset the accumulator if the calendar month rolled over.
    pub fn roll(&mut self, now: DateTime<Utc>) {
        let current = now.format("%Y-%m").to_string();
        if self.month != current {
            self.month = current;
            self.accrued = 0.0;
        }
    }
}

impl CustomerProfile {
    /// Fresh profile at the entry tier.
    pub fn new(customer_id: &str) -> Self {
        let now = Utc::now();
        Self {
            customer_id: customer_id.to_string(),
            current_tier: "bronze".to_string(),
            points: PointsBalance::default(),
            spending: SpendingStats::default(),
            status: MembershipStatus {
                is_active: true,
                next_tier: Some("silver".to_string()),
                progress: TierProgress::default(),
                tier_expiry: None,
                last_activity: now,
            },
            achievements: Vec::new(),
            referrals: ReferralStats::default(),
            preferences: Preferences::default(),
            engagement_score: 0,
            monthly_cashback: MonthlyCashback::for_month(now),
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_profile_starts_at_bronze() {
        let p = CustomerProfile::new("CUST-1");
        assert_eq!(p.current_tier, "bronze");
        assert_eq!(p.points.available, 0);
        assert!(p.status.is_active);
    }

    #[test]
    fn monthly_cashback_rolls_over() {
        let jan = "2026-01-15T00:00:00Z".parse().unwrap();
        let feb = "2026-02-01T00:00:00Z".parse().unwrap();
        let mut acc = MonthlyCashback::for_month(jan);
        acc.accrued = 120.0;
        acc.roll(jan);
        assert_eq!(acc.accrued, 120.0);
        acc.roll(feb);
        assert_eq!(acc.month, "2026-02");
        assert_eq!(acc.accrued, 0.0);
    }
}
