//! Tier eligibility evaluation: compares a profile's current-period
//! activity against the next tier's requirements, criterion by criterion.

use rewards_core::profile::{CustomerProfile, TierProgress};
use rewards_core::tiers::{LoyaltyTier, TierCatalog};
use serde::Serialize;
use std::collections::BTreeMap;

/// Pass/fail detail for one qualification criterion.
#[derive(Debug, Clone, Serialize)]
pub struct RequirementStatus {
    pub required: f64,
    pub current: f64,
    pub met: bool,
}

impl RequirementStatus {
    fn check(required: f64, current: f64) -> Self {
        Self {
            required,
            current,
            met: current >= required,
        }
    }
}

/// Eligibility verdict plus the full requirement breakdown. The breakdown
/// is populated whenever a next tier exists, eligible or not, so the API
/// can render progress. `next_tier` is set only when every evaluated
/// criterion passed.
#[derive(Debug, Clone, Serialize)]
pub struct EligibilityReport {
    pub eligible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_tier: Option<LoyaltyTier>,
    pub requirements: BTreeMap<String, RequirementStatus>,
}

impl EligibilityReport {
    fn ineligible() -> Self {
        Self {
            eligible: false,
            next_tier: None,
            requirements: BTreeMap::new(),
        }
    }
}

/// Evaluate whether the profile qualifies for the tier one level up.
///
/// Criteria: current-period spending, transaction count, and — only when
/// the next tier declares it — successful referrals. Declared `reviews`
/// and `social_engagement` criteria are not evaluated here.
pub fn check_eligibility(catalog: &TierCatalog, profile: &CustomerProfile) -> EligibilityReport {
    let Some(current) = catalog.get(&profile.current_tier) else {
        return EligibilityReport::ineligible();
    };
    let Some(next) = catalog.next_tier(current.level) else {
        return EligibilityReport::ineligible();
    };

    let mut requirements = BTreeMap::new();
    requirements.insert(
        "spending".to_string(),
        RequirementStatus::check(next.requirements.min_spending, profile.spending.current_period),
    );
    requirements.insert(
        "transactions".to_string(),
        RequirementStatus::check(
            next.requirements.min_transactions as f64,
            profile.spending.transaction_count as f64,
        ),
    );
    if let Some(referrals) = next
        .requirements
        .additional_criteria
        .as_ref()
        .and_then(|c| c.referrals)
    {
        requirements.insert(
            "referrals".to_string(),
            RequirementStatus::check(
                referrals as f64,
                profile.referrals.successful_referrals as f64,
            ),
        );
    }

    let eligible = requirements.values().all(|r| r.met);
    EligibilityReport {
        eligible,
        next_tier: eligible.then(|| next.clone()),
        requirements,
    }
}

/// Remaining distance to the next tier, for the profile's status block
/// and the milestones view. Returns the next tier id and the progress.
/// At the top tier (or on an unknown tier) progress reads 100%.
pub fn progress_toward_next(
    catalog: &TierCatalog,
    profile: &CustomerProfile,
) -> (Option<String>, TierProgress) {
    let next = catalog
        .get(&profile.current_tier)
        .and_then(|t| catalog.next_tier(t.level));
    let Some(next) = next else {
        return (
            None,
            TierProgress {
                spending_needed: 0.0,
                transactions_needed: 0,
                percentage: 100.0,
            },
        );
    };

    let spending_needed =
        (next.requirements.min_spending - profile.spending.current_period).max(0.0);
    let transactions_needed = next
        .requirements
        .min_transactions
        .saturating_sub(profile.spending.transaction_count);

    let mut ratios = vec![
        ratio(
            profile.spending.current_period,
            next.requirements.min_spending,
        ),
        ratio(
            profile.spending.transaction_count as f64,
            next.requirements.min_transactions as f64,
        ),
    ];
    if let Some(referrals) = next
        .requirements
        .additional_criteria
        .as_ref()
        .and_then(|c| c.referrals)
    {
        ratios.push(ratio(
            profile.referrals.successful_referrals as f64,
            referrals as f64,
        ));
    }
    let percentage = 100.0 * ratios.iter().sum::<f64>() / ratios.len() as f64;

    (
        Some(next.id.clone()),
        TierProgress {
            spending_needed,
            transactions_needed,
            percentage,
        },
    )
}

fn ratio(current: f64, required: f64) -> f64 {
    if required <= 0.0 {
        1.0
    } else {
        (current / required).min(1.0)
    }
}
