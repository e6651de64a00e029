//! Cashback computation with the per-month cap.
//!
//! The cap is enforced against the remaining monthly budget: callers pass
//! the amount already accrued this calendar month and the result never
//! pushes the month's total past `max_monthly`.

use rewards_core::config::ProgramConfig;
use rewards_core::tiers::TierCatalog;

/// Cashback in AED for a purchase, capped to the tier's remaining
/// monthly budget. Zero when the tier is unknown or cashback-disabled.
pub fn cashback(
    catalog: &TierCatalog,
    config: &ProgramConfig,
    amount: f64,
    tier_id: &str,
    categories: &[String],
    accrued_this_month: f64,
) -> f64 {
    let Some(tier) = catalog.get(tier_id) else {
        return 0.0;
    };
    if !tier.cashback.enabled {
        return 0.0;
    }

    let mut rate = tier.cashback.percentage / 100.0;
    let boosted = categories
        .iter()
        .any(|c| tier.cashback.eligible_categories.iter().any(|e| e == c));
    if boosted {
        rate *= config.special_category_multiplier;
    }

    let remaining = (tier.cashback.max_monthly - accrued_this_month).max(0.0);
    (amount * rate).min(remaining)
}
