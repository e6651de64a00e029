//! Points earned from a purchase: base rate, tier multiplier, and the
//! special-category boost.

use rewards_core::config::ProgramConfig;
use rewards_core::tiers::TierCatalog;

/// Points earned for `amount` AED at the given tier.
///
/// `base = floor(amount * base_points_rate)`, scaled by the tier's
/// multiplier, then by the special-category multiplier when the purchase
/// hits a premium category and the tier actually has an eligible-category
/// list. An unknown tier id falls back to the unmultiplied base rather
/// than rejecting the earn.
pub fn points_earned(
    catalog: &TierCatalog,
    config: &ProgramConfig,
    amount: f64,
    tier_id: &str,
    special_category: bool,
) -> u64 {
    let base = (amount * config.base_points_rate).floor();

    let Some(tier) = catalog.get(tier_id) else {
        return base as u64;
    };

    let mut value = base * tier.benefits.points_multiplier;
    if special_category && !tier.cashback.eligible_categories.is_empty() {
        value *= config.special_category_multiplier;
    }
    value.floor() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (TierCatalog, ProgramConfig) {
        (TierCatalog::standard(), ProgramConfig::default())
    }

    #[test]
    fn gold_thousand_aed_is_150_points() {
        let (catalog, config) = setup();
        assert_eq!(points_earned(&catalog, &config, 1000.0, "gold", false), 150);
    }

    #[test]
    fn gold_premium_category_scenario() {
        // 5000 AED of premium oud: floor(5000 * 0.1 * 1.5 * 1.5) = 1125.
        let (catalog, config) = setup();
        assert_eq!(points_earned(&catalog, &config, 5000.0, "gold", true), 1125);
    }

    #[test]
    fn special_category_needs_an_eligible_list() {
        // Bronze has no cashback categories, so the 1.5x boost never applies.
        let (catalog, config) = setup();
        assert_eq!(points_earned(&catalog, &config, 1000.0, "bronze", true), 100);
    }

    #[test]
    fn unknown_tier_falls_back_to_base_rate() {
        let (catalog, config) = setup();
        assert_eq!(points_earned(&catalog, &config, 1000.0, "titanium", true), 100);
    }

    #[test]
    fn zero_amount_earns_nothing() {
        let (catalog, config) = setup();
        assert_eq!(points_earned(&catalog, &config, 0.0, "diamond", true), 0);
    }

    #[test]
    fn monotone_in_amount_and_multiplier() {
        let (catalog, config) = setup();
        let mut prev = 0;
        for amount in [10.0, 99.0, 250.0, 1_000.0, 12_345.0] {
            let p = points_earned(&catalog, &config, amount, "silver", false);
            assert!(p >= prev);
            prev = p;
        }
        // Tier ladder orders multipliers, so points order with it.
        let by_tier: Vec<u64> = ["bronze", "silver", "gold", "platinum", "diamond"]
            .into_iter()
            .map(|t| points_earned(&catalog, &config, 777.0, t, false))
            .collect();
        assert!(by_tier.windows(2).all(|w| w[0] <= w[1]));
    }
}
