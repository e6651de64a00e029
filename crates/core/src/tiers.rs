//! Loyalty tier catalog — static reference data for the five-tier program.
//!
//! Modeled after Gulf retail loyalty programs: Bronze → Silver → Gold →
//! Platinum → Diamond, with AED spending thresholds, points multipliers,
//! cashback rules, seasonal (Ramadan/Eid/National Day) benefits, and
//! degradation rules. The catalog is read-only after construction.

use serde::{Deserialize, Serialize};

/// Categories that qualify for the 1.5x special-category points multiplier.
pub const PREMIUM_CATEGORIES: &[&str] = &["premium_oud", "exclusive_attars", "limited_edition"];

/// A single loyalty tier definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoyaltyTier {
    /// Stable snake-case identifier ("bronze" .. "diamond").
    pub id: String,
    pub name: String,
    /// Arabic display name.
    pub name_ar: String,
    /// Ordinal level, dense 1..=N. Defines progression order.
    pub level: u8,
    pub requirements: TierRequirements,
    pub benefits: TierBenefits,
    pub privileges: TierPrivileges,
    pub seasonal: SeasonalBenefits,
    pub cashback: CashbackRules,
    pub validity_months: u32,
    pub degradation: DegradationRules,
}

/// Thresholds a customer must meet within the timeframe to qualify.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TierRequirements {
    /// Minimum spending in AED within the qualifying timeframe.
    pub min_spending: f64,
    pub min_transactions: u32,
    pub timeframe_months: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_criteria: Option<AdditionalCriteria>,
}

/// Extra qualification criteria declared by upper tiers. Only `referrals`
/// is evaluated by the eligibility checker; reviews and social engagement
/// are declared reference data without an evaluator yet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdditionalCriteria {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referrals: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviews: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub social_engagement: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TierBenefits {
    /// Points earn multiplier, >= 1.0.
    pub points_multiplier: f64,
    pub discount_percentage: f64,
    pub free_shipping: bool,
    pub early_access: bool,
    /// Points granted by the birthday-bonus action.
    pub birthday_bonus: u64,
    /// Points granted once on upgrade into this tier.
    pub welcome_bonus: u64,
    pub renewal_bonus: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TierPrivileges {
    pub priority_support: bool,
    pub personal_shopper: bool,
    pub exclusive_events: bool,
    pub extended_returns_days: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeasonalBenefits {
    /// Bonus points added to earns flagged with the `ramadan` event.
    pub ramadan_bonus: u64,
    pub eid_special_discount: f64,
    pub national_day_promo: f64,
    pub black_friday_early_access: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashbackRules {
    pub enabled: bool,
    /// Cashback rate as a percentage of purchase amount.
    pub percentage: f64,
    /// Monthly cashback cap in AED.
    pub max_monthly: f64,
    /// Categories that boost both cashback and points by 1.5x.
    #[serde(default)]
    pub eligible_categories: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DegradationRules {
    pub warning_months: u32,
    pub grace_period_months: u32,
    /// Tier to fall back to. None only on the lowest tier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub downgrade_to: Option<String>,
}

/// Ordered, read-only tier table. Levels are dense 1..=N.
#[derive(Debug, Clone)]
pub struct TierCatalog {
    tiers: Vec<LoyaltyTier>,
}

impl TierCatalog {
    /// The standard five-tier oud retail program.
    pub fn standard() -> Self {
        Self {
            tiers: vec![
                LoyaltyTier {
                    id: "bronze".into(),
                    name: "Bronze".into(),
                    name_ar: "برونزي".into(),
                    level: 1,
                    requirements: TierRequirements {
                        min_spending: 0.0,
                        min_transactions: 0,
                        timeframe_months: 12,
                        additional_criteria: None,
                    },
                    benefits: TierBenefits {
                        points_multiplier: 1.0,
                        discount_percentage: 0.0,
                        free_shipping: false,
                        early_access: false,
                        birthday_bonus: 200,
                        welcome_bonus: 100,
                        renewal_bonus: 0,
                    },
                    privileges: TierPrivileges {
                        priority_support: false,
                        personal_shopper: false,
                        exclusive_events: false,
                        extended_returns_days: 14,
                    },
                    seasonal: SeasonalBenefits {
                        ramadan_bonus: 50,
                        eid_special_discount: 5.0,
                        national_day_promo: 5.0,
                        black_friday_early_access: false,
                    },
                    cashback: CashbackRules {
                        enabled: false,
                        percentage: 0.0,
                        max_monthly: 0.0,
                        eligible_categories: vec![],
                    },
                    validity_months: 12,
                    degradation: DegradationRules {
                        warning_months: 2,
                        grace_period_months: 1,
                        downgrade_to: None,
                    },
                },
                LoyaltyTier {
                    id: "silver".into(),
                    name: "Silver".into(),
                    name_ar: "فضي".into(),
                    level: 2,
                    requirements: TierRequirements {
                        min_spending: 5_000.0,
                        min_transactions: 10,
                        timeframe_months: 12,
                        additional_criteria: None,
                    },
                    benefits: TierBenefits {
                        points_multiplier: 1.25,
                        discount_percentage: 5.0,
                        free_shipping: true,
                        early_access: false,
                        birthday_bonus: 300,
                        welcome_bonus: 250,
                        renewal_bonus: 100,
                    },
                    privileges: TierPrivileges {
                        priority_support: false,
                        personal_shopper: false,
                        exclusive_events: false,
                        extended_returns_days: 21,
                    },
                    seasonal: SeasonalBenefits {
                        ramadan_bonus: 100,
                        eid_special_discount: 7.5,
                        national_day_promo: 7.5,
                        black_friday_early_access: false,
                    },
                    cashback: CashbackRules {
                        enabled: true,
                        percentage: 1.0,
                        max_monthly: 75.0,
                        eligible_categories: vec![],
                    },
                    validity_months: 12,
                    degradation: DegradationRules {
                        warning_months: 2,
                        grace_period_months: 1,
                        downgrade_to: Some("bronze".into()),
                    },
                },
                LoyaltyTier {
                    id: "gold".into(),
                    name: "Gold".into(),
                    name_ar: "ذهبي".into(),
                    level: 3,
                    requirements: TierRequirements {
                        min_spending: 15_000.0,
                        min_transactions: 25,
                        timeframe_months: 12,
                        additional_criteria: None,
                    },
                    benefits: TierBenefits {
                        points_multiplier: 1.5,
                        discount_percentage: 10.0,
                        free_shipping: true,
                        early_access: true,
                        birthday_bonus: 500,
                        welcome_bonus: 500,
                        renewal_bonus: 250,
                    },
                    privileges: TierPrivileges {
                        priority_support: true,
                        personal_shopper: false,
                        exclusive_events: true,
                        extended_returns_days: 30,
                    },
                    seasonal: SeasonalBenefits {
                        ramadan_bonus: 200,
                        eid_special_discount: 10.0,
                        national_day_promo: 10.0,
                        black_friday_early_access: true,
                    },
                    cashback: CashbackRules {
                        enabled: true,
                        percentage: 2.0,
                        max_monthly: 150.0,
                        eligible_categories: vec!["premium_oud".into(), "exclusive_attars".into()],
                    },
                    validity_months: 12,
                    degradation: DegradationRules {
                        warning_months: 3,
                        grace_period_months: 2,
                        downgrade_to: Some("silver".into()),
                    },
                },
                LoyaltyTier {
                    id: "platinum".into(),
                    name: "Platinum".into(),
                    name_ar: "بلاتيني".into(),
                    level: 4,
                    requirements: TierRequirements {
                        min_spending: 40_000.0,
                        min_transactions: 50,
                        timeframe_months: 12,
                        additional_criteria: Some(AdditionalCriteria {
                            referrals: Some(3),
                            reviews: None,
                            social_engagement: None,
                        }),
                    },
                    benefits: TierBenefits {
                        points_multiplier: 2.0,
                        discount_percentage: 15.0,
                        free_shipping: true,
                        early_access: true,
                        birthday_bonus: 1_000,
                        welcome_bonus: 1_000,
                        renewal_bonus: 500,
                    },
                    privileges: TierPrivileges {
                        priority_support: true,
                        personal_shopper: true,
                        exclusive_events: true,
                        extended_returns_days: 45,
                    },
                    seasonal: SeasonalBenefits {
                        ramadan_bonus: 400,
                        eid_special_discount: 12.5,
                        national_day_promo: 12.5,
                        black_friday_early_access: true,
                    },
                    cashback: CashbackRules {
                        enabled: true,
                        percentage: 3.0,
                        max_monthly: 500.0,
                        eligible_categories: vec![
                            "premium_oud".into(),
                            "exclusive_attars".into(),
                            "limited_edition".into(),
                        ],
                    },
                    validity_months: 12,
                    degradation: DegradationRules {
                        warning_months: 3,
                        grace_period_months: 2,
                        downgrade_to: Some("gold".into()),
                    },
                },
                LoyaltyTier {
                    id: "diamond".into(),
                    name: "Diamond".into(),
                    name_ar: "ماسي".into(),
                    level: 5,
                    requirements: TierRequirements {
                        min_spending: 100_000.0,
                        min_transactions: 100,
                        timeframe_months: 12,
                        additional_criteria: Some(AdditionalCriteria {
                            referrals: Some(5),
                            reviews: Some(10),
                            social_engagement: Some(20),
                        }),
                    },
                    benefits: TierBenefits {
                        points_multiplier: 3.0,
                        discount_percentage: 20.0,
                        free_shipping: true,
                        early_access: true,
                        birthday_bonus: 2_000,
                        welcome_bonus: 2_500,
                        renewal_bonus: 1_000,
                    },
                    privileges: TierPrivileges {
                        priority_support: true,
                        personal_shopper: true,
                        exclusive_events: true,
                        extended_returns_days: 60,
                    },
                    seasonal: SeasonalBenefits {
                        ramadan_bonus: 800,
                        eid_special_discount: 15.0,
                        national_day_promo: 15.0,
                        black_friday_early_access: true,
                    },
                    cashback: CashbackRules {
                        enabled: true,
                        percentage: 5.0,
                        max_monthly: 1_500.0,
                        eligible_categories: vec![
                            "premium_oud".into(),
                            "exclusive_attars".into(),
                            "limited_edition".into(),
                        ],
                    },
                    validity_months: 12,
                    degradation: DegradationRules {
                        warning_months: 4,
                        grace_period_months: 3,
                        downgrade_to: Some("platinum".into()),
                    },
                },
            ],
        }
    }

    /// Look up a tier by id. Unknown ids are a caller concern (404-class
    /// at the API boundary, defensive fallbacks in the calculators).
    pub fn get(&self, id: &str) -> Option<&LoyaltyTier> {
        self.tiers.iter().find(|t| t.id == id)
    }

    /// The tier one level above `current_level`, if any.
    pub fn next_tier(&self, current_level: u8) -> Option<&LoyaltyTier> {
        self.tiers.iter().find(|t| t.level == current_level + 1)
    }

    /// All tiers in level order.
    pub fn tiers(&self) -> &[LoyaltyTier] {
        &self.tiers
    }

    /// Whether a purchase category qualifies for the special multiplier.
    pub fn is_premium_category(category: &str) -> bool {
        PREMIUM_CATEGORIES.contains(&category)
    }
}

impl Default for TierCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_are_dense_from_one() {
        let catalog = TierCatalog::standard();
        for (i, tier) in catalog.tiers().iter().enumerate() {
            assert_eq!(tier.level as usize, i + 1);
        }
    }

    #[test]
    fn exactly_one_tier_has_no_downgrade() {
        let catalog = TierCatalog::standard();
        let roots: Vec<_> = catalog
            .tiers()
            .iter()
            .filter(|t| t.degradation.downgrade_to.is_none())
            .collect();
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].id, "bronze");
    }

    #[test]
    fn downgrade_targets_exist() {
        let catalog = TierCatalog::standard();
        for tier in catalog.tiers() {
            if let Some(target) = &tier.degradation.downgrade_to {
                assert!(catalog.get(target).is_some(), "dangling downgrade: {target}");
            }
        }
    }

    #[test]
    fn next_tier_walks_the_ladder() {
        let catalog = TierCatalog::standard();
        assert_eq!(catalog.next_tier(1).map(|t| t.id.as_str()), Some("silver"));
        assert_eq!(catalog.next_tier(3).map(|t| t.id.as_str()), Some("platinum"));
        assert!(catalog.next_tier(5).is_none());
    }

    #[test]
    fn get_unknown_tier_is_none() {
        assert!(TierCatalog::standard().get("titanium").is_none());
    }

    #[test]
    fn multipliers_never_below_one() {
        for tier in TierCatalog::standard().tiers() {
            assert!(tier.benefits.points_multiplier >= 1.0);
        }
    }

    #[test]
    fn premium_category_set() {
        assert!(TierCatalog::is_premium_category("premium_oud"));
        assert!(!TierCatalog::is_premium_category("body_mist"));
    }
}
