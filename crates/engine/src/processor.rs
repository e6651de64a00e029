//! Transaction processor — applies loyalty actions to customer profiles.
//!
//! Each action computes its deltas on a working copy of the profile and
//! persists with a single `save_profile` at the end, so a failure before
//! the save leaves the stored profile untouched. Repeated identical calls
//! are NOT idempotent: every call appends a new ledger entry and
//! re-applies its deltas.

use crate::{cashback, eligibility, points};
use chrono::{Duration, Months, Utc};
use rewards_core::config::ProgramConfig;
use rewards_core::error::{LoyaltyError, LoyaltyResult};
use rewards_core::profile::CustomerProfile;
use rewards_core::store::LoyaltyStore;
use rewards_core::tiers::TierCatalog;
use rewards_core::transaction::{
    LoyaltyTransaction, TransactionSource, TransactionType,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

const KNOWN_ACTIONS: &[&str] = &[
    "earn_points",
    "redeem_points",
    "birthday_bonus",
    "referral_bonus",
];

/// A loyalty action, dispatched from the POST body's `action` tag.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum LoyaltyAction {
    EarnPoints {
        customer_id: String,
        amount: f64,
        #[serde(default)]
        categories: Vec<String>,
        #[serde(default)]
        transaction_id: Option<String>,
        #[serde(default)]
        special_event: Option<String>,
    },
    RedeemPoints {
        customer_id: String,
        points: u64,
        #[serde(default)]
        redemption_type: Option<String>,
        #[serde(default)]
        order_id: Option<String>,
    },
    BirthdayBonus {
        customer_id: String,
    },
    ReferralBonus {
        customer_id: String,
        referral_customer_id: String,
    },
}

impl LoyaltyAction {
    /// Parse a raw POST body, distinguishing an unknown `action` tag
    /// (invalid action) from a malformed payload (invalid request).
    pub fn from_value(value: serde_json::Value) -> LoyaltyResult<Self> {
        let tag = value
            .get("action")
            .and_then(|a| a.as_str())
            .unwrap_or_default()
            .to_string();
        if !KNOWN_ACTIONS.contains(&tag.as_str()) {
            return Err(LoyaltyError::InvalidAction(tag));
        }
        serde_json::from_value(value)
            .map_err(|e| LoyaltyError::InvalidRequest(format!("{tag}: {e}")))
    }
}

/// Tier advancement details attached to an earn response.
#[derive(Debug, Clone, Serialize)]
pub struct TierUpgrade {
    pub new_tier: String,
    pub bonus_transaction: LoyaltyTransaction,
}

#[derive(Debug, Clone, Serialize)]
pub struct EarnOutcome {
    pub transaction: LoyaltyTransaction,
    pub points_earned: u64,
    pub cashback: f64,
    /// Tier after any upgrade triggered by this earn.
    pub tier: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upgrade: Option<TierUpgrade>,
    pub points_balance: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RedeemOutcome {
    pub transaction: LoyaltyTransaction,
    /// AED value of the redeemed points.
    pub redemption_value: f64,
    pub points_remaining: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BonusOutcome {
    pub transaction: LoyaltyTransaction,
    pub points_added: u64,
    pub points_balance: u64,
}

/// Per-action response payload for the POST endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ActionOutcome {
    Earn(EarnOutcome),
    Redeem(RedeemOutcome),
    Bonus(BonusOutcome),
}

/// Orchestrates loyalty actions over the injected store and catalog.
pub struct TransactionProcessor {
    catalog: Arc<TierCatalog>,
    store: Arc<dyn LoyaltyStore>,
    config: ProgramConfig,
}

impl TransactionProcessor {
    pub fn new(
        catalog: Arc<TierCatalog>,
        store: Arc<dyn LoyaltyStore>,
        config: ProgramConfig,
    ) -> Self {
        info!(
            base_points_rate = config.base_points_rate,
            redemption_rate = config.redemption_rate,
            referral_bonus = config.referral_bonus_points,
            "Transaction processor initialized"
        );
        Self {
            catalog,
            store,
            config,
        }
    }

    pub fn catalog(&self) -> &TierCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &ProgramConfig {
        &self.config
    }

    /// Dispatch a parsed action.
    pub fn process(&self, action: LoyaltyAction) -> LoyaltyResult<ActionOutcome> {
        match action {
            LoyaltyAction::EarnPoints {
                customer_id,
                amount,
                categories,
                transaction_id,
                special_event,
            } => self
                .earn_points(&customer_id, amount, &categories, transaction_id, special_event)
                .map(ActionOutcome::Earn),
            LoyaltyAction::RedeemPoints {
                customer_id,
                points,
                redemption_type,
                order_id,
            } => self
                .redeem_points(&customer_id, points, redemption_type, order_id)
                .map(ActionOutcome::Redeem),
            LoyaltyAction::BirthdayBonus { customer_id } => {
                self.birthday_bonus(&customer_id).map(ActionOutcome::Bonus)
            }
            LoyaltyAction::ReferralBonus {
                customer_id,
                referral_customer_id,
            } => self
                .referral_bonus(&customer_id, &referral_customer_id)
                .map(ActionOutcome::Bonus),
        }
    }

    /// Earn points from a purchase; may trigger a single-level tier
    /// advancement with its welcome-bonus transaction.
    pub fn earn_points(
        &self,
        customer_id: &str,
        amount: f64,
        categories: &[String],
        transaction_id: Option<String>,
        special_event: Option<String>,
    ) -> LoyaltyResult<EarnOutcome> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(LoyaltyError::InvalidRequest(
                "amount must be a non-negative number".to_string(),
            ));
        }
        let mut profile = self.lookup(customer_id)?;
        let now = Utc::now();
        let tier_id = profile.current_tier.clone();

        let special = categories
            .iter()
            .any(|c| TierCatalog::is_premium_category(c));
        let earned = points::points_earned(&self.catalog, &self.config, amount, &tier_id, special);

        let mut bonus_points = 0u64;
        if special_event.as_deref() == Some("ramadan") {
            if let Some(tier) = self.catalog.get(&tier_id) {
                bonus_points += tier.seasonal.ramadan_bonus;
            }
        }

        profile.monthly_cashback.roll(now);
        let cashback = cashback::cashback(
            &self.catalog,
            &self.config,
            amount,
            &tier_id,
            categories,
            profile.monthly_cashback.accrued,
        );
        profile.monthly_cashback.accrued += cashback;

        let total_points = earned + bonus_points;
        let mut tx = LoyaltyTransaction::approved(
            customer_id,
            TransactionType::Earn,
            total_points as i64,
            TransactionSource::Purchase,
            format!("Earned {total_points} points on AED {amount:.2} purchase"),
        );
        tx.description_ar = Some("نقاط مكتسبة من الشراء".to_string());
        tx.amount = Some(amount);
        tx.expires_at = Some(now + Duration::days(self.config.points_expiry_days));
        tx.metadata.transaction_id = transaction_id;
        tx.metadata.tier_at_time = Some(tier_id.clone());

        profile.points.total += total_points;
        profile.points.available += total_points;
        profile.points.lifetime += total_points;
        profile.spending.total_lifetime += amount;
        profile.spending.current_period += amount;
        profile.spending.transaction_count += 1;
        profile.spending.average_order_value =
            profile.spending.total_lifetime / profile.spending.transaction_count as f64;
        profile.spending.last_purchase = Some(now);
        profile.status.last_activity = now;
        profile.updated_at = now;

        let report = eligibility::check_eligibility(&self.catalog, &profile);
        let upgrade = if report.eligible {
            advance(&self.catalog, &mut profile).map(|bonus_tx| TierUpgrade {
                new_tier: profile.current_tier.clone(),
                bonus_transaction: bonus_tx,
            })
        } else {
            None
        };

        let (next_tier, progress) = eligibility::progress_toward_next(&self.catalog, &profile);
        profile.status.next_tier = next_tier;
        profile.status.progress = progress;

        let points_balance = profile.points.available;
        let tier = profile.current_tier.clone();

        // Single transactional write, then the ledger entries.
        self.store.save_profile(profile);
        self.store.append_transaction(tx.clone());
        if let Some(u) = &upgrade {
            self.store.append_transaction(u.bonus_transaction.clone());
        }

        metrics::counter!("loyalty.points_earned").increment(total_points);
        if cashback > 0.0 {
            metrics::counter!("loyalty.cashback_awarded_fils")
                .increment((cashback * 100.0).round() as u64);
        }

        debug!(
            customer_id = %customer_id,
            points = total_points,
            cashback = cashback,
            tier = %tier,
            upgraded = upgrade.is_some(),
            "Points earned"
        );

        Ok(EarnOutcome {
            transaction: tx,
            points_earned: total_points,
            cashback,
            tier,
            upgrade,
            points_balance,
        })
    }

    /// Redeem available points at the fixed conversion rate.
    pub fn redeem_points(
        &self,
        customer_id: &str,
        points: u64,
        redemption_type: Option<String>,
        order_id: Option<String>,
    ) -> LoyaltyResult<RedeemOutcome> {
        let mut profile = self.lookup(customer_id)?;

        if points > profile.points.available {
            warn!(
                customer_id = %customer_id,
                requested = points,
                available = profile.points.available,
                "Redemption rejected: insufficient points"
            );
            return Err(LoyaltyError::InsufficientPoints {
                requested: points,
                available: profile.points.available,
            });
        }

        let now = Utc::now();
        let redemption_value = points as f64 * self.config.redemption_rate;
        let kind = redemption_type.unwrap_or_else(|| "discount".to_string());

        let mut tx = LoyaltyTransaction::approved(
            customer_id,
            TransactionType::Redeem,
            -(points as i64),
            TransactionSource::Manual,
            format!("Redeemed {points} points for AED {redemption_value:.2} {kind}"),
        );
        tx.description_ar = Some("استبدال نقاط".to_string());
        tx.amount = Some(redemption_value);
        tx.metadata.order_id = order_id;
        tx.metadata.tier_at_time = Some(profile.current_tier.clone());

        profile.points.available -= points;
        profile.status.last_activity = now;
        profile.updated_at = now;
        let points_remaining = profile.points.available;

        self.store.save_profile(profile);
        self.store.append_transaction(tx.clone());

        metrics::counter!("loyalty.points_redeemed").increment(points);
        metrics::counter!("loyalty.redemptions").increment(1);

        info!(
            customer_id = %customer_id,
            points = points,
            value = redemption_value,
            remaining = points_remaining,
            "Points redeemed"
        );

        Ok(RedeemOutcome {
            transaction: tx,
            redemption_value,
            points_remaining,
        })
    }

    /// Grant the tier's birthday bonus.
    pub fn birthday_bonus(&self, customer_id: &str) -> LoyaltyResult<BonusOutcome> {
        let mut profile = self.lookup(customer_id)?;
        let tier = self
            .catalog
            .get(&profile.current_tier)
            .ok_or_else(|| LoyaltyError::TierNotFound(profile.current_tier.clone()))?;

        let bonus = tier.benefits.birthday_bonus;
        let now = Utc::now();
        let mut tx = LoyaltyTransaction::approved(
            customer_id,
            TransactionType::Bonus,
            bonus as i64,
            TransactionSource::Birthday,
            format!("Birthday bonus: {bonus} points ({} tier)", tier.name),
        );
        tx.description_ar = Some("مكافأة عيد الميلاد".to_string());
        tx.metadata.tier_at_time = Some(tier.id.clone());

        profile.points.total += bonus;
        profile.points.available += bonus;
        profile.status.last_activity = now;
        profile.updated_at = now;
        let points_balance = profile.points.available;

        self.store.save_profile(profile);
        self.store.append_transaction(tx.clone());

        metrics::counter!("loyalty.birthday_bonuses").increment(1);
        info!(customer_id = %customer_id, bonus = bonus, "Birthday bonus granted");

        Ok(BonusOutcome {
            transaction: tx,
            points_added: bonus,
            points_balance,
        })
    }

    /// Grant the flat referral bonus and update referral counters.
    pub fn referral_bonus(
        &self,
        customer_id: &str,
        referral_customer_id: &str,
    ) -> LoyaltyResult<BonusOutcome> {
        let mut profile = self.lookup(customer_id)?;
        let bonus = self.config.referral_bonus_points;
        let now = Utc::now();

        let mut tx = LoyaltyTransaction::approved(
            customer_id,
            TransactionType::Bonus,
            bonus as i64,
            TransactionSource::Referral,
            format!("Referral bonus: {bonus} points"),
        );
        tx.description_ar = Some("مكافأة إحالة".to_string());
        tx.metadata.referral_id = Some(referral_customer_id.to_string());
        tx.metadata.tier_at_time = Some(profile.current_tier.clone());

        profile.points.total += bonus;
        profile.points.available += bonus;
        profile.referrals.total_referred += 1;
        profile.referrals.successful_referrals += 1;
        profile.referrals.referral_bonus += bonus;
        profile.status.last_activity = now;
        profile.updated_at = now;
        let points_balance = profile.points.available;

        self.store.save_profile(profile);
        self.store.append_transaction(tx.clone());

        metrics::counter!("loyalty.referral_bonuses").increment(1);
        info!(
            customer_id = %customer_id,
            referred = %referral_customer_id,
            "Referral bonus granted"
        );

        Ok(BonusOutcome {
            transaction: tx,
            points_added: bonus,
            points_balance,
        })
    }

    fn lookup(&self, customer_id: &str) -> LoyaltyResult<CustomerProfile> {
        self.store
            .get_profile(customer_id)
            .ok_or_else(|| LoyaltyError::ProfileNotFound(customer_id.to_string()))
    }
}

/// Advance the profile exactly one tier level and credit the new tier's
/// welcome bonus. Returns the bonus ledger entry, or None when there is
/// no current tier in the catalog or no level above it.
///
/// Downgrades are intentionally not handled here; degradation rules are
/// reference data until a periodic evaluation job exists.
pub fn advance(
    catalog: &TierCatalog,
    profile: &mut CustomerProfile,
) -> Option<LoyaltyTransaction> {
    let current = catalog.get(&profile.current_tier)?;
    let next = catalog.next_tier(current.level)?;
    let now = Utc::now();

    profile.current_tier = next.id.clone();
    profile.status.tier_expiry = now.checked_add_months(Months::new(next.validity_months));

    let bonus = next.benefits.welcome_bonus;
    profile.points.total += bonus;
    profile.points.available += bonus;

    let mut tx = LoyaltyTransaction::approved(
        &profile.customer_id,
        TransactionType::Bonus,
        bonus as i64,
        TransactionSource::Welcome,
        format!("Tier upgrade to {}: {bonus} welcome points", next.name),
    );
    tx.description_ar = Some(format!("ترقية إلى مستوى {}", next.name_ar));
    tx.metadata.tier_at_time = Some(next.id.clone());

    metrics::counter!("loyalty.tier_upgrades").increment(1);
    info!(
        customer_id = %profile.customer_id,
        old = %current.id,
        new = %next.id,
        welcome_bonus = bonus,
        "Tier upgrade"
    );

    Some(tx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_moves_one_level_and_credits_welcome_bonus() {
        let catalog = TierCatalog::standard();
        let mut profile = CustomerProfile::new("CUST-1");
        let before = profile.points.available;

        let tx = advance(&catalog, &mut profile).expect("bronze can advance");
        assert_eq!(profile.current_tier, "silver");
        assert_eq!(tx.points, 250);
        assert_eq!(profile.points.available, before + 250);
        assert!(profile.status.tier_expiry.is_some());
    }

    #[test]
    fn advance_stops_at_the_top() {
        let catalog = TierCatalog::standard();
        let mut profile = CustomerProfile::new("CUST-1");
        profile.current_tier = "diamond".to_string();
        assert!(advance(&catalog, &mut profile).is_none());
        assert_eq!(profile.current_tier, "diamond");
    }

    #[test]
    fn advance_requires_a_known_tier() {
        let catalog = TierCatalog::standard();
        let mut profile = CustomerProfile::new("CUST-1");
        profile.current_tier = "titanium".to_string();
        assert!(advance(&catalog, &mut profile).is_none());
    }

    #[test]
    fn unknown_action_tag_is_rejected() {
        let body = serde_json::json!({"action": "grant_everything", "customer_id": "C1"});
        match LoyaltyAction::from_value(body) {
            Err(LoyaltyError::InvalidAction(tag)) => assert_eq!(tag, "grant_everything"),
            other => panic!("expected InvalidAction, got {other:?}"),
        }
    }

    #[test]
    fn malformed_known_action_is_invalid_request() {
        // earn_points without an amount.
        let body = serde_json::json!({"action": "earn_points", "customer_id": "C1"});
        assert!(matches!(
            LoyaltyAction::from_value(body),
            Err(LoyaltyError::InvalidRequest(_))
        ));
    }

    #[test]
    fn action_tags_parse_into_variants() {
        let body = serde_json::json!({
            "action": "earn_points",
            "customer_id": "C1",
            "amount": 250.0,
            "categories": ["premium_oud"],
        });
        let action = LoyaltyAction::from_value(body).unwrap();
        match action {
            LoyaltyAction::EarnPoints {
                customer_id,
                amount,
                categories,
                ..
            } => {
                assert_eq!(customer_id, "C1");
                assert_eq!(amount, 250.0);
                assert_eq!(categories, vec!["premium_oud"]);
            }
            other => panic!("wrong variant: {other:?}"),
        }
    }
}
