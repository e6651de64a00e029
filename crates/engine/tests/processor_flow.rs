//! End-to-end processor flows over the in-memory store: earn with
//! tier advancement, redemption guards, and the bonus actions.

use rewards_core::config::ProgramConfig;
use rewards_core::error::LoyaltyError;
use rewards_core::profile::CustomerProfile;
use rewards_core::store::LoyaltyStore;
use rewards_core::tiers::TierCatalog;
use rewards_engine::processor::TransactionProcessor;
use rewards_store::InMemoryStore;
use std::sync::Arc;

fn setup() -> (TransactionProcessor, Arc<InMemoryStore>) {
    let store = Arc::new(InMemoryStore::empty());
    let processor = TransactionProcessor::new(
        Arc::new(TierCatalog::standard()),
        store.clone(),
        ProgramConfig::default(),
    );
    (processor, store)
}

fn enroll(store: &InMemoryStore, id: &str) {
    store.save_profile(CustomerProfile::new(id));
}

#[test]
fn earn_updates_points_and_spending() {
    let (processor, store) = setup();
    enroll(&store, "C1");

    let outcome = processor
        .earn_points("C1", 1_000.0, &[], Some("ORD-77".into()), None)
        .unwrap();
    // Bronze multiplier 1.0: floor(1000 * 0.10) = 100.
    assert_eq!(outcome.points_earned, 100);
    assert_eq!(outcome.cashback, 0.0);
    assert!(outcome.upgrade.is_none());
    assert!(outcome.transaction.expires_at.is_some());
    assert_eq!(
        outcome.transaction.metadata.transaction_id.as_deref(),
        Some("ORD-77")
    );

    let profile = store.get_profile("C1").unwrap();
    assert_eq!(profile.points.available, 100);
    assert_eq!(profile.points.lifetime, 100);
    assert_eq!(profile.spending.current_period, 1_000.0);
    assert_eq!(profile.spending.transaction_count, 1);
    assert_eq!(profile.spending.average_order_value, 1_000.0);
    assert_eq!(store.transactions_for("C1").len(), 1);
}

#[test]
fn earn_across_threshold_advances_one_level_with_welcome_bonus() {
    let (processor, store) = setup();
    let mut p = CustomerProfile::new("C2");
    // One more transaction and 1000 AED away from Silver (5000 / 10 tx).
    p.spending.current_period = 4_500.0;
    p.spending.transaction_count = 9;
    store.save_profile(p);

    let outcome = processor.earn_points("C2", 600.0, &[], None, None).unwrap();
    let upgrade = outcome.upgrade.expect("threshold crossed");
    assert_eq!(upgrade.new_tier, "silver");
    assert_eq!(outcome.tier, "silver");
    // Welcome bonus matches the new tier's benefit.
    assert_eq!(upgrade.bonus_transaction.points, 250);

    let profile = store.get_profile("C2").unwrap();
    assert_eq!(profile.current_tier, "silver");
    // 60 earned + 250 welcome.
    assert_eq!(profile.points.available, 310);
    // Earn entry plus the synthesized upgrade bonus entry.
    assert_eq!(store.transactions_for("C2").len(), 2);
    // Exactly one level: Gold requires a fresh qualifying run.
    assert_ne!(profile.current_tier, "gold");
}

#[test]
fn ramadan_event_adds_the_seasonal_bonus() {
    let (processor, store) = setup();
    enroll(&store, "C3");

    let outcome = processor
        .earn_points("C3", 100.0, &[], None, Some("ramadan".into()))
        .unwrap();
    // floor(100 * 0.10) = 10 plus the Bronze ramadan bonus of 50.
    assert_eq!(outcome.points_earned, 60);
}

#[test]
fn gold_premium_purchase_matches_the_published_scenario() {
    let (processor, store) = setup();
    let mut p = CustomerProfile::new("C4");
    p.current_tier = "gold".to_string();
    store.save_profile(p);

    let categories = vec!["premium_oud".to_string()];
    let outcome = processor
        .earn_points("C4", 5_000.0, &categories, None, None)
        .unwrap();
    assert_eq!(outcome.points_earned, 1_125);
    assert!((outcome.cashback - 150.0).abs() < 1e-9);

    // The monthly budget is now exhausted; a second purchase pays nothing.
    let outcome = processor
        .earn_points("C4", 5_000.0, &categories, None, None)
        .unwrap();
    assert_eq!(outcome.cashback, 0.0);
}

#[test]
fn redeem_insufficient_points_mutates_nothing() {
    let (processor, store) = setup();
    let mut p = CustomerProfile::new("C5");
    p.points.total = 100;
    p.points.available = 100;
    store.save_profile(p);

    let err = processor
        .redeem_points("C5", 500, None, None)
        .unwrap_err();
    assert!(matches!(
        err,
        LoyaltyError::InsufficientPoints {
            requested: 500,
            available: 100
        }
    ));

    let profile = store.get_profile("C5").unwrap();
    assert_eq!(profile.points.available, 100);
    assert!(store.transactions_for("C5").is_empty());
}

#[test]
fn redeem_converts_points_at_the_fixed_rate() {
    let (processor, store) = setup();
    let mut p = CustomerProfile::new("C6");
    p.points.total = 1_000;
    p.points.available = 1_000;
    store.save_profile(p);

    let outcome = processor
        .redeem_points("C6", 400, Some("gift_wrap".into()), Some("ORD-9".into()))
        .unwrap();
    assert_eq!(outcome.transaction.points, -400);
    assert!((outcome.redemption_value - 40.0).abs() < 1e-9);
    assert_eq!(outcome.points_remaining, 600);
    assert_eq!(
        outcome.transaction.metadata.order_id.as_deref(),
        Some("ORD-9")
    );
}

#[test]
fn redeem_then_earn_back_restores_available() {
    let (processor, store) = setup();
    let mut p = CustomerProfile::new("C7");
    p.points.total = 500;
    p.points.available = 500;
    store.save_profile(p);

    processor.redeem_points("C7", 200, None, None).unwrap();
    // Bronze: floor(2000 * 0.10) = 200 points nets the balance back.
    processor.earn_points("C7", 2_000.0, &[], None, None).unwrap();
    assert_eq!(store.get_profile("C7").unwrap().points.available, 500);
}

#[test]
fn birthday_bonus_follows_the_tier() {
    let (processor, store) = setup();
    let mut p = CustomerProfile::new("C8");
    p.current_tier = "platinum".to_string();
    store.save_profile(p);

    let outcome = processor.birthday_bonus("C8").unwrap();
    assert_eq!(outcome.points_added, 1_000);
    assert_eq!(store.get_profile("C8").unwrap().points.available, 1_000);
}

#[test]
fn birthday_bonus_on_unknown_tier_fails_without_mutation() {
    let (processor, store) = setup();
    let mut p = CustomerProfile::new("C9");
    p.current_tier = "titanium".to_string();
    store.save_profile(p);

    let err = processor.birthday_bonus("C9").unwrap_err();
    assert!(matches!(err, LoyaltyError::TierNotFound(t) if t == "titanium"));
    assert_eq!(store.get_profile("C9").unwrap().points.available, 0);
    assert!(store.transactions_for("C9").is_empty());
}

#[test]
fn referral_bonus_is_flat_and_tracks_referrals() {
    let (processor, store) = setup();
    enroll(&store, "C10");

    let outcome = processor.referral_bonus("C10", "C11").unwrap();
    assert_eq!(outcome.points_added, 500);
    assert_eq!(
        outcome.transaction.metadata.referral_id.as_deref(),
        Some("C11")
    );

    let profile = store.get_profile("C10").unwrap();
    assert_eq!(profile.referrals.total_referred, 1);
    assert_eq!(profile.referrals.successful_referrals, 1);
    assert_eq!(profile.referrals.referral_bonus, 500);
    assert_eq!(profile.points.available, 500);
}

#[test]
fn missing_profile_is_not_found() {
    let (processor, _store) = setup();
    assert!(matches!(
        processor.earn_points("NOBODY", 100.0, &[], None, None),
        Err(LoyaltyError::ProfileNotFound(_))
    ));
    assert!(matches!(
        processor.redeem_points("NOBODY", 1, None, None),
        Err(LoyaltyError::ProfileNotFound(_))
    ));
}

#[test]
fn negative_amount_is_rejected_before_mutation() {
    let (processor, store) = setup();
    enroll(&store, "C12");

    assert!(matches!(
        processor.earn_points("C12", -5.0, &[], None, None),
        Err(LoyaltyError::InvalidRequest(_))
    ));
    assert_eq!(store.get_profile("C12").unwrap().points.available, 0);
}
