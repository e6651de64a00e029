//! Loyalty computation engine: points and cashback calculators, tier
//! eligibility evaluation, and the transaction processor that applies
//! actions to customer profiles.

pub mod cashback;
pub mod eligibility;
pub mod points;
pub mod processor;

pub use eligibility::{check_eligibility, EligibilityReport, RequirementStatus};
pub use processor::{ActionOutcome, LoyaltyAction, TransactionProcessor};
