//! Core domain types for the Oud Rewards loyalty engine: tier catalog,
//! customer profiles, ledger transactions, store trait, errors, and config.

pub mod config;
pub mod error;
pub mod profile;
pub mod store;
pub mod tiers;
pub mod transaction;

pub use error::{LoyaltyError, LoyaltyResult};
pub use store::LoyaltyStore;
pub use tiers::TierCatalog;
