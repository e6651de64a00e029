use thiserror::Error;

pub type LoyaltyResult<T> = Result<T, LoyaltyError>;

#[derive(Error, Debug)]
pub enum LoyaltyError {
    #[error("Customer profile not found: {0}")]
    ProfileNotFound(String),

    #[error("Loyalty tier not found: {0}")]
    TierNotFound(String),

    #[error("Insufficient points: requested {requested}, available {available}")]
    InsufficientPoints { requested: u64, available: u64 },

    #[error("Invalid action: {0}")]
    InvalidAction(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}
