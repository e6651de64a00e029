//! Loyalty program REST handlers.
//!
//! The program resource is query/action shaped: one route serves the tier
//! catalog, customer snapshots, and the program summary on GET; POST
//! dispatches ledger actions; PUT shallow-merges profile fields.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use rewards_core::config::ProgramConfig;
use rewards_core::error::LoyaltyError;
use rewards_core::profile::{CustomerProfile, TierProgress};
use rewards_core::store::{LoyaltyStore, ProgramTotals};
use rewards_core::tiers::{LoyaltyTier, TierCatalog};
use rewards_engine::eligibility::{self, EligibilityReport};
use rewards_engine::processor::{ActionOutcome, LoyaltyAction, TransactionProcessor};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::error;

/// Shared state for loyalty endpoints.
#[derive(Clone)]
pub struct LoyaltyState {
    pub processor: Arc<TransactionProcessor>,
    pub store: Arc<dyn LoyaltyStore>,
    pub catalog: Arc<TierCatalog>,
    pub program: ProgramConfig,
    pub start_time: Instant,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn error_response(err: LoyaltyError) -> ApiError {
    let (status, code, message) = match &err {
        LoyaltyError::ProfileNotFound(_) => {
            (StatusCode::NOT_FOUND, "profile_not_found", err.to_string())
        }
        LoyaltyError::TierNotFound(_) => {
            (StatusCode::BAD_REQUEST, "tier_not_found", err.to_string())
        }
        LoyaltyError::InsufficientPoints { .. } => (
            StatusCode::BAD_REQUEST,
            "insufficient_points",
            err.to_string(),
        ),
        LoyaltyError::InvalidAction(_) => {
            (StatusCode::BAD_REQUEST, "invalid_action", err.to_string())
        }
        LoyaltyError::InvalidRequest(_) => {
            (StatusCode::BAD_REQUEST, "invalid_request", err.to_string())
        }
        _ => {
            error!(error = %err, "Loyalty request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "Internal processing error".to_string(),
            )
        }
    };
    metrics::counter!("loyalty.api.errors", "code" => code).increment(1);
    (
        status,
        Json(ErrorResponse {
            error: code.to_string(),
            message,
        }),
    )
}

// ─── GET ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ProgramQuery {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default, alias = "customerId")]
    pub customer_id: Option<String>,
}

#[derive(Serialize)]
pub struct ProgramMeta {
    pub name: String,
    pub currency: String,
    pub points_per_aed: f64,
    pub redemption_rate: f64,
}

#[derive(Serialize)]
pub struct TiersResponse {
    pub tiers: Vec<LoyaltyTier>,
    pub program: ProgramMeta,
}

#[derive(Serialize)]
pub struct NextMilestones {
    pub next_tier: Option<String>,
    pub progress: TierProgress,
}

#[derive(Serialize)]
pub struct CustomerResponse {
    pub profile: CustomerProfile,
    /// The customer's tier row, when the id still exists in the catalog.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier_data: Option<LoyaltyTier>,
    pub eligibility: EligibilityReport,
    pub next_milestones: NextMilestones,
}

#[derive(Serialize)]
pub struct SummaryResponse {
    pub program: ProgramMeta,
    pub totals: ProgramTotals,
}

#[derive(Serialize)]
#[serde(untagged)]
pub enum ProgramGetResponse {
    Tiers(TiersResponse),
    Customer(Box<CustomerResponse>),
    Summary(SummaryResponse),
}

fn program_meta(config: &ProgramConfig) -> ProgramMeta {
    ProgramMeta {
        name: config.name.clone(),
        currency: config.currency.clone(),
        points_per_aed: config.base_points_rate,
        redemption_rate: config.redemption_rate,
    }
}

/// GET /api/v1/loyalty/program — tiers, one customer, or the summary.
pub async fn handle_program_get(
    State(state): State<LoyaltyState>,
    Query(query): Query<ProgramQuery>,
) -> Result<Json<ProgramGetResponse>, ApiError> {
    metrics::counter!("loyalty.api.requests", "method" => "get").increment(1);

    if query.action.as_deref() == Some("tiers") {
        return Ok(Json(ProgramGetResponse::Tiers(TiersResponse {
            tiers: state.catalog.tiers().to_vec(),
            program: program_meta(&state.program),
        })));
    }

    if let Some(customer_id) = &query.customer_id {
        let profile = state
            .store
            .get_profile(customer_id)
            .ok_or_else(|| error_response(LoyaltyError::ProfileNotFound(customer_id.clone())))?;
        let tier_data = state.catalog.get(&profile.current_tier).cloned();
        let eligibility = eligibility::check_eligibility(&state.catalog, &profile);
        let (next_tier, progress) = eligibility::progress_toward_next(&state.catalog, &profile);
        return Ok(Json(ProgramGetResponse::Customer(Box::new(
            CustomerResponse {
                profile,
                tier_data,
                eligibility,
                next_milestones: NextMilestones {
                    next_tier,
                    progress,
                },
            },
        ))));
    }

    Ok(Json(ProgramGetResponse::Summary(SummaryResponse {
        program: program_meta(&state.program),
        totals: state.store.totals(),
    })))
}

// ─── POST ───────────────────────────────────────────────────────────────────

/// POST /api/v1/loyalty/program — dispatch a loyalty action.
pub async fn handle_action(
    State(state): State<LoyaltyState>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<ActionOutcome>, ApiError> {
    metrics::counter!("loyalty.api.requests", "method" => "post").increment(1);
    let action = LoyaltyAction::from_value(body).map_err(error_response)?;
    state
        .processor
        .process(action)
        .map(Json)
        .map_err(error_response)
}

// ─── PUT ────────────────────────────────────────────────────────────────────

/// PUT /api/v1/loyalty/program — shallow-merge fields into a profile.
pub async fn handle_profile_update(
    State(state): State<LoyaltyState>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<CustomerProfile>, ApiError> {
    metrics::counter!("loyalty.api.requests", "method" => "put").increment(1);

    let Some(obj) = body.as_object() else {
        return Err(error_response(LoyaltyError::InvalidRequest(
            "body must be a JSON object".to_string(),
        )));
    };
    let customer_id = obj
        .get("customer_id")
        .or_else(|| obj.get("customerId"))
        .and_then(|v| v.as_str())
        .ok_or_else(|| {
            error_response(LoyaltyError::InvalidRequest(
                "customer_id is required".to_string(),
            ))
        })?
        .to_string();

    let mut patch = obj.clone();
    patch.remove("customer_id");
    patch.remove("customerId");

    state
        .store
        .merge_profile(&customer_id, &patch)
        .map(Json)
        .map_err(error_response)
}

// ─── Operational ────────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_secs: u64,
}

/// GET /health — health check endpoint.
pub async fn health_check(State(state): State<LoyaltyState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}
