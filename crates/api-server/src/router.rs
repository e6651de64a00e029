//! Loyalty API router — mounts the program resource and operational
//! endpoints on the injected state.

use crate::handlers::{self, LoyaltyState};
use axum::routing::get;
use axum::Router;

/// Build the loyalty router. Merge into the main app or serve standalone.
pub fn loyalty_router(state: LoyaltyState) -> Router {
    Router::new()
        .route(
            "/api/v1/loyalty/program",
            get(handlers::handle_program_get)
                .post(handlers::handle_action)
                .put(handlers::handle_profile_update),
        )
        .route("/health", get(handlers::health_check))
        .with_state(state)
}
