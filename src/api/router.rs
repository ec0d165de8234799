//! HTTP API router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! Record and assistant routes are nested under `/api/`; `/health` is also
//! served at the root for load balancers.
//!
//! NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;

/// Build the API router over an initialized store and assistant.
pub fn api_router(ctx: ApiContext) -> Router {
    let api = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/health/ready", get(endpoints::health::ready))
        .route("/appointments", post(endpoints::appointments::create))
        .route("/appointments/:patient_id", get(endpoints::appointments::list))
        .route("/labs", post(endpoints::labs::create))
        .route("/labs/:patient_id", get(endpoints::labs::list))
        .route("/prescriptions", post(endpoints::prescriptions::create))
        .route(
            "/prescriptions/:patient_id",
            get(endpoints::prescriptions::list),
        )
        .route("/billing", post(endpoints::billing::create))
        .route("/billing/:patient_id", get(endpoints::billing::list))
        .route(
            "/chat-interactions",
            post(endpoints::chat_interactions::create),
        )
        .route(
            "/chat-interactions/:patient_id",
            get(endpoints::chat_interactions::list),
        )
        .route("/patients", post(endpoints::patients::create))
        .route("/patients/:patient_id", get(endpoints::patients::get))
        .route("/records/:patient_id", get(endpoints::records::unified))
        .route("/audit/:patient_id", get(endpoints::audit::list))
        .route("/chat", post(endpoints::chat::send))
        .route(
            "/discharge-summary",
            post(endpoints::chat::discharge_summary),
        )
        .with_state(ctx);

    Router::new()
        .route("/health", get(endpoints::health::check))
        .nest("/api", api)
        .layer(axum::middleware::from_fn(middleware::audit::log_access))
        .layer(CorsLayer::permissive())
}
