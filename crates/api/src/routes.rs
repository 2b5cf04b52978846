use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use quantlens_analysis::{analyze_all, Capability, Envelope, Snapshot};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        // Health
        .route("/health", get(health_check))
        // Capabilities
        .route("/capabilities", get(list_capabilities))
        .route("/analysis/{capability}/{symbol}", get(run_analysis))
        // Combined report
        .route("/report/{symbol}", get(market_report))
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "provider": state.provider.name(),
    }))
}

// ---------------------------------------------------------------------------
// Capabilities
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct CapabilityInfo {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    default_period: &'static str,
}

async fn list_capabilities() -> impl IntoResponse {
    let capabilities: Vec<_> = Capability::ALL
        .iter()
        .map(|c| CapabilityInfo {
            id: c.slug(),
            name: c.name(),
            description: c.description(),
            default_period: c.default_period(),
        })
        .collect();
    Json(capabilities)
}

#[derive(Deserialize)]
struct AnalysisQuery {
    period: Option<String>,
}

/// Analysis failures are part of the payload, so only an unknown capability
/// changes the status code.
async fn run_analysis(
    State(state): State<Arc<AppState>>,
    Path((capability, symbol)): Path<(String, String)>,
    Query(query): Query<AnalysisQuery>,
) -> impl IntoResponse {
    let capability: Capability = match capability.parse() {
        Ok(c) => c,
        Err(e) => {
            return (
                StatusCode::NOT_FOUND,
                Json(serde_json::json!({ "error": e.to_string() })),
            )
        }
    };

    tracing::debug!(%capability, %symbol, period = ?query.period, "Analysis requested");
    let envelope = Envelope::<Snapshot>::from(
        capability
            .run(state.provider.as_ref(), &symbol, query.period.as_deref())
            .await,
    );

    match serde_json::to_value(&envelope) {
        Ok(body) => (StatusCode::OK, Json(body)),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": e.to_string() })),
        ),
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

async fn market_report(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
) -> impl IntoResponse {
    Json(analyze_all(state.provider.as_ref(), &symbol).await)
}
