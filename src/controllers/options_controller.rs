use std::time::{Duration, Instant};

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::warn;

use crate::{
    services::options_chain::{self, OptionSide},
    AppState,
};

fn owner_id(headers: &HeaderMap) -> Option<i64> {
    headers
        .get("X-User-Id")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<i64>().ok())
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": "missing or invalid X-User-Id header" })),
    )
        .into_response()
}

/// One invocation per user per cooldown window; the window is charged on
/// entry whether or not the aggregation succeeds.
async fn on_cooldown(state: &AppState, owner: i64) -> bool {
    let window = Duration::from_secs(state.settings.options_cooldown_secs);
    let now = Instant::now();

    let mut cooldowns = state.cooldowns.lock().await;
    match cooldowns.get(&owner) {
        Some(last) if now.duration_since(*last) < window => true,
        _ => {
            cooldowns.insert(owner, now);
            false
        }
    }
}

async fn matrix_response(state: AppState, headers: HeaderMap, side: OptionSide) -> Response {
    let Some(owner) = owner_id(&headers) else {
        return unauthorized();
    };

    if on_cooldown(&state, owner).await {
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({ "error": "option prices were requested recently, try again in a bit" })),
        )
            .into_response();
    }

    match options_chain::build_matrix(state.feed.as_ref(), &state.settings, side).await {
        Ok(matrix) => (StatusCode::OK, Json(matrix)).into_response(),
        Err(e) => {
            warn!(error = %e, side = side.query_word(), "options chain aggregation failed");
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({ "error": "could not retrieve price data" })),
            )
                .into_response()
        }
    }
}

// GET /options/put
pub async fn get_put_matrix(State(state): State<AppState>, headers: HeaderMap) -> Response {
    matrix_response(state, headers, OptionSide::Put).await
}

// GET /options/call
pub async fn get_call_matrix(State(state): State<AppState>, headers: HeaderMap) -> Response {
    matrix_response(state, headers, OptionSide::Call).await
}
