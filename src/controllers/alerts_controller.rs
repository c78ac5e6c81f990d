use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::{
    services::{alerts_service, expiry},
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

#[derive(Deserialize)]
pub struct CreateAlertBody {
    // Caller-supplied unique id; defaults to a timestamp when omitted.
    #[serde(default)]
    pub id: Option<i64>,

    pub threshold: f64,
    pub month: String,
    pub strike: i64,
}

// POST /alerts
pub async fn post_create_alert(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<CreateAlertBody>,
) -> Response {
    let Some(owner) = owner_id(&headers) else {
        return unauthorized();
    };

    if !body.threshold.is_finite() || body.threshold <= 0.0 {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "please enter a valid price level" })),
        )
            .into_response();
    }

    // Bad months are rejected before anything touches the store.
    let expiry = match expiry::normalize_today(&body.month) {
        Ok(e) => e,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response();
        }
    };

    let id = body
        .id
        .unwrap_or_else(|| chrono::Utc::now().timestamp_millis());

    match alerts_service::create_alert(&state, owner, id, body.threshold, expiry, body.strike).await
    {
        Ok(alert) => (
            StatusCode::CREATED,
            Json(json!({
                "alert": alert,
                "message": format!(
                    "Price alert added for `{} {}p` at ${}.",
                    alert.expiry, alert.strike, alert.threshold
                ),
            })),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": format!("db error: {e}") })),
        )
            .into_response(),
    }
}

// GET /alerts
pub async fn get_alerts(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let Some(owner) = owner_id(&headers) else {
        return unauthorized();
    };

    match alerts_service::list_owner_alerts(&state, owner).await {
        Ok(alerts) if alerts.is_empty() => (
            StatusCode::OK,
            Json(json!({
                "alerts": alerts,
                "message": "No alerts found! Set one up with the alert command.",
            })),
        )
            .into_response(),
        Ok(alerts) => (StatusCode::OK, Json(json!({ "alerts": alerts }))).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": format!("db error: {e}") })),
        )
            .into_response(),
    }
}

// DELETE /alerts/:id
pub async fn delete_alert(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    let Some(owner) = owner_id(&headers) else {
        return unauthorized();
    };

    match alerts_service::delete_alert(&state, owner, id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "message": format!("Deleted alert {id}.") })),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": format!("db error: {e}") })),
        )
            .into_response(),
    }
}
