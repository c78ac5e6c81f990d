use axum::{
    routing::{delete, get},
    Router,
};

use crate::{controllers::alerts_controller, AppState};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route(
            "/alerts",
            get(alerts_controller::get_alerts).post(alerts_controller::post_create_alert),
        )
        .route("/alerts/:id", delete(alerts_controller::delete_alert))
}
