use axum::{routing::get, Router};

use crate::{controllers::options_controller, AppState};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/options/put", get(options_controller::get_put_matrix))
        .route("/options/call", get(options_controller::get_call_matrix))
}
