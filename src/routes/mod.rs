use axum::Router;

use crate::{controllers::home_controller, AppState};

pub mod alerts_routes;
pub mod home_routes;
pub mod options_routes;
pub mod realtime_routes;

pub fn app(state: AppState) -> Router {
    let router = Router::<AppState>::new();

    let router = home_routes::add_routes(router);
    let router = alerts_routes::add_routes(router);
    let router = options_routes::add_routes(router);
    let router = realtime_routes::add_routes(router);

    router
        .fallback(home_controller::not_found)
        .with_state(state)
}
