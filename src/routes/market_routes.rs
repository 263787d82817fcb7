use axum::{routing::get, Router};

use crate::{controllers::market_controller, AppState};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/api/history", get(market_controller::get_history))
        .route("/api/current", get(market_controller::get_current))
        .route("/api/compare", get(market_controller::get_compare))
        .route("/api/instruments", get(market_controller::get_instruments))
}
