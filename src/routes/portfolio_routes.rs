use axum::{
    routing::{get, post},
    Router,
};

use crate::{controllers::portfolio_controller, AppState};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/api/portfolio", get(portfolio_controller::get_portfolio))
        .route(
            "/api/portfolio/positions",
            post(portfolio_controller::post_position),
        )
}
