use axum::Router;
use tower_http::cors::CorsLayer;

use crate::{controllers::home_controller, AppState};

pub mod alerts_routes;
pub mod export_routes;
pub mod home_routes;
pub mod logs_routes;
pub mod market_routes;
pub mod portfolio_routes;

pub fn app(state: AppState) -> Router {
    let router = Router::<AppState>::new();

    let router = home_routes::add_routes(router);
    let router = market_routes::add_routes(router);
    let router = alerts_routes::add_routes(router);
    let router = portfolio_routes::add_routes(router);
    let router = export_routes::add_routes(router);
    let router = logs_routes::add_routes(router);

    router
        .fallback(home_controller::not_found)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
