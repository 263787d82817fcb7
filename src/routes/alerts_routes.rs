use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::{controllers::alerts_controller, AppState};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route(
            "/api/alerts",
            get(alerts_controller::get_alerts).post(alerts_controller::post_create_alert),
        )
        .route("/api/alerts/check", post(alerts_controller::post_check_alerts))
        .route("/api/alerts/:id/toggle", post(alerts_controller::post_toggle_alert))
        .route("/api/alerts/:id", delete(alerts_controller::delete_alert))
}
