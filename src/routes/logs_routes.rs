use axum::{routing::get, Router};

use crate::{controllers::logs_controller, AppState};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router.route("/api/logs", get(logs_controller::get_logs))
}
