use axum::{routing::get, Router};

use crate::{controllers::export_controller, AppState};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router.route("/api/export/csv", get(export_controller::get_export_csv))
}
