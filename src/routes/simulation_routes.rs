use axum::{routing::get, Router};
use crate::controllers::simulation_controller::{analyze, simulate, usage};
use crate::shared_state::AppState;

/// Build the `/api/*` sub-router.
pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/",         get(usage))
        .route("/simulate", get(simulate))
        .route("/analyze",  get(analyze))
        .with_state(state)
}

/// `/simulate` and `/analyze` at the root, for a same-origin front-end built
/// with an empty API base URL.
pub fn root_routes(state: AppState) -> Router {
    Router::new()
        .route("/simulate", get(simulate))
        .route("/analyze",  get(analyze))
        .with_state(state)
}
