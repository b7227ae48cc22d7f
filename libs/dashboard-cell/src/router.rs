// libs/dashboard-cell/src/router.rs
use axum::{
    Router,
    routing::get,
    middleware,
};

use shared_utils::extractor::auth_middleware;

use crate::handlers::{self, DashboardState};

pub fn dashboard_routes(state: DashboardState) -> Router {
    let protected_routes = Router::new()
        .route("/metrics", get(handlers::get_metrics))
        .layer(middleware::from_fn_with_state(state.config.clone(), auth_middleware));

    Router::new()
        .merge(protected_routes)
        .with_state(state)
}
