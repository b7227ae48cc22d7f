use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use auth_cell::router::auth_routes;
use dashboard_cell::handlers::DashboardState;
use dashboard_cell::router::dashboard_routes;
use scheduling_cell::handlers::SchedulingState;
use scheduling_cell::router::scheduling_routes;
use scheduling_cell::services::{FixtureSlotSource, HttpAppointmentStore};
use shared_config::AppConfig;

pub fn create_router(config: Arc<AppConfig>) -> Router {
    let scheduling = SchedulingState::new(
        config.clone(),
        Arc::new(HttpAppointmentStore::new(&config)),
        Arc::new(FixtureSlotSource::standard_day()),
    );

    Router::new()
        .route("/", get(|| async { "Mundos dashboard API is running!" }))
        .nest("/auth", auth_routes(config.clone()))
        .nest("/scheduling", scheduling_routes(scheduling))
        .nest("/dashboard", dashboard_routes(DashboardState::new(config)))
}
