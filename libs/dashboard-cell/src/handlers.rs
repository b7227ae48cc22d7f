// libs/dashboard-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Extension, State},
    Json,
};

use shared_config::AppConfig;
use shared_models::auth::AuthSession;

use crate::services::metrics::{DashboardMetricsService, MetricsReading};

#[derive(Clone)]
pub struct DashboardState {
    pub config: Arc<AppConfig>,
    pub metrics: Arc<DashboardMetricsService>,
}

impl DashboardState {
    pub fn new(config: Arc<AppConfig>) -> Self {
        let metrics = Arc::new(DashboardMetricsService::new(&config));
        Self { config, metrics }
    }
}

#[axum::debug_handler]
pub async fn get_metrics(
    State(state): State<DashboardState>,
    Extension(auth): Extension<AuthSession>,
) -> Json<MetricsReading> {
    Json(state.metrics.refresh(&auth).await)
}
