// libs/dashboard-cell/src/services/metrics.rs
use reqwest::Method;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use shared_api_client::{AdminApiClient, ApiError};
use shared_config::AppConfig;
use shared_models::auth::AuthSession;

use crate::models::{DashboardMetrics, DashboardStats};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricsSource {
    Remote,
    Cached,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsReading {
    pub metrics: DashboardMetrics,
    pub source: MetricsSource,
}

/// Serves dashboard metrics, falling back to the last good reading.
pub struct DashboardMetricsService {
    client: AdminApiClient,
    cache: RwLock<DashboardMetrics>,
}

impl DashboardMetricsService {
    pub fn new(config: &AppConfig) -> Self {
        Self::with_fallback(config, DashboardMetrics::default())
    }

    pub fn with_fallback(config: &AppConfig, fallback: DashboardMetrics) -> Self {
        Self {
            client: AdminApiClient::new(config),
            cache: RwLock::new(fallback),
        }
    }

    pub async fn cached(&self) -> DashboardMetrics {
        self.cache.read().await.clone()
    }

    pub async fn fetch_stats(&self, session: &AuthSession) -> Result<DashboardStats, ApiError> {
        self.client.request(
            Method::GET,
            "/api/v1/admin/dashboard-stats",
            Some(session.bearer_token()),
            None,
        ).await
    }

    pub async fn refresh(&self, session: &AuthSession) -> MetricsReading {
        match self.fetch_stats(session).await {
            Ok(stats) => {
                let mut cache = self.cache.write().await;
                let merged = cache.merge_remote(&stats);
                *cache = merged.clone();
                debug!("Dashboard metrics refreshed from admin API");

                MetricsReading {
                    metrics: merged,
                    source: MetricsSource::Remote,
                }
            }
            Err(e) => {
                warn!("Dashboard stats unavailable, serving cached metrics: {}", e);
                MetricsReading {
                    metrics: self.cached().await,
                    source: MetricsSource::Cached,
                }
            }
        }
    }
}
