// libs/dashboard-cell/src/models.rs
use serde::{Deserialize, Serialize};

/// Headline numbers shown on the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardMetrics {
    pub active_recovery_campaigns: u64,
    pub active_recall_campaigns: u64,
    pub engaged_leads: u64,
    pub human_handoff_queue: u64,
    pub recoveries: u64,
    pub recovery_rate: f64,
    pub recall_rate: f64,
}

impl DashboardMetrics {
    /// Overlays whatever the backend reported. Fields it does not report, or
    /// reported without a value, keep their current value.
    pub fn merge_remote(&self, stats: &DashboardStats) -> DashboardMetrics {
        let kpis = stats.kpis.as_ref();
        let rates = stats.conversion_rates.as_ref();

        DashboardMetrics {
            active_recovery_campaigns: kpis
                .and_then(|k| k.active_recovery_campaigns)
                .unwrap_or(self.active_recovery_campaigns),
            human_handoff_queue: kpis
                .and_then(|k| k.handoffs_requiring_action)
                .unwrap_or(self.human_handoff_queue),
            recovery_rate: rates
                .and_then(|r| r.recovery_rate_percent)
                .unwrap_or(self.recovery_rate),
            recall_rate: rates
                .and_then(|r| r.recall_rate_percent)
                .unwrap_or(self.recall_rate),
            ..self.clone()
        }
    }
}

// ==============================================================================
// WIRE MODELS
// ==============================================================================

/// Response of `GET /api/v1/admin/dashboard-stats`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    #[serde(default)]
    pub kpis: Option<DashboardKpis>,
    #[serde(default)]
    pub conversion_rates: Option<ConversionRates>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardKpis {
    #[serde(default)]
    pub appointments_booked_month: Option<u64>,
    #[serde(default)]
    pub handoffs_requiring_action: Option<u64>,
    #[serde(default)]
    pub active_recovery_campaigns: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversionRates {
    #[serde(default)]
    pub recovery_rate_percent: Option<f64>,
    #[serde(default)]
    pub recall_rate_percent: Option<f64>,
}
