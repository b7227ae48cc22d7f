pub mod metrics;

pub use metrics::{DashboardMetricsService, MetricsReading, MetricsSource};
