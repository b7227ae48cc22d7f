use std::env;
use tracing::warn;

const DEFAULT_ADMIN_API_URL: &str = "http://localhost:8000";
const DEFAULT_APPOINTMENT_DURATION_MINUTES: u32 = 45;
const DEFAULT_PREFERRED_CHANNEL: &str = "email";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub admin_api_url: String,
    pub jwt_secret: String,
    pub appointment_duration_minutes: u32,
    pub preferred_channel: String,
    pub bind_addr: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            admin_api_url: env::var("ADMIN_API_URL")
                .unwrap_or_else(|_| {
                    warn!("ADMIN_API_URL not set, using default");
                    DEFAULT_ADMIN_API_URL.to_string()
                }),
            jwt_secret: env::var("JWT_SECRET_KEY")
                .unwrap_or_else(|_| {
                    warn!("JWT_SECRET_KEY not set, using empty value");
                    String::new()
                }),
            appointment_duration_minutes: match env::var("APPOINTMENT_DURATION_MINUTES") {
                Ok(raw) => raw.parse().unwrap_or_else(|_| {
                    warn!("APPOINTMENT_DURATION_MINUTES is not a number ({}), using default", raw);
                    DEFAULT_APPOINTMENT_DURATION_MINUTES
                }),
                Err(_) => DEFAULT_APPOINTMENT_DURATION_MINUTES,
            },
            preferred_channel: env::var("PREFERRED_CHANNEL")
                .unwrap_or_else(|_| DEFAULT_PREFERRED_CHANNEL.to_string()),
            bind_addr: env::var("API_BIND_ADDR")
                .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.admin_api_url.is_empty() && !self.jwt_secret.is_empty()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            admin_api_url: DEFAULT_ADMIN_API_URL.to_string(),
            jwt_secret: String::new(),
            appointment_duration_minutes: DEFAULT_APPOINTMENT_DURATION_MINUTES,
            preferred_channel: DEFAULT_PREFERRED_CHANNEL.to_string(),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
        }
    }
}
