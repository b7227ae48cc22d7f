use std::sync::Arc;
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use base64::{Engine as _, engine::general_purpose};
use serde_json::json;
use uuid::Uuid;

use shared_config::AppConfig;

pub const TEST_JWT_SECRET: &str = "test-secret-key-for-jwt-validation-must-be-long-enough";

pub struct TestConfig {
    pub jwt_secret: String,
    pub admin_api_url: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: TEST_JWT_SECRET.to_string(),
            admin_api_url: "http://localhost:8000".to_string(),
        }
    }
}

impl TestConfig {
    pub fn with_api_url(api_url: &str) -> Self {
        Self {
            admin_api_url: api_url.to_string(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            admin_api_url: self.admin_api_url.clone(),
            jwt_secret: self.jwt_secret.clone(),
            ..AppConfig::default()
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub struct TestUser {
    pub email: String,
    pub role: String,
}

impl Default for TestUser {
    fn default() -> Self {
        Self {
            email: "frontdesk@example.com".to_string(),
            role: "admin".to_string(),
        }
    }
}

impl TestUser {
    pub fn new(email: &str, role: &str) -> Self {
        Self {
            email: email.to_string(),
            role: role.to_string(),
        }
    }

    pub fn admin(email: &str) -> Self {
        Self::new(email, "admin")
    }
}

pub struct JwtTestUtils;

impl JwtTestUtils {
    pub fn create_test_token(user: &TestUser, secret: &str, exp_hours: Option<i64>) -> String {
        let exp = Utc::now() + Duration::hours(exp_hours.unwrap_or(24));

        let header = json!({
            "alg": "HS256",
            "typ": "JWT"
        });

        let payload = json!({
            "email": user.email,
            "role": user.role,
            "exp": exp.timestamp()
        });

        let header_encoded = general_purpose::URL_SAFE_NO_PAD.encode(header.to_string());
        let payload_encoded = general_purpose::URL_SAFE_NO_PAD.encode(payload.to_string());

        let signing_input = format!("{}.{}", header_encoded, payload_encoded);

        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(signing_input.as_bytes());
        let signature_encoded = general_purpose::URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        format!("{}.{}", signing_input, signature_encoded)
    }

    pub fn create_expired_token(user: &TestUser, secret: &str) -> String {
        Self::create_test_token(user, secret, Some(-1))
    }

    pub fn create_invalid_signature_token(user: &TestUser) -> String {
        Self::create_test_token(user, "wrong-secret", Some(24))
    }

    pub fn create_malformed_token() -> String {
        "invalid.token.format".to_string()
    }
}

/// Canned admin backend payloads.
pub struct MockAdminApiResponses;

impl MockAdminApiResponses {
    pub fn appointment_response(patient_name: &str, appointment_date: &str, status: &str) -> serde_json::Value {
        json!({
            "appointment_id": Uuid::new_v4().simple().to_string(),
            "patient_name": patient_name,
            "appointment_date": appointment_date,
            "service_name": "Consultation",
            "status": status
        })
    }

    pub fn created_appointment_response(appointment_date: &str, service_name: &str) -> serde_json::Value {
        json!({
            "_id": Uuid::new_v4().simple().to_string(),
            "patient_id": Uuid::new_v4().simple().to_string(),
            "campaign_id": null,
            "appointment_date": appointment_date,
            "duration_minutes": 45,
            "status": "booked",
            "service_name": service_name,
            "notes": null,
            "created_from": "manual_admin"
        })
    }

    pub fn dashboard_stats_response(active_recovery: u64, handoffs: u64, recovery_rate: f64, recall_rate: f64) -> serde_json::Value {
        json!({
            "kpis": {
                "appointments_booked_month": 12,
                "handoffs_requiring_action": handoffs,
                "active_recovery_campaigns": active_recovery
            },
            "conversion_rates": {
                "recovery_rate_percent": recovery_rate,
                "recall_rate_percent": recall_rate
            }
        })
    }

    pub fn message_response(message: &str) -> serde_json::Value {
        json!({ "message": message })
    }

    pub fn error_response(detail: &str) -> serde_json::Value {
        json!({ "detail": detail })
    }
}
