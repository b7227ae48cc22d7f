use std::sync::Arc;

use axum::{
    extract::{Extension, State},
    Json,
};
use axum_extra::TypedHeader;
use headers::{Authorization, authorization::Bearer};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use shared_api_client::{AdminApiClient, ApiError};
use shared_config::AppConfig;
use shared_models::auth::{AuthSession, User};
use shared_models::error::AppError;
use shared_utils::jwt::validate_token;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

fn map_api_error(error: ApiError) -> AppError {
    match error {
        ApiError::Unauthorized(_) => AppError::Auth("Incorrect email or password".to_string()),
        ApiError::NotFound(msg) => AppError::NotFound(msg),
        other => AppError::ExternalService(other.to_string()),
    }
}

/// Exchanges operator credentials for an admin API token.
pub async fn login(
    State(config): State<Arc<AppConfig>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<Value>, AppError> {
    if request.email.trim().is_empty() || request.password.is_empty() {
        return Err(AppError::BadRequest("Email and password are required".to_string()));
    }

    let client = AdminApiClient::new(&config);
    let session = client.login(&request.email, &request.password).await.map_err(|e| {
        warn!("Sign-in failed for {}: {}", request.email, e);
        map_api_error(e)
    })?;

    info!("Operator {} signed in", session.email);

    Ok(Json(json!({
        "email": session.email,
        "access_token": session.access_token,
        "token_type": "bearer",
    })))
}

pub async fn verify_token(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Json<Value> {
    debug!("Verifying token");

    match validate_token(auth.token(), &config.jwt_secret) {
        Ok(session) => Json(json!({ "valid": true, "email": session.email })),
        Err(_) => Json(json!({ "valid": false })),
    }
}

#[axum::debug_handler]
pub async fn current_user(
    State(config): State<Arc<AppConfig>>,
    Extension(session): Extension<AuthSession>,
) -> Result<Json<User>, AppError> {
    let client = AdminApiClient::new(&config);
    let user = client.current_user(&session).await.map_err(map_api_error)?;

    Ok(Json(user))
}
