use reqwest::{
    Client,
    header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION},
    Method, StatusCode,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error};

use shared_config::AppConfig;
use shared_models::auth::{AuthSession, TokenResponse, User};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Authentication error: {0}")]
    Unauthorized(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("API error ({status}): {body}")]
    Status { status: u16, body: String },

    #[error("Invalid authorization token")]
    InvalidToken,

    #[error("Unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Thin HTTP wrapper over the admin backend (`/api/v1/...`).
#[derive(Clone)]
pub struct AdminApiClient {
    client: Client,
    base_url: String,
}

impl AdminApiClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.admin_api_url.trim_end_matches('/').to_string(),
        }
    }

    fn get_headers(&self, auth_token: Option<&str>) -> Result<HeaderMap, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        if let Some(token) = auth_token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| ApiError::InvalidToken)?;
            headers.insert(AUTHORIZATION, value);
        }

        Ok(headers)
    }

    pub async fn request<T>(&self, method: Method, path: &str,
                            auth_token: Option<&str>, body: Option<Value>)
                            -> Result<T, ApiError>
    where T: DeserializeOwned {
        self.request_with_query(method, path, auth_token, &[], body).await
    }

    pub async fn request_with_query<T>(&self, method: Method, path: &str,
                                       auth_token: Option<&str>,
                                       query: &[(&str, String)],
                                       body: Option<Value>)
                                       -> Result<T, ApiError>
    where T: DeserializeOwned {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making {} request to {}", method, url);

        let mut req = self.client.request(method, &url)
            .headers(self.get_headers(auth_token)?);

        if !query.is_empty() {
            req = req.query(query);
        }

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = Self::check_status(req.send().await?).await?;
        let bytes = response.bytes().await?;

        // Some admin endpoints answer 204 with no body
        if bytes.is_empty() {
            return Ok(serde_json::from_value(Value::Null)?);
        }
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// `POST /api/v1/auth/login` with the OAuth2 password form the backend expects.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession, ApiError> {
        let url = format!("{}/api/v1/auth/login", self.base_url);
        debug!("Signing in {}", email);

        let response = self.client.post(&url)
            .form(&[("username", email), ("password", password)])
            .send()
            .await?;

        let token: TokenResponse = Self::check_status(response).await?.json().await?;
        Ok(AuthSession::new(email, token.access_token))
    }

    pub async fn current_user(&self, session: &AuthSession) -> Result<User, ApiError> {
        self.request(
            Method::GET,
            "/api/v1/users/me",
            Some(session.bearer_token()),
            None,
        ).await
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_text = response.text().await.unwrap_or_default();
        error!("API error ({}): {}", status, error_text);

        Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiError::Unauthorized(error_text),
            StatusCode::NOT_FOUND => ApiError::NotFound(error_text),
            _ => ApiError::Status { status: status.as_u16(), body: error_text },
        })
    }
}
