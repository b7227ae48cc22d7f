use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct JwtHeader {
    pub alg: String,
    pub typ: String,
}

/// Claims issued by the admin backend on login. Only `email` is guaranteed.
#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    pub email: Option<String>,
    pub exp: Option<u64>,
    pub sub: Option<String>,
    pub role: Option<String>,
}

/// The signed-in operator, as returned by `GET /api/v1/users/me`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub user_id: String,
    pub name: Option<String>,
    pub email: String,
    pub role: Option<String>,
}

/// Explicit session handed to every component acting on behalf of a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub email: String,
    pub access_token: String,
}

impl AuthSession {
    pub fn new(email: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            access_token: access_token.into(),
        }
    }

    pub fn bearer_token(&self) -> &str {
        &self.access_token
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}
