use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{body_string_contains, header as header_matcher, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use auth_cell::auth_routes;
use shared_utils::test_utils::{JwtTestUtils, MockAdminApiResponses, TestConfig, TestUser, TEST_JWT_SECRET};

async fn call(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

fn login_request(email: &str, password: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "email": email, "password": password }).to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_login_returns_backend_token() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .and(body_string_contains("username=desk%40clinic.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "backend-token",
            "token_type": "bearer"
        })))
        .mount(&mock_server)
        .await;

    let app = auth_routes(TestConfig::with_api_url(&mock_server.uri()).to_arc());
    let (status, body) = call(app, login_request("desk@clinic.com", "secret")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["access_token"], "backend-token");
    assert_eq!(body["email"], "desk@clinic.com");
}

#[tokio::test]
async fn test_login_with_wrong_password() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(
            MockAdminApiResponses::error_response("Incorrect email or password"),
        ))
        .mount(&mock_server)
        .await;

    let app = auth_routes(TestConfig::with_api_url(&mock_server.uri()).to_arc());
    let (status, body) = call(app, login_request("desk@clinic.com", "wrong")).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Incorrect email or password");
}

#[tokio::test]
async fn test_login_requires_credentials() {
    let app = auth_routes(TestConfig::default().to_arc());
    let (status, _) = call(app, login_request("", "")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_verify_token() {
    let app = auth_routes(TestConfig::default().to_arc());
    let user = TestUser::admin("desk@clinic.com");

    let valid = JwtTestUtils::create_test_token(&user, TEST_JWT_SECRET, Some(1));
    let request = Request::builder()
        .method(Method::POST)
        .uri("/verify")
        .header(header::AUTHORIZATION, format!("Bearer {}", valid))
        .body(Body::empty())
        .unwrap();
    let (_, body) = call(app.clone(), request).await;
    assert_eq!(body, json!({ "valid": true, "email": "desk@clinic.com" }));

    let forged = JwtTestUtils::create_invalid_signature_token(&user);
    let request = Request::builder()
        .method(Method::POST)
        .uri("/verify")
        .header(header::AUTHORIZATION, format!("Bearer {}", forged))
        .body(Body::empty())
        .unwrap();
    let (_, body) = call(app, request).await;
    assert_eq!(body, json!({ "valid": false }));
}

#[tokio::test]
async fn test_me_forwards_session_token() {
    let mock_server = MockServer::start().await;
    let token = JwtTestUtils::create_test_token(&TestUser::admin("desk@clinic.com"), TEST_JWT_SECRET, Some(1));

    Mock::given(method("GET"))
        .and(path("/api/v1/users/me"))
        .and(header_matcher("Authorization", format!("Bearer {}", token).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user_id": "u-42",
            "name": "Front Desk",
            "email": "desk@clinic.com",
            "role": "admin"
        })))
        .mount(&mock_server)
        .await;

    let app = auth_routes(TestConfig::with_api_url(&mock_server.uri()).to_arc());
    let request = Request::builder()
        .uri("/me")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let (status, body) = call(app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user_id"], "u-42");
    assert_eq!(body["email"], "desk@clinic.com");
}

#[tokio::test]
async fn test_me_without_token() {
    let app = auth_routes(TestConfig::default().to_arc());
    let request = Request::builder().uri("/me").body(Body::empty()).unwrap();

    let (status, _) = call(app, request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
