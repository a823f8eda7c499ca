//! Handler tests for the account endpoints, run against in-memory adapters.

use actix_web::http::StatusCode;
use actix_web::http::header::AUTHORIZATION;
use actix_web::test;
use rstest::{fixture, rstest};
use serde_json::{Value, json};

use super::*;
use crate::domain::account_service::{DUPLICATE_EMAIL_MESSAGE, INVALID_CREDENTIALS_MESSAGE};
use crate::inbound::http::bearer::TOKEN_REQUIRED_MESSAGE;
use crate::test_support::http::TestApp;

#[fixture]
fn harness() -> TestApp {
    TestApp::new()
}

async fn post_json<S>(app: &S, uri: &str, body: Value) -> (StatusCode, Value)
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse<actix_web::body::EitherBody<actix_web::body::BoxBody>>,
            Error = actix_web::Error,
        >,
{
    let request = test::TestRequest::post()
        .uri(uri)
        .set_json(body)
        .to_request();
    let response = test::call_service(app, request).await;
    let status = response.status();
    (status, test::read_body_json(response).await)
}

fn ada() -> Value {
    json!({
        "name": "Ada",
        "email": "Ada@Example.com",
        "password": "secret1",
        "college": "MIT"
    })
}

#[rstest]
#[actix_web::test]
async fn register_creates_an_account_and_returns_a_token(harness: TestApp) {
    let app = test::init_service(harness.app()).await;

    let (status, body) = post_json(&app, "/api/auth/register", ada()).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], REGISTERED_MESSAGE);
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
    assert_eq!(body["user"]["name"], "Ada");
    assert_eq!(body["user"]["email"], "ada@example.com");
    assert_eq!(body["user"]["college"], "MIT");
    assert!(body["user"].get("password").is_none());
}

#[rstest]
#[actix_web::test]
async fn register_without_college_reports_null(harness: TestApp) {
    let app = test::init_service(harness.app()).await;

    let (status, body) = post_json(
        &app,
        "/api/auth/register",
        json!({ "name": "Ada", "email": "ada@example.com", "password": "secret1" }),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["college"], Value::Null);
}

#[rstest]
#[case(json!({ "email": "a@b.c", "password": "secret1" }), "Name, email, and password are required")]
#[case(json!({ "name": "Ada", "password": "secret1" }), "Name, email, and password are required")]
#[case(json!({ "name": "Ada", "email": "a@b.c", "password": "" }), "Name, email, and password are required")]
#[case(json!({ "name": "Ada", "email": "a@b.c", "password": "12345" }), "Password must be at least 6 characters long")]
#[actix_web::test]
async fn register_validates_input(harness: TestApp, #[case] payload: Value, #[case] message: &str) {
    let app = test::init_service(harness.app()).await;

    let (status, body) = post_json(&app, "/api/auth/register", payload).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": message }));
}

#[rstest]
#[actix_web::test]
async fn duplicate_email_is_rejected_in_any_case(harness: TestApp) {
    let app = test::init_service(harness.app()).await;
    let (first, _) = post_json(&app, "/api/auth/register", ada()).await;

    let mut again = ada();
    again["email"] = json!("ADA@EXAMPLE.COM");
    let (status, body) = post_json(&app, "/api/auth/register", again).await;

    assert_eq!(first, StatusCode::CREATED);
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": DUPLICATE_EMAIL_MESSAGE }));
}

#[rstest]
#[actix_web::test]
async fn login_returns_a_fresh_token(harness: TestApp) {
    let app = test::init_service(harness.app()).await;
    post_json(&app, "/api/auth/register", ada()).await;

    let (status, body) = post_json(
        &app,
        "/api/auth/login",
        json!({ "email": "ada@example.com", "password": "secret1" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], LOGGED_IN_MESSAGE);
    assert_eq!(body["user"]["email"], "ada@example.com");
    assert!(body["token"].is_string());
}

#[rstest]
#[actix_web::test]
async fn unknown_email_and_wrong_password_look_the_same(harness: TestApp) {
    let app = test::init_service(harness.app()).await;
    post_json(&app, "/api/auth/register", ada()).await;

    let wrong_password = post_json(
        &app,
        "/api/auth/login",
        json!({ "email": "ada@example.com", "password": "not-it" }),
    )
    .await;
    let unknown_email = post_json(
        &app,
        "/api/auth/login",
        json!({ "email": "nobody@example.com", "password": "secret1" }),
    )
    .await;

    assert_eq!(wrong_password, unknown_email);
    assert_eq!(wrong_password.0, StatusCode::BAD_REQUEST);
    assert_eq!(
        wrong_password.1,
        json!({ "error": INVALID_CREDENTIALS_MESSAGE })
    );
}

#[rstest]
#[actix_web::test]
async fn login_requires_both_fields(harness: TestApp) {
    let app = test::init_service(harness.app()).await;

    let (status, body) =
        post_json(&app, "/api/auth/login", json!({ "email": "ada@example.com" })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Email and password are required" }));
}

#[rstest]
#[actix_web::test]
async fn profile_returns_the_token_owner(harness: TestApp) {
    let app = test::init_service(harness.app()).await;
    let (_, registered) = post_json(&app, "/api/auth/register", ada()).await;
    let token = registered["token"].as_str().expect("token").to_owned();

    let request = test::TestRequest::get()
        .uri("/api/auth/profile")
        .insert_header((AUTHORIZATION, format!("Bearer {token}")))
        .to_request();
    let response = test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["user"], registered["user"]);
}

#[rstest]
#[actix_web::test]
async fn profile_without_token_is_unauthorised(harness: TestApp) {
    let app = test::init_service(harness.app()).await;

    let response = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/auth/profile").to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body, json!({ "error": TOKEN_REQUIRED_MESSAGE }));
}
