//! Shared helpers for backend integration tests.
//!
//! Integration tests compile as separate crates under `backend/tests/`; this
//! module holds the request helpers they have in common. Every helper drives
//! the fully assembled application through `actix_web::test`.

use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::http::header::{AUTHORIZATION, CONTENT_TYPE};
use actix_web::test;
use bytes::Bytes;
use serde_json::{Value, json};
use synapse::test_support::http::{MultipartForm, metadata_form};

/// Minimal PDF-looking payload.
pub const PDF_BYTES: &[u8] = b"%PDF-1.4 synapse integration fixture";

/// Register `email` and return the response status and body.
pub async fn register<S, B>(app: &S, name: &str, email: &str, password: &str) -> (StatusCode, Value)
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let request = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({ "name": name, "email": email, "password": password }))
        .to_request();
    send_json(app, request).await
}

/// Register a fresh account and return its bearer token.
pub async fn token_for<S, B>(app: &S, name: &str, email: &str) -> String
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let (status, body) = register(app, name, email, "secret1").await;
    assert_eq!(status, StatusCode::CREATED, "registration failed: {body}");
    body["token"].as_str().expect("token issued").to_owned()
}

/// Log in and return the response status and body.
pub async fn login<S, B>(app: &S, email: &str, password: &str) -> (StatusCode, Value)
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let request = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "email": email, "password": password }))
        .to_request();
    send_json(app, request).await
}

/// Submit `form` to the upload endpoint.
pub async fn upload<S, B>(app: &S, token: Option<&str>, form: MultipartForm) -> (StatusCode, Value)
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let mut request = test::TestRequest::post()
        .uri("/api/resources/upload")
        .insert_header((CONTENT_TYPE, form.content_type()));
    if let Some(token) = token {
        request = request.insert_header((AUTHORIZATION, format!("Bearer {token}")));
    }
    send_json(app, request.set_payload(form.into_body()).to_request()).await
}

/// Upload a small PDF with the given metadata and return the new id.
pub async fn upload_pdf<S, B>(app: &S, token: &str, title: &str, subject: &str, year: &str) -> String
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let form = metadata_form(title, subject, year).file("file", "notes.pdf", PDF_BYTES);
    let (status, body) = upload(app, Some(token), form).await;
    assert_eq!(status, StatusCode::CREATED, "upload failed: {body}");
    body["resource"]["id"].as_str().expect("resource id").to_owned()
}

/// GET `uri` without credentials and decode the JSON body.
pub async fn get_json<S, B>(app: &S, uri: &str) -> (StatusCode, Value)
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    send_json(app, test::TestRequest::get().uri(uri).to_request()).await
}

/// GET `uri` with a raw `Authorization` header value.
pub async fn get_json_authorised<S, B>(app: &S, uri: &str, authorization: &str) -> (StatusCode, Value)
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let request = test::TestRequest::get()
        .uri(uri)
        .insert_header((AUTHORIZATION, authorization.to_owned()))
        .to_request();
    send_json(app, request).await
}

/// Download resource `id` and return the status and raw body.
pub async fn download<S, B>(app: &S, id: &str) -> (StatusCode, Bytes)
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let request = test::TestRequest::get()
        .uri(&format!("/api/resources/{id}/download"))
        .to_request();
    let response = test::call_service(app, request).await;
    let status = response.status();
    (status, test::read_body(response).await)
}

async fn send_json<S, B>(app: &S, request: actix_http::Request) -> (StatusCode, Value)
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let response = test::call_service(app, request).await;
    let status = response.status();
    let body = test::read_body(response).await;
    let value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, value)
}
