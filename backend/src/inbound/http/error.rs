//! HTTP adapter mapping for domain errors.
//!
//! Purpose: keep the domain error type HTTP-agnostic while allowing Actix
//! handlers to turn domain failures into `{"error": "..."}` bodies and the
//! matching status codes. Body and query extraction failures are routed
//! through the same shape.

use actix_web::error::{JsonPayloadError, QueryPayloadError};
use actix_web::{HttpRequest, HttpResponse, ResponseError, http::StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};
use utoipa::ToSchema;

use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

/// Message sent in place of any internal failure.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";
/// Message for requests that match no route.
pub const ROUTE_NOT_FOUND_MESSAGE: &str = "Route not found";
/// Message for request bodies that are not valid JSON for the endpoint.
pub const INVALID_JSON_MESSAGE: &str = "Invalid JSON body";
/// Message for query strings that cannot be decoded.
pub const INVALID_QUERY_MESSAGE: &str = "Invalid query string";

/// Wire shape of every error response.
///
/// Example JSON:
/// `{"error":"Resource not found"}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    /// Human-readable failure description.
    #[schema(example = "Resource not found")]
    pub error: String,
}

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest
        | ErrorCode::DuplicateEmail
        | ErrorCode::InvalidCredentials
        | ErrorCode::UnsupportedFileType
        | ErrorCode::FileTooLarge => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn client_message(error: &Error) -> String {
    if matches!(error.code(), ErrorCode::InternalError) {
        error!(
            trace_id = error.trace_id().unwrap_or("-"),
            message = error.message(),
            "request failed with an internal error"
        );
        INTERNAL_ERROR_MESSAGE.to_owned()
    } else {
        error.message().to_owned()
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());
        if let Some(id) = self.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }

        builder.json(ErrorBody {
            error: client_message(self),
        })
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        // Do not leak implementation details to clients.
        error!(error = %err, "actix error promoted to domain error");
        Error::internal(INTERNAL_ERROR_MESSAGE)
    }
}

/// Error handler for [`actix_web::web::JsonConfig`].
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    warn!(error = %err, "rejected request body");
    Error::invalid_request(INVALID_JSON_MESSAGE).into()
}

/// Error handler for [`actix_web::web::QueryConfig`].
pub fn query_error_handler(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    warn!(error = %err, "rejected query string");
    Error::invalid_request(INVALID_QUERY_MESSAGE).into()
}

/// Fallback service for unmatched routes and methods.
pub async fn not_found() -> ApiResult<HttpResponse> {
    Err(Error::not_found(ROUTE_NOT_FOUND_MESSAGE))
}
