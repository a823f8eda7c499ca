//! Account API handlers.
//!
//! ```text
//! POST /api/auth/register {"name":"Ada","email":"ada@example.com","password":"secret1"}
//! POST /api/auth/login {"email":"ada@example.com","password":"secret1"}
//! GET /api/auth/profile   (Authorization: Bearer <token>)
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{AuthSession, Error, LoginCredentials, Registration, User};
use crate::inbound::http::ApiResult;
use crate::inbound::http::bearer::Authenticated;
use crate::inbound::http::error::ErrorBody;
use crate::inbound::http::state::HttpState;

/// Message returned with a successful registration.
pub const REGISTERED_MESSAGE: &str = "User registered successfully";
/// Message returned with a successful login.
pub const LOGGED_IN_MESSAGE: &str = "Login successful";

/// Registration request body for `POST /api/auth/register`.
///
/// Fields are optional at the wire level so that absent values surface as
/// the documented validation message rather than a JSON error.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct RegisterRequest {
    #[schema(example = "Ada Lovelace")]
    pub name: Option<String>,
    #[schema(example = "ada@example.com")]
    pub email: Option<String>,
    #[schema(example = "secret1")]
    pub password: Option<String>,
    #[schema(example = "MIT")]
    pub college: Option<String>,
}

/// Login request body for `POST /api/auth/login`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "ada@example.com")]
    pub email: Option<String>,
    #[schema(example = "secret1")]
    pub password: Option<String>,
}

/// Public view of an account.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
pub struct UserView {
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: String,
    pub name: String,
    pub email: String,
    /// `null` when the user gave no college.
    pub college: Option<String>,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id().to_string(),
            name: user.name().as_str().to_owned(),
            email: user.email().as_str().to_owned(),
            college: user.college().map(str::to_owned),
        }
    }
}

/// Body returned by register and login.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct AuthResponse {
    pub message: String,
    /// Bearer token valid for seven days.
    pub token: String,
    pub user: UserView,
}

impl AuthResponse {
    fn new(message: &str, session: &AuthSession) -> Self {
        Self {
            message: message.to_owned(),
            token: session.token.as_str().to_owned(),
            user: UserView::from(&session.user),
        }
    }
}

/// Body returned by `GET /api/auth/profile`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct ProfileResponse {
    pub user: UserView,
}

/// Create an account and sign the caller in.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Missing fields, short password or duplicate email", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    tags = ["auth"],
    operation_id = "register",
    security([])
)]
#[post("/auth/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let request = payload.into_inner();
    let registration = Registration::try_from_parts(
        request.name.as_deref(),
        request.email.as_deref(),
        request.password.as_deref(),
        request.college.as_deref(),
    )
    .map_err(|err| Error::invalid_request(err.to_string()))?;
    let session = state.accounts.register(registration).await?;
    Ok(HttpResponse::Created().json(AuthResponse::new(REGISTERED_MESSAGE, &session)))
}

/// Exchange credentials for a bearer token.
///
/// Unknown emails and wrong passwords produce the same response.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = AuthResponse),
        (status = 400, description = "Missing fields or invalid credentials", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/auth/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<AuthResponse>> {
    let request = payload.into_inner();
    let credentials =
        LoginCredentials::try_from_parts(request.email.as_deref(), request.password.as_deref())
            .map_err(|err| Error::invalid_request(err.to_string()))?;
    let session = state.accounts.login(credentials).await?;
    Ok(web::Json(AuthResponse::new(LOGGED_IN_MESSAGE, &session)))
}

/// Return the authenticated caller's account.
#[utoipa::path(
    get,
    path = "/api/auth/profile",
    responses(
        (status = 200, description = "Current user", body = ProfileResponse),
        (status = 401, description = "No bearer token", body = ErrorBody),
        (status = 403, description = "Invalid or expired token", body = ErrorBody),
        (status = 404, description = "User no longer exists", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    tags = ["auth"],
    operation_id = "profile"
)]
#[get("/auth/profile")]
pub async fn profile(
    state: web::Data<HttpState>,
    auth: Authenticated,
) -> ApiResult<web::Json<ProfileResponse>> {
    let user = state.profiles.profile(&auth.claims().user_id).await?;
    Ok(web::Json(ProfileResponse {
        user: UserView::from(&user),
    }))
}

#[cfg(test)]
#[path = "auth_tests.rs"]
mod tests;
