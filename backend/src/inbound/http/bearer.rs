//! Bearer-token extractor guarding protected routes.
//!
//! Handlers take [`Authenticated`] as an argument; extraction fails with the
//! domain error before the handler body runs, so protected handlers never see
//! an anonymous request.

use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::LocalBoxFuture;
use tracing::debug;

use crate::domain::ports::TokenError;
use crate::domain::{Error, TokenClaims};
use crate::inbound::http::state::HttpState;

/// Message for requests that carry no usable token.
pub const TOKEN_REQUIRED_MESSAGE: &str = "Access token required";
/// Message for tokens that fail verification.
pub const TOKEN_REJECTED_MESSAGE: &str = "Invalid or expired token";

/// Claims of a verified bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authenticated(pub TokenClaims);

impl Authenticated {
    /// The verified identity.
    pub fn claims(&self) -> &TokenClaims {
        &self.0
    }
}

/// Second space-separated segment of an `Authorization` header value.
///
/// The scheme word is not inspected; verification rejects anything that is
/// not a token we issued.
fn token_from_header(value: &str) -> Option<&str> {
    value.split(' ').nth(1).filter(|token| !token.is_empty())
}

fn authenticate(req: &HttpRequest) -> Result<TokenClaims, Error> {
    let state = req
        .app_data::<web::Data<HttpState>>()
        .ok_or_else(|| Error::internal("HTTP state is not registered"))?;
    let token = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(token_from_header)
        .ok_or_else(|| Error::unauthorized(TOKEN_REQUIRED_MESSAGE))?;
    state.tokens.verify(token).map_err(|err| {
        match &err {
            TokenError::Expired => debug!("rejected expired bearer token"),
            _ => debug!(error = %err, "rejected bearer token"),
        }
        Error::forbidden(TOKEN_REJECTED_MESSAGE)
    })
}

impl FromRequest for Authenticated {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let result = authenticate(req).map(Authenticated);
        Box::pin(async move { result })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test};
    use mockall::predicate::eq;
    use rstest::rstest;

    use super::*;
    use crate::domain::ports::{
        MockAccountCommand, MockProfileQuery, MockResourceCommand, MockResourceQuery,
        MockTokenService,
    };
    use crate::domain::{EmailAddress, UploadPolicy, UserId};
    use crate::inbound::http::error::ErrorBody;
    use crate::inbound::http::state::HttpStatePorts;

    const USER_ID: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

    fn claims() -> TokenClaims {
        TokenClaims {
            user_id: UserId::new(USER_ID).expect("fixture id"),
            email: EmailAddress::new("ada@example.com").expect("fixture email"),
        }
    }

    fn state_with(tokens: MockTokenService) -> web::Data<HttpState> {
        web::Data::new(HttpState::new(
            HttpStatePorts {
                accounts: Arc::new(MockAccountCommand::new()),
                profiles: Arc::new(MockProfileQuery::new()),
                resources: Arc::new(MockResourceCommand::new()),
                catalogue: Arc::new(MockResourceQuery::new()),
                tokens: Arc::new(tokens),
            },
            UploadPolicy::default(),
        ))
    }

    async fn call(tokens: MockTokenService, header: Option<&str>) -> (StatusCode, String) {
        let app = test::init_service(App::new().app_data(state_with(tokens)).route(
            "/protected",
            web::get().to(|auth: Authenticated| async move {
                HttpResponse::Ok().body(auth.claims().user_id.to_string())
            }),
        ))
        .await;
        let mut request = test::TestRequest::get().uri("/protected");
        if let Some(value) = header {
            request = request.insert_header((AUTHORIZATION, value));
        }
        let response = test::call_service(&app, request.to_request()).await;
        let status = response.status();
        let body = test::read_body(response).await;
        let text = if status.is_success() {
            String::from_utf8_lossy(&body).into_owned()
        } else {
            serde_json::from_slice::<ErrorBody>(&body)
                .expect("error body")
                .error
        };
        (status, text)
    }

    #[rstest]
    #[case("Bearer abc", Some("abc"))]
    #[case("Token abc", Some("abc"))]
    #[case("Bearer", None)]
    #[case("Bearer ", None)]
    #[case("", None)]
    #[core::prelude::v1::test]
    fn token_is_the_second_segment(#[case] header: &str, #[case] expected: Option<&str>) {
        assert_eq!(token_from_header(header), expected);
    }

    #[rstest]
    #[actix_web::test]
    async fn valid_token_reaches_the_handler() {
        let mut tokens = MockTokenService::new();
        tokens
            .expect_verify()
            .with(eq("good"))
            .times(1)
            .return_once(|_| Ok(claims()));

        let (status, body) = call(tokens, Some("Bearer good")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, USER_ID);
    }

    #[rstest]
    #[case(None)]
    #[case(Some("Bearer"))]
    #[actix_web::test]
    async fn missing_token_is_unauthorised(#[case] header: Option<&str>) {
        let mut tokens = MockTokenService::new();
        tokens.expect_verify().never();

        let (status, body) = call(tokens, header).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, TOKEN_REQUIRED_MESSAGE);
    }

    #[rstest]
    #[case(TokenError::invalid())]
    #[case(TokenError::expired())]
    #[actix_web::test]
    async fn rejected_token_is_forbidden(#[case] failure: TokenError) {
        let mut tokens = MockTokenService::new();
        tokens.expect_verify().return_once(move |_| Err(failure));

        let (status, body) = call(tokens, Some("Bearer forged")).await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body, TOKEN_REJECTED_MESSAGE);
    }
}
