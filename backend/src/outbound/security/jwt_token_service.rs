//! HS256 JSON Web Token adapter for [`TokenService`].
//!
//! Tokens carry `{userId, email, iat, exp}`. Expiry is checked against the
//! injected [`Clock`] rather than the system time so it can be tested.

use std::sync::Arc;

use chrono::TimeDelta;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use mockable::Clock;
use serde::{Deserialize, Serialize};

use crate::domain::ports::{TokenError, TokenService};
use crate::domain::{AccessToken, EmailAddress, TokenClaims, UserId};

use super::SigningKey;

/// Lifetime of an issued token.
pub const TOKEN_TTL_DAYS: i64 = 7;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireClaims {
    user_id: String,
    email: String,
    iat: i64,
    exp: i64,
}

/// Issues and verifies bearer tokens signed with a shared secret.
#[derive(Clone)]
pub struct JwtTokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: TimeDelta,
    clock: Arc<dyn Clock>,
}

impl JwtTokenService {
    /// Service signing with `key` and a seven day token lifetime.
    #[must_use]
    pub fn new(key: &SigningKey, clock: Arc<dyn Clock>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        Self {
            encoding: EncodingKey::from_secret(key.as_bytes()),
            decoding: DecodingKey::from_secret(key.as_bytes()),
            validation,
            ttl: TimeDelta::days(TOKEN_TTL_DAYS),
            clock,
        }
    }

    /// Override the token lifetime.
    #[must_use]
    pub fn with_ttl(mut self, ttl: TimeDelta) -> Self {
        self.ttl = ttl;
        self
    }
}

impl TokenService for JwtTokenService {
    fn issue(&self, claims: &TokenClaims) -> Result<AccessToken, TokenError> {
        let issued_at = self.clock.utc();
        let wire = WireClaims {
            user_id: claims.user_id.to_string(),
            email: claims.email.as_str().to_owned(),
            iat: issued_at.timestamp(),
            exp: (issued_at + self.ttl).timestamp(),
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &wire, &self.encoding)
            .map(AccessToken::new)
            .map_err(|err| TokenError::signing(err.to_string()))
    }

    fn verify(&self, token: &str) -> Result<TokenClaims, TokenError> {
        let data = jsonwebtoken::decode::<WireClaims>(token, &self.decoding, &self.validation)
            .map_err(|_| TokenError::invalid())?;
        let wire = data.claims;
        if self.clock.utc().timestamp() >= wire.exp {
            return Err(TokenError::expired());
        }
        let user_id = UserId::new(&wire.user_id).map_err(|_| TokenError::invalid())?;
        let email = EmailAddress::new(&wire.email).map_err(|_| TokenError::invalid())?;
        Ok(TokenClaims { user_id, email })
    }
}
