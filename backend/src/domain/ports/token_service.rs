//! Driven port for signed bearer tokens.

use crate::domain::{AccessToken, TokenClaims};

use super::define_port_error;

define_port_error! {
    /// Errors raised while issuing or verifying tokens.
    pub enum TokenError {
        /// Malformed token or bad signature.
        Invalid => "token is malformed or its signature does not verify",
        /// Signature is valid but the expiry has passed.
        Expired => "token has expired",
        /// The signer rejected the claims.
        Signing { message: String } => "token signing failed: {message}",
    }
}

/// Issues and verifies stateless, time-limited tokens.
///
/// There is no revocation: a token stays valid until it expires.
#[cfg_attr(test, mockall::automock)]
pub trait TokenService: Send + Sync {
    /// Sign a token for `claims`.
    fn issue(&self, claims: &TokenClaims) -> Result<AccessToken, TokenError>;

    /// Verify signature and expiry, returning the embedded claims.
    fn verify(&self, token: &str) -> Result<TokenClaims, TokenError>;
}
