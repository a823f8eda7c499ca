//! Credential adapters: password hashing, token signing and key loading.

mod bcrypt_hasher;
mod jwt_token_service;
mod signing_key;

pub use bcrypt_hasher::{BcryptPasswordHasher, DEFAULT_BCRYPT_COST};
pub use jwt_token_service::{JwtTokenService, TOKEN_TTL_DAYS};
pub use signing_key::{
    BuildMode, JWT_SECRET_ENV, SIGNING_KEY_MIN_LEN, SigningKey, SigningKeyError,
    signing_key_from_env,
};
