//! Token signing key loading.
//!
//! The key comes from `SYNAPSE_JWT_SECRET` or from the file configured as
//! `jwt_secret_file`. Debug builds fall back to a random per-process key;
//! release builds refuse to start without one.

use std::fmt;
use std::path::{Path, PathBuf};

use cap_std::{ambient_authority, fs::Dir};
use mockable::Env;
use rand::RngCore;
use tracing::warn;
use zeroize::Zeroizing;

/// Environment variable holding the secret inline.
pub const JWT_SECRET_ENV: &str = "SYNAPSE_JWT_SECRET";
/// Shortest secret accepted in release builds.
pub const SIGNING_KEY_MIN_LEN: usize = 32;
const EPHEMERAL_KEY_LEN: usize = 64;

/// Build mode for signing key validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Missing or weak keys are tolerated with a warning.
    Debug,
    /// A key of at least [`SIGNING_KEY_MIN_LEN`] bytes is required.
    Release,
}

impl BuildMode {
    /// Determine the build mode from `cfg!(debug_assertions)`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use synapse::outbound::security::BuildMode;
    ///
    /// let mode = BuildMode::from_debug_assertions();
    /// if cfg!(debug_assertions) {
    ///     assert_eq!(mode, BuildMode::Debug);
    /// } else {
    ///     assert_eq!(mode, BuildMode::Release);
    /// }
    /// ```
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    fn is_debug(self) -> bool {
        matches!(self, Self::Debug)
    }
}

/// HMAC secret used to sign access tokens. Wiped on drop.
#[derive(Clone)]
pub struct SigningKey(Zeroizing<Vec<u8>>);

impl SigningKey {
    /// Wrap raw secret bytes.
    #[must_use]
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(Zeroizing::new(bytes))
    }

    /// Random key for processes that have no configured secret.
    #[must_use]
    pub fn ephemeral() -> Self {
        let mut bytes = vec![0_u8; EPHEMERAL_KEY_LEN];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self::new(bytes)
    }

    /// Raw secret bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningKey(<redacted>)")
    }
}

/// Errors raised while loading the signing key.
#[derive(thiserror::Error, Debug)]
pub enum SigningKeyError {
    /// Neither the variable nor a key file was configured.
    #[error("no token signing key configured; set {JWT_SECRET_ENV} or jwt_secret_file")]
    Missing,
    /// Reading the key file failed.
    #[error("failed to read signing key at {path}: {source}")]
    KeyRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The key is too short for release builds.
    #[error("signing key too short: need >= {min_len} bytes, got {length}")]
    KeyTooShort { length: usize, min_len: usize },
}

/// Resolve the signing key from the environment and the optional key file.
///
/// `SYNAPSE_JWT_SECRET` wins over `secret_file` when both are present.
///
/// # Examples
///
/// ```rust
/// use mockable::MockEnv;
/// use synapse::outbound::security::{BuildMode, signing_key_from_env};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut env = MockEnv::new();
/// env.expect_string().returning(|name| match name {
///     "SYNAPSE_JWT_SECRET" => Some("x".repeat(48)),
///     _ => None,
/// });
///
/// let key = signing_key_from_env(&env, None, BuildMode::Release)?;
/// assert_eq!(key.as_bytes().len(), 48);
/// # Ok(())
/// # }
/// ```
///
/// # Errors
///
/// Returns [`SigningKeyError`] in release builds when no usable key is
/// configured. Debug builds only warn and use [`SigningKey::ephemeral`].
pub fn signing_key_from_env<E: Env>(
    env: &E,
    secret_file: Option<&Path>,
    mode: BuildMode,
) -> Result<SigningKey, SigningKeyError> {
    let inline = env
        .string(JWT_SECRET_ENV)
        .filter(|secret| !secret.trim().is_empty())
        .map(|secret| Zeroizing::new(secret.into_bytes()));

    let bytes = match (inline, secret_file) {
        (Some(bytes), _) => bytes,
        (None, Some(path)) => match read_key_file(path) {
            Ok(bytes) => bytes,
            Err(source) if mode.is_debug() => {
                warn!(
                    path = %path.display(),
                    error = %source,
                    "using temporary signing key (dev only)"
                );
                return Ok(SigningKey::ephemeral());
            }
            Err(source) => {
                return Err(SigningKeyError::KeyRead {
                    path: path.to_path_buf(),
                    source,
                });
            }
        },
        (None, None) if mode.is_debug() => {
            warn!("no token signing key configured; using temporary key (dev only)");
            return Ok(SigningKey::ephemeral());
        }
        (None, None) => return Err(SigningKeyError::Missing),
    };

    let length = bytes.len();
    if length < SIGNING_KEY_MIN_LEN {
        if !mode.is_debug() {
            return Err(SigningKeyError::KeyTooShort {
                length,
                min_len: SIGNING_KEY_MIN_LEN,
            });
        }
        warn!(length, "signing key shorter than recommended");
    }
    Ok(SigningKey(bytes))
}

fn read_key_file(path: &Path) -> std::io::Result<Zeroizing<Vec<u8>>> {
    let parent = path.parent().filter(|p| !p.as_os_str().is_empty());
    let parent = parent.unwrap_or_else(|| Path::new("."));
    let name = path.file_name().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "key path must name a file",
        )
    })?;
    let dir = Dir::open_ambient_dir(parent, ambient_authority())?;
    let mut bytes = Zeroizing::new(dir.read(name)?);
    while bytes.last().is_some_and(u8::is_ascii_whitespace) {
        bytes.pop();
    }
    Ok(bytes)
}

#[cfg(test)]
#[path = "signing_key_tests.rs"]
mod tests;
