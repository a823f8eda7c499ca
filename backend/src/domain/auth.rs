//! Authentication primitives: registration and login input, password hashes,
//! issued tokens and the identity they carry.
//!
//! Constructors validate raw strings so handlers can reject malformed input
//! before calling a driving port.

use std::fmt;

use zeroize::Zeroizing;

use super::{DisplayName, EmailAddress, User, UserId, normalise_college};

/// Shortest password accepted at registration, in characters.
pub const PASSWORD_MIN_CHARS: usize = 6;

/// Validation failures for registration payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationValidationError {
    /// Name, email or password was absent or blank.
    MissingFields,
    /// Password shorter than [`PASSWORD_MIN_CHARS`].
    PasswordTooShort { min: usize },
}

impl fmt::Display for RegistrationValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingFields => write!(f, "Name, email, and password are required"),
            Self::PasswordTooShort { min } => {
                write!(f, "Password must be at least {min} characters long")
            }
        }
    }
}

impl std::error::Error for RegistrationValidationError {}

/// Validation failures for login payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginValidationError {
    /// Email or password was absent or blank.
    MissingFields,
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingFields => write!(f, "Email and password are required"),
        }
    }
}

impl std::error::Error for LoginValidationError {}

/// Validated registration request.
///
/// ## Invariants
/// - `name` and `email` satisfy their value-type rules.
/// - `password` has at least [`PASSWORD_MIN_CHARS`] characters and keeps any
///   caller-supplied whitespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    name: DisplayName,
    email: EmailAddress,
    password: Zeroizing<String>,
    college: Option<String>,
}

impl Registration {
    /// Validate raw registration fields.
    ///
    /// # Examples
    /// ```
    /// use synapse::domain::Registration;
    ///
    /// let reg = Registration::try_from_parts(
    ///     Some("Ada"), Some("ADA@example.com"), Some("secret1"), None,
    /// ).unwrap();
    /// assert_eq!(reg.email().as_str(), "ada@example.com");
    /// ```
    pub fn try_from_parts(
        name: Option<&str>,
        email: Option<&str>,
        password: Option<&str>,
        college: Option<&str>,
    ) -> Result<Self, RegistrationValidationError> {
        let name = name
            .and_then(|raw| DisplayName::new(raw).ok())
            .ok_or(RegistrationValidationError::MissingFields)?;
        let email = email
            .and_then(|raw| EmailAddress::new(raw).ok())
            .ok_or(RegistrationValidationError::MissingFields)?;
        let password = password
            .filter(|raw| !raw.is_empty())
            .ok_or(RegistrationValidationError::MissingFields)?;
        if password.chars().count() < PASSWORD_MIN_CHARS {
            return Err(RegistrationValidationError::PasswordTooShort {
                min: PASSWORD_MIN_CHARS,
            });
        }

        Ok(Self {
            name,
            email,
            password: Zeroizing::new(password.to_owned()),
            college: normalise_college(college),
        })
    }

    /// Requested display name.
    #[must_use]
    pub fn name(&self) -> &DisplayName {
        &self.name
    }

    /// Canonical email address.
    #[must_use]
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Raw password; only ever handed to the hasher.
    #[must_use]
    pub fn password(&self) -> &str {
        self.password.as_str()
    }

    /// Optional college affiliation.
    #[must_use]
    pub fn college(&self) -> Option<&str> {
        self.college.as_deref()
    }
}

/// Validated login credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: EmailAddress,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Validate raw login fields.
    pub fn try_from_parts(
        email: Option<&str>,
        password: Option<&str>,
    ) -> Result<Self, LoginValidationError> {
        let email = email
            .and_then(|raw| EmailAddress::new(raw).ok())
            .ok_or(LoginValidationError::MissingFields)?;
        let password = password
            .filter(|raw| !raw.is_empty())
            .ok_or(LoginValidationError::MissingFields)?;
        Ok(Self {
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Canonical email address used for the lookup.
    #[must_use]
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Raw password supplied by the caller.
    #[must_use]
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Encoded output of the password hasher. Opaque to the domain.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap an encoded hash produced by a [`PasswordHasher`](super::ports::PasswordHasher).
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// Borrow the encoded hash.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(..)")
    }
}

/// Identity carried by a verified bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    /// Subject of the token.
    pub user_id: UserId,
    /// Email the token was issued for.
    pub email: EmailAddress,
}

/// Signed bearer token handed to clients.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wrap an encoded token.
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// Borrow the encoded token.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(..)")
    }
}

/// Outcome of a successful registration or login.
#[derive(Debug, Clone)]
pub struct AuthSession {
    /// Freshly issued bearer token.
    pub token: AccessToken,
    /// Public view of the authenticated user.
    pub user: User,
}
