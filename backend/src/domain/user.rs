//! User identity and credential value types.
//!
//! Constructors validate raw strings at the boundary so repositories and
//! services only ever see well-formed values.

use std::fmt;

use chrono::{DateTime, Utc};
use uuid::Uuid;
use zeroize::Zeroizing;

/// Validation errors for user value types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    /// The user id is not a valid UUID.
    #[error("user id must be a valid UUID")]
    InvalidId,
    /// The e-mail address is blank or structurally invalid.
    #[error("e-mail address must contain a local part and a domain")]
    InvalidEmail,
    /// The password is empty.
    #[error("password must not be empty")]
    EmptyPassword,
    /// The stored password hash is blank.
    #[error("password hash must not be empty")]
    EmptyPasswordHash,
}

/// Opaque identifier for a registered user.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserId(Uuid);

impl UserId {
    /// Parse an id from its canonical string form.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        Uuid::parse_str(raw.as_ref())
            .map(Self)
            .map_err(|_| UserValidationError::InvalidId)
    }

    /// Wrap an already-parsed UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Mint a fresh random identifier for a new account.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Borrow the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validated, lower-cased e-mail address.
///
/// ## Invariants
/// - trimmed, non-empty, and contains exactly one `@` with text on both
///   sides.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Normalise and validate a raw address.
    ///
    /// # Examples
    /// ```
    /// use backend::domain::EmailAddress;
    ///
    /// let email = EmailAddress::new("  Student@Example.COM ").unwrap();
    /// assert_eq!(email.as_str(), "student@example.com");
    /// ```
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let normalised = raw.as_ref().trim().to_lowercase();
        let mut parts = normalised.split('@');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(local), Some(domain), None) if !local.is_empty() && !domain.is_empty() => {
                Ok(Self(normalised))
            }
            _ => Err(UserValidationError::InvalidEmail),
        }
    }

    /// Borrow the normalised address.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller-supplied clear-text password, zeroised on drop.
#[derive(Clone)]
pub struct Password(Zeroizing<String>);

impl Password {
    /// Accept a non-empty password. Whitespace is preserved so credential
    /// comparisons never surprise the caller.
    pub fn new(raw: impl Into<String>) -> Result<Self, UserValidationError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(UserValidationError::EmptyPassword);
        }
        Ok(Self(Zeroizing::new(raw)))
    }

    /// Borrow the clear-text bytes for hashing or verification.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(<redacted>)")
    }
}

/// One-way password hash in PHC string format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap a hash string produced by the hashing adapter.
    pub fn new(raw: impl Into<String>) -> Result<Self, UserValidationError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(UserValidationError::EmptyPasswordHash);
        }
        Ok(Self(raw))
    }

    /// Borrow the encoded hash.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// A registered user account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    email: EmailAddress,
    password_hash: PasswordHash,
    created_at: DateTime<Utc>,
}

impl User {
    /// Assemble a user from already-validated parts.
    pub fn new(
        id: UserId,
        email: EmailAddress,
        password_hash: PasswordHash,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            email,
            password_hash,
            created_at,
        }
    }

    /// Account identifier.
    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// Normalised e-mail address.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Stored password hash.
    pub fn password_hash(&self) -> &PasswordHash {
        &self.password_hash
    }

    /// Registration timestamp.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("no-at-sign")]
    #[case("@missing-local")]
    #[case("missing-domain@")]
    #[case("two@at@signs")]
    fn email_rejects_malformed_input(#[case] raw: &str) {
        let err = EmailAddress::new(raw).expect_err("malformed address must fail");
        assert_eq!(err, UserValidationError::InvalidEmail);
    }

    #[rstest]
    fn email_normalises_case_and_whitespace() {
        let email = EmailAddress::new(" A@X.Com ").expect("valid address");
        assert_eq!(email.as_str(), "a@x.com");
    }

    #[rstest]
    fn user_id_round_trips_through_string_form() {
        let id = UserId::generate();
        let reparsed = UserId::new(id.to_string()).expect("canonical form parses");
        assert_eq!(id, reparsed);
    }

    #[rstest]
    fn password_rejects_empty_and_redacts_debug() {
        assert_eq!(
            Password::new("").expect_err("empty password must fail"),
            UserValidationError::EmptyPassword
        );
        let password = Password::new("hunter2").expect("valid password");
        assert_eq!(format!("{password:?}"), "Password(<redacted>)");
    }
}
