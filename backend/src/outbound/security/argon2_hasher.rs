//! Argon2id implementation of the password-hashing port.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash as PhcString, SaltString};
use argon2::{Argon2, PasswordHasher as _, PasswordVerifier as _};

use crate::domain::ports::{CredentialHashError, PasswordHasher};
use crate::domain::{Password, PasswordHash};

/// Hashes passwords with Argon2id under the crate's default parameters,
/// emitting PHC-format strings that embed salt and parameters.
#[derive(Clone, Default)]
pub struct Argon2PasswordHasher {
    argon: Argon2<'static>,
}

impl Argon2PasswordHasher {
    /// Create a hasher with the default Argon2id parameters.
    pub fn new() -> Self {
        Self::default()
    }
}

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, password: &Password) -> Result<PasswordHash, CredentialHashError> {
        let salt = SaltString::generate(&mut OsRng);
        let encoded = self
            .argon
            .hash_password(password.as_bytes(), &salt)
            .map_err(|err| CredentialHashError::hashing(err.to_string()))?;
        PasswordHash::new(encoded.to_string())
            .map_err(|err| CredentialHashError::hashing(err.to_string()))
    }

    fn verify(
        &self,
        password: &Password,
        hash: &PasswordHash,
    ) -> Result<bool, CredentialHashError> {
        let parsed = PhcString::new(hash.as_str())
            .map_err(|err| CredentialHashError::hashing(err.to_string()))?;
        Ok(self
            .argon
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}
