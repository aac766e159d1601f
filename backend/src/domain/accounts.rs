//! Account registration, credential verification, and password changes.
//!
//! Keep inbound payload parsing outside the domain by exposing a
//! credentials constructor that validates string inputs before a handler
//! talks to the service.

use std::sync::Arc;

use chrono::Utc;

use super::error::Error;
use super::ports::{CredentialHashError, PasswordHasher, PersistenceError, UserRepository};
use super::user::{EmailAddress, Password, User, UserId, UserValidationError};

/// Validated register/login credentials.
#[derive(Debug, Clone)]
pub struct Credentials {
    email: EmailAddress,
    password: Password,
}

impl Credentials {
    /// Construct credentials from raw e-mail/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, UserValidationError> {
        Ok(Self {
            email: EmailAddress::new(email)?,
            password: Password::new(password)?,
        })
    }

    /// Normalised e-mail address used for account lookups.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Clear-text password provided by the caller.
    pub fn password(&self) -> &Password {
        &self.password
    }
}

/// Use-case service around the credential store.
#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserRepository>,
    passwords: Arc<dyn PasswordHasher>,
}

fn map_persistence_error(error: PersistenceError) -> Error {
    Error::internal(error.to_string())
}

fn map_hash_error(error: CredentialHashError) -> Error {
    Error::internal(error.to_string())
}

impl AccountService {
    /// Create a service over the given repository and hasher.
    pub fn new(users: Arc<dyn UserRepository>, passwords: Arc<dyn PasswordHasher>) -> Self {
        Self { users, passwords }
    }

    /// Register a new account, hashing the password before it is stored.
    ///
    /// The e-mail uniqueness check runs first for a friendly error; the
    /// repository's conflict variant still covers the race where two
    /// registrations interleave.
    pub async fn register(&self, credentials: &Credentials) -> Result<User, Error> {
        let existing = self
            .users
            .find_by_email(credentials.email())
            .await
            .map_err(map_persistence_error)?;
        if existing.is_some() {
            return Err(Error::duplicate_user("User already exists"));
        }

        let hash = self
            .passwords
            .hash(credentials.password())
            .map_err(map_hash_error)?;
        let user = User::new(
            UserId::generate(),
            credentials.email().clone(),
            hash,
            Utc::now(),
        );
        match self.users.insert(&user).await {
            Ok(()) => Ok(user),
            Err(PersistenceError::Conflict { .. }) => {
                Err(Error::duplicate_user("User already exists"))
            }
            Err(other) => Err(map_persistence_error(other)),
        }
    }

    /// Verify login credentials and return the matching account.
    ///
    /// A missing account and a wrong password are indistinguishable to
    /// the caller.
    pub async fn verify(&self, credentials: &Credentials) -> Result<User, Error> {
        let user = self
            .users
            .find_by_email(credentials.email())
            .await
            .map_err(map_persistence_error)?
            .ok_or_else(|| Error::unauthorized("Invalid credentials"))?;

        let matches = self
            .passwords
            .verify(credentials.password(), user.password_hash())
            .map_err(map_hash_error)?;
        if matches {
            Ok(user)
        } else {
            Err(Error::unauthorized("Invalid credentials"))
        }
    }

    /// Fetch an account by id for profile reads.
    pub async fn fetch(&self, id: &UserId) -> Result<User, Error> {
        self.users
            .find_by_id(id)
            .await
            .map_err(map_persistence_error)?
            .ok_or_else(|| Error::not_found("User not found"))
    }

    /// Replace an account's password.
    pub async fn change_password(&self, id: &UserId, password: &Password) -> Result<(), Error> {
        let hash = self.passwords.hash(password).map_err(map_hash_error)?;
        let replaced = self
            .users
            .update_password_hash(id, &hash)
            .await
            .map_err(map_persistence_error)?;
        if replaced {
            Ok(())
        } else {
            Err(Error::not_found("User not found"))
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for account flows over stubbed ports.
    use std::sync::Mutex;

    use async_trait::async_trait;
    use rstest::rstest;

    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::user::PasswordHash;

    #[derive(Default)]
    struct StubUserRepository {
        state: Mutex<StubState>,
    }

    #[derive(Default)]
    struct StubState {
        users: Vec<User>,
        fail_queries: bool,
    }

    impl StubUserRepository {
        fn with_user(user: User) -> Self {
            Self {
                state: Mutex::new(StubState {
                    users: vec![user],
                    fail_queries: false,
                }),
            }
        }

        fn failing() -> Self {
            Self {
                state: Mutex::new(StubState {
                    users: Vec::new(),
                    fail_queries: true,
                }),
            }
        }

        fn stored(&self) -> Vec<User> {
            self.state.lock().expect("state lock").users.clone()
        }
    }

    #[async_trait]
    impl UserRepository for StubUserRepository {
        async fn insert(&self, user: &User) -> Result<(), PersistenceError> {
            let mut state = self.state.lock().expect("state lock");
            if state.fail_queries {
                return Err(PersistenceError::query("insert failed"));
            }
            if state.users.iter().any(|u| u.email() == user.email()) {
                return Err(PersistenceError::conflict("duplicate e-mail"));
            }
            state.users.push(user.clone());
            Ok(())
        }

        async fn find_by_email(
            &self,
            email: &EmailAddress,
        ) -> Result<Option<User>, PersistenceError> {
            let state = self.state.lock().expect("state lock");
            if state.fail_queries {
                return Err(PersistenceError::connection("database unavailable"));
            }
            Ok(state.users.iter().find(|u| u.email() == email).cloned())
        }

        async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, PersistenceError> {
            let state = self.state.lock().expect("state lock");
            Ok(state.users.iter().find(|u| u.id() == id).cloned())
        }

        async fn update_password_hash(
            &self,
            id: &UserId,
            hash: &PasswordHash,
        ) -> Result<bool, PersistenceError> {
            let mut state = self.state.lock().expect("state lock");
            match state.users.iter_mut().find(|u| u.id() == id) {
                Some(user) => {
                    *user = User::new(
                        user.id().clone(),
                        user.email().clone(),
                        hash.clone(),
                        user.created_at(),
                    );
                    Ok(true)
                }
                None => Ok(false),
            }
        }
    }

    /// Deterministic hasher: prefixes the clear text, so hashes are easy
    /// to assert against.
    struct StubHasher;

    impl PasswordHasher for StubHasher {
        fn hash(&self, password: &Password) -> Result<PasswordHash, CredentialHashError> {
            let text = String::from_utf8_lossy(password.as_bytes());
            PasswordHash::new(format!("hashed:{text}"))
                .map_err(|err| CredentialHashError::hashing(err.to_string()))
        }

        fn verify(
            &self,
            password: &Password,
            hash: &PasswordHash,
        ) -> Result<bool, CredentialHashError> {
            let text = String::from_utf8_lossy(password.as_bytes());
            Ok(hash.as_str() == format!("hashed:{text}"))
        }
    }

    fn service(repo: Arc<StubUserRepository>) -> AccountService {
        AccountService::new(repo, Arc::new(StubHasher))
    }

    fn creds(email: &str, password: &str) -> Credentials {
        Credentials::try_from_parts(email, password).expect("valid credentials")
    }

    #[tokio::test]
    async fn register_stores_hash_never_clear_text() {
        let repo = Arc::new(StubUserRepository::default());
        let user = service(repo.clone())
            .register(&creds("a@x.com", "pw"))
            .await
            .expect("registration succeeds");

        assert_eq!(user.email().as_str(), "a@x.com");
        let stored = repo.stored();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].password_hash().as_str(), "hashed:pw");
    }

    #[tokio::test]
    async fn second_registration_of_same_email_is_a_duplicate() {
        let repo = Arc::new(StubUserRepository::default());
        let svc = service(repo);
        svc.register(&creds("a@x.com", "pw"))
            .await
            .expect("first registration succeeds");

        let err = svc
            .register(&creds("a@x.com", "other"))
            .await
            .expect_err("second registration must fail");
        assert_eq!(err.code(), ErrorCode::DuplicateUser);
    }

    #[tokio::test]
    async fn verify_accepts_matching_credentials() {
        let repo = Arc::new(StubUserRepository::default());
        let svc = service(repo);
        let registered = svc
            .register(&creds("a@x.com", "pw"))
            .await
            .expect("registration succeeds");

        let verified = svc
            .verify(&creds("a@x.com", "pw"))
            .await
            .expect("matching credentials verify");
        assert_eq!(verified.id(), registered.id());
    }

    #[rstest]
    #[case("a@x.com", "wrong")]
    #[case("nobody@x.com", "pw")]
    #[tokio::test]
    async fn verify_rejects_bad_credentials(#[case] email: &str, #[case] password: &str) {
        let repo = Arc::new(StubUserRepository::default());
        let svc = service(repo);
        svc.register(&creds("a@x.com", "pw"))
            .await
            .expect("registration succeeds");

        let err = svc
            .verify(&creds(email, password))
            .await
            .expect_err("bad credentials must fail");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
    }

    #[tokio::test]
    async fn change_password_for_missing_user_is_not_found() {
        let repo = Arc::new(StubUserRepository::default());
        let err = service(repo)
            .change_password(&UserId::generate(), &Password::new("new").expect("valid"))
            .await
            .expect_err("missing user must fail");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn change_password_replaces_the_stored_hash() {
        let repo = Arc::new(StubUserRepository::default());
        let svc = service(repo.clone());
        let user = svc
            .register(&creds("a@x.com", "old"))
            .await
            .expect("registration succeeds");

        svc.change_password(user.id(), &Password::new("new").expect("valid"))
            .await
            .expect("password change succeeds");
        assert_eq!(repo.stored()[0].password_hash().as_str(), "hashed:new");
    }

    #[tokio::test]
    async fn repository_failures_surface_as_internal_errors() {
        let repo = Arc::new(StubUserRepository::failing());
        let err = service(repo)
            .register(&creds("a@x.com", "pw"))
            .await
            .expect_err("failing repository must surface");
        assert_eq!(err.code(), ErrorCode::InternalError);
    }

    #[rstest]
    fn fetch_is_used_by_profile_reads() {
        let user = User::new(
            UserId::generate(),
            EmailAddress::new("a@x.com").expect("valid"),
            PasswordHash::new("hashed:pw").expect("valid"),
            Utc::now(),
        );
        let repo = Arc::new(StubUserRepository::with_user(user.clone()));

        actix_rt::System::new().block_on(async move {
            let fetched = service(repo).fetch(user.id()).await.expect("user exists");
            assert_eq!(fetched.email().as_str(), "a@x.com");
        });
    }
}
