//! PostgreSQL-backed `UserRepository` implementation using Diesel.
//!
//! Translates between user rows and the domain's validated account
//! types; duplicate e-mail inserts surface as conflicts via the shared
//! error mapping.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{PersistenceError, UserRepository};
use crate::domain::{EmailAddress, PasswordHash, User, UserId};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{NewUserRow, UserRow};
use super::pool::DbPool;
use super::schema::users;

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_user(row: UserRow) -> Result<User, PersistenceError> {
    let email = EmailAddress::new(&row.email)
        .map_err(|err| PersistenceError::query(format!("stored user row is invalid: {err}")))?;
    let hash = PasswordHash::new(row.password_hash)
        .map_err(|err| PersistenceError::query(format!("stored user row is invalid: {err}")))?;
    Ok(User::new(
        UserId::from_uuid(row.id),
        email,
        hash,
        row.created_at,
    ))
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(&self, user: &User) -> Result<(), PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::insert_into(users::table)
            .values(&NewUserRow {
                id: *user.id().as_uuid(),
                email: user.email().as_str(),
                password_hash: user.password_hash().as_str(),
                created_at: user.created_at(),
            })
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .filter(users::email.eq(email.as_str()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_user).transpose()
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .filter(users::id.eq(id.as_uuid()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_user).transpose()
    }

    async fn update_password_hash(
        &self,
        id: &UserId,
        hash: &PasswordHash,
    ) -> Result<bool, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let updated = diesel::update(users::table.filter(users::id.eq(id.as_uuid())))
            .set(users::password_hash.eq(hash.as_str()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(updated > 0)
    }
}

#[cfg(test)]
mod tests {
    //! Coverage for row conversion; query paths run against a live
    //! database in the integration environment.
    use chrono::Utc;
    use rstest::rstest;
    use uuid::Uuid;

    use super::*;

    #[rstest]
    fn rows_convert_into_validated_users() {
        let row = UserRow {
            id: Uuid::new_v4(),
            email: "student@example.com".to_owned(),
            password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_owned(),
            created_at: Utc::now(),
        };

        let user = row_to_user(row.clone()).expect("valid row converts");
        assert_eq!(user.id().as_uuid(), &row.id);
        assert_eq!(user.email().as_str(), "student@example.com");
    }

    #[rstest]
    fn corrupt_rows_surface_as_query_errors() {
        let row = UserRow {
            id: Uuid::new_v4(),
            email: "not-an-address".to_owned(),
            password_hash: "hash".to_owned(),
            created_at: Utc::now(),
        };

        let err = row_to_user(row).expect_err("corrupt row must fail");
        assert!(matches!(err, PersistenceError::Query { .. }));
    }
}
