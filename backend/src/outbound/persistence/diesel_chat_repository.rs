//! PostgreSQL-backed `ChatRepository` implementation using Diesel.
//!
//! Sessions are keyed by `(user_id, client_id)`; messages order by
//! `created_at` with the serial id as tie-break so turns inserted in
//! the same instant keep their insertion order.

use std::collections::HashMap;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{ChatRepository, PersistenceError};
use crate::domain::{ChatMessage, ChatSession, ClientSessionId, MessageRole, UserId};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{ChatMessageRow, ChatSessionRow, NewChatMessageRow, NewChatSessionRow};
use super::pool::DbPool;
use super::schema::{chat_messages, chat_sessions};

/// Diesel-backed implementation of the `ChatRepository` port.
#[derive(Clone)]
pub struct DieselChatRepository {
    pool: DbPool,
}

impl DieselChatRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_session(row: ChatSessionRow) -> Result<ChatSession, PersistenceError> {
    let client_id = ClientSessionId::new(&row.client_id)
        .map_err(|err| PersistenceError::query(format!("stored session row is invalid: {err}")))?;
    Ok(ChatSession::new(
        row.id,
        UserId::from_uuid(row.user_id),
        client_id,
        row.title,
        row.created_at,
    ))
}

fn row_to_message(row: ChatMessageRow) -> Result<ChatMessage, PersistenceError> {
    let role: MessageRole = row
        .role
        .parse()
        .map_err(|_| PersistenceError::query("stored message role is invalid"))?;
    Ok(ChatMessage::new(
        row.id,
        row.session_id,
        role,
        row.content,
        row.created_at,
    ))
}

#[async_trait]
impl ChatRepository for DieselChatRepository {
    async fn find_session(
        &self,
        owner: &UserId,
        client_id: &ClientSessionId,
    ) -> Result<Option<ChatSession>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<ChatSessionRow> = chat_sessions::table
            .filter(chat_sessions::user_id.eq(owner.as_uuid()))
            .filter(chat_sessions::client_id.eq(client_id.as_str()))
            .select(ChatSessionRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_session).transpose()
    }

    async fn create_session(
        &self,
        owner: &UserId,
        client_id: &ClientSessionId,
        title: &str,
    ) -> Result<ChatSession, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: ChatSessionRow = diesel::insert_into(chat_sessions::table)
            .values(&NewChatSessionRow {
                user_id: *owner.as_uuid(),
                client_id: client_id.as_str(),
                title,
            })
            .returning(ChatSessionRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        row_to_session(row)
    }

    async fn append_message(
        &self,
        session_id: i32,
        role: MessageRole,
        content: &str,
    ) -> Result<ChatMessage, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: ChatMessageRow = diesel::insert_into(chat_messages::table)
            .values(&NewChatMessageRow {
                session_id,
                role: role.as_str(),
                content,
            })
            .returning(ChatMessageRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        row_to_message(row)
    }

    async fn recent_messages(
        &self,
        session_id: i32,
        limit: i64,
    ) -> Result<Vec<ChatMessage>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<ChatMessageRow> = chat_messages::table
            .filter(chat_messages::session_id.eq(session_id))
            .select(ChatMessageRow::as_select())
            .order_by((chat_messages::created_at.desc(), chat_messages::id.desc()))
            .limit(limit)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_message).collect()
    }

    async fn sessions_with_messages(
        &self,
        owner: &UserId,
    ) -> Result<Vec<(ChatSession, Vec<ChatMessage>)>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let session_rows: Vec<ChatSessionRow> = chat_sessions::table
            .filter(chat_sessions::user_id.eq(owner.as_uuid()))
            .select(ChatSessionRow::as_select())
            .order_by((chat_sessions::created_at.desc(), chat_sessions::id.desc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let session_ids: Vec<i32> = session_rows.iter().map(|row| row.id).collect();
        let message_rows: Vec<ChatMessageRow> = chat_messages::table
            .filter(chat_messages::session_id.eq_any(&session_ids))
            .select(ChatMessageRow::as_select())
            .order_by((chat_messages::created_at.asc(), chat_messages::id.asc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let mut by_session: HashMap<i32, Vec<ChatMessage>> = HashMap::new();
        for row in message_rows {
            let message = row_to_message(row)?;
            by_session.entry(message.session_id()).or_default().push(message);
        }

        session_rows
            .into_iter()
            .map(|row| {
                let messages = by_session.remove(&row.id).unwrap_or_default();
                row_to_session(row).map(|session| (session, messages))
            })
            .collect()
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
    #[case("user", MessageRole::User)]
    #[case("assistant", MessageRole::Assistant)]
    fn message_rows_convert_known_roles(#[case] stored: &str, #[case] expected: MessageRole) {
        let row = ChatMessageRow {
            id: 1,
            session_id: 2,
            role: stored.to_owned(),
            content: "hello".to_owned(),
            created_at: Utc::now(),
        };

        let message = row_to_message(row).expect("known role converts");
        assert_eq!(message.role(), expected);
    }

    #[rstest]
    fn unknown_roles_surface_as_query_errors() {
        let row = ChatMessageRow {
            id: 1,
            session_id: 2,
            role: "system".to_owned(),
            content: "hello".to_owned(),
            created_at: Utc::now(),
        };

        let err = row_to_message(row).expect_err("unknown role must fail");
        assert!(matches!(err, PersistenceError::Query { .. }));
    }

    #[rstest]
    fn blank_client_ids_surface_as_query_errors() {
        let row = ChatSessionRow {
            id: 1,
            user_id: Uuid::new_v4(),
            client_id: "  ".to_owned(),
            title: "Maths".to_owned(),
            created_at: Utc::now(),
        };

        let err = row_to_session(row).expect_err("blank client id must fail");
        assert!(matches!(err, PersistenceError::Query { .. }));
    }
}
