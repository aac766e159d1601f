//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and
//! must never be exposed to the domain. They exist solely to satisfy
//! Diesel's type requirements for queries and mutations.

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{chat_messages, chat_sessions, events, schoolwork_analyses, scores, users};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for creating new user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub created_at: DateTime<Utc>,
}

/// Row struct for reading from the events table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = events)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct EventRow {
    pub id: i32,
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub kind: String,
    pub description: String,
    #[expect(dead_code, reason = "schema field kept for audit queries")]
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for creating new event records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = events)]
pub(crate) struct NewEventRow<'a> {
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub kind: &'a str,
    pub description: &'a str,
}

/// Row struct for reading from the chat_sessions table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = chat_sessions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ChatSessionRow {
    pub id: i32,
    pub user_id: Uuid,
    pub client_id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for creating new chat session records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = chat_sessions)]
pub(crate) struct NewChatSessionRow<'a> {
    pub user_id: Uuid,
    pub client_id: &'a str,
    pub title: &'a str,
}

/// Row struct for reading from the chat_messages table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = chat_messages)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ChatMessageRow {
    pub id: i32,
    pub session_id: i32,
    pub role: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for creating new chat message records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = chat_messages)]
pub(crate) struct NewChatMessageRow<'a> {
    pub session_id: i32,
    pub role: &'a str,
    pub content: &'a str,
}

/// Row struct for reading from the scores table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = scores)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ScoreRow {
    pub id: i32,
    pub user_id: Uuid,
    pub subject: String,
    pub score_value: i32,
    pub total: i32,
    pub recorded_at: DateTime<Utc>,
}

/// Insertable struct for recording new quiz results.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = scores)]
pub(crate) struct NewScoreRow<'a> {
    pub user_id: Uuid,
    pub subject: &'a str,
    pub score_value: i32,
    pub total: i32,
}

/// Row struct for reading from the schoolwork_analyses table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = schoolwork_analyses)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct SchoolworkAnalysisRow {
    pub id: i32,
    pub user_id: Uuid,
    pub kind: String,
    pub subject: String,
    pub topic: Option<String>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for persisting new analyses.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schoolwork_analyses)]
pub(crate) struct NewSchoolworkAnalysisRow<'a> {
    pub user_id: Uuid,
    pub kind: &'a str,
    pub subject: &'a str,
    pub topic: Option<&'a str>,
    pub content: &'a str,
}
