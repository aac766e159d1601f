//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the migrations exactly; regenerate with
//! `diesel print-schema` after a migration changes the schema.

diesel::table! {
    /// Registered user accounts.
    users (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Normalised, unique e-mail address.
        email -> Varchar,
        /// Argon2id hash in PHC string format.
        password_hash -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Calendar events, one owner each.
    events (id) {
        id -> Int4,
        user_id -> Uuid,
        date -> Date,
        /// One of `homework`, `test`, `project`.
        kind -> Varchar,
        description -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Chat sessions; `(user_id, client_id)` is unique.
    chat_sessions (id) {
        id -> Int4,
        user_id -> Uuid,
        /// Session id chosen by the client.
        client_id -> Varchar,
        title -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Chat turns, ordered by `created_at` within a session.
    chat_messages (id) {
        id -> Int4,
        session_id -> Int4,
        /// `user` or `assistant`.
        role -> Varchar,
        content -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Recorded quiz results.
    scores (id) {
        id -> Int4,
        user_id -> Uuid,
        subject -> Varchar,
        score_value -> Int4,
        total -> Int4,
        recorded_at -> Timestamptz,
    }
}

diesel::table! {
    /// Persisted schoolwork analyses.
    schoolwork_analyses (id) {
        id -> Int4,
        user_id -> Uuid,
        kind -> Varchar,
        subject -> Varchar,
        topic -> Nullable<Varchar>,
        content -> Text,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(events -> users (user_id));
diesel::joinable!(chat_sessions -> users (user_id));
diesel::joinable!(chat_messages -> chat_sessions (session_id));
diesel::joinable!(scores -> users (user_id));
diesel::joinable!(schoolwork_analyses -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    events,
    chat_sessions,
    chat_messages,
    scores,
    schoolwork_analyses,
);
