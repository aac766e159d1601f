//! Domain ports defining the edges of the hexagon.
//!
//! Ports describe how the domain expects to interact with driven adapters
//! (the database, the generative model, credential hashing, token
//! signing). Each trait exposes strongly typed errors so adapters map
//! their failures into predictable variants.

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use super::chat::{ChatMessage, ChatSession, ClientSessionId, InlineImage, MessageRole};
use super::events::{CalendarEvent, EventDraft};
use super::schoolwork::{AnalysisDraft, SchoolworkAnalysis};
use super::scores::{Score, ScoreDraft};
use super::user::{EmailAddress, Password, PasswordHash, User, UserId};

/// Errors surfaced by persistence adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersistenceError {
    /// Connection could not be established or was lost mid-operation.
    #[error("repository connection failed: {message}")]
    Connection { message: String },
    /// Query or mutation failed during execution; the transaction is
    /// rolled back by the adapter.
    #[error("repository query failed: {message}")]
    Query { message: String },
    /// A uniqueness constraint rejected the write.
    #[error("repository conflict: {message}")]
    Conflict { message: String },
}

impl From<PersistenceError> for super::error::Error {
    fn from(error: PersistenceError) -> Self {
        Self::internal(error.to_string())
    }
}

impl PersistenceError {
    /// Helper for connection oriented failures.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Helper for query failures.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    /// Helper for uniqueness conflicts.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }
}

/// Errors surfaced by the generative-model adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssistantGatewayError {
    /// The model endpoint could not be reached.
    #[error("model transport failed: {message}")]
    Transport { message: String },
    /// The model endpoint answered with a non-success status.
    #[error("model returned status {status}: {message}")]
    Status { status: u16, message: String },
    /// The model's envelope could not be decoded into a reply.
    #[error("model reply could not be decoded: {message}")]
    Decode { message: String },
}

impl AssistantGatewayError {
    /// Helper for transport-level failures.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Helper for non-success HTTP statuses.
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            message: message.into(),
        }
    }

    /// Helper for envelope decode failures.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }
}

/// Errors surfaced by the password-hashing adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialHashError {
    /// The hash could not be produced or parsed.
    #[error("password hashing failed: {message}")]
    Hashing { message: String },
}

impl CredentialHashError {
    /// Helper for hashing failures.
    pub fn hashing(message: impl Into<String>) -> Self {
        Self::Hashing {
            message: message.into(),
        }
    }
}

/// Errors surfaced by the token-signing adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// The presented token is missing, malformed, expired, or carries a
    /// bad signature.
    #[error("token is invalid or expired")]
    Invalid,
    /// A token could not be minted.
    #[error("token issuance failed: {message}")]
    Issuance { message: String },
}

impl TokenError {
    /// Helper for issuance failures.
    pub fn issuance(message: impl Into<String>) -> Self {
        Self::Issuance {
            message: message.into(),
        }
    }
}

/// Persistence port for user accounts.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new account. Duplicate e-mail addresses surface as
    /// [`PersistenceError::Conflict`].
    async fn insert(&self, user: &User) -> Result<(), PersistenceError>;

    /// Fetch an account by normalised e-mail address.
    async fn find_by_email(&self, email: &EmailAddress)
    -> Result<Option<User>, PersistenceError>;

    /// Fetch an account by id.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, PersistenceError>;

    /// Replace an account's password hash. Returns `false` when no such
    /// account exists.
    async fn update_password_hash(
        &self,
        id: &UserId,
        hash: &PasswordHash,
    ) -> Result<bool, PersistenceError>;
}

/// Persistence port for calendar events. Every operation is scoped to
/// the owning user.
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Insert an event for the owner and return it with its assigned id.
    async fn insert(
        &self,
        owner: &UserId,
        draft: &EventDraft,
    ) -> Result<CalendarEvent, PersistenceError>;

    /// List all of the owner's events, dates ascending.
    async fn list_for_owner(&self, owner: &UserId) -> Result<Vec<CalendarEvent>, PersistenceError>;

    /// Delete the owner's events matching the exact (date, description)
    /// pair. Returns how many rows went away.
    async fn delete_matching(
        &self,
        owner: &UserId,
        date: NaiveDate,
        description: &str,
    ) -> Result<usize, PersistenceError>;
}

/// Persistence port for chat sessions and messages.
#[async_trait]
pub trait ChatRepository: Send + Sync {
    /// Fetch the owner's session with the given client id, if any.
    async fn find_session(
        &self,
        owner: &UserId,
        client_id: &ClientSessionId,
    ) -> Result<Option<ChatSession>, PersistenceError>;

    /// Create a session for the owner under the given client id.
    async fn create_session(
        &self,
        owner: &UserId,
        client_id: &ClientSessionId,
        title: &str,
    ) -> Result<ChatSession, PersistenceError>;

    /// Append a message to a session and return it with its assigned id.
    async fn append_message(
        &self,
        session_id: i32,
        role: MessageRole,
        content: &str,
    ) -> Result<ChatMessage, PersistenceError>;

    /// Load a session's most recent messages, newest first.
    async fn recent_messages(
        &self,
        session_id: i32,
        limit: i64,
    ) -> Result<Vec<ChatMessage>, PersistenceError>;

    /// Load all of the owner's sessions, newest first, each with its
    /// messages oldest first.
    async fn sessions_with_messages(
        &self,
        owner: &UserId,
    ) -> Result<Vec<(ChatSession, Vec<ChatMessage>)>, PersistenceError>;
}

/// Persistence port for quiz scores.
#[async_trait]
pub trait ScoreRepository: Send + Sync {
    /// Record a quiz result for the owner.
    async fn insert(&self, owner: &UserId, draft: &ScoreDraft) -> Result<Score, PersistenceError>;

    /// List the owner's results, newest first.
    async fn list_for_owner(&self, owner: &UserId) -> Result<Vec<Score>, PersistenceError>;
}

/// Persistence port for schoolwork analyses.
#[async_trait]
pub trait SchoolworkRepository: Send + Sync {
    /// Persist an analysis for the owner.
    async fn insert(
        &self,
        owner: &UserId,
        draft: &AnalysisDraft,
    ) -> Result<SchoolworkAnalysis, PersistenceError>;

    /// List the owner's most recent analyses, newest first.
    async fn list_recent(
        &self,
        owner: &UserId,
        limit: i64,
    ) -> Result<Vec<SchoolworkAnalysis>, PersistenceError>;

    /// Fetch one of the owner's analyses by id.
    async fn find_by_id(
        &self,
        owner: &UserId,
        id: i32,
    ) -> Result<Option<SchoolworkAnalysis>, PersistenceError>;
}

/// Role vocabulary of the generative model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssistantRole {
    /// The student's side of the conversation.
    User,
    /// The model's side of the conversation.
    Model,
}

/// One part of a model turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssistantPart {
    /// Plain text content.
    Text(String),
    /// An inline image.
    Image(InlineImage),
}

/// One turn in the conversation shipped to the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistantTurn {
    pub role: AssistantRole,
    pub parts: Vec<AssistantPart>,
}

impl AssistantTurn {
    /// A single-part text turn.
    pub fn text(role: AssistantRole, content: impl Into<String>) -> Self {
        Self {
            role,
            parts: vec![AssistantPart::Text(content.into())],
        }
    }
}

/// A fully assembled model invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistantRequest {
    /// Fixed behavioural instruction, when the endpoint carries one.
    pub system_instruction: Option<String>,
    /// Prior turns plus the current one, oldest first.
    pub turns: Vec<AssistantTurn>,
    /// Whether the model is asked to answer with a JSON document.
    pub expect_json: bool,
}

/// Port for the external generative model.
#[async_trait]
pub trait AssistantGateway: Send + Sync {
    /// Send the assembled request and return the reply text.
    async fn generate(&self, request: &AssistantRequest)
    -> Result<String, AssistantGatewayError>;
}

/// Port for one-way password hashing.
pub trait PasswordHasher: Send + Sync {
    /// Hash a clear-text password with a fresh salt.
    fn hash(&self, password: &Password) -> Result<PasswordHash, CredentialHashError>;

    /// Check a clear-text password against a stored hash.
    fn verify(&self, password: &Password, hash: &PasswordHash)
    -> Result<bool, CredentialHashError>;
}

/// Port for issuing and verifying bearer tokens.
pub trait TokenService: Send + Sync {
    /// Mint a signed token carrying the user's identity.
    fn issue(&self, user: &UserId) -> Result<String, TokenError>;

    /// Verify a presented token and extract the identity it carries.
    fn verify(&self, token: &str) -> Result<UserId, TokenError>;
}
