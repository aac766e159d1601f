//! Domain layer: entities, validated constructors, use-case services,
//! and the ports adapters implement.

pub mod accounts;
pub mod chat;
pub mod conversation;
pub mod error;
pub mod events;
pub mod ports;
pub mod schoolwork;
pub mod scores;
pub mod structured;
pub mod user;

pub use accounts::{AccountService, Credentials};
pub use chat::{ChatMessage, ChatSession, ClientSessionId, InlineImage, MessageRole};
pub use conversation::{AssistantService, ChatTurnInput, QuizInput, SchoolworkInput};
pub use error::{Error, ErrorCode};
pub use events::{CalendarEvent, EventDraft, EventKind, group_by_date, parse_event_date};
pub use schoolwork::{AnalysisDraft, SchoolworkAnalysis};
pub use scores::{Score, ScoreDraft, ScoreSummary};
pub use structured::QuizQuestion;
pub use user::{EmailAddress, Password, PasswordHash, User, UserId};
