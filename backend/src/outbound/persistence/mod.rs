//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the domain repository ports backed by
//! PostgreSQL via `diesel-async` with `bb8` connection pooling.
//!
//! The adapters stay thin: they translate between Diesel rows
//! (`models.rs`, `schema.rs` — internal implementation details) and
//! domain types, and map database failures onto the persistence port's
//! error variants. No business logic lives here.

mod diesel_chat_repository;
mod diesel_error_mapping;
mod diesel_event_repository;
mod diesel_schoolwork_repository;
mod diesel_score_repository;
mod diesel_user_repository;
mod models;
mod pool;
mod schema;

pub use diesel_chat_repository::DieselChatRepository;
pub use diesel_event_repository::DieselEventRepository;
pub use diesel_schoolwork_repository::DieselSchoolworkRepository;
pub use diesel_score_repository::DieselScoreRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
