//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data`, so they only
//! depend on domain ports and use-case services and stay testable
//! without real I/O. Everything here is built once at startup and never
//! mutated afterwards.

use std::sync::Arc;

use crate::domain::ports::{
    AssistantGateway, ChatRepository, EventRepository, PasswordHasher, SchoolworkRepository,
    ScoreRepository, TokenService, UserRepository,
};
use crate::domain::{AccountService, AssistantService};

/// Parameter object bundling every port implementation the HTTP layer
/// needs.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub users: Arc<dyn UserRepository>,
    pub events: Arc<dyn EventRepository>,
    pub chat: Arc<dyn ChatRepository>,
    pub scores: Arc<dyn ScoreRepository>,
    pub schoolwork: Arc<dyn SchoolworkRepository>,
    pub assistant: Arc<dyn AssistantGateway>,
    pub passwords: Arc<dyn PasswordHasher>,
    pub tokens: Arc<dyn TokenService>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub accounts: AccountService,
    pub tutor: AssistantService,
    pub events: Arc<dyn EventRepository>,
    pub chat: Arc<dyn ChatRepository>,
    pub scores: Arc<dyn ScoreRepository>,
    pub schoolwork: Arc<dyn SchoolworkRepository>,
    pub tokens: Arc<dyn TokenService>,
}

impl HttpState {
    /// Wire the use-case services from a ports bundle.
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            users,
            events,
            chat,
            scores,
            schoolwork,
            assistant,
            passwords,
            tokens,
        } = ports;
        let accounts = AccountService::new(users, passwords);
        let tutor = AssistantService::new(
            chat.clone(),
            events.clone(),
            schoolwork.clone(),
            assistant,
        );
        Self {
            accounts,
            tutor,
            events,
            chat,
            scores,
            schoolwork,
            tokens,
        }
    }
}
