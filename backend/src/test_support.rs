//! Test utilities for the backend crate.
//!
//! Shared helpers for both unit tests (in `src/`) and integration tests
//! (in `tests/`): in-memory implementations of every persistence port, a
//! scripted model gateway, and a [`TestApp`] harness that drives the
//! real routing table. Hashing and token signing use the production
//! adapters so authentication behaves exactly as deployed.

use std::sync::{Arc, Mutex};

use actix_web::dev::ServiceResponse;
use actix_web::http::header;
use actix_web::{App, test, web};
use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};
use serde_json::json;

use crate::domain::ports::{
    AssistantGateway, AssistantGatewayError, AssistantRequest, ChatRepository, EventRepository,
    PersistenceError, SchoolworkRepository, ScoreRepository, UserRepository,
};
use crate::domain::{
    AnalysisDraft, CalendarEvent, ChatMessage, ChatSession, ClientSessionId, EmailAddress,
    EventDraft, MessageRole, PasswordHash, SchoolworkAnalysis, Score, ScoreDraft, User, UserId,
};
use crate::inbound::http::configure;
use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::outbound::security::{Argon2PasswordHasher, JwtTokenService};

const TEST_SIGNING_KEY: &[u8] = b"test-signing-key";

/// Mint a token exactly as the login handler would.
pub fn issue_test_token(state: &HttpState, user: &UserId) -> String {
    state.tokens.issue(user).expect("test token issuance")
}

#[derive(Default)]
struct InMemoryUserRepository {
    state: Mutex<Vec<User>>,
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, user: &User) -> Result<(), PersistenceError> {
        let mut users = self.state.lock().expect("state lock");
        if users.iter().any(|u| u.email() == user.email()) {
            return Err(PersistenceError::conflict("duplicate e-mail"));
        }
        users.push(user.clone());
        Ok(())
    }

    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>, PersistenceError> {
        let users = self.state.lock().expect("state lock");
        Ok(users.iter().find(|u| u.email() == email).cloned())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, PersistenceError> {
        let users = self.state.lock().expect("state lock");
        Ok(users.iter().find(|u| u.id() == id).cloned())
    }

    async fn update_password_hash(
        &self,
        id: &UserId,
        hash: &PasswordHash,
    ) -> Result<bool, PersistenceError> {
        let mut users = self.state.lock().expect("state lock");
        match users.iter_mut().find(|u| u.id() == id) {
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

#[derive(Default)]
struct EventState {
    events: Vec<CalendarEvent>,
    next_id: i32,
}

#[derive(Default)]
struct InMemoryEventRepository {
    state: Mutex<EventState>,
}

#[async_trait]
impl EventRepository for InMemoryEventRepository {
    async fn insert(
        &self,
        owner: &UserId,
        draft: &EventDraft,
    ) -> Result<CalendarEvent, PersistenceError> {
        let mut state = self.state.lock().expect("state lock");
        state.next_id += 1;
        let event = CalendarEvent::new(
            state.next_id,
            owner.clone(),
            draft.date(),
            draft.kind(),
            draft.description().to_owned(),
        );
        state.events.push(event.clone());
        Ok(event)
    }

    async fn list_for_owner(&self, owner: &UserId) -> Result<Vec<CalendarEvent>, PersistenceError> {
        let state = self.state.lock().expect("state lock");
        let mut events: Vec<CalendarEvent> = state
            .events
            .iter()
            .filter(|e| e.owner() == owner)
            .cloned()
            .collect();
        events.sort_by_key(|e| (e.date(), e.id()));
        Ok(events)
    }

    async fn delete_matching(
        &self,
        owner: &UserId,
        date: NaiveDate,
        description: &str,
    ) -> Result<usize, PersistenceError> {
        let mut state = self.state.lock().expect("state lock");
        let before = state.events.len();
        state.events.retain(|e| {
            !(e.owner() == owner && e.date() == date && e.description() == description)
        });
        Ok(before - state.events.len())
    }
}

#[derive(Default)]
struct ChatState {
    sessions: Vec<ChatSession>,
    messages: Vec<ChatMessage>,
    next_session_id: i32,
    next_message_id: i32,
}

#[derive(Default)]
struct InMemoryChatRepository {
    state: Mutex<ChatState>,
}

#[async_trait]
impl ChatRepository for InMemoryChatRepository {
    async fn find_session(
        &self,
        owner: &UserId,
        client_id: &ClientSessionId,
    ) -> Result<Option<ChatSession>, PersistenceError> {
        let state = self.state.lock().expect("state lock");
        Ok(state
            .sessions
            .iter()
            .find(|s| s.owner() == owner && s.client_id() == client_id)
            .cloned())
    }

    async fn create_session(
        &self,
        owner: &UserId,
        client_id: &ClientSessionId,
        title: &str,
    ) -> Result<ChatSession, PersistenceError> {
        let mut state = self.state.lock().expect("state lock");
        state.next_session_id += 1;
        let session = ChatSession::new(
            state.next_session_id,
            owner.clone(),
            client_id.clone(),
            title.to_owned(),
            Utc::now(),
        );
        state.sessions.push(session.clone());
        Ok(session)
    }

    async fn append_message(
        &self,
        session_id: i32,
        role: MessageRole,
        content: &str,
    ) -> Result<ChatMessage, PersistenceError> {
        let mut state = self.state.lock().expect("state lock");
        state.next_message_id += 1;
        // Millisecond offsets keep same-instant inserts ordered.
        let sequence = i64::from(state.next_message_id);
        let message = ChatMessage::new(
            state.next_message_id,
            session_id,
            role,
            content.to_owned(),
            Utc::now() + Duration::milliseconds(sequence),
        );
        state.messages.push(message.clone());
        Ok(message)
    }

    async fn recent_messages(
        &self,
        session_id: i32,
        limit: i64,
    ) -> Result<Vec<ChatMessage>, PersistenceError> {
        let state = self.state.lock().expect("state lock");
        let mut messages: Vec<ChatMessage> = state
            .messages
            .iter()
            .filter(|m| m.session_id() == session_id)
            .cloned()
            .collect();
        messages.sort_by_key(|m| std::cmp::Reverse(m.id()));
        messages.truncate(usize::try_from(limit).expect("small limit"));
        Ok(messages)
    }

    async fn sessions_with_messages(
        &self,
        owner: &UserId,
    ) -> Result<Vec<(ChatSession, Vec<ChatMessage>)>, PersistenceError> {
        let state = self.state.lock().expect("state lock");
        let mut sessions: Vec<ChatSession> = state
            .sessions
            .iter()
            .filter(|s| s.owner() == owner)
            .cloned()
            .collect();
        sessions.sort_by_key(|s| std::cmp::Reverse(s.id()));
        Ok(sessions
            .into_iter()
            .map(|session| {
                let messages = state
                    .messages
                    .iter()
                    .filter(|m| m.session_id() == session.id())
                    .cloned()
                    .collect();
                (session, messages)
            })
            .collect())
    }
}

#[derive(Default)]
struct ScoreState {
    scores: Vec<Score>,
    next_id: i32,
}

#[derive(Default)]
struct InMemoryScoreRepository {
    state: Mutex<ScoreState>,
}

#[async_trait]
impl ScoreRepository for InMemoryScoreRepository {
    async fn insert(&self, owner: &UserId, draft: &ScoreDraft) -> Result<Score, PersistenceError> {
        let mut state = self.state.lock().expect("state lock");
        state.next_id += 1;
        let score = Score::new(
            state.next_id,
            owner.clone(),
            draft.subject().to_owned(),
            draft.score_value(),
            draft.total(),
            Utc::now(),
        );
        state.scores.push(score.clone());
        Ok(score)
    }

    async fn list_for_owner(&self, owner: &UserId) -> Result<Vec<Score>, PersistenceError> {
        let state = self.state.lock().expect("state lock");
        let mut scores: Vec<Score> = state
            .scores
            .iter()
            .filter(|s| s.owner() == owner)
            .cloned()
            .collect();
        scores.sort_by_key(|s| std::cmp::Reverse(s.id()));
        Ok(scores)
    }
}

#[derive(Default)]
struct SchoolworkState {
    analyses: Vec<SchoolworkAnalysis>,
    next_id: i32,
}

#[derive(Default)]
struct InMemorySchoolworkRepository {
    state: Mutex<SchoolworkState>,
}

#[async_trait]
impl SchoolworkRepository for InMemorySchoolworkRepository {
    async fn insert(
        &self,
        owner: &UserId,
        draft: &AnalysisDraft,
    ) -> Result<SchoolworkAnalysis, PersistenceError> {
        let mut state = self.state.lock().expect("state lock");
        state.next_id += 1;
        let analysis = SchoolworkAnalysis::new(
            state.next_id,
            owner.clone(),
            draft.kind().to_owned(),
            draft.subject().to_owned(),
            draft.topic().map(str::to_owned),
            draft.content().to_owned(),
            Utc::now(),
        );
        state.analyses.push(analysis.clone());
        Ok(analysis)
    }

    async fn list_recent(
        &self,
        owner: &UserId,
        limit: i64,
    ) -> Result<Vec<SchoolworkAnalysis>, PersistenceError> {
        let state = self.state.lock().expect("state lock");
        let mut analyses: Vec<SchoolworkAnalysis> = state
            .analyses
            .iter()
            .filter(|a| a.owner() == owner)
            .cloned()
            .collect();
        analyses.sort_by_key(|a| std::cmp::Reverse(a.id()));
        analyses.truncate(usize::try_from(limit).expect("small limit"));
        Ok(analyses)
    }

    async fn find_by_id(
        &self,
        owner: &UserId,
        id: i32,
    ) -> Result<Option<SchoolworkAnalysis>, PersistenceError> {
        let state = self.state.lock().expect("state lock");
        Ok(state
            .analyses
            .iter()
            .find(|a| a.owner() == owner && a.id() == id)
            .cloned())
    }
}

/// Gateway double that replays one scripted outcome for every call.
struct ScriptedAssistant {
    reply: Result<String, AssistantGatewayError>,
}

#[async_trait]
impl AssistantGateway for ScriptedAssistant {
    async fn generate(&self, _request: &AssistantRequest) -> Result<String, AssistantGatewayError> {
        self.reply.clone()
    }
}

/// Builds an [`HttpState`] over in-memory adapters with a configurable
/// model script.
pub struct TestStateBuilder {
    reply: Result<String, AssistantGatewayError>,
}

impl TestStateBuilder {
    /// Start with a model that answers `"OK."` to everything.
    pub fn new() -> Self {
        Self {
            reply: Ok("OK.".to_owned()),
        }
    }

    /// Script the model's reply text.
    #[must_use]
    pub fn with_reply(mut self, reply: &str) -> Self {
        self.reply = Ok(reply.to_owned());
        self
    }

    /// Script the model to fail every call.
    #[must_use]
    pub fn with_failing_model(mut self) -> Self {
        self.reply = Err(AssistantGatewayError::status(429, "quota exhausted"));
        self
    }

    /// Assemble the HTTP state.
    pub fn build(self) -> HttpState {
        HttpState::new(HttpStatePorts {
            users: Arc::new(InMemoryUserRepository::default()),
            events: Arc::new(InMemoryEventRepository::default()),
            chat: Arc::new(InMemoryChatRepository::default()),
            scores: Arc::new(InMemoryScoreRepository::default()),
            schoolwork: Arc::new(InMemorySchoolworkRepository::default()),
            assistant: Arc::new(ScriptedAssistant { reply: self.reply }),
            passwords: Arc::new(Argon2PasswordHasher::new()),
            tokens: Arc::new(JwtTokenService::new(TEST_SIGNING_KEY)),
        })
    }
}

impl Default for TestStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Drives the full routing table against a shared state. Adapters live
/// behind `Arc`s, so data persists across requests on one harness.
pub struct TestApp {
    state: HttpState,
}

impl TestApp {
    /// Build a harness from the given state builder.
    pub async fn spawn(builder: TestStateBuilder) -> Self {
        Self {
            state: builder.build(),
        }
    }

    async fn call(&self, request: test::TestRequest) -> ServiceResponse {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(self.state.clone()))
                .configure(configure),
        )
        .await;
        test::call_service(&app, request.to_request()).await
    }

    /// Issue a GET, optionally with a bearer token.
    pub async fn get(&self, path: &str, token: Option<&str>) -> ServiceResponse {
        let mut request = test::TestRequest::get().uri(path);
        if let Some(token) = token {
            request = request.insert_header((header::AUTHORIZATION, format!("Bearer {token}")));
        }
        self.call(request).await
    }

    /// POST a JSON body without authentication.
    pub async fn post_json(&self, path: &str, body: serde_json::Value) -> ServiceResponse {
        self.call(test::TestRequest::post().uri(path).set_json(body))
            .await
    }

    /// POST a JSON body with a bearer token.
    pub async fn post_json_authed(
        &self,
        path: &str,
        body: serde_json::Value,
        token: &str,
    ) -> ServiceResponse {
        self.call(
            test::TestRequest::post()
                .uri(path)
                .set_json(body)
                .insert_header((header::AUTHORIZATION, format!("Bearer {token}"))),
        )
        .await
    }

    /// Register an account and return a fresh bearer token for it.
    pub async fn register_and_login(&self, email: &str, password: &str) -> String {
        let created = self
            .post_json("/auth/register", json!({"email": email, "password": password}))
            .await;
        assert!(
            created.status().is_success(),
            "registration failed with {}",
            created.status()
        );

        let login = self
            .post_json("/auth/login", json!({"email": email, "password": password}))
            .await;
        assert!(
            login.status().is_success(),
            "login failed with {}",
            login.status()
        );
        let body: serde_json::Value = test::read_body_json(login).await;
        body["access_token"]
            .as_str()
            .expect("login body carries a token")
            .to_owned()
    }
}
