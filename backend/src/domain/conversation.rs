//! Conversation assembly for the AI chat, extraction, quiz, and
//! analysis flows.
//!
//! This is where the rolling chat history and the multi-part model
//! payloads are built. The user's turn is always committed before the
//! model is called, so a failed call never loses what the student wrote.

use std::sync::Arc;

use chrono::Utc;
use tracing::warn;

use super::chat::{
    ChatMessage, ChatSession, ClientSessionId, HISTORY_WINDOW, InlineImage, MessageRole,
    decode_inline_image, session_title,
};
use super::error::Error;
use super::events::CalendarEvent;
use super::ports::{
    AssistantGateway, AssistantGatewayError, AssistantPart, AssistantRequest, AssistantRole,
    AssistantTurn, ChatRepository, EventRepository, PersistenceError, SchoolworkRepository,
};
use super::schoolwork::{AnalysisDraft, SchoolworkAnalysis};
use super::structured::{QuizQuestion, parse_extracted_events, parse_quiz_questions};

/// Fixed behavioural instruction for the tutoring endpoints.
pub const TUTOR_SYSTEM_INSTRUCTION: &str = "You are a friendly study tutor helping a student \
prepare for school. Keep answers clear, encouraging, and focused on learning.";

/// Instruction used when a turn carries an image but no text.
pub const DESCRIBE_IMAGE_INSTRUCTION: &str = "Describe this image.";

const MAX_QUIZ_QUESTIONS: u32 = 20;

/// Validated input for the chat endpoint.
#[derive(Debug, Clone)]
pub struct ChatTurnInput {
    session_id: ClientSessionId,
    text: Option<String>,
    image: Option<InlineImage>,
}

impl ChatTurnInput {
    /// Validate a raw chat payload: a turn needs text, an image, or both.
    pub fn from_parts(
        session_id: &str,
        text: Option<&str>,
        image: Option<&str>,
    ) -> Result<Self, Error> {
        let session_id = ClientSessionId::new(session_id)
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        let text = text
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_owned);
        let image = image
            .filter(|raw| !raw.trim().is_empty())
            .map(decode_inline_image)
            .transpose()
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        if text.is_none() && image.is_none() {
            return Err(Error::invalid_request("message or image is required"));
        }
        Ok(Self {
            session_id,
            text,
            image,
        })
    }

    fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }
}

/// Validated input for quiz generation.
#[derive(Debug, Clone)]
pub struct QuizInput {
    subject: String,
    context: Option<String>,
    question_count: u32,
    images: Vec<InlineImage>,
}

impl QuizInput {
    /// Validate a raw quiz-generation payload.
    pub fn from_parts(
        subject: &str,
        context: Option<&str>,
        question_count: u32,
        images: &[String],
    ) -> Result<Self, Error> {
        let subject = subject.trim();
        if subject.is_empty() {
            return Err(Error::invalid_request("subject is required"));
        }
        if question_count == 0 || question_count > MAX_QUIZ_QUESTIONS {
            return Err(Error::invalid_request(format!(
                "questionsCount must be between 1 and {MAX_QUIZ_QUESTIONS}"
            )));
        }
        let context = context
            .map(str::trim)
            .filter(|context| !context.is_empty())
            .map(str::to_owned);
        let images = decode_images(images)?;
        if context.is_none() && images.is_empty() {
            return Err(Error::invalid_request("context or images are required"));
        }
        Ok(Self {
            subject: subject.to_owned(),
            context,
            question_count,
            images,
        })
    }
}

/// Validated input for the schoolwork-analysis endpoint.
#[derive(Debug, Clone)]
pub struct SchoolworkInput {
    kind: String,
    subject: String,
    grade: Option<String>,
    mistakes: Option<String>,
    notes: Option<String>,
    topic: Option<String>,
    images: Vec<InlineImage>,
}

impl SchoolworkInput {
    /// Validate a raw analysis payload.
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        kind: &str,
        subject: &str,
        grade: Option<&str>,
        mistakes: Option<&str>,
        notes: Option<&str>,
        topic: Option<&str>,
        images: &[String],
    ) -> Result<Self, Error> {
        let kind = kind.trim();
        if kind.is_empty() {
            return Err(Error::invalid_request("type is required"));
        }
        let subject = subject.trim();
        if subject.is_empty() {
            return Err(Error::invalid_request("subject is required"));
        }
        let clean = |value: Option<&str>| {
            value
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_owned)
        };
        Ok(Self {
            kind: kind.to_owned(),
            subject: subject.to_owned(),
            grade: clean(grade),
            mistakes: clean(mistakes),
            notes: clean(notes),
            topic: clean(topic),
            images: decode_images(images)?,
        })
    }
}

fn decode_images(images: &[String]) -> Result<Vec<InlineImage>, Error> {
    images
        .iter()
        .filter(|raw| !raw.trim().is_empty())
        .map(|raw| decode_inline_image(raw).map_err(|err| Error::invalid_request(err.to_string())))
        .collect()
}

fn map_persistence_error(error: PersistenceError) -> Error {
    Error::internal(error.to_string())
}

fn map_gateway_error(error: AssistantGatewayError) -> Error {
    warn!(error = %error, "generative model call failed");
    Error::assistant_unavailable("The assistant is currently unavailable")
}

/// Use-case service for every endpoint that talks to the model.
#[derive(Clone)]
pub struct AssistantService {
    chat: Arc<dyn ChatRepository>,
    events: Arc<dyn EventRepository>,
    schoolwork: Arc<dyn SchoolworkRepository>,
    assistant: Arc<dyn AssistantGateway>,
}

impl AssistantService {
    /// Create a service over the given ports.
    pub fn new(
        chat: Arc<dyn ChatRepository>,
        events: Arc<dyn EventRepository>,
        schoolwork: Arc<dyn SchoolworkRepository>,
        assistant: Arc<dyn AssistantGateway>,
    ) -> Self {
        Self {
            chat,
            events,
            schoolwork,
            assistant,
        }
    }

    /// Handle one chat turn and return the persisted assistant reply.
    pub async fn reply(
        &self,
        owner: &crate::domain::UserId,
        input: &ChatTurnInput,
    ) -> Result<ChatMessage, Error> {
        let session = self.resolve_session(owner, input).await?;

        // The student's turn is committed before the model call so a
        // failure past this point cannot lose it.
        let user_turn = self
            .chat
            .append_message(session.id(), MessageRole::User, input.text().unwrap_or(""))
            .await
            .map_err(map_persistence_error)?;

        let history = self.history_before(&user_turn).await?;
        let mut turns = history;
        turns.push(current_turn(input.text(), input.image.as_ref()));

        let request = AssistantRequest {
            system_instruction: Some(TUTOR_SYSTEM_INSTRUCTION.to_owned()),
            turns,
            expect_json: false,
        };
        let reply = self
            .assistant
            .generate(&request)
            .await
            .map_err(map_gateway_error)?;

        self.chat
            .append_message(session.id(), MessageRole::Assistant, &reply)
            .await
            .map_err(map_persistence_error)
    }

    /// Extract calendar events from text or an image and persist them
    /// for the owner.
    pub async fn extract_events(
        &self,
        owner: &crate::domain::UserId,
        text: Option<&str>,
        image: Option<&str>,
    ) -> Result<Vec<CalendarEvent>, Error> {
        let text = text.map(str::trim).filter(|text| !text.is_empty());
        let image = image
            .filter(|raw| !raw.trim().is_empty())
            .map(decode_inline_image)
            .transpose()
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        if text.is_none() && image.is_none() {
            return Err(Error::invalid_request("text or image is required"));
        }

        let today = Utc::now().date_naive();
        let mut parts = vec![AssistantPart::Text(format!(
            "Today is {today}. Extract every school event from the material below. Answer with \
a JSON array only, no prose: [{{\"date\": \"YYYY-MM-DD\", \"type\": \
\"homework|test|project\", \"description\": \"...\"}}]. Use an empty array when there is \
nothing to extract."
        ))];
        if let Some(text) = text {
            parts.push(AssistantPart::Text(text.to_owned()));
        }
        if let Some(image) = image {
            parts.push(AssistantPart::Image(image));
        }

        let request = AssistantRequest {
            system_instruction: None,
            turns: vec![AssistantTurn {
                role: AssistantRole::User,
                parts,
            }],
            expect_json: true,
        };
        let reply = self
            .assistant
            .generate(&request)
            .await
            .map_err(map_gateway_error)?;
        let drafts = parse_extracted_events(&reply)
            .map_err(|err| Error::assistant_response_format(err.to_string()))?;

        let mut created = Vec::with_capacity(drafts.len());
        for draft in &drafts {
            let event = self
                .events
                .insert(owner, draft)
                .await
                .map_err(map_persistence_error)?;
            created.push(event);
        }
        Ok(created)
    }

    /// Generate a practice quiz. Nothing is persisted; the score arrives
    /// later through its own endpoint.
    pub async fn generate_quiz(&self, input: &QuizInput) -> Result<Vec<QuizQuestion>, Error> {
        let mut prompt = format!(
            "Create a practice test for the subject \"{}\". Write exactly {} multiple-choice \
questions. Answer with JSON only, no prose, in this shape: {{\"questions\": [{{\"question\": \
\"...\", \"options\": [\"...\", \"...\", \"...\", \"...\"], \"correct\": \"...\"}}]}}. Each \
\"correct\" value must repeat one of its own options verbatim.",
            input.subject, input.question_count
        );
        if let Some(context) = &input.context {
            prompt.push_str("\n\nStudy notes:\n");
            prompt.push_str(context);
        }

        let mut parts = vec![AssistantPart::Text(prompt)];
        parts.extend(input.images.iter().cloned().map(AssistantPart::Image));

        let request = AssistantRequest {
            system_instruction: Some(TUTOR_SYSTEM_INSTRUCTION.to_owned()),
            turns: vec![AssistantTurn {
                role: AssistantRole::User,
                parts,
            }],
            expect_json: true,
        };
        let reply = self
            .assistant
            .generate(&request)
            .await
            .map_err(map_gateway_error)?;
        parse_quiz_questions(&reply).map_err(|err| Error::assistant_response_format(err.to_string()))
    }

    /// Analyse a piece of schoolwork and persist the produced write-up.
    pub async fn analyze_schoolwork(
        &self,
        owner: &crate::domain::UserId,
        input: &SchoolworkInput,
    ) -> Result<SchoolworkAnalysis, Error> {
        let mut prompt = format!(
            "A student asks for help with their {} in {}.",
            input.kind, input.subject
        );
        if let Some(topic) = &input.topic {
            prompt.push_str(&format!(" The topic is {topic}."));
        }
        if let Some(grade) = &input.grade {
            prompt.push_str(&format!(" They received the grade {grade}."));
        }
        if let Some(mistakes) = &input.mistakes {
            prompt.push_str(&format!("\n\nMistakes they noticed:\n{mistakes}"));
        }
        if let Some(notes) = &input.notes {
            prompt.push_str(&format!("\n\nAdditional notes:\n{notes}"));
        }
        prompt.push_str(
            "\n\nExplain what went wrong, work through the underlying concepts, and end with \
concrete practice suggestions. Use Markdown.",
        );

        let mut parts = vec![AssistantPart::Text(prompt)];
        parts.extend(input.images.iter().cloned().map(AssistantPart::Image));

        let request = AssistantRequest {
            system_instruction: Some(TUTOR_SYSTEM_INSTRUCTION.to_owned()),
            turns: vec![AssistantTurn {
                role: AssistantRole::User,
                parts,
            }],
            expect_json: false,
        };
        let content = self
            .assistant
            .generate(&request)
            .await
            .map_err(map_gateway_error)?;

        let draft = AnalysisDraft::from_parts(
            &input.kind,
            &input.subject,
            input.topic.as_deref(),
            content,
        )
        .map_err(|err| Error::invalid_request(err.to_string()))?;
        self.schoolwork
            .insert(owner, &draft)
            .await
            .map_err(map_persistence_error)
    }

    /// Analyse a photographed exam and return free-text feedback.
    /// Nothing is persisted.
    pub async fn analyze_exam(&self, image: &str) -> Result<String, Error> {
        if image.trim().is_empty() {
            return Err(Error::invalid_request("image is required"));
        }
        let image =
            decode_inline_image(image).map_err(|err| Error::invalid_request(err.to_string()))?;

        let request = AssistantRequest {
            system_instruction: Some(TUTOR_SYSTEM_INSTRUCTION.to_owned()),
            turns: vec![AssistantTurn {
                role: AssistantRole::User,
                parts: vec![
                    AssistantPart::Text(
                        "This is a photo of a marked exam. Point out each mistake, explain the \
correct approach, and suggest what to revise."
                            .to_owned(),
                    ),
                    AssistantPart::Image(image),
                ],
            }],
            expect_json: false,
        };
        self.assistant
            .generate(&request)
            .await
            .map_err(map_gateway_error)
    }

    async fn resolve_session(
        &self,
        owner: &crate::domain::UserId,
        input: &ChatTurnInput,
    ) -> Result<ChatSession, Error> {
        if let Some(session) = self
            .chat
            .find_session(owner, &input.session_id)
            .await
            .map_err(map_persistence_error)?
        {
            return Ok(session);
        }
        let title = session_title(input.text());
        self.chat
            .create_session(owner, &input.session_id, &title)
            .await
            .map_err(map_persistence_error)
    }

    /// Load the rolling window of turns preceding the one just inserted,
    /// translated into the model's role vocabulary, oldest first.
    async fn history_before(&self, just_inserted: &ChatMessage) -> Result<Vec<AssistantTurn>, Error> {
        let mut recent = self
            .chat
            .recent_messages(just_inserted.session_id(), HISTORY_WINDOW)
            .await
            .map_err(map_persistence_error)?;
        recent.reverse();

        Ok(recent
            .into_iter()
            .filter(|message| message.id() != just_inserted.id())
            .filter(|message| !message.content().is_empty())
            .map(|message| {
                let role = match message.role() {
                    MessageRole::User => AssistantRole::User,
                    MessageRole::Assistant => AssistantRole::Model,
                };
                AssistantTurn::text(role, message.content().to_owned())
            })
            .collect())
    }
}

/// Build the model parts for the turn being answered.
fn current_turn(text: Option<&str>, image: Option<&InlineImage>) -> AssistantTurn {
    let mut parts = Vec::new();
    match (text, image) {
        (Some(text), _) => parts.push(AssistantPart::Text(text.to_owned())),
        (None, Some(_)) => {
            parts.push(AssistantPart::Text(DESCRIBE_IMAGE_INSTRUCTION.to_owned()));
        }
        (None, None) => {}
    }
    if let Some(image) = image {
        parts.push(AssistantPart::Image(image.clone()));
    }
    AssistantTurn {
        role: AssistantRole::User,
        parts,
    }
}
