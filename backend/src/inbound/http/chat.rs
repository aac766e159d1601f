//! AI chat, extraction, quiz, and analysis HTTP handlers.
//!
//! ```text
//! POST /chat/message
//! GET  /chat/history
//! POST /chat/extract-events
//! POST /chat/generate-test
//! POST /chat/analyze-schoolwork
//! POST /chat/examAnalyse
//! ```

use actix_web::{get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::events::DATE_FORMAT;
use crate::domain::{
    ChatMessage, ChatSession, ChatTurnInput, Error, QuizInput, QuizQuestion, SchoolworkInput,
};

use super::bearer::Identity;
use super::error::ApiResult;
use super::events::EventBody;
use super::state::HttpState;
use super::validation::{FieldName, require_field};

const DEFAULT_QUIZ_QUESTIONS: u32 = 5;

/// Request payload for one chat turn.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ChatMessageRequestBody {
    pub session_id: Option<String>,
    pub message: Option<String>,
    /// Base64 image, with or without a `data:` URL prefix.
    pub image: Option<String>,
}

/// Response payload carrying the assistant's reply.
#[derive(Debug, Serialize, ToSchema)]
pub struct ChatMessageResponseBody {
    pub id: i32,
    pub reply: String,
}

/// One message inside a history session.
#[derive(Debug, Serialize, ToSchema)]
pub struct HistoryMessageBody {
    pub id: i32,
    #[schema(example = "user")]
    pub role: String,
    pub content: String,
}

/// One session in the chat history listing.
#[derive(Debug, Serialize, ToSchema)]
pub struct HistorySessionBody {
    /// The client-supplied session id.
    pub id: String,
    pub title: String,
    #[schema(example = "2026-01-10")]
    pub date: String,
    pub messages: Vec<HistoryMessageBody>,
}

impl HistorySessionBody {
    fn from_session(session: &ChatSession, messages: &[ChatMessage]) -> Self {
        Self {
            id: session.client_id().as_str().to_owned(),
            title: session.title().to_owned(),
            date: session.created_at().format(DATE_FORMAT).to_string(),
            messages: messages
                .iter()
                .map(|message| HistoryMessageBody {
                    id: message.id(),
                    role: message.role().to_string(),
                    content: message.content().to_owned(),
                })
                .collect(),
        }
    }
}

/// Request payload for event extraction.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ExtractEventsRequestBody {
    pub text: Option<String>,
    pub image: Option<String>,
}

/// Response payload listing the events created from an extraction.
#[derive(Debug, Serialize, ToSchema)]
pub struct ExtractEventsResponseBody {
    pub events: Vec<ExtractedEventBody>,
}

/// One extracted event, carrying its date alongside the listing shape.
#[derive(Debug, Serialize, ToSchema)]
pub struct ExtractedEventBody {
    #[schema(example = "2026-01-10")]
    pub date: String,
    #[serde(flatten)]
    pub event: EventBody,
}

/// Request payload for quiz generation.
#[derive(Debug, Deserialize, ToSchema)]
pub struct GenerateTestRequestBody {
    pub subject: Option<String>,
    pub context: Option<String>,
    #[serde(rename = "questionsCount")]
    pub questions_count: Option<u32>,
    pub images: Option<Vec<String>>,
}

/// Response payload carrying the generated quiz.
#[derive(Debug, Serialize, ToSchema)]
pub struct GenerateTestResponseBody {
    pub questions: Vec<QuizQuestionBody>,
}

/// One generated multiple-choice question.
#[derive(Debug, Serialize, ToSchema)]
pub struct QuizQuestionBody {
    pub question: String,
    pub options: Vec<String>,
    pub correct: String,
}

impl From<QuizQuestion> for QuizQuestionBody {
    fn from(question: QuizQuestion) -> Self {
        Self {
            question: question.question,
            options: question.options,
            correct: question.correct,
        }
    }
}

/// Request payload for schoolwork analysis.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AnalyzeSchoolworkRequestBody {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub subject: Option<String>,
    pub grade: Option<String>,
    pub mistakes: Option<String>,
    pub notes: Option<String>,
    pub topic: Option<String>,
    pub images: Option<Vec<String>>,
}

/// Response payload for schoolwork analysis.
#[derive(Debug, Serialize, ToSchema)]
pub struct AnalyzeSchoolworkResponseBody {
    pub id: i32,
    pub analysis: String,
}

/// Request payload for exam analysis.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ExamAnalyseRequestBody {
    pub image: Option<String>,
}

/// Response payload for exam analysis.
#[derive(Debug, Serialize, ToSchema)]
pub struct ExamAnalyseResponseBody {
    pub reply: String,
}

/// Answer one chat turn with the rolling session history.
#[utoipa::path(
    post,
    path = "/chat/message",
    request_body = ChatMessageRequestBody,
    responses(
        (status = 200, description = "Assistant reply", body = ChatMessageResponseBody),
        (status = 400, description = "Invalid payload", body = Error),
        (status = 401, description = "Missing or invalid token", body = Error),
        (status = 500, description = "Model unavailable", body = Error)
    ),
    tags = ["chat"],
    operation_id = "chatMessage",
    security(("BearerToken" = []))
)]
#[post("/chat/message")]
pub async fn chat_message(
    state: web::Data<HttpState>,
    identity: Identity,
    payload: web::Json<ChatMessageRequestBody>,
) -> ApiResult<web::Json<ChatMessageResponseBody>> {
    let payload = payload.into_inner();
    let session_id = require_field(payload.session_id, FieldName::new("session_id"))?;
    let input = ChatTurnInput::from_parts(
        &session_id,
        payload.message.as_deref(),
        payload.image.as_deref(),
    )?;

    let reply = state.tutor.reply(identity.user_id(), &input).await?;
    Ok(web::Json(ChatMessageResponseBody {
        id: reply.id(),
        reply: reply.content().to_owned(),
    }))
}

/// List the caller's chat sessions with their messages.
#[utoipa::path(
    get,
    path = "/chat/history",
    responses(
        (status = 200, description = "Sessions, newest first", body = [HistorySessionBody]),
        (status = 401, description = "Missing or invalid token", body = Error)
    ),
    tags = ["chat"],
    operation_id = "chatHistory",
    security(("BearerToken" = []))
)]
#[get("/chat/history")]
pub async fn chat_history(
    state: web::Data<HttpState>,
    identity: Identity,
) -> ApiResult<web::Json<Vec<HistorySessionBody>>> {
    let sessions = state
        .chat
        .sessions_with_messages(identity.user_id())
        .await?;
    Ok(web::Json(
        sessions
            .iter()
            .map(|(session, messages)| HistorySessionBody::from_session(session, messages))
            .collect(),
    ))
}

/// Extract calendar events from notes or a photo and persist them.
#[utoipa::path(
    post,
    path = "/chat/extract-events",
    request_body = ExtractEventsRequestBody,
    responses(
        (status = 200, description = "Created events", body = ExtractEventsResponseBody),
        (status = 400, description = "Invalid payload", body = Error),
        (status = 401, description = "Missing or invalid token", body = Error),
        (status = 500, description = "Model unavailable or unparsable", body = Error)
    ),
    tags = ["chat"],
    operation_id = "extractEvents",
    security(("BearerToken" = []))
)]
#[post("/chat/extract-events")]
pub async fn extract_events(
    state: web::Data<HttpState>,
    identity: Identity,
    payload: web::Json<ExtractEventsRequestBody>,
) -> ApiResult<web::Json<ExtractEventsResponseBody>> {
    let payload = payload.into_inner();
    let created = state
        .tutor
        .extract_events(
            identity.user_id(),
            payload.text.as_deref(),
            payload.image.as_deref(),
        )
        .await?;
    Ok(web::Json(ExtractEventsResponseBody {
        events: created
            .iter()
            .map(|event| ExtractedEventBody {
                date: event.date().format(DATE_FORMAT).to_string(),
                event: EventBody::from(event),
            })
            .collect(),
    }))
}

/// Generate a practice quiz from notes and photos.
#[utoipa::path(
    post,
    path = "/chat/generate-test",
    request_body = GenerateTestRequestBody,
    responses(
        (status = 200, description = "Generated quiz", body = GenerateTestResponseBody),
        (status = 400, description = "Invalid payload", body = Error),
        (status = 401, description = "Missing or invalid token", body = Error),
        (status = 500, description = "Model unavailable or unparsable", body = Error)
    ),
    tags = ["chat"],
    operation_id = "generateTest",
    security(("BearerToken" = []))
)]
#[post("/chat/generate-test")]
pub async fn generate_test(
    state: web::Data<HttpState>,
    _identity: Identity,
    payload: web::Json<GenerateTestRequestBody>,
) -> ApiResult<web::Json<GenerateTestResponseBody>> {
    let payload = payload.into_inner();
    let subject = require_field(payload.subject, FieldName::new("subject"))?;
    let input = QuizInput::from_parts(
        &subject,
        payload.context.as_deref(),
        payload.questions_count.unwrap_or(DEFAULT_QUIZ_QUESTIONS),
        payload.images.as_deref().unwrap_or(&[]),
    )?;

    let questions = state.tutor.generate_quiz(&input).await?;
    Ok(web::Json(GenerateTestResponseBody {
        questions: questions.into_iter().map(QuizQuestionBody::from).collect(),
    }))
}

/// Analyse a piece of schoolwork and persist the write-up.
#[utoipa::path(
    post,
    path = "/chat/analyze-schoolwork",
    request_body = AnalyzeSchoolworkRequestBody,
    responses(
        (status = 200, description = "Analysis", body = AnalyzeSchoolworkResponseBody),
        (status = 400, description = "Invalid payload", body = Error),
        (status = 401, description = "Missing or invalid token", body = Error),
        (status = 500, description = "Model unavailable", body = Error)
    ),
    tags = ["chat"],
    operation_id = "analyzeSchoolwork",
    security(("BearerToken" = []))
)]
#[post("/chat/analyze-schoolwork")]
pub async fn analyze_schoolwork(
    state: web::Data<HttpState>,
    identity: Identity,
    payload: web::Json<AnalyzeSchoolworkRequestBody>,
) -> ApiResult<web::Json<AnalyzeSchoolworkResponseBody>> {
    let payload = payload.into_inner();
    let kind = require_field(payload.kind, FieldName::new("type"))?;
    let subject = require_field(payload.subject, FieldName::new("subject"))?;
    let input = SchoolworkInput::from_parts(
        &kind,
        &subject,
        payload.grade.as_deref(),
        payload.mistakes.as_deref(),
        payload.notes.as_deref(),
        payload.topic.as_deref(),
        payload.images.as_deref().unwrap_or(&[]),
    )?;

    let analysis = state
        .tutor
        .analyze_schoolwork(identity.user_id(), &input)
        .await?;
    Ok(web::Json(AnalyzeSchoolworkResponseBody {
        id: analysis.id(),
        analysis: analysis.content().to_owned(),
    }))
}

/// Analyse a photographed exam without persisting anything.
#[utoipa::path(
    post,
    path = "/chat/examAnalyse",
    request_body = ExamAnalyseRequestBody,
    responses(
        (status = 200, description = "Feedback", body = ExamAnalyseResponseBody),
        (status = 400, description = "Invalid payload", body = Error),
        (status = 401, description = "Missing or invalid token", body = Error),
        (status = 500, description = "Model unavailable", body = Error)
    ),
    tags = ["chat"],
    operation_id = "examAnalyse",
    security(("BearerToken" = []))
)]
#[post("/chat/examAnalyse")]
pub async fn exam_analyse(
    state: web::Data<HttpState>,
    _identity: Identity,
    payload: web::Json<ExamAnalyseRequestBody>,
) -> ApiResult<web::Json<ExamAnalyseResponseBody>> {
    let image = require_field(payload.into_inner().image, FieldName::new("image"))?;
    let reply = state.tutor.analyze_exam(&image).await?;
    Ok(web::Json(ExamAnalyseResponseBody { reply }))
}

#[cfg(test)]
mod tests {
    //! Handler coverage over in-memory adapters and a scripted gateway.
    use actix_web::http::StatusCode;
    use actix_web::test;
    use rstest::rstest;
    use serde_json::json;

    use crate::test_support::{TestApp, TestStateBuilder};

    #[actix_web::test]
    async fn chat_turn_returns_reply_and_shows_up_in_history() {
        let app = TestApp::spawn(TestStateBuilder::new().with_reply("Here is how fractions work."))
            .await;
        let token = app.register_and_login("a@x.com", "pw").await;

        let response = app
            .post_json_authed(
                "/chat/message",
                json!({"session_id": "42", "message": "Explain fractions"}),
                &token,
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(response).await;
        assert_eq!(body["reply"], "Here is how fractions work.");

        let history = app.get("/chat/history", Some(&token)).await;
        let sessions: serde_json::Value = test::read_body_json(history).await;
        assert_eq!(sessions[0]["id"], "42");
        assert_eq!(sessions[0]["title"], "Explain fractions");
        let messages = sessions[0]["messages"].as_array().expect("messages array");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["role"], "user");
        assert_eq!(messages[1]["role"], "assistant");
    }

    #[rstest]
    #[case(json!({"message": "no session id"}))]
    #[case(json!({"session_id": "42"}))]
    #[case(json!({"session_id": "42", "image": "!!! not base64 !!!"}))]
    #[actix_web::test]
    async fn invalid_chat_payloads_are_rejected(#[case] payload: serde_json::Value) {
        let app = TestApp::spawn(TestStateBuilder::new()).await;
        let token = app.register_and_login("a@x.com", "pw").await;

        let response = app.post_json_authed("/chat/message", payload, &token).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn model_failure_is_a_500_and_keeps_the_user_turn() {
        let app = TestApp::spawn(TestStateBuilder::new().with_failing_model()).await;
        let token = app.register_and_login("a@x.com", "pw").await;

        let response = app
            .post_json_authed(
                "/chat/message",
                json!({"session_id": "7", "message": "anyone there?"}),
                &token,
            )
            .await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let history = app.get("/chat/history", Some(&token)).await;
        let sessions: serde_json::Value = test::read_body_json(history).await;
        let messages = sessions[0]["messages"].as_array().expect("messages array");
        assert_eq!(messages.len(), 1, "only the user turn survives");
        assert_eq!(messages[0]["content"], "anyone there?");
    }

    #[actix_web::test]
    async fn chat_history_is_owner_scoped() {
        let app = TestApp::spawn(TestStateBuilder::new().with_reply("hi")).await;
        let owner = app.register_and_login("owner@x.com", "pw").await;
        let other = app.register_and_login("other@x.com", "pw").await;

        app.post_json_authed(
            "/chat/message",
            json!({"session_id": "1", "message": "mine"}),
            &owner,
        )
        .await;

        let history = app.get("/chat/history", Some(&other)).await;
        let sessions: serde_json::Value = test::read_body_json(history).await;
        assert_eq!(sessions, json!([]));
    }

    #[actix_web::test]
    async fn extraction_round_trips_into_the_calendar() {
        let reply = r#"[{"date": "2026-03-01", "type": "test", "description": "Biology mid-term"}]"#;
        let app = TestApp::spawn(TestStateBuilder::new().with_reply(reply)).await;
        let token = app.register_and_login("a@x.com", "pw").await;

        let response = app
            .post_json_authed(
                "/chat/extract-events",
                json!({"text": "planner page"}),
                &token,
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(response).await;
        assert_eq!(body["events"][0]["description"], "Biology mid-term");

        let listing = app.get("/events", Some(&token)).await;
        let calendar: serde_json::Value = test::read_body_json(listing).await;
        assert_eq!(calendar["2026-03-01"][0]["type"], "test");
    }

    #[actix_web::test]
    async fn unparsable_extraction_reply_is_a_format_error() {
        let app = TestApp::spawn(TestStateBuilder::new().with_reply("no json here")).await;
        let token = app.register_and_login("a@x.com", "pw").await;

        let response = app
            .post_json_authed("/chat/extract-events", json!({"text": "planner"}), &token)
            .await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: serde_json::Value = test::read_body_json(response).await;
        assert_eq!(body["code"], "assistant_response_format");
    }

    #[actix_web::test]
    async fn quiz_generation_returns_questions() {
        let reply = r#"{"questions": [{
            "question": "2 + 2?",
            "options": ["3", "4", "5", "22"],
            "correct": "4"
        }]}"#;
        let app = TestApp::spawn(TestStateBuilder::new().with_reply(reply)).await;
        let token = app.register_and_login("a@x.com", "pw").await;

        let response = app
            .post_json_authed(
                "/chat/generate-test",
                json!({"subject": "Maths", "context": "addition", "questionsCount": 5}),
                &token,
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(response).await;
        assert_eq!(body["questions"][0]["correct"], "4");
    }

    #[actix_web::test]
    async fn schoolwork_analysis_is_persisted_and_retrievable() {
        let app = TestApp::spawn(TestStateBuilder::new().with_reply("Practise isolating x."))
            .await;
        let token = app.register_and_login("a@x.com", "pw").await;

        let response = app
            .post_json_authed(
                "/chat/analyze-schoolwork",
                json!({"type": "exam", "subject": "Maths", "topic": "algebra"}),
                &token,
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(response).await;
        assert_eq!(body["analysis"], "Practise isolating x.");
        let id = body["id"].as_i64().expect("analysis id");

        let fetched = app.get(&format!("/schoolwork/{id}"), Some(&token)).await;
        assert_eq!(fetched.status(), StatusCode::OK);
        let stored: serde_json::Value = test::read_body_json(fetched).await;
        assert_eq!(stored["content"], "Practise isolating x.");
    }

    #[actix_web::test]
    async fn exam_analysis_requires_an_image() {
        let app = TestApp::spawn(TestStateBuilder::new().with_reply("Look at question 3.")).await;
        let token = app.register_and_login("a@x.com", "pw").await;

        let missing = app
            .post_json_authed("/chat/examAnalyse", json!({}), &token)
            .await;
        assert_eq!(missing.status(), StatusCode::BAD_REQUEST);

        let response = app
            .post_json_authed("/chat/examAnalyse", json!({"image": "aGVsbG8="}), &token)
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(response).await;
        assert_eq!(body["reply"], "Look at question 3.");
    }
}
