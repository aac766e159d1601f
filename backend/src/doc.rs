//! OpenAPI documentation configuration.
//!
//! Defines the [`ApiDoc`] struct which generates the OpenAPI
//! specification for the REST API: every HTTP endpoint from the inbound
//! layer, the request/response schemas, and the bearer-token security
//! scheme. The generated specification backs Swagger UI in debug
//! builds.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{Error, ErrorCode};
use crate::inbound::http::auth::{
    ChangePasswordRequestBody, CredentialsRequestBody, LoginResponseBody, MessageBody,
    ProfileResponseBody,
};
use crate::inbound::http::chat::{
    AnalyzeSchoolworkRequestBody, AnalyzeSchoolworkResponseBody, ChatMessageRequestBody,
    ChatMessageResponseBody, ExamAnalyseRequestBody, ExamAnalyseResponseBody,
    ExtractEventsRequestBody, ExtractEventsResponseBody, ExtractedEventBody,
    GenerateTestRequestBody, GenerateTestResponseBody, HistoryMessageBody, HistorySessionBody,
    QuizQuestionBody,
};
use crate::inbound::http::events::{CreateEventRequestBody, DeleteEventRequestBody, EventBody};
use crate::inbound::http::schoolwork::{AnalysisResponseBody, AnalysisSummaryBody};
use crate::inbound::http::scores::{SaveScoreRequestBody, ScoreSummaryResponseBody};

/// Enrich the generated document with the bearer-token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "BearerToken",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some("Token issued by POST /auth/login."))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Student assistant backend API",
        description = "HTTP interface for accounts, the event calendar, AI tutoring, \
quiz generation, and schoolwork analysis."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::auth::register,
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::my_info,
        crate::inbound::http::auth::change_password,
        crate::inbound::http::events::list_events,
        crate::inbound::http::events::create_event,
        crate::inbound::http::events::delete_event,
        crate::inbound::http::chat::chat_message,
        crate::inbound::http::chat::chat_history,
        crate::inbound::http::chat::extract_events,
        crate::inbound::http::chat::generate_test,
        crate::inbound::http::chat::analyze_schoolwork,
        crate::inbound::http::chat::exam_analyse,
        crate::inbound::http::scores::save_score,
        crate::inbound::http::scores::recent_scores,
        crate::inbound::http::schoolwork::recent_analyses,
        crate::inbound::http::schoolwork::get_analysis,
    ),
    components(schemas(
        Error,
        ErrorCode,
        CredentialsRequestBody,
        LoginResponseBody,
        ProfileResponseBody,
        ChangePasswordRequestBody,
        MessageBody,
        EventBody,
        CreateEventRequestBody,
        DeleteEventRequestBody,
        ChatMessageRequestBody,
        ChatMessageResponseBody,
        HistoryMessageBody,
        HistorySessionBody,
        ExtractEventsRequestBody,
        ExtractEventsResponseBody,
        ExtractedEventBody,
        GenerateTestRequestBody,
        GenerateTestResponseBody,
        QuizQuestionBody,
        AnalyzeSchoolworkRequestBody,
        AnalyzeSchoolworkResponseBody,
        ExamAnalyseRequestBody,
        ExamAnalyseResponseBody,
        SaveScoreRequestBody,
        ScoreSummaryResponseBody,
        AnalysisSummaryBody,
        AnalysisResponseBody,
    )),
    tags(
        (name = "auth", description = "Account registration and authentication"),
        (name = "events", description = "Calendar events"),
        (name = "chat", description = "AI tutoring, extraction, and analysis"),
        (name = "scores", description = "Quiz results and statistics"),
        (name = "schoolwork", description = "Persisted schoolwork analyses")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Structure checks for the generated document.
    use rstest::rstest;
    use utoipa::OpenApi as _;

    use super::*;

    #[rstest]
    fn every_endpoint_is_documented() {
        let doc = ApiDoc::openapi();
        for path in [
            "/auth/register",
            "/auth/login",
            "/auth/myInfo",
            "/auth/change_password",
            "/events",
            "/events/delete",
            "/chat/message",
            "/chat/history",
            "/chat/extract-events",
            "/chat/generate-test",
            "/chat/analyze-schoolwork",
            "/chat/examAnalyse",
            "/save-score",
            "/recent-scores",
            "/schoolwork/recents",
            "/schoolwork/{id}",
        ] {
            assert!(
                doc.paths.paths.contains_key(path),
                "missing documented path: {path}"
            );
        }
    }

    #[rstest]
    fn bearer_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components section");
        assert!(components.security_schemes.contains_key("BearerToken"));
    }
}
