//! Wire types for the Gemini `generateContent` endpoint.
//!
//! Mirrors the subset of the API surface this backend uses; everything
//! else in the envelope is ignored on decode.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};

use crate::domain::ports::{AssistantPart, AssistantRequest, AssistantRole, AssistantTurn};

pub(super) const JSON_MIME_TYPE: &str = "application/json";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct GenerateContentRequestDto {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<ContentDto>,
    pub contents: Vec<ContentDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfigDto>,
}

#[derive(Debug, Serialize)]
pub(super) struct ContentDto {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<&'static str>,
    pub parts: Vec<PartDto>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) enum PartDto {
    Text(String),
    InlineData(InlineDataDto),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct InlineDataDto {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct GenerationConfigDto {
    pub response_mime_type: &'static str,
}

#[derive(Debug, Deserialize)]
pub(super) struct GenerateContentResponseDto {
    #[serde(default)]
    pub candidates: Vec<CandidateDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct CandidateDto {
    pub content: Option<CandidateContentDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct CandidateContentDto {
    #[serde(default)]
    pub parts: Vec<CandidatePartDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct CandidatePartDto {
    pub text: Option<String>,
}

fn role_name(role: AssistantRole) -> &'static str {
    match role {
        AssistantRole::User => "user",
        AssistantRole::Model => "model",
    }
}

fn part_to_dto(part: &AssistantPart) -> PartDto {
    match part {
        AssistantPart::Text(text) => PartDto::Text(text.clone()),
        AssistantPart::Image(image) => PartDto::InlineData(InlineDataDto {
            mime_type: image.mime_type().to_owned(),
            data: BASE64.encode(image.data()),
        }),
    }
}

fn turn_to_dto(turn: &AssistantTurn) -> ContentDto {
    ContentDto {
        role: Some(role_name(turn.role)),
        parts: turn.parts.iter().map(part_to_dto).collect(),
    }
}

impl GenerateContentRequestDto {
    /// Translate an assembled domain request into the wire shape.
    pub(super) fn from_request(request: &AssistantRequest) -> Self {
        Self {
            system_instruction: request.system_instruction.as_ref().map(|text| ContentDto {
                role: None,
                parts: vec![PartDto::Text(text.clone())],
            }),
            contents: request.turns.iter().map(turn_to_dto).collect(),
            generation_config: request.expect_json.then_some(GenerationConfigDto {
                response_mime_type: JSON_MIME_TYPE,
            }),
        }
    }
}

impl GenerateContentResponseDto {
    /// Concatenate the text parts of the first candidate's reply.
    /// Returns `None` when the envelope holds no usable text, e.g. a
    /// safety block.
    pub(super) fn into_reply_text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content
            .parts
            .into_iter()
            .filter_map(|part| part.text)
            .collect();
        if text.is_empty() { None } else { Some(text) }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use rstest::rstest;

    use super::*;
    use crate::domain::chat::decode_inline_image;

    #[rstest]
    fn requests_serialise_with_camel_case_and_roles() {
        let request = AssistantRequest {
            system_instruction: Some("Be kind.".to_owned()),
            turns: vec![
                AssistantTurn::text(AssistantRole::User, "hi"),
                AssistantTurn::text(AssistantRole::Model, "hello"),
            ],
            expect_json: true,
        };

        let body = serde_json::to_value(GenerateContentRequestDto::from_request(&request))
            .expect("serialisable request");
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "Be kind.");
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][1]["role"], "model");
        assert_eq!(
            body["generationConfig"]["responseMimeType"],
            "application/json"
        );
    }

    #[rstest]
    fn images_travel_as_inline_data() {
        let image = decode_inline_image("data:image/png;base64,aGVsbG8=").expect("valid image");
        let request = AssistantRequest {
            system_instruction: None,
            turns: vec![AssistantTurn {
                role: AssistantRole::User,
                parts: vec![AssistantPart::Image(image)],
            }],
            expect_json: false,
        };

        let body = serde_json::to_value(GenerateContentRequestDto::from_request(&request))
            .expect("serialisable request");
        let inline = &body["contents"][0]["parts"][0]["inlineData"];
        assert_eq!(inline["mimeType"], "image/png");
        assert_eq!(inline["data"], "aGVsbG8=");
        assert!(body.get("generationConfig").is_none());
    }

    #[rstest]
    fn replies_concatenate_candidate_text_parts() {
        let envelope: GenerateContentResponseDto = serde_json::from_str(
            r#"{"candidates": [{"content": {"parts": [{"text": "Hello "}, {"text": "there."}]}}]}"#,
        )
        .expect("decodable envelope");

        assert_eq!(envelope.into_reply_text().as_deref(), Some("Hello there."));
    }

    #[rstest]
    #[case(r#"{"candidates": []}"#)]
    #[case(r#"{"candidates": [{"content": {"parts": []}}]}"#)]
    #[case(r#"{}"#)]
    fn empty_envelopes_yield_no_text(#[case] payload: &str) {
        let envelope: GenerateContentResponseDto =
            serde_json::from_str(payload).expect("decodable envelope");
        assert_eq!(envelope.into_reply_text(), None);
    }
}
