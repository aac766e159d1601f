//! Defensive decoding of structured model output.
//!
//! The model is asked for JSON but is never trusted to return it: replies
//! may be wrapped in Markdown fences, carry stray prose, or miss keys.
//! Everything here turns such replies into validated domain values or a
//! typed decode error, never a panic.

use serde::Deserialize;

use super::events::EventDraft;

/// Decode failures for structured model replies.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StructuredReplyError {
    /// The reply is not parseable JSON at all.
    #[error("model reply is not valid JSON: {message}")]
    NotJson { message: String },
    /// The JSON parsed but the expected keys are missing or mistyped.
    #[error("model reply is missing the expected structure: {message}")]
    WrongShape { message: String },
}

/// One multiple-choice question produced by the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub correct: String,
}

#[derive(Deserialize)]
struct QuizReplyDto {
    questions: Vec<QuizQuestionDto>,
}

#[derive(Deserialize)]
struct QuizQuestionDto {
    question: String,
    options: Vec<String>,
    correct: String,
}

#[derive(Deserialize)]
struct ExtractedEventDto {
    date: String,
    #[serde(rename = "type")]
    kind: String,
    description: String,
}

/// Strip a Markdown code fence (```json ... ```), if present, so the
/// payload inside can be parsed.
fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}

/// Parse a quiz reply into validated questions.
///
/// Every question must carry a non-empty prompt, at least two options,
/// and a correct answer that is one of those options.
pub fn parse_quiz_questions(reply: &str) -> Result<Vec<QuizQuestion>, StructuredReplyError> {
    let payload = strip_code_fence(reply);
    let decoded: QuizReplyDto =
        serde_json::from_str(payload).map_err(|err| StructuredReplyError::NotJson {
            message: err.to_string(),
        })?;

    if decoded.questions.is_empty() {
        return Err(StructuredReplyError::WrongShape {
            message: "questions array is empty".to_owned(),
        });
    }

    decoded
        .questions
        .into_iter()
        .enumerate()
        .map(|(index, question)| {
            if question.question.trim().is_empty() {
                return Err(StructuredReplyError::WrongShape {
                    message: format!("question {index} has no prompt"),
                });
            }
            if question.options.len() < 2 {
                return Err(StructuredReplyError::WrongShape {
                    message: format!("question {index} needs at least two options"),
                });
            }
            if !question.options.contains(&question.correct) {
                return Err(StructuredReplyError::WrongShape {
                    message: format!("question {index} answer is not among its options"),
                });
            }
            Ok(QuizQuestion {
                question: question.question,
                options: question.options,
                correct: question.correct,
            })
        })
        .collect()
}

/// Parse an event-extraction reply into zero or more event drafts.
///
/// Entries that fail domain validation (unknown kind, malformed date,
/// blank description) are skipped rather than failing the batch; only a
/// structurally unusable reply is an error.
pub fn parse_extracted_events(reply: &str) -> Result<Vec<EventDraft>, StructuredReplyError> {
    let payload = strip_code_fence(reply);
    let decoded: Vec<ExtractedEventDto> =
        serde_json::from_str(payload).map_err(|err| StructuredReplyError::NotJson {
            message: err.to_string(),
        })?;

    Ok(decoded
        .into_iter()
        .filter_map(|entry| {
            EventDraft::from_parts(&entry.date, &entry.kind, &entry.description).ok()
        })
        .collect())
}
