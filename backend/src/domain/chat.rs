//! Chat sessions, messages, and inline image handling.

use std::fmt;
use std::str::FromStr;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, Utc};

use super::user::UserId;

/// Maximum number of characters carried into a session title.
pub const TITLE_MAX_CHARS: usize = 30;

/// Title used when the opening message carried only an image.
pub const IMAGE_ONLY_TITLE: &str = "Image Shared";

/// How many of a session's most recent messages accompany a model call.
pub const HISTORY_WINDOW: i64 = 10;

/// Validation errors for chat input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChatValidationError {
    /// The stored role string is not part of the closed set.
    #[error("role must be user or assistant")]
    UnknownRole,
    /// The client session id is blank.
    #[error("session id must not be empty")]
    EmptySessionId,
    /// The inline image is not valid base64.
    #[error("image must be base64-encoded")]
    InvalidImage,
}

/// Author of a chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageRole {
    User,
    Assistant,
}

impl MessageRole {
    /// Canonical stored spelling of the role.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl FromStr for MessageRole {
    type Err = ChatValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "user" => Ok(Self::User),
            "assistant" => Ok(Self::Assistant),
            _ => Err(ChatValidationError::UnknownRole),
        }
    }
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Client-supplied session identifier, trimmed and non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientSessionId(String);

impl ClientSessionId {
    /// Validate a raw client id.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, ChatValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ChatValidationError::EmptySessionId);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the id string.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// A persisted chat session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatSession {
    id: i32,
    owner: UserId,
    client_id: ClientSessionId,
    title: String,
    created_at: DateTime<Utc>,
}

impl ChatSession {
    /// Assemble a session from already-validated parts.
    pub fn new(
        id: i32,
        owner: UserId,
        client_id: ClientSessionId,
        title: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            owner,
            client_id,
            title,
            created_at,
        }
    }

    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn owner(&self) -> &UserId {
        &self.owner
    }

    pub fn client_id(&self) -> &ClientSessionId {
        &self.client_id
    }

    pub fn title(&self) -> &str {
        self.title.as_str()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// A persisted chat turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    id: i32,
    session_id: i32,
    role: MessageRole,
    content: String,
    created_at: DateTime<Utc>,
}

impl ChatMessage {
    /// Assemble a message from already-validated parts.
    pub fn new(
        id: i32,
        session_id: i32,
        role: MessageRole,
        content: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            session_id,
            role,
            content,
            created_at,
        }
    }

    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn session_id(&self) -> i32 {
        self.session_id
    }

    pub fn role(&self) -> MessageRole {
        self.role
    }

    pub fn content(&self) -> &str {
        self.content.as_str()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Derive a new session's title from its opening turn.
///
/// The first message's text wins, truncated to [`TITLE_MAX_CHARS`]
/// characters; an image-only opening falls back to [`IMAGE_ONLY_TITLE`].
pub fn session_title(first_text: Option<&str>) -> String {
    match first_text.map(str::trim).filter(|text| !text.is_empty()) {
        Some(text) => text.chars().take(TITLE_MAX_CHARS).collect(),
        None => IMAGE_ONLY_TITLE.to_owned(),
    }
}

/// Decoded inline image ready for the model request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    mime_type: String,
    data: Vec<u8>,
}

impl InlineImage {
    /// MIME type declared by the client, `image/jpeg` when unstated.
    pub fn mime_type(&self) -> &str {
        self.mime_type.as_str()
    }

    /// Raw image bytes.
    pub fn data(&self) -> &[u8] {
        self.data.as_slice()
    }
}

/// Decode a client-supplied base64 image, stripping any `data:` URL
/// prefix first.
pub fn decode_inline_image(raw: &str) -> Result<InlineImage, ChatValidationError> {
    let trimmed = raw.trim();
    let (mime_type, payload) = match trimmed
        .strip_prefix("data:")
        .and_then(|rest| rest.split_once(";base64,"))
    {
        Some((mime, payload)) if !mime.is_empty() => (mime.to_owned(), payload),
        Some((_, payload)) => ("image/jpeg".to_owned(), payload),
        None => ("image/jpeg".to_owned(), trimmed),
    };

    let data = BASE64
        .decode(payload)
        .map_err(|_| ChatValidationError::InvalidImage)?;
    Ok(InlineImage { mime_type, data })
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Some("Explain photosynthesis to me in detail please"), "Explain photosynthesis to me i")]
    #[case(Some("  short  "), "short")]
    #[case(Some("   "), IMAGE_ONLY_TITLE)]
    #[case(None, IMAGE_ONLY_TITLE)]
    fn titles_truncate_or_fall_back(#[case] text: Option<&str>, #[case] expected: &str) {
        assert_eq!(session_title(text), expected);
    }

    #[rstest]
    fn title_truncates_by_characters_not_bytes() {
        let title = session_title(Some(&"é".repeat(40)));
        assert_eq!(title.chars().count(), TITLE_MAX_CHARS);
    }

    #[rstest]
    #[case("user", MessageRole::User)]
    #[case("assistant", MessageRole::Assistant)]
    fn role_round_trips(#[case] raw: &str, #[case] role: MessageRole) {
        assert_eq!(raw.parse::<MessageRole>().expect("known role"), role);
        assert_eq!(role.as_str(), raw);
    }

    #[rstest]
    fn image_decodes_plain_base64_as_jpeg() {
        let image = decode_inline_image("aGVsbG8=").expect("valid base64");
        assert_eq!(image.mime_type(), "image/jpeg");
        assert_eq!(image.data(), b"hello");
    }

    #[rstest]
    fn image_strips_data_url_prefix_and_keeps_mime() {
        let image =
            decode_inline_image("data:image/png;base64,aGVsbG8=").expect("valid data url");
        assert_eq!(image.mime_type(), "image/png");
        assert_eq!(image.data(), b"hello");
    }

    #[rstest]
    fn image_rejects_garbage() {
        let err = decode_inline_image("not base64 at all!").expect_err("invalid payload");
        assert_eq!(err, ChatValidationError::InvalidImage);
    }
}
