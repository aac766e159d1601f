//! Reqwest-backed Gemini gateway adapter.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use url::Url;

use crate::domain::ports::{AssistantGateway, AssistantGatewayError, AssistantRequest};

use super::dto::{GenerateContentRequestDto, GenerateContentResponseDto};

const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/";
const DEFAULT_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Connection settings for the Gemini API.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    api_key: String,
    model: String,
    endpoint: String,
    timeout: Duration,
}

impl GeminiConfig {
    /// Create a configuration with the given API key and defaults for
    /// everything else.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_owned(),
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Select the model invoked by `generateContent`.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Point the adapter at a different base URL, e.g. a local stub.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the whole-request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Gemini gateway adapter performing HTTP POST requests against the
/// `generateContent` endpoint.
pub struct GeminiClient {
    client: Client,
    url: Url,
    api_key: String,
}

impl GeminiClient {
    /// Build an adapter with its own reqwest client.
    ///
    /// # Errors
    ///
    /// Fails when the endpoint/model pair does not form a valid URL or
    /// the reqwest client cannot be constructed.
    pub fn new(config: GeminiConfig) -> Result<Self, AssistantGatewayError> {
        let url = build_generate_url(&config.endpoint, &config.model)?;
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| AssistantGatewayError::transport(err.to_string()))?;
        Ok(Self {
            client,
            url,
            api_key: config.api_key,
        })
    }
}

fn build_generate_url(endpoint: &str, model: &str) -> Result<Url, AssistantGatewayError> {
    let base = Url::parse(endpoint)
        .map_err(|err| AssistantGatewayError::transport(format!("invalid endpoint: {err}")))?;
    base.join(&format!("v1beta/models/{model}:generateContent"))
        .map_err(|err| AssistantGatewayError::transport(format!("invalid model path: {err}")))
}

fn map_transport_error(error: reqwest::Error) -> AssistantGatewayError {
    AssistantGatewayError::transport(error.to_string())
}

fn map_status_error(status: StatusCode, body: &[u8]) -> AssistantGatewayError {
    AssistantGatewayError::status(status.as_u16(), body_preview(body))
}

fn parse_reply(body: &[u8]) -> Result<String, AssistantGatewayError> {
    let envelope: GenerateContentResponseDto = serde_json::from_slice(body)
        .map_err(|err| AssistantGatewayError::decode(format!("invalid reply envelope: {err}")))?;
    envelope
        .into_reply_text()
        .ok_or_else(|| AssistantGatewayError::decode("reply carries no text candidate"))
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

#[async_trait]
impl AssistantGateway for GeminiClient {
    async fn generate(
        &self,
        request: &AssistantRequest,
    ) -> Result<String, AssistantGatewayError> {
        let payload = GenerateContentRequestDto::from_request(request);
        let response = self
            .client
            .post(self.url.clone())
            .header(API_KEY_HEADER, self.api_key.as_str())
            .json(&payload)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }

        parse_reply(body.as_ref())
    }
}
