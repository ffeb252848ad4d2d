//! Anthropic API client.
//!
//! Two endpoints are used per photo: the beta Files API to upload the image
//! bytes, and the Messages API to request a vision completion referencing the
//! uploaded file. Both require the `files-api-2025-04-14` beta flag.

use anyhow::Result;
use log::info;
use reqwest::multipart;
use serde::{Deserialize, Serialize};

use crate::prompt::PROMPT;

/// Model used for every completion request.
pub const MODEL: &str = "claude-sonnet-4-20250514";

/// Maximum output token budget per completion.
pub const MAX_TOKENS: u32 = 20000;

/// Sampling temperature per completion.
pub const TEMPERATURE: f32 = 1.0;

/// System instruction framing every completion request.
pub const SYSTEM_PROMPT: &str = "You are a text analysis expert";

/// Beta capability flag required by the Files API and by file references in
/// message content.
pub const FILES_API_BETA: &str = "files-api-2025-04-14";

const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";

/// File record returned by the Files API after an upload. Only the
/// identifier is consumed, as the handle for the completion request.
#[derive(Debug, Deserialize)]
pub struct FileObject {
    pub id: String,
}

/// One typed content part of a user turn.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    Image { source: ImageSource },
}

/// Where the image content of a message part comes from.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ImageSource {
    File { file_id: String },
}

#[derive(Debug, Serialize)]
pub struct MessageParam {
    pub role: &'static str,
    pub content: Vec<ContentPart>,
}

/// Body of a Messages API request.
#[derive(Debug, Serialize)]
pub struct MessagesRequest {
    pub model: &'static str,
    pub max_tokens: u32,
    pub temperature: f32,
    pub system: &'static str,
    pub messages: Vec<MessageParam>,
}

impl MessagesRequest {
    /// Builds the fixed transcription request for an uploaded file.
    pub fn for_file(file_id: &str) -> Self {
        Self {
            model: MODEL,
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
            system: SYSTEM_PROMPT,
            messages: vec![MessageParam {
                role: "user",
                content: vec![
                    ContentPart::Text {
                        text: PROMPT.to_string(),
                    },
                    ContentPart::Image {
                        source: ImageSource::File {
                            file_id: file_id.to_string(),
                        },
                    },
                ],
            }],
        }
    }
}

/// One typed content block of a completion.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        text: String,
    },
    /// Any block kind this relay does not consume (tool use, thinking, ...).
    #[serde(other)]
    Other,
}

/// Completion returned by the Messages API.
#[derive(Debug, Deserialize)]
pub struct MessagesResponse {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub model: String,
    pub content: Vec<ContentBlock>,
    #[serde(default)]
    pub stop_reason: Option<String>,
}

impl MessagesResponse {
    /// Returns the first content block's text.
    ///
    /// Fails with a descriptive error when the completion has no content or
    /// its first block is not textual, instead of indexing blindly.
    pub fn first_text(&self) -> Result<&str> {
        match self.content.first() {
            Some(ContentBlock::Text { text }) => Ok(text),
            Some(_) => Err(anyhow::anyhow!(
                "First content block of completion is not text"
            )),
            None => Err(anyhow::anyhow!("Completion returned no content blocks")),
        }
    }
}

/// Shared handle to the Anthropic API. Constructed once at startup and reused
/// across all handler invocations.
#[derive(Debug, Clone)]
pub struct AnthropicClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl AnthropicClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Client pointed at an alternative API endpoint. Used by tests to stand
    /// in a local mock server.
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: base_url.into(),
        }
    }

    /// Reads `ANTHROPIC_API_KEY` from the environment. Absence yields an
    /// empty credential; the API rejects it at request time, not at startup.
    pub fn from_env() -> Self {
        Self::new(std::env::var("ANTHROPIC_API_KEY").unwrap_or_default())
    }

    /// Uploads raw image bytes to the Files API, declared as JPEG regardless
    /// of actual content. Returns the provider-assigned file record.
    pub async fn upload_file(&self, image: Vec<u8>) -> Result<FileObject> {
        let part = multipart::Part::bytes(image)
            .file_name("image.jpg")
            .mime_str("image/jpeg")?;
        let form = multipart::Form::new().part("file", part);

        let response = self
            .http
            .post(format!("{}/v1/files", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("anthropic-beta", FILES_API_BETA)
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("File upload failed with {status}: {body}"));
        }

        let file: FileObject = response.json().await?;
        info!("Uploaded image as file {}", file.id);

        Ok(file)
    }

    /// Requests a completion for an uploaded file, with the fixed model,
    /// token budget, temperature and prompts.
    pub async fn create_message(&self, file_id: &str) -> Result<MessagesResponse> {
        let request = MessagesRequest::for_file(file_id);

        let response = self
            .http
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("anthropic-beta", FILES_API_BETA)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!(
                "Completion request failed with {status}: {body}"
            ));
        }

        let message: MessagesResponse = response.json().await?;
        info!("Completion response: {message:?}");

        Ok(message)
    }
}
