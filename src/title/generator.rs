use async_trait::async_trait;
use log::debug;
use reqwest::Client as HttpClient;
use serde::{ Deserialize, Serialize };
use std::error::Error as StdError;

use crate::cli::Args;
use crate::locale::LanguageCode;
use super::TITLE_MAX_TOKENS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptRole {
    User,
    Assistant,
}

/// One sanitized entry of the transcript sent to the title endpoint.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TranscriptMessage {
    pub role: TranscriptRole,
    pub content: String,
}

#[derive(Serialize)]
struct TitleRequest<'a> {
    language: &'a str,
    messages: &'a [TranscriptMessage],
    max_tokens: u32,
}

/// Success body of the title endpoint. A 200 without `title` is still a
/// failure for the caller.
#[derive(Deserialize, Debug, Clone)]
pub struct TitleResponse {
    pub title: Option<String>,
}

/// Transport port for title generation. The orchestrator only sees this
/// trait, so its decision logic tests run without a live backend.
/// `forward_headers` are request-scoped headers (e.g. auth context from
/// the inbound conversation-turn request) copied onto the outbound call.
#[async_trait]
pub trait TitleGenerator: Send + Sync {
    async fn generate(
        &self,
        language: LanguageCode,
        messages: &[TranscriptMessage],
        forward_headers: &[(String, String)]
    ) -> Result<TitleResponse, Box<dyn StdError + Send + Sync>>;
}

/// Calls the AI backend's `POST /api/v1/chat/title` route. Timeouts and
/// connection policy live in the shared reqwest client; any transport
/// error surfaces as `Err` and is downgraded to a soft failure upstream.
pub struct HttpTitleGenerator {
    http: HttpClient,
    base_url: String,
    api_key: Option<String>,
}

impl HttpTitleGenerator {
    pub fn new(base_url: String, api_key: Option<String>) -> Self {
        Self {
            http: HttpClient::new(),
            base_url,
            api_key: api_key.filter(|k| !k.is_empty()),
        }
    }

    pub fn from_config(args: &Args) -> Self {
        Self::new(args.ai_base_url.clone(), args.ai_api_key.clone())
    }
}

#[async_trait]
impl TitleGenerator for HttpTitleGenerator {
    async fn generate(
        &self,
        language: LanguageCode,
        messages: &[TranscriptMessage],
        forward_headers: &[(String, String)]
    ) -> Result<TitleResponse, Box<dyn StdError + Send + Sync>> {
        let url = format!("{}/api/v1/chat/title", self.base_url.trim_end_matches('/'));
        let payload = TitleRequest {
            language: language.as_str(),
            messages,
            max_tokens: TITLE_MAX_TOKENS,
        };

        let mut req = self.http.post(&url).json(&payload);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }
        for (name, value) in forward_headers {
            req = req.header(name.as_str(), value.as_str());
        }

        debug!("Requesting title from {} ({} transcript messages)", url, messages.len());
        let resp = req.send().await?;
        if resp.status() != reqwest::StatusCode::OK {
            return Err(format!("title endpoint returned status {}", resp.status()).into());
        }

        let body: TitleResponse = resp.json().await?;
        Ok(body)
    }
}
