//! Client for the hosted model-execution API.
//!
//! All knowledge of the vendor wire format lives here: the execute
//! endpoint shape, the generation parameters the service expects (as
//! strings, oddly), and the status values it reports while a freshly
//! scaled-up instance is warming up.

use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};
use tokio::time::sleep;

use crate::chat::{ChatError, ConversationTurn, Role, TurnInput};
use crate::core::AppConfig;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Serialize)]
struct HistoryEntry<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
enum RequestInput<'a> {
    Text { text: &'a str },
    Audio { data: String },
}

#[derive(Serialize)]
struct ExecuteRequest<'a> {
    context: &'a str,
    history: Vec<HistoryEntry<'a>>,
    input: RequestInput<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    source_language: Option<&'a str>,
    // The execute API takes generation parameters as strings
    temperature: String,
    top_p: String,
    top_k: String,
    max_tokens: String,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
enum ExecuteStatus {
    Success,
    WarmingUp,
    Timeout,
    Error,
}

#[derive(Debug, Deserialize)]
struct ExecuteResponse {
    status: ExecuteStatus,
    #[serde(default)]
    data: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    transcription: Option<String>,
}

/// A successful generation. For audio input the endpoint echoes back the
/// transcription it produced before answering.
#[derive(Clone, Debug)]
pub struct Generation {
    pub text: String,
    pub transcription: Option<String>,
}

/// Thin request builder/sender for the model-execution endpoint. Built
/// once at startup; the model ID is fixed for the process lifetime.
#[derive(Clone, Debug)]
pub struct ModelClient {
    http: reqwest::Client,
    hostname: String,
    api_key: String,
    model_id: &'static str,
    system_message: String,
    max_attempts: u32,
    retry_delay: Duration,
    temperature: f32,
    top_p: f32,
    top_k: u32,
    max_tokens: u32,
}

impl ModelClient {
    /// Fails fast when the credential is absent so no request is ever
    /// attempted without one.
    pub fn new(config: &AppConfig) -> Result<Self, ChatError> {
        if config.api_key.trim().is_empty() {
            return Err(ChatError::Config(
                "AIXPLAIN_API_KEY is not set".to_string(),
            ));
        }

        Ok(Self {
            http: reqwest::Client::new(),
            hostname: config.api_hostname.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model_id: config.model.model_id(),
            system_message: config.system_message.clone(),
            max_attempts: config.max_attempts.max(1),
            retry_delay: config.retry_delay,
            temperature: config.temperature,
            top_p: config.top_p,
            top_k: config.top_k,
            max_tokens: config.max_tokens,
        })
    }

    /// Call the endpoint with the conversation so far plus the new input.
    ///
    /// Retries up to the configured attempt budget while the endpoint
    /// reports `WARMING_UP` or `TIMEOUT`, re-sending the identical payload
    /// each time. Exhausting the budget surfaces `ChatError::Retryable`;
    /// every other failure is fatal.
    pub async fn generate(
        &self,
        history: &[ConversationTurn],
        input: &TurnInput,
    ) -> Result<Generation, ChatError> {
        let payload = self.build_payload(history, input);
        let url = format!("{}/api/v1/execute/{}", self.hostname, self.model_id);

        let mut attempt = 0;
        loop {
            attempt += 1;
            let response = self
                .http
                .post(&url)
                .bearer_auth(&self.api_key)
                .header("Content-Type", "application/json")
                .timeout(REQUEST_TIMEOUT)
                .json(&payload)
                .send()
                .await?;

            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                return Err(ChatError::Remote(format!("{status}: {body}")));
            }

            let parsed: ExecuteResponse = response.json().await?;
            match parsed.status {
                ExecuteStatus::Success => {
                    let text = parsed.data.unwrap_or_default();
                    if text.is_empty() {
                        return Err(ChatError::Remote(
                            "endpoint reported success with no data".to_string(),
                        ));
                    }
                    return Ok(Generation {
                        text,
                        transcription: parsed.transcription,
                    });
                }
                ExecuteStatus::WarmingUp | ExecuteStatus::Timeout => {
                    if attempt >= self.max_attempts {
                        return Err(ChatError::Retryable { attempts: attempt });
                    }
                    tracing::info!(
                        "Model endpoint not ready ({:?}), attempt {}/{}",
                        parsed.status,
                        attempt,
                        self.max_attempts
                    );
                    sleep(self.retry_delay).await;
                }
                ExecuteStatus::Error => {
                    return Err(ChatError::Remote(
                        parsed
                            .message
                            .unwrap_or_else(|| "unspecified model error".to_string()),
                    ));
                }
            }
        }
    }

    fn build_payload<'a>(
        &'a self,
        history: &'a [ConversationTurn],
        input: &'a TurnInput,
    ) -> ExecuteRequest<'a> {
        let history = history
            .iter()
            .map(|turn| HistoryEntry {
                role: match turn.role {
                    Role::User => "user",
                    Role::Assistant => "assistant",
                },
                content: &turn.content,
            })
            .collect();

        let (input, source_language) = match input {
            TurnInput::Text {
                text,
                source_language,
            } => (RequestInput::Text { text }, source_language.as_deref()),
            TurnInput::Audio {
                bytes,
                source_language,
            } => (
                RequestInput::Audio {
                    data: BASE64.encode(bytes),
                },
                source_language.as_deref(),
            ),
        };

        ExecuteRequest {
            context: &self.system_message,
            history,
            input,
            source_language,
            temperature: self.temperature.to_string(),
            top_p: self.top_p.to_string(),
            top_k: self.top_k.to_string(),
            max_tokens: self.max_tokens.to_string(),
        }
    }
}
