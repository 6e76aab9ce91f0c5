//! Test utilities for integration tests
use std::sync::{Arc, RwLock};
use std::time::Duration;

use axum::{Router, body::Body};

use biochat::aixplain::ModelClient;
use biochat::api::AppState;
use biochat::api::app;
use biochat::core::{AppConfig, ModelChoice};

/// Path the model client posts to for the model under test.
pub fn execute_path() -> String {
    format!("/api/v1/execute/{}", ModelChoice::Small.model_id())
}

fn test_config(api_hostname: &str) -> AppConfig {
    AppConfig {
        api_hostname: api_hostname.to_string(),
        api_key: String::from("test-api-key"),
        model: ModelChoice::Small,
        system_message: String::from("You are a helpful medical assistant."),
        max_attempts: 4,
        // No point sleeping between mocked attempts
        retry_delay: Duration::ZERO,
        temperature: 1.0,
        top_p: 0.9,
        top_k: 50,
        max_tokens: 100,
    }
}

/// Creates a test application router pointed at a mock model endpoint.
///
/// Pass the URL of a `mockito::Server` standing in for the hosted model
/// API; each test owns its own server and app, so tests run in parallel.
pub fn test_app(model_api_url: &str) -> Router {
    let config = test_config(model_api_url);
    let client = ModelClient::new(&config).expect("Failed to build model client");
    let app_state = AppState::new(client, config);
    app(Arc::new(RwLock::new(app_state)))
}

pub async fn body_to_string(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Failed to read response body");
    String::from_utf8(bytes.to_vec()).expect("Response body was not UTF-8")
}

/// Build a multipart/form-data body for the audio chat endpoint.
pub fn multipart_audio_body(
    boundary: &str,
    audio: &str,
    session_id: Option<&str>,
    source_language: Option<&str>,
) -> String {
    let mut body = String::new();
    if let Some(id) = session_id {
        body.push_str(&format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"session_id\"\r\n\r\n{id}\r\n"
        ));
    }
    if let Some(lang) = source_language {
        body.push_str(&format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"source_language\"\r\n\r\n{lang}\r\n"
        ));
    }
    body.push_str(&format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"audio\"; filename=\"clip.wav\"\r\nContent-Type: audio/wav\r\n\r\n{audio}\r\n--{boundary}--\r\n"
    ));
    body
}
