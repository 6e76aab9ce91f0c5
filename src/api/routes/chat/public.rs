//! Public types for the chat API
use serde::{Deserialize, Serialize};

use crate::chat::ConversationTurn;

#[derive(Deserialize)]
pub struct ChatRequest {
    // When absent the server mints a session ID and returns it
    pub session_id: Option<String>,
    pub message: String,
    pub source_language: Option<String>,
}

#[derive(Serialize)]
pub struct ChatResponse {
    pub session_id: String,
    pub response: String,
}

#[derive(Serialize)]
pub struct AudioChatResponse {
    pub session_id: String,
    pub transcribed: String,
    pub response: String,
}

#[derive(Serialize)]
pub struct SessionSummary {
    pub id: String,
    pub turns: usize,
}

#[derive(Serialize)]
pub struct SessionsResponse {
    pub sessions: Vec<SessionSummary>,
}

#[derive(Serialize)]
pub struct TranscriptResponse {
    pub transcript: Vec<ConversationTurn>,
}
