//! Router for the chat API

use std::sync::{Arc, RwLock};

use axum::{
    Router,
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use super::public;
use crate::aixplain::ModelClient;
use crate::api::public::ApiError;
use crate::api::state::AppState;
use crate::chat::{ChatError, Role, Session, TurnInput};

type SharedState = Arc<RwLock<AppState>>;

/// Pull a snapshot of the session (or start a fresh one) plus a client
/// handle out of shared state, so no lock is held across the model call.
fn checkout_session(state: &SharedState, session_id: Option<String>) -> (ModelClient, Session) {
    let shared_state = state.read().expect("Unable to read shared state");
    let client = shared_state.client.clone();
    let session = match session_id {
        Some(id) => shared_state
            .sessions
            .get(&id)
            .cloned()
            .unwrap_or_else(|| Session::new(&id)),
        None => Session::with_generated_id(),
    };
    (client, session)
}

/// Write the session back after a successful exchange. Failed calls never
/// reach this point, which keeps history untouched for retries.
fn checkin_session(state: &SharedState, session: Session) {
    let mut shared_state = state.write().expect("Unable to write shared state");
    shared_state.sessions.insert(session.id.clone(), session);
}

/// Submit a text turn and return the assistant's response
async fn chat_handler(
    State(state): State<SharedState>,
    axum::Json(payload): axum::Json<public::ChatRequest>,
) -> Result<axum::Json<public::ChatResponse>, ApiError> {
    let (client, mut session) = checkout_session(&state, payload.session_id);

    let input = TurnInput::Text {
        text: payload.message,
        source_language: payload.source_language,
    };
    let assistant = session.submit_turn(&client, input).await?;

    let session_id = session.id.clone();
    checkin_session(&state, session);

    Ok(axum::Json(public::ChatResponse {
        session_id,
        response: assistant.content,
    }))
}

/// Submit an audio turn. Expects a multipart form with an `audio` file
/// field and optional `session_id` / `source_language` text fields. The
/// endpoint transcribes the audio; the transcription is returned alongside
/// the response so the UI can show what was heard.
async fn audio_chat_handler(
    State(state): State<SharedState>,
    mut multipart: Multipart,
) -> Result<axum::Json<public::AudioChatResponse>, ApiError> {
    let mut audio: Option<Vec<u8>> = None;
    let mut session_id: Option<String> = None;
    let mut source_language: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ChatError::InvalidInput(format!("invalid multipart payload: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "audio" => {
                let bytes = field.bytes().await.map_err(|e| {
                    ChatError::InvalidInput(format!("failed reading 'audio' field: {e}"))
                })?;
                if bytes.is_empty() {
                    return Err(ChatError::InvalidInput(
                        "multipart 'audio' field is empty".to_string(),
                    )
                    .into());
                }
                audio = Some(bytes.to_vec());
            }
            "session_id" => {
                let text = field.text().await.map_err(|e| {
                    ChatError::InvalidInput(format!("failed reading 'session_id' field: {e}"))
                })?;
                if !text.trim().is_empty() {
                    session_id = Some(text);
                }
            }
            "source_language" => {
                let text = field.text().await.map_err(|e| {
                    ChatError::InvalidInput(format!("failed reading 'source_language' field: {e}"))
                })?;
                if !text.trim().is_empty() {
                    source_language = Some(text);
                }
            }
            _ => {}
        }
    }

    let audio =
        audio.ok_or_else(|| ChatError::InvalidInput("no audio file provided".to_string()))?;

    let (client, mut session) = checkout_session(&state, session_id);
    let input = TurnInput::Audio {
        bytes: audio,
        source_language,
    };
    let assistant = session.submit_turn(&client, input).await?;

    // The user turn recorded for this exchange carries the transcription
    let transcribed = session
        .conversation()
        .turns()
        .iter()
        .rev()
        .find(|turn| turn.role == Role::User)
        .map(|turn| turn.content.clone())
        .unwrap_or_default();

    let session_id = session.id.clone();
    checkin_session(&state, session);

    Ok(axum::Json(public::AudioChatResponse {
        session_id,
        transcribed,
        response: assistant.content,
    }))
}

/// Get the transcript of a single chat session by ID
async fn chat_transcript(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let shared_state = state.read().expect("Unable to read shared state");

    match shared_state.sessions.get(&id) {
        Some(session) => axum::Json(public::TranscriptResponse {
            transcript: session.conversation().turns().to_vec(),
        })
        .into_response(),
        None => (
            StatusCode::NOT_FOUND,
            format!("Chat session {} not found", id),
        )
            .into_response(),
    }
}

/// List all in-memory chat sessions
async fn chat_sessions(State(state): State<SharedState>) -> axum::Json<public::SessionsResponse> {
    let shared_state = state.read().expect("Unable to read shared state");

    let mut sessions: Vec<_> = shared_state
        .sessions
        .values()
        .map(|session| public::SessionSummary {
            id: session.id.clone(),
            turns: session.conversation().len(),
        })
        .collect();
    sessions.sort_by(|a, b| a.id.cmp(&b.id));

    axum::Json(public::SessionsResponse { sessions })
}

/// Reset a session, clearing its conversation history
async fn chat_reset(State(state): State<SharedState>, Path(id): Path<String>) -> impl IntoResponse {
    let mut shared_state = state.write().expect("Unable to write shared state");

    match shared_state.sessions.remove(&id) {
        Some(_) => StatusCode::NO_CONTENT.into_response(),
        None => (
            StatusCode::NOT_FOUND,
            format!("Chat session {} not found", id),
        )
            .into_response(),
    }
}

/// Create the chat router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", post(chat_handler))
        .route("/audio", post(audio_chat_handler))
        .route("/sessions", get(chat_sessions))
        .route("/{id}", get(chat_transcript).delete(chat_reset))
}
