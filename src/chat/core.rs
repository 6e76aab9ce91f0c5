//! Session orchestration between the HTTP layer and the model client.
//!
//! A `Session` owns the conversation history for one browser session and
//! exposes a single `submit_turn` operation. History is only mutated after
//! the remote call succeeds, so any failure leaves the session exactly as
//! it was and the caller can resend the same input.

use crate::aixplain::ModelClient;
use crate::chat::error::ChatError;
use crate::chat::models::{ConversationTurn, Modality, Session};

/// New input for one turn, in whichever modality the UI captured it.
#[derive(Clone, Debug)]
pub enum TurnInput {
    Text {
        text: String,
        source_language: Option<String>,
    },
    Audio {
        bytes: Vec<u8>,
        source_language: Option<String>,
    },
}

impl TurnInput {
    fn validate(&self) -> Result<(), ChatError> {
        match self {
            TurnInput::Text { text, .. } if text.trim().is_empty() => Err(
                ChatError::InvalidInput("message text is empty".to_string()),
            ),
            TurnInput::Audio { bytes, .. } if bytes.is_empty() => Err(ChatError::InvalidInput(
                "audio payload is empty".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

impl Session {
    /// Submit one turn: send current history plus the new input to the
    /// model and, on success, append the user turn and the returned
    /// assistant turn. Returns the assistant turn.
    ///
    /// For audio input the user turn's content is the transcription the
    /// endpoint produced, recorded with `Modality::Audio`.
    pub async fn submit_turn(
        &mut self,
        client: &ModelClient,
        input: TurnInput,
    ) -> Result<ConversationTurn, ChatError> {
        input.validate()?;

        let generation = client.generate(self.conversation.turns(), &input).await?;

        let user_turn = match &input {
            TurnInput::Text { text, .. } => ConversationTurn::user(text, Modality::Text),
            TurnInput::Audio { .. } => {
                // The endpoint transcribes audio itself. If it didn't echo
                // the transcription back, keep a placeholder so the turn
                // still reads sensibly in the transcript.
                let transcribed = generation
                    .transcription
                    .as_deref()
                    .unwrap_or("(audio input)");
                ConversationTurn::user(transcribed, Modality::Audio)
            }
        };
        let assistant_turn = ConversationTurn::assistant(&generation.text);
        self.conversation
            .apply_exchange(user_turn, assistant_turn.clone());

        Ok(assistant_turn)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::chat::models::Role;
    use crate::core::{AppConfig, ModelChoice};

    fn test_client(api_hostname: &str) -> ModelClient {
        let config = AppConfig {
            api_hostname: api_hostname.to_string(),
            api_key: "test-api-key".to_string(),
            model: ModelChoice::Small,
            system_message: "You are a helpful medical assistant.".to_string(),
            max_attempts: 4,
            retry_delay: Duration::ZERO,
            temperature: 1.0,
            top_p: 0.9,
            top_k: 50,
            max_tokens: 100,
        };
        ModelClient::new(&config).expect("Failed to build model client")
    }

    fn execute_path() -> String {
        format!("/api/v1/execute/{}", ModelChoice::Small.model_id())
    }

    #[tokio::test]
    async fn test_submit_text_turn_appends_exchange() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", execute_path().as_str())
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"status":"SUCCESS","data":"Those symptoms are consistent with a viral upper respiratory infection."}"#)
            .create();

        let client = test_client(&server.url());
        let mut session = Session::new("test-session");
        assert!(session.conversation().is_empty());

        let input = TurnInput::Text {
            text: "fever and cough for 3 days".to_string(),
            source_language: None,
        };
        let assistant = session
            .submit_turn(&client, input)
            .await
            .expect("submit_turn should succeed");

        assert!(!assistant.content.is_empty());
        let turns = session.conversation().turns();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].role, Role::User);
        assert_eq!(turns[0].content, "fever and cough for 3 days");
        assert_eq!(turns[0].modality, Modality::Text);
        assert_eq!(turns[1].role, Role::Assistant);
        assert_eq!(turns[1], assistant);
    }

    #[tokio::test]
    async fn test_history_grows_by_two_per_successful_turn() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", execute_path().as_str())
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"status":"SUCCESS","data":"Answer."}"#)
            .expect(3)
            .create();

        let client = test_client(&server.url());
        let mut session = Session::new("test-session");

        for (i, question) in ["first", "second", "third"].iter().enumerate() {
            let input = TurnInput::Text {
                text: question.to_string(),
                source_language: None,
            };
            session.submit_turn(&client, input).await.unwrap();
            assert_eq!(session.conversation().len(), (i + 1) * 2);
        }
    }

    #[tokio::test]
    async fn test_warm_up_exhaustion_leaves_history_unchanged() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", execute_path().as_str())
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"status":"WARMING_UP","message":"Model is scaling up"}"#)
            .expect(4)
            .create();

        let client = test_client(&server.url());
        let mut session = Session::new("test-session");
        let input = TurnInput::Text {
            text: "fever and cough for 3 days".to_string(),
            source_language: None,
        };

        let err = session.submit_turn(&client, input).await.unwrap_err();
        assert!(err.is_retryable());
        assert!(matches!(err, ChatError::Retryable { attempts: 4 }));
        assert!(session.conversation().is_empty());
        // One request per attempt, identical payload each time
        mock.assert();
    }

    #[tokio::test]
    async fn test_remote_error_leaves_history_unchanged() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", execute_path().as_str())
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"status":"ERROR","message":"Unsupported input"}"#)
            .create();

        let client = test_client(&server.url());
        let mut session = Session::new("test-session");
        let input = TurnInput::Text {
            text: "fever and cough for 3 days".to_string(),
            source_language: None,
        };

        let err = session.submit_turn(&client, input).await.unwrap_err();
        match err {
            ChatError::Remote(msg) => assert!(msg.contains("Unsupported input")),
            other => panic!("Expected a remote error, got: {other}"),
        }
        assert!(session.conversation().is_empty());
    }

    #[tokio::test]
    async fn test_audio_turn_records_transcription_after_warm_up() {
        use std::sync::Arc;
        use std::sync::atomic::{AtomicU32, Ordering};

        let mut server = mockito::Server::new_async().await;
        // Three warm-up responses, then a success on the fourth attempt
        let hits = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&hits);
        let mock = server
            .mock("POST", execute_path().as_str())
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body_from_request(move |_| {
                if counter.fetch_add(1, Ordering::SeqCst) < 3 {
                    br#"{"status":"WARMING_UP"}"#.to_vec()
                } else {
                    br#"{"status":"SUCCESS","data":"Stay hydrated and rest.","transcription":"I have a sore throat"}"#.to_vec()
                }
            })
            .expect(4)
            .create();

        let client = test_client(&server.url());
        let mut session = Session::new("test-session");
        let input = TurnInput::Audio {
            bytes: vec![0x52, 0x49, 0x46, 0x46],
            source_language: Some("en".to_string()),
        };

        let assistant = session.submit_turn(&client, input).await.unwrap();
        mock.assert();
        assert_eq!(hits.load(Ordering::SeqCst), 4);

        assert_eq!(assistant.content, "Stay hydrated and rest.");
        let turns = session.conversation().turns();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].content, "I have a sore throat");
        assert_eq!(turns[0].modality, Modality::Audio);
        assert_eq!(turns[1].modality, Modality::Text);
    }

    #[tokio::test]
    async fn test_empty_audio_rejected_before_any_request() {
        // Unroutable hostname: validation must fail before a request is made
        let client = test_client("http://127.0.0.1:9");
        let mut session = Session::new("test-session");
        let input = TurnInput::Audio {
            bytes: Vec::new(),
            source_language: None,
        };

        let err = session.submit_turn(&client, input).await.unwrap_err();
        assert!(matches!(err, ChatError::InvalidInput(_)));
        assert!(session.conversation().is_empty());
    }
}
