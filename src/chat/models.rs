//! The core models for managing a stateful chat with the hosted model.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// How the user supplied the input for a turn. Assistant turns are always
/// text.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    Text,
    Audio,
}

/// One entry in a conversation. Immutable once created.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
    pub modality: Modality,
}

impl ConversationTurn {
    pub fn user(content: &str, modality: Modality) -> Self {
        Self {
            role: Role::User,
            content: content.to_string(),
            modality,
        }
    }

    pub fn assistant(content: &str) -> Self {
        Self {
            role: Role::Assistant,
            content: content.to_string(),
            modality: Modality::Text,
        }
    }
}

/// Ordered conversation history for one session. Insertion order matters
/// since it is sent as prompt context on every call.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Conversation(Vec<ConversationTurn>);

impl Conversation {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Append a completed user/assistant exchange. This is the only way to
    /// grow a conversation, so history never holds a user turn without its
    /// assistant turn.
    pub(crate) fn apply_exchange(&mut self, user: ConversationTurn, assistant: ConversationTurn) {
        self.0.push(user);
        self.0.push(assistant);
    }
}

/// Conversation state keyed by an explicit session identifier. Lives for
/// one process lifetime; nothing is persisted.
#[derive(Clone, Debug)]
pub struct Session {
    pub id: String,
    pub(crate) conversation: Conversation,
}

impl Session {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            conversation: Conversation::new(),
        }
    }

    /// Mint a session with a fresh ID for clients that did not supply one.
    pub fn with_generated_id() -> Self {
        Self::new(&Uuid::new_v4().to_string())
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }
}
