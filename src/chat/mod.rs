//! Conversation state and session orchestration.

mod core;
mod error;
mod models;

pub use self::core::TurnInput;
pub use error::ChatError;
pub use models::{Conversation, ConversationTurn, Modality, Role, Session};
