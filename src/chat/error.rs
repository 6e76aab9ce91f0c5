//! Error taxonomy for the chat pipeline.
//!
//! Failures split into one retryable case (the endpoint is still warming
//! up or timed out while scaling) and fatal cases (bad local config, an
//! unrecoverable remote error, a transport failure). The HTTP layer maps
//! each variant to a status code in `api::public`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChatError {
    /// The endpoint reported warm-up or timeout on every attempt within
    /// the retry budget. Resending the same input later is safe because a
    /// failed call never touches conversation history.
    #[error("model endpoint is still warming up after {attempts} attempts, resend the request")]
    Retryable { attempts: u32 },

    /// Missing or unusable local configuration. No request was attempted.
    #[error("configuration error: {0}")]
    Config(String),

    /// The endpoint returned an unrecoverable error. The remote message is
    /// passed through verbatim.
    #[error("model endpoint error: {0}")]
    Remote(String),

    /// Transport-level failure before a usable response was read.
    #[error("network error calling model endpoint: {0}")]
    Network(#[from] reqwest::Error),

    /// The caller handed over input the pipeline cannot use.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl ChatError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, ChatError::Retryable { .. })
    }
}
