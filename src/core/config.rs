use std::env;
use std::time::Duration;

/// Model ID for the OpenBioLLM 8B deployment. Slower to warm up but cheap
/// to keep running.
pub const OPENBIOLLM_8B_MODEL_ID: &str = "677c18696eb5634c19191911";

/// Model ID for the OpenBioLLM 70B deployment.
pub const OPENBIOLLM_70B_MODEL_ID: &str = "6626a3a8c8f1d089790cf5a2";

const DEFAULT_SYSTEM_MESSAGE: &str = "You are an expert and experienced from the healthcare and biomedical \
     domain with extensive medical knowledge and practical experience. Your \
     name is OpenBioLLM. In your explanation, leverage your deep medical \
     expertise such as relevant anatomical structures, physiological \
     processes, diagnostic criteria, treatment guidelines, or other \
     pertinent medical concepts. Use precise medical terminology while \
     still aiming to make the explanation clear and accessible to a \
     general audience.";

/// Which of the two deployed biomedical models to use. Picked once at
/// startup via `BIOCHAT_MODEL`, never per request.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ModelChoice {
    Small,
    Large,
}

impl ModelChoice {
    pub fn model_id(&self) -> &'static str {
        match self {
            ModelChoice::Small => OPENBIOLLM_8B_MODEL_ID,
            ModelChoice::Large => OPENBIOLLM_70B_MODEL_ID,
        }
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api_hostname: String,
    pub api_key: String,
    pub model: ModelChoice,
    pub system_message: String,
    pub max_attempts: u32,
    pub retry_delay: Duration,
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_tokens: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        let api_hostname = env::var("BIOCHAT_API_HOSTNAME")
            .unwrap_or_else(|_| "https://models.aixplain.com".to_string());
        // An empty key is rejected by `ModelClient::new` before any request
        // is attempted
        let api_key = env::var("AIXPLAIN_API_KEY").unwrap_or_default();
        let model = match env::var("BIOCHAT_MODEL").as_deref() {
            Ok("70b") => ModelChoice::Large,
            _ => ModelChoice::Small,
        };
        let system_message = env::var("BIOCHAT_SYSTEM_MESSAGE")
            .unwrap_or_else(|_| DEFAULT_SYSTEM_MESSAGE.to_string());
        // Early calls after a cold start routinely report warming up, so
        // the client re-sends a few times before giving up
        let max_attempts = env::var("BIOCHAT_MAX_ATTEMPTS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(4);
        let retry_delay_ms = env::var("BIOCHAT_RETRY_DELAY_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(2000);

        Self {
            api_hostname,
            api_key,
            model,
            system_message,
            max_attempts,
            retry_delay: Duration::from_millis(retry_delay_ms),
            temperature: 1.0,
            top_p: 0.9,
            top_k: 50,
            max_tokens: 100,
        }
    }
}
