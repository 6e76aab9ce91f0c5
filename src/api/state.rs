use std::collections::HashMap;

use crate::aixplain::ModelClient;
use crate::chat::Session;
use crate::core::AppConfig;

pub struct AppState {
    // In-memory session store; history lives for one process lifetime
    pub sessions: HashMap<String, Session>,
    pub client: ModelClient,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(client: ModelClient, config: AppConfig) -> Self {
        Self {
            sessions: HashMap::new(),
            client,
            config,
        }
    }
}
