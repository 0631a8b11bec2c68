//! Server state and configuration.

use crate::job::Normalizer;
use crate::printer::PrintDispatcher;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on (e.g., "0.0.0.0:8080")
    pub listen_addr: String,
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self {
            listen_addr: format!("{}:{}", host, port),
        }
    }
}

/// Application state shared across handlers.
pub struct AppState {
    pub dispatcher: PrintDispatcher,
    pub normalizer: Normalizer,
}

impl AppState {
    pub fn new(dispatcher: PrintDispatcher) -> Self {
        Self {
            dispatcher,
            normalizer: Normalizer::default(),
        }
    }

    pub fn with_normalizer(mut self, normalizer: Normalizer) -> Self {
        self.normalizer = normalizer;
        self
    }
}
