use std::sync::Arc;
use tokio::sync::mpsc;
use crate::models::ChatJob;
use crate::rate_limit::RateGovernor;
use crate::store::PortfolioStore;

// Chatbot wiring - present only when a completion provider is configured
pub struct Chatbot {
    pub jobs: mpsc::Sender<ChatJob>,
    pub model: String,
}

// app's shared state
pub struct AppState {
    pub store: Arc<dyn PortfolioStore>,
    pub governor: Arc<RateGovernor>,
    pub chatbot: Option<Chatbot>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn PortfolioStore>,
        governor: Arc<RateGovernor>,
        chatbot: Option<Chatbot>,
    ) -> Arc<Self> {
        Arc::new(Self {
            store,
            governor,
            chatbot,
        })
    }

    pub fn model(&self) -> &str {
        self.chatbot
            .as_ref()
            .map(|c| c.model.as_str())
            .unwrap_or("DISABLED")
    }
}
