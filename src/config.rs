use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

// CLI argument structure
#[derive(Parser, Debug, Clone)]
#[command(name = "portfolio-gateway")]
#[command(about = "Read-only portfolio API with a rate limited chatbot")]
pub struct Args {
    // Port to run the server on
    #[arg(short, long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    // JSON file holding authors, projects, education and resumes
    #[arg(short, long, env = "PORTFOLIO_DATA")]
    pub data: Option<PathBuf>,

    // Chatbot is disabled without a key
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    #[arg(short, long, env = "OPENAI_MODEL", default_value = "gpt-3.5-turbo")]
    pub model: String,

    #[arg(long, env = "OPENAI_BASE_URL", default_value = "https://api.openai.com/v1")]
    pub openai_url: String,

    // Whose portfolio this is, as the assistant should call them
    #[arg(long, default_value = "the portfolio owner")]
    pub owner: String,

    // Rate limiter sweep interval in seconds
    #[arg(long, default_value_t = 300)]
    pub cleanup_interval: u64,

    // Max characters of portfolio context sent with a query
    #[arg(long, default_value_t = 8000)]
    pub context_limit: usize,

    // Chat queries allowed to wait for the worker
    #[arg(long, default_value_t = 100)]
    pub queue_capacity: usize,
}

impl Args {
    pub fn api_key(&self) -> Option<&str> {
        self.openai_api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    pub fn cleanup_every(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval.max(1))
    }
}
