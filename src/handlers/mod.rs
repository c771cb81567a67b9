mod chatbot;
mod collections;
mod health;
mod metrics;
mod search;

pub use chatbot::chatbot_handler;
pub use collections::{
    authors_count_handler, authors_handler, education_count_handler, education_handler,
    projects_count_handler, projects_handler, resumes_count_handler, resumes_handler,
};
pub use health::health_handler;
pub use metrics::metrics_handler;
pub use search::search_handler;
