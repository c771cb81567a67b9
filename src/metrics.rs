use lazy_static::lazy_static;
use prometheus::{Counter, Gauge, Histogram, register_counter, register_gauge, register_histogram};


lazy_static! {
    pub static ref CHAT_REQUESTS: Counter =
        register_counter!("portfolio_chatbot_requests_total", "Total chatbot requests").unwrap();
    pub static ref RATE_LIMITED: Counter =
        register_counter!("portfolio_chatbot_rate_limited_total", "Chatbot requests rejected by the rate limiter").unwrap();
    pub static ref INVALID_INPUT: Counter =
        register_counter!("portfolio_chatbot_invalid_input_total", "Chatbot requests rejected by input validation").unwrap();
    pub static ref CHAT_LATENCY: Histogram = register_histogram!(
        "portfolio_chatbot_latency_seconds",
        "Chatbot completion latency in seconds"
    )
    .unwrap();
    pub static ref TRACKED_CLIENTS: Gauge =
        register_gauge!("portfolio_rate_limit_clients", "Client windows currently tracked").unwrap();
}
