use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use portfolio_gateway::{
    app,
    config::Args,
    llm::{OpenAiProvider, PromptTemplate},
    rate_limit::{RateGovernor, cleanup_sweeper},
    state::{AppState, Chatbot},
    store::{JsonStore, PortfolioStore},
    worker::spawn_chat_worker,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    // parse cli arguments
    let args = Args::parse();

    let store: Arc<dyn PortfolioStore> = match &args.data {
        Some(path) => Arc::new(JsonStore::load(path)?),
        None => {
            warn!("No portfolio data file given, serving empty collections");
            Arc::new(JsonStore::default())
        }
    };

    // one registry for the life of the process
    let governor = Arc::new(RateGovernor::default());
    tokio::spawn(cleanup_sweeper(Arc::clone(&governor), args.cleanup_every()));

    let chatbot = match args.api_key() {
        Some(key) => {
            let provider = Arc::new(OpenAiProvider::new(
                reqwest::Client::new(),
                &args.openai_url,
                key.to_string(),
                args.model.clone(),
            ));
            let template = PromptTemplate::new(args.owner.clone(), args.context_limit);
            let jobs = spawn_chat_worker(provider, Arc::clone(&store), template, args.queue_capacity);
            Some(Chatbot {
                jobs,
                model: args.model.clone(),
            })
        }
        None => {
            warn!("OPENAI_API_KEY not set, chatbot disabled");
            None
        }
    };

    let limits = governor.limits();
    let state = AppState::new(store, governor, chatbot);
    let model = state.model().to_string();
    let app = app(state);

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = TcpListener::bind(&addr).await?;

    info!(%addr, %model, "Portfolio gateway running");
    info!(
        per_minute = limits.short_limit,
        per_five_minutes = limits.long_limit,
        "Chatbot rate limits"
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                warn!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
