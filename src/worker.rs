use chrono::Local;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::error::AppError;
use crate::llm::{CompletionProvider, PromptTemplate};
use crate::models::ChatJob;
use crate::store::PortfolioStore;

// Spawn the chat worker and hand back the sending side of its queue
pub fn spawn_chat_worker(
    provider: Arc<dyn CompletionProvider>,
    store: Arc<dyn PortfolioStore>,
    template: PromptTemplate,
    capacity: usize,
) -> mpsc::Sender<ChatJob> {
    let (tx, rx) = mpsc::channel::<ChatJob>(capacity);
    tokio::spawn(chat_worker(rx, provider, store, template));
    tx
}

// One query at a time - at most one completion in flight upstream
pub async fn chat_worker(
    mut rx: mpsc::Receiver<ChatJob>,
    provider: Arc<dyn CompletionProvider>,
    store: Arc<dyn PortfolioStore>,
    template: PromptTemplate,
) {
    info!(model = provider.model(), "Chat worker started - processing queries sequentially");

    while let Some(job) = rx.recv().await {
        let result = answer(provider.as_ref(), store.as_ref(), &template, &job.query).await;

        if let Err(e) = &result {
            warn!(error = %e, "Chat query failed");
        }

        // Handler may have gone away; nothing to do then
        let _ = job.response_tx.send(result);
    }

    info!("Chat worker stopped");
}

async fn answer(
    provider: &dyn CompletionProvider,
    store: &dyn PortfolioStore,
    template: &PromptTemplate,
    query: &str,
) -> Result<String, AppError> {
    let results = store.search_all(query).await?;

    debug!(
        authors = results.authors.len(),
        projects = results.projects.len(),
        education = results.education.len(),
        resumes = results.resumes.len(),
        "Portfolio context gathered"
    );

    let prompt = template.render(&results, query, Local::now())?;
    let response = provider.complete(&prompt).await?;

    info!(chars = response.len(), "Completion received");
    Ok(response)
}
