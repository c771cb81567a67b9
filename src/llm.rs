use async_trait::async_trait;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::SearchResults;

pub const NO_ANSWER: &str = "I'm sorry, I couldn't generate a response. Please try again.";
const TRUNCATION_MARKER: &str = "...[truncated]";

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("provider returned {status}: {body}")]
    Api { status: u16, body: String },
}

// Text in, text out
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;

    fn model(&self) -> &str;
}

// OpenAI-compatible chat completions API
pub struct OpenAiProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiProvider {
    pub fn new(client: reqwest::Client, base_url: &str, api_key: String, model: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model,
        }
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let body = ChatCompletionRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        debug!(model = %self.model, prompt_chars = prompt.len(), "Sending completion request");

        let res = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .timeout(Duration::from_secs(60))
            .json(&body)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let completion: ChatCompletionResponse = res.json().await?;

        match completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
        {
            Some(text) => Ok(text),
            None => {
                warn!(model = %self.model, "Provider returned no choices");
                Ok(NO_ANSWER.to_string())
            }
        }
    }

    fn model(&self) -> &str {
        &self.model
    }
}

// At most `limit` characters, marked when cut
pub fn truncate_context(context: &str, limit: usize) -> String {
    match context.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}{}", &context[..cut], TRUNCATION_MARKER),
        None => context.to_string(),
    }
}

#[derive(Clone, Debug)]
pub struct PromptTemplate {
    pub owner: String,
    pub context_limit: usize,
}

impl PromptTemplate {
    pub fn new(owner: impl Into<String>, context_limit: usize) -> Self {
        Self {
            owner: owner.into(),
            context_limit,
        }
    }

    pub fn render(
        &self,
        results: &SearchResults,
        query: &str,
        now: DateTime<Local>,
    ) -> Result<String, serde_json::Error> {
        let context = serde_json::to_string_pretty(results)?;
        let context = truncate_context(&context, self.context_limit);
        let owner = &self.owner;

        Ok(format!(
            "You are a professional portfolio assistant for {owner}. You have access to \
{owner}'s portfolio data: authors, projects, education and resumes.

CURRENT DATE: {date}

AUTHORS: name, job title, email, LinkedIn and GitHub URLs, hobbies.
PROJECTS: names, descriptions, technologies used, repository links where available.
EDUCATION: university, major, start and end dates.
RESUMES: contact information, work experience, skills and education.

PORTFOLIO DATA:
{context}

USER QUESTION: {query}

Instructions:
- Answer questions about {owner}'s professional background, projects, skills and experience
- Be conversational but professional
- Do not assume {owner} knows technologies that are not referenced in the portfolio
- For questions about specific projects, include the technologies used
- For skills or experience, cite concrete examples from the work history, as bullet points where possible
- If the question is unrelated to the portfolio, politely redirect to professional topics
- Never invent information about {owner}
- Keep responses concise but informative

Please provide a helpful response based on the portfolio data above, separated by newlines where appropriate.
",
            date = now.format("%Y-%m-%d %H:%M:%S"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Author;

    #[test]
    fn short_context_is_untouched() {
        assert_eq!(truncate_context("abc", 10), "abc");
        assert_eq!(truncate_context("abcdefghij", 10), "abcdefghij");
    }

    #[test]
    fn long_context_is_cut_and_marked() {
        assert_eq!(truncate_context("abcdefghijk", 10), "abcdefghij...[truncated]");
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let context = "é".repeat(20);
        let cut = truncate_context(&context, 5);
        assert_eq!(cut, format!("{}{}", "é".repeat(5), TRUNCATION_MARKER));
    }

    #[test]
    fn prompt_carries_query_owner_and_data() {
        let results = SearchResults {
            authors: vec![Author {
                id: "a1".to_string(),
                name: "Sam Rivera".to_string(),
                ..Default::default()
            }],
            ..Default::default()
        };
        let template = PromptTemplate::new("Sam Rivera", 8000);

        let prompt = template
            .render(&results, "What does Sam do?", Local::now())
            .unwrap();

        assert!(prompt.contains("USER QUESTION: What does Sam do?"));
        assert!(prompt.contains("portfolio assistant for Sam Rivera"));
        assert!(prompt.contains("\"id\": \"a1\""));
        assert!(!prompt.contains(TRUNCATION_MARKER));
    }

    #[test]
    fn prompt_context_honours_the_limit() {
        let results = SearchResults {
            authors: vec![Author {
                id: "a1".to_string(),
                name: "x".repeat(200),
                ..Default::default()
            }],
            ..Default::default()
        };
        let template = PromptTemplate::new("Sam", 50);

        let prompt = template.render(&results, "hi", Local::now()).unwrap();

        assert!(prompt.contains(TRUNCATION_MARKER));
        assert!(!prompt.contains(&"x".repeat(200)));
    }
}
