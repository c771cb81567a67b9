use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use crate::error::AppError;

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
pub struct Author {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub job_title: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub linkedin_url: String,
    #[serde(default)]
    pub github_url: String,
    #[serde(default)]
    pub hobbies: Vec<String>,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct Project {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub category: String,
    pub start_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub description: String,
    pub author_id: String,
    #[serde(default)]
    pub technologies_used: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo_url: Option<String>,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
pub struct Contact {
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct Experience {
    pub job_title: String,
    pub company: String,
    // months
    #[serde(default)]
    pub time_present: u32,
    #[serde(default)]
    pub projects: Vec<Project>,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct Education {
    #[serde(alias = "_id")]
    pub id: String,
    pub university_name: String,
    #[serde(default)]
    pub major: String,
    pub start_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub student_name: String,
    pub student_id: String,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct Resume {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub contact: Contact,
    #[serde(default)]
    pub experience: Vec<Experience>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub education: Vec<Education>,
    pub author_id: String,
    #[serde(default)]
    pub author_name: String,
}

// Search hits across all four collections
#[derive(Serialize, Clone, Debug, Default, PartialEq)]
pub struct SearchResults {
    pub authors: Vec<Author>,
    pub projects: Vec<Project>,
    pub education: Vec<Education>,
    pub resumes: Vec<Resume>,
}

impl SearchResults {
    pub fn total(&self) -> usize {
        self.authors.len() + self.projects.len() + self.education.len() + self.resumes.len()
    }
}

#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct ChatRequest {
    // missing query is treated as empty input, not a decode failure
    #[serde(default)]
    pub query: String,
}

#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct ChatResponse {
    pub response: String,
    pub query: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CountResponse {
    pub count: usize,
}

// Queued chatbot query - holds the query + reply channel
pub struct ChatJob {
    pub query: String,
    pub response_tx: oneshot::Sender<Result<String, AppError>>,
}
