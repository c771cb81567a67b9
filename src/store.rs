use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;
use tracing::info;

use crate::models::{Author, Education, Project, Resume, SearchResults};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse portfolio data: {0}")]
    Parse(#[from] serde_json::Error),
}

// Fields a document exposes to free-text search
pub trait Searchable {
    fn search_fields(&self) -> Vec<&str>;

    fn matches(&self, terms: &[String]) -> bool {
        if terms.is_empty() {
            return true;
        }
        self.search_fields().iter().any(|field| {
            let field = field.to_lowercase();
            terms.iter().any(|term| field.contains(term.as_str()))
        })
    }
}

impl Searchable for Author {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![
            self.name.as_str(),
            self.email.as_str(),
            self.job_title.as_str(),
            self.linkedin_url.as_str(),
            self.github_url.as_str(),
        ];
        fields.extend(self.hobbies.iter().map(String::as_str));
        fields
    }
}

impl Searchable for Project {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![
            self.name.as_str(),
            self.category.as_str(),
            self.description.as_str(),
        ];
        fields.extend(self.technologies_used.iter().map(String::as_str));
        fields
    }
}

impl Searchable for Education {
    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.university_name.as_str(),
            self.major.as_str(),
            self.description.as_str(),
            self.student_name.as_str(),
        ]
    }
}

impl Searchable for Resume {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields: Vec<&str> = self.skills.iter().map(String::as_str).collect();
        fields.push(self.author_name.as_str());
        for job in &self.experience {
            fields.push(job.job_title.as_str());
            fields.push(job.company.as_str());
        }
        fields
    }
}

// Lowercased whitespace-separated terms with edge punctuation stripped;
// any term may match any field
pub fn search_terms(query: &str) -> Vec<String> {
    query
        .to_lowercase()
        .split_whitespace()
        .map(|term| term.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|term| !term.is_empty())
        .map(str::to_string)
        .collect()
}

#[async_trait]
pub trait PortfolioStore: Send + Sync {
    async fn authors(&self) -> Result<Vec<Author>, StoreError>;
    async fn projects(&self) -> Result<Vec<Project>, StoreError>;
    async fn education(&self) -> Result<Vec<Education>, StoreError>;
    async fn resumes(&self) -> Result<Vec<Resume>, StoreError>;

    // No terms means everything
    async fn search_all(&self, query: &str) -> Result<SearchResults, StoreError> {
        let terms = search_terms(query);

        let mut authors = self.authors().await?;
        authors.retain(|a| a.matches(&terms));
        let mut projects = self.projects().await?;
        projects.retain(|p| p.matches(&terms));
        let mut education = self.education().await?;
        education.retain(|e| e.matches(&terms));
        let mut resumes = self.resumes().await?;
        resumes.retain(|r| r.matches(&terms));

        Ok(SearchResults {
            authors,
            projects,
            education,
            resumes,
        })
    }
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct PortfolioData {
    #[serde(default)]
    pub authors: Vec<Author>,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub education: Vec<Education>,
    #[serde(default)]
    pub resumes: Vec<Resume>,
}

// In-memory store loaded once at startup
#[derive(Clone, Debug, Default)]
pub struct JsonStore {
    data: PortfolioData,
}

impl JsonStore {
    pub fn new(data: PortfolioData) -> Self {
        Self { data }
    }

    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let raw = std::fs::read_to_string(path).map_err(|source| StoreError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let store = Self::from_json(&raw)?;

        info!(
            path = %path.display(),
            authors = store.data.authors.len(),
            projects = store.data.projects.len(),
            education = store.data.education.len(),
            resumes = store.data.resumes.len(),
            "Portfolio data loaded"
        );

        Ok(store)
    }

    pub fn from_json(raw: &str) -> Result<Self, StoreError> {
        Ok(Self::new(serde_json::from_str(raw)?))
    }
}

#[async_trait]
impl PortfolioStore for JsonStore {
    async fn authors(&self) -> Result<Vec<Author>, StoreError> {
        Ok(self.data.authors.clone())
    }

    async fn projects(&self) -> Result<Vec<Project>, StoreError> {
        Ok(self.data.projects.clone())
    }

    async fn education(&self) -> Result<Vec<Education>, StoreError> {
        Ok(self.data.education.clone())
    }

    async fn resumes(&self) -> Result<Vec<Resume>, StoreError> {
        Ok(self.data.resumes.clone())
    }
}
