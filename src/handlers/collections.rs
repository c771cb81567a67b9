use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use std::sync::Arc;
use crate::error::AppError;
use crate::models::{Author, CountResponse, Education, Project, Resume};
use crate::state::AppState;

// Case-insensitive substring match
fn contains(value: &str, wanted: &str) -> bool {
    value.to_lowercase().contains(&wanted.to_lowercase())
}

fn any_contains(values: &[String], wanted: &str) -> bool {
    values.iter().any(|v| contains(v, wanted))
}

// Empty query values count as absent
fn given(param: &Option<String>) -> Option<&str> {
    param.as_deref().filter(|v| !v.is_empty())
}

// Single document lookups answer with a one-element list or 404
fn single<T>(found: Option<T>, what: &'static str) -> Result<Json<Vec<T>>, AppError> {
    found
        .map(|doc| Json(vec![doc]))
        .ok_or(AppError::NotFound(what))
}

#[derive(Deserialize, Default)]
pub struct AuthorFilter {
    pub name: Option<String>,
    pub email: Option<String>,
}

pub async fn authors_handler(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<AuthorFilter>,
) -> Result<Json<Vec<Author>>, AppError> {
    let authors = state.store.authors().await?;

    if let Some(name) = given(&filter.name) {
        return single(authors.into_iter().find(|a| contains(&a.name, name)), "author");
    }
    if let Some(email) = given(&filter.email) {
        return single(authors.into_iter().find(|a| a.email == email), "author");
    }
    Ok(Json(authors))
}

pub async fn authors_count_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CountResponse>, AppError> {
    let count = state.store.authors().await?.len();
    Ok(Json(CountResponse { count }))
}

#[derive(Deserialize, Default)]
pub struct ProjectFilter {
    pub name: Option<String>,
    pub category: Option<String>,
    pub technology: Option<String>,
    pub author_id: Option<String>,
}

pub async fn projects_handler(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<ProjectFilter>,
) -> Result<Json<Vec<Project>>, AppError> {
    let mut projects = state.store.projects().await?;

    if let Some(name) = given(&filter.name) {
        return single(projects.into_iter().find(|p| contains(&p.name, name)), "project");
    }
    if let Some(category) = given(&filter.category) {
        projects.retain(|p| contains(&p.category, category));
    } else if let Some(technology) = given(&filter.technology) {
        projects.retain(|p| any_contains(&p.technologies_used, technology));
    } else if let Some(author_id) = given(&filter.author_id) {
        projects.retain(|p| p.author_id == author_id);
    }
    Ok(Json(projects))
}

pub async fn projects_count_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CountResponse>, AppError> {
    let count = state.store.projects().await?.len();
    Ok(Json(CountResponse { count }))
}

#[derive(Deserialize, Default)]
pub struct EducationFilter {
    pub university: Option<String>,
    pub major: Option<String>,
    pub student_id: Option<String>,
}

pub async fn education_handler(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<EducationFilter>,
) -> Result<Json<Vec<Education>>, AppError> {
    let mut education = state.store.education().await?;

    if let Some(university) = given(&filter.university) {
        education.retain(|e| contains(&e.university_name, university));
    } else if let Some(major) = given(&filter.major) {
        education.retain(|e| contains(&e.major, major));
    } else if let Some(student_id) = given(&filter.student_id) {
        education.retain(|e| e.student_id == student_id);
    }
    Ok(Json(education))
}

pub async fn education_count_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CountResponse>, AppError> {
    let count = state.store.education().await?.len();
    Ok(Json(CountResponse { count }))
}

#[derive(Deserialize, Default)]
pub struct ResumeFilter {
    pub author_id: Option<String>,
    pub skill: Option<String>,
}

pub async fn resumes_handler(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<ResumeFilter>,
) -> Result<Json<Vec<Resume>>, AppError> {
    let mut resumes = state.store.resumes().await?;

    if let Some(author_id) = given(&filter.author_id) {
        return single(resumes.into_iter().find(|r| r.author_id == author_id), "resume");
    }
    if let Some(skill) = given(&filter.skill) {
        resumes.retain(|r| any_contains(&r.skills, skill));
    }
    Ok(Json(resumes))
}

pub async fn resumes_count_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CountResponse>, AppError> {
    let count = state.store.resumes().await?.len();
    Ok(Json(CountResponse { count }))
}
