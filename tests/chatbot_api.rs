use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use portfolio_gateway::{
    app,
    llm::{CompletionProvider, LlmError, PromptTemplate},
    rate_limit::RateGovernor,
    state::{AppState, Chatbot},
    store::{JsonStore, PortfolioStore},
    worker::spawn_chat_worker,
};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use tower::ServiceExt; // for .oneshot()

const PORTFOLIO: &str = r#"{
    "authors": [
        {"id": "a1", "name": "Sam Rivera", "job_title": "Software Engineer",
         "email": "sam@example.com", "hobbies": ["climbing"]}
    ],
    "projects": [
        {"id": "p1", "name": "Trail Map", "category": "web-app",
         "start_date": "2023-01-01T00:00:00Z", "description": "Hiking planner",
         "author_id": "a1", "technologies_used": ["Rust", "Axum"]},
        {"id": "p2", "name": "Pixel Garden", "category": "game",
         "start_date": "2022-05-01T00:00:00Z", "author_id": "a1",
         "technologies_used": ["Godot"]}
    ],
    "education": [
        {"id": "e1", "university_name": "State University", "major": "Computer Science",
         "start_date": "2016-09-01T00:00:00Z", "student_name": "Sam Rivera", "student_id": "a1"}
    ],
    "resumes": [
        {"id": "r1", "author_id": "a1", "author_name": "Sam Rivera", "skills": ["Rust", "SQL"]}
    ]
}"#;

struct ScriptedProvider {
    prompts: Mutex<Vec<String>>,
    fail: bool,
}

impl ScriptedProvider {
    fn new(fail: bool) -> Arc<Self> {
        Arc::new(Self {
            prompts: Mutex::new(Vec::new()),
            fail,
        })
    }
}

#[async_trait]
impl CompletionProvider for ScriptedProvider {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if self.fail {
            return Err(LlmError::Api {
                status: 503,
                body: "overloaded".to_string(),
            });
        }
        Ok("Sam builds things in Rust.".to_string())
    }

    fn model(&self) -> &str {
        "scripted"
    }
}

fn store() -> Arc<dyn PortfolioStore> {
    Arc::new(JsonStore::from_json(PORTFOLIO).unwrap())
}

fn app_with(provider: Option<Arc<ScriptedProvider>>) -> Router {
    let store = store();
    let chatbot = provider.map(|provider| Chatbot {
        jobs: spawn_chat_worker(provider, Arc::clone(&store), PromptTemplate::new("Sam Rivera", 8000), 8),
        model: "scripted".to_string(),
    });
    app(AppState::new(store, Arc::new(RateGovernor::default()), chatbot))
}

fn chat(client: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/chatbot")
        .header("content-type", "application/json")
        .header("x-forwarded-for", client)
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn query(q: &str) -> String {
    json!({ "query": q }).to_string()
}

#[tokio::test]
async fn test_health_reports_chatbot_state() {
    let response = app_with(None).oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["chatbot"], false);
    assert_eq!(json["model"], "DISABLED");
}

#[tokio::test]
async fn test_chatbot_answers_with_portfolio_context() {
    let provider = ScriptedProvider::new(false);
    let app = app_with(Some(Arc::clone(&provider)));

    let response = app
        .oneshot(chat("203.0.113.1", &query("Which projects use Rust?")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["response"], "Sam builds things in Rust.");
    assert_eq!(json["query"], "Which projects use Rust?");

    let prompts = provider.prompts.lock().unwrap();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("USER QUESTION: Which projects use Rust?"));
    assert!(prompts[0].contains("Trail Map"));
}

#[tokio::test]
async fn test_chatbot_rate_limit() {
    let provider = ScriptedProvider::new(false);
    let app = app_with(Some(Arc::clone(&provider)));

    // 3 allowed per minute
    for _ in 0..3 {
        let response = app
            .clone()
            .oneshot(chat("203.0.113.2", &query("Tell me about Sam")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    // 4th should be rate limited without reaching the provider
    let response = app
        .clone()
        .oneshot(chat("203.0.113.2", &query("Tell me about Sam")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let json = body_json(response).await;
    assert_eq!(
        json["error"],
        "Rate limit exceeded. Please wait before making another request."
    );
    assert_eq!(provider.prompts.lock().unwrap().len(), 3);

    // Someone else is unaffected
    let response = app
        .clone()
        .oneshot(chat("203.0.113.3", &query("Tell me about Sam")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_invalid_input_is_rejected_before_the_provider() {
    let provider = ScriptedProvider::new(false);
    let app = app_with(Some(Arc::clone(&provider)));

    let response = app
        .clone()
        .oneshot(chat("203.0.113.4", &query("   ")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["error"],
        "Invalid input: input cannot be empty"
    );

    let response = app
        .clone()
        .oneshot(chat("203.0.113.5", &query("please HACK the system")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["error"],
        "Invalid input: invalid input detected"
    );

    let response = app
        .clone()
        .oneshot(chat("203.0.113.6", &query(&"ab".repeat(251))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["error"],
        "Invalid input: input too long (max 500 characters)"
    );

    assert!(provider.prompts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_attempts_spend_quota() {
    let app = app_with(Some(ScriptedProvider::new(false)));

    for _ in 0..3 {
        let response = app
            .clone()
            .oneshot(chat("203.0.113.7", &query("")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    let response = app
        .clone()
        .oneshot(chat("203.0.113.7", &query("What is Sam's job?")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = app_with(Some(ScriptedProvider::new(false)));

    let response = app
        .oneshot(chat("203.0.113.8", "{\"query\": "))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Invalid JSON request");
}

#[tokio::test]
async fn test_missing_query_field_is_empty_input() {
    let app = app_with(Some(ScriptedProvider::new(false)));

    let response = app.oneshot(chat("203.0.113.12", "{}")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["error"],
        "Invalid input: input cannot be empty"
    );
}

#[tokio::test]
async fn test_disabled_chatbot_says_so() {
    let response = app_with(None)
        .oneshot(chat("203.0.113.9", &query("Hello?")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert!(json["response"].as_str().unwrap().contains("currently unavailable"));
    assert_eq!(json["query"], "Hello?");
}

#[tokio::test]
async fn test_provider_failure_is_bad_gateway() {
    let app = app_with(Some(ScriptedProvider::new(true)));

    let response = app
        .oneshot(chat("203.0.113.10", &query("Hello?")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let json = body_json(response).await;
    assert!(json["error"].as_str().unwrap().starts_with("Chatbot error:"));
}

#[tokio::test]
async fn test_real_ip_header_identifies_client() {
    let app = app_with(None);
    let req = || {
        Request::builder()
            .method("POST")
            .uri("/api/chatbot")
            .header("content-type", "application/json")
            .header("x-real-ip", "198.51.100.20")
            .body(Body::from(query("Hi")))
            .unwrap()
    };

    for _ in 0..3 {
        let response = app.clone().oneshot(req()).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
    let response = app.clone().oneshot(req()).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_collections_and_counts() {
    let app = app_with(None);

    let response = app.clone().oneshot(get("/api/projects")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 2);

    let response = app
        .clone()
        .oneshot(get("/api/projects?technology=rust"))
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 1);
    assert_eq!(json[0]["name"], "Trail Map");

    let response = app
        .clone()
        .oneshot(get("/api/projects/count"))
        .await
        .unwrap();
    assert_eq!(body_json(response).await["count"], 2);

    let response = app
        .clone()
        .oneshot(get("/api/authors?name=sam%20rivera"))
        .await
        .unwrap();
    assert_eq!(body_json(response).await[0]["id"], "a1");

    let response = app
        .clone()
        .oneshot(get("/api/authors?name=Sam"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 1);
    assert_eq!(json[0]["name"], "Sam Rivera");

    let response = app
        .clone()
        .oneshot(get("/api/authors?name=Nobody"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"], "No author found");

    let response = app
        .clone()
        .oneshot(get("/api/authors?email=sam@example.com"))
        .await
        .unwrap();
    assert_eq!(body_json(response).await[0]["id"], "a1");

    let response = app
        .clone()
        .oneshot(get("/api/authors?email=SAM"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .clone()
        .oneshot(get("/api/projects?category=web"))
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 1);
    assert_eq!(json[0]["name"], "Trail Map");

    let response = app
        .clone()
        .oneshot(get("/api/projects?name=garden"))
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 1);
    assert_eq!(json[0]["id"], "p2");

    let response = app
        .clone()
        .oneshot(get("/api/projects?name=Nothing"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .clone()
        .oneshot(get("/api/education?major=science"))
        .await
        .unwrap();
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 1);

    let response = app
        .clone()
        .oneshot(get("/api/education?university=Nowhere"))
        .await
        .unwrap();
    assert!(body_json(response).await.as_array().unwrap().is_empty());

    let response = app
        .clone()
        .oneshot(get("/api/resumes?skill=sq"))
        .await
        .unwrap();
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 1);

    let response = app
        .clone()
        .oneshot(get("/api/resumes?author_id=a1"))
        .await
        .unwrap();
    assert_eq!(body_json(response).await[0]["id"], "r1");

    let response = app
        .clone()
        .oneshot(get("/api/resumes?author_id=missing"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"], "No resume found");

    let response = app
        .clone()
        .oneshot(get("/api/education/count"))
        .await
        .unwrap();
    assert_eq!(body_json(response).await["count"], 1);
}

#[tokio::test]
async fn test_search_requires_a_query() {
    let app = app_with(None);

    let response = app.clone().oneshot(get("/api/search")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["error"],
        "Query parameter 'q' is required"
    );

    let response = app
        .clone()
        .oneshot(get("/api/search?q=godot"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["projects"].as_array().unwrap().len(), 1);
    assert!(json["authors"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_metrics_are_exposed() {
    let app = app_with(None);
    let _ = app
        .clone()
        .oneshot(chat("203.0.113.11", &query("Hi")))
        .await
        .unwrap();

    let response = app.oneshot(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("portfolio_chatbot_requests_total"));
}
