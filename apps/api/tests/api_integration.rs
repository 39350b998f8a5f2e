//! End-to-end API integration tests
//!
//! These tests drive the HTTP router with stubbed completion clients and
//! verify:
//! - Request validation before any agent runs
//! - The server-sent event stream for successful runs
//! - Single error termination for failed runs

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use taskpilot_api::agents::llm::{ChatMessage, ClientFactory, CompletionClient};
use taskpilot_api::agents::{AgentError, AgentResult, OpenAiClientFactory};
use taskpilot_api::api::{self, AppState};
use tower::util::ServiceExt; // for oneshot

/// Completion client that replays canned replies in order
struct Scripted {
    replies: Mutex<VecDeque<AgentResult<String>>>,
    calls: AtomicUsize,
}

#[async_trait]
impl CompletionClient for Scripted {
    async fn complete(&self, _messages: &[ChatMessage]) -> AgentResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AgentError::Completion("script exhausted".to_string())))
    }
}

/// Hands out the same scripted client for every key and remembers the keys
struct ScriptedFactory {
    client: Arc<Scripted>,
    keys: Mutex<Vec<String>>,
}

impl ClientFactory for ScriptedFactory {
    fn build(&self, api_key: &str) -> AgentResult<Arc<dyn CompletionClient>> {
        self.keys.lock().unwrap().push(api_key.to_string());
        Ok(self.client.clone())
    }
}

fn scripted_factory(replies: Vec<AgentResult<String>>) -> Arc<ScriptedFactory> {
    Arc::new(ScriptedFactory {
        client: Arc::new(Scripted {
            replies: Mutex::new(replies.into()),
            calls: AtomicUsize::new(0),
        }),
        keys: Mutex::new(vec![]),
    })
}

/// Setup test application with routes
fn setup_app(factory: Arc<ScriptedFactory>) -> Router {
    api::router(AppState::new(factory))
}

fn process_request(payload: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/process")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&payload).unwrap()))
        .unwrap()
}

/// Parse every `data:` record of an SSE body into JSON
fn sse_events(body: &[u8]) -> Vec<Value> {
    std::str::from_utf8(body)
        .unwrap()
        .lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(|data| serde_json::from_str(data.trim()).unwrap())
        .collect()
}

fn types(events: &[Value]) -> Vec<&str> {
    events.iter().map(|e| e["type"].as_str().unwrap()).collect()
}

fn checklist_plan() -> String {
    json!({
        "subtasks": [
            {"id": "t1", "description": "Draft checklist", "dependencies": [], "estimated_time": "1h"},
            {"id": "t2", "description": "Review checklist", "dependencies": ["t1"], "estimated_time": "30m"}
        ],
        "execution_order": ["t1", "t2"]
    })
    .to_string()
}

fn completed(id: &str, findings: &str) -> String {
    json!({
        "task_id": id,
        "status": "completed",
        "results": {
            "main_findings": findings,
            "supporting_data": {"items": 12},
            "recommendations": "Share with the team"
        },
        "execution_time": "20m",
        "issues": []
    })
    .to_string()
}

#[tokio::test]
async fn test_health_check() {
    let app = setup_app(scripted_factory(vec![]));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&body[..], b"OK");
}

#[tokio::test]
async fn test_missing_task_is_rejected() {
    let factory = scripted_factory(vec![]);
    let app = setup_app(factory.clone());

    let response = app
        .oneshot(process_request(json!({"apiKey": "sk-test"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"], "Task is required");
    assert!(factory.keys.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_blank_api_key_is_rejected() {
    let factory = scripted_factory(vec![]);
    let app = setup_app(factory.clone());

    let response = app
        .oneshot(process_request(json!({"task": "Write a checklist", "apiKey": "  "})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"], "API key is required");
    assert_eq!(factory.client.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_unsendable_api_key_is_rejected() {
    let app = api::router(AppState::new(Arc::new(OpenAiClientFactory::default())));

    let response = app
        .oneshot(process_request(json!({"task": "Write a checklist", "apiKey": "sk-bad\nkey"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"], "Invalid API key");
}

#[tokio::test]
async fn test_process_streams_full_run() {
    let factory = scripted_factory(vec![
        Ok(format!("```json\n{}\n```", checklist_plan())),
        Ok(completed("t1", "Drafted 12 items")),
        Ok(completed("t2", "Reviewed and approved")),
    ]);
    let app = setup_app(factory.clone());

    let response = app
        .oneshot(process_request(json!({
            "task": "Write a product launch checklist",
            "apiKey": "sk-test"
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()["content-type"].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/event-stream"));

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let events = sse_events(&body);

    assert_eq!(
        types(&events),
        vec![
            "connection",
            "planning_start",
            "planning_complete",
            "execution_start",
            "execution_complete",
            "execution_start",
            "execution_complete",
            "final"
        ]
    );
    assert_eq!(events[3]["subtask"], "Draft checklist");
    assert_eq!(events[2]["plan"]["subtasks"].as_array().unwrap().len(), 2);

    let report = &events[7]["result"];
    assert_eq!(report["original_task"], "Write a product launch checklist");
    assert_eq!(report["results"].as_array().unwrap().len(), 2);
    assert_eq!(
        report["summary"],
        "Task 1: completed\nDrafted 12 items\n\nTask 2: completed\nReviewed and approved"
    );

    assert_eq!(*factory.keys.lock().unwrap(), vec!["sk-test".to_string()]);
    assert_eq!(factory.client.calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_process_streams_single_error_on_failure() {
    let factory = scripted_factory(vec![
        Ok(json!({
            "subtasks": [
                {"id": "a", "description": "First"},
                {"id": "b", "description": "Second"},
                {"id": "c", "description": "Third"}
            ],
            "execution_order": ["a", "b", "c"]
        })
        .to_string()),
        Ok(completed("a", "done")),
        Ok("Unfortunately I cannot do that. CONFIDENTIAL-RAW".to_string()),
        Ok(completed("c", "never reached")),
    ]);
    let app = setup_app(factory.clone());

    let response = app
        .oneshot(process_request(json!({"task": "Do three things", "apiKey": "sk-test"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let events = sse_events(&body);

    assert_eq!(
        types(&events),
        vec![
            "connection",
            "planning_start",
            "planning_complete",
            "execution_start",
            "execution_complete",
            "execution_start",
            "error"
        ]
    );
    assert_eq!(events[6]["error"], "Invalid JSON response from agent");
    assert!(!String::from_utf8_lossy(&body).contains("CONFIDENTIAL-RAW"));
    // Planner call plus two executor calls; the third subtask never runs.
    assert_eq!(factory.client.calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_process_reports_completion_failure() {
    let factory = scripted_factory(vec![Err(AgentError::Completion(
        "request timed out".to_string(),
    ))]);
    let app = setup_app(factory);

    let response = app
        .oneshot(process_request(json!({"task": "Plan", "apiKey": "sk-test"})))
        .await
        .unwrap();

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let events = sse_events(&body);

    assert_eq!(types(&events), vec!["connection", "planning_start", "error"]);
    assert_eq!(
        events[2]["error"],
        "Completion request failed: request timed out"
    );
}
