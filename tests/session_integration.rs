use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use tempfile::TempDir;

use sheetrx::core::state::ViewState;
use sheetrx::core::types::{ExecutionResult, FileId, ToastLevel};
use sheetrx::render::render_report_html;
use sheetrx::{ApiClient, ApiConfig, ResultMode, Session};

#[derive(Clone, Default)]
struct Recorded {
    executes: Arc<Mutex<Vec<Value>>>,
}

async fn upload(body: Bytes) -> (StatusCode, Json<Value>) {
    let text = String::from_utf8_lossy(&body);
    if text.contains("filename=\"bad.csv\"") {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Unsupported file", "hint": "Upload CSV or Excel"})),
        );
    }
    (
        StatusCode::OK,
        Json(json!({
            "file_id": 7,
            "filename": "people.csv",
            "is_excel": false,
            "columns": ["name", "email"],
            "head": [
                {"name": "A", "email": "a@x.com"},
                {"name": "B", "email": "none"}
            ]
        })),
    )
}

async fn execute(
    State(recorded): State<Recorded>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let instruction = body["instruction"].as_str().unwrap_or_default().to_string();
    let chain = body["chain"].as_bool().unwrap_or(false);
    recorded.executes.lock().unwrap().push(body);

    if instruction == "fail" {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "planner crashed"})),
        );
    }
    if instruction.starts_with("replace") {
        let mut resp = json!({
            "mode": "replace",
            "regex": "[a-z]+@x\\.com",
            "flags": "i",
            "columns": ["name", "email"],
            "processed_head": [
                {"name": "A", "email": "REDACTED"},
                {"name": "B", "email": "none"}
            ],
            "replacements": 1,
            "per_column": {"email": 1},
            "changed_row_indices": [0],
            "download_url": "/media/exports/people-1.csv",
            "download_filename": "people-1.csv"
        });
        if chain {
            resp["chain"] = json!({
                "file_id": 42,
                "filename": "people-1.csv",
                "columns": ["name", "email"],
                "head": [
                    {"name": "A", "email": "REDACTED"},
                    {"name": "B", "email": "none"}
                ]
            });
        }
        return (StatusCode::OK, Json(resp));
    }
    (
        StatusCode::OK,
        Json(json!({
            "mode": "find",
            "regex": "[a-z]+@x\\.com",
            "flags": "i",
            "columns_applied": ["email"],
            "stats": {"total_matches": 1, "per_column": {"email": 1}, "rows_with_hits": 1},
            "examples": []
        })),
    )
}

async fn export() -> &'static str {
    "name,email\nA,REDACTED\nB,none\n"
}

async fn spawn_backend() -> (SocketAddr, Recorded) {
    let recorded = Recorded::default();
    let app = Router::new()
        .route("/api/upload/", post(upload))
        .route("/api/execute/", post(execute))
        .route("/media/exports/people-1.csv", get(export))
        .with_state(recorded.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, recorded)
}

fn session_for(addr: SocketAddr) -> Session {
    let config = ApiConfig {
        api_base: format!("http://{}/api", addr),
    };
    let client = ApiClient::new(&config).unwrap();
    Session::new(client, ViewState::new(100, vec![25, 50, 100, 200]))
}

fn write_csv(dir: &TempDir, name: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, "name,email\nA,a@x.com\nB,none\n").unwrap();
    path
}

fn toast_messages(session: &mut Session) -> Vec<(ToastLevel, String)> {
    session
        .state
        .drain_toasts()
        .into_iter()
        .map(|t| (t.level, t.message))
        .collect()
}

#[tokio::test]
async fn test_find_highlights_matches_in_report() {
    let (addr, recorded) = spawn_backend().await;
    let dir = TempDir::new().unwrap();
    let mut session = session_for(addr);

    assert!(session.upload(&write_csv(&dir, "people.csv")).await);
    assert!(session.execute("find emails").await);

    let sent = recorded.executes.lock().unwrap().clone();
    assert_eq!(
        sent,
        vec![json!({"file_id": 7, "instruction": "find emails", "download": true, "chain": false})]
    );

    let view = session.state.result.as_ref().unwrap();
    assert_eq!(view.mode(), ResultMode::Find);
    match &view.result {
        ExecutionResult::Find(find) => assert_eq!(find.stats.total_matches, 1),
        other => panic!("expected a find result, got {:?}", other),
    }

    let html = render_report_html(&session.state);
    assert!(html.contains("<mark>a@x.com</mark>"));
    assert!(!html.contains("<mark>none</mark>"));

    let toasts = toast_messages(&mut session);
    assert!(toasts.contains(&(ToastLevel::Success, "Uploaded people.csv".to_string())));
    assert!(toasts.contains(&(ToastLevel::Success, "Found 1 match".to_string())));
}

#[tokio::test]
async fn test_replace_with_auto_chain_adopts_new_base() {
    let (addr, recorded) = spawn_backend().await;
    let dir = TempDir::new().unwrap();
    let mut session = session_for(addr);
    session.state.auto_chain = true;

    assert!(session.upload(&write_csv(&dir, "people.csv")).await);
    assert!(session.execute("replace emails with REDACTED").await);

    let sent = recorded.executes.lock().unwrap().clone();
    assert_eq!(sent[0]["chain"], json!(true));

    let upload = session.state.upload.as_ref().unwrap();
    assert_eq!(upload.file_id, FileId::Int(42));
    assert_eq!(upload.filename, "people-1.csv");
    assert_eq!(upload.head[0].text("email"), "REDACTED");

    let toasts = toast_messages(&mut session);
    assert!(toasts.contains(&(
        ToastLevel::Success,
        "Result set as new base (file 42)".to_string()
    )));

    // The next instruction runs against the chained file
    assert!(session.execute("find emails").await);
    let sent = recorded.executes.lock().unwrap().clone();
    assert_eq!(sent[1]["file_id"], json!(42));
}

#[tokio::test]
async fn test_download_resolves_relative_link() {
    let (addr, _) = spawn_backend().await;
    let dir = TempDir::new().unwrap();
    let mut session = session_for(addr);

    assert!(session.upload(&write_csv(&dir, "people.csv")).await);
    assert!(session.execute("replace emails with REDACTED").await);
    assert_eq!(
        session.state.result.as_ref().unwrap().download_url(),
        Some(format!("http://{}/media/exports/people-1.csv", addr).as_str())
    );

    let dest = dir.path().join("out").join("result.csv");
    let written = session.download_result(&dest).await.unwrap();
    let text = std::fs::read_to_string(&dest).unwrap();
    assert_eq!(text, "name,email\nA,REDACTED\nB,none\n");
    assert_eq!(written, text.len());
}

#[tokio::test]
async fn test_failed_execute_keeps_previous_result() {
    let (addr, _) = spawn_backend().await;
    let dir = TempDir::new().unwrap();
    let mut session = session_for(addr);

    assert!(session.upload(&write_csv(&dir, "people.csv")).await);
    assert!(session.execute("find emails").await);
    session.state.drain_toasts();

    assert!(!session.execute("fail").await);
    assert!(!session.state.is_busy());
    let view = session.state.result.as_ref().unwrap();
    assert_eq!(view.instruction, "find emails");
    assert_eq!(
        toast_messages(&mut session),
        vec![(ToastLevel::Error, "Execution failed".to_string())]
    );
}

#[tokio::test]
async fn test_rejected_upload_leaves_state_empty() {
    let (addr, _) = spawn_backend().await;
    let dir = TempDir::new().unwrap();
    let mut session = session_for(addr);

    assert!(!session.upload(&write_csv(&dir, "bad.csv")).await);
    assert!(session.state.upload.is_none());
    assert!(!session.state.is_busy());
    assert_eq!(
        toast_messages(&mut session),
        vec![(ToastLevel::Error, "Upload failed".to_string())]
    );
}
