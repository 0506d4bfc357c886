//! Wire-level tests for the HTTP and serial transports.

use adjutant_agent::{ArtifactStore, CodeAgent, Collaborator};
use adjutant_channels::Router;
use adjutant_core::{CoreError, RuntimeConfig};
use adjutant_executor::{ActionRegistry, Dispatcher};
use adjutant_sandbox::SandboxPolicy;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

struct NoCollaborator;

#[async_trait]
impl Collaborator for NoCollaborator {
    async fn complete(
        &self,
        _system_prompt: &str,
        _user_prompt: &str,
        _model: &str,
    ) -> Result<String, CoreError> {
        Err(CoreError::CollaboratorUnavailable(
            "not configured in this test".to_string(),
        ))
    }
}

fn test_router(artifact_dir: &std::path::Path) -> Arc<Router> {
    let mut config = RuntimeConfig::default();
    config.artifact_dir = artifact_dir.to_path_buf();
    let config = Arc::new(config);

    let dispatcher = Arc::new(Dispatcher::new(Arc::new(ActionRegistry::with_defaults(
        &config,
    ))));
    let agent = Arc::new(CodeAgent::new(
        Arc::new(NoCollaborator),
        ArtifactStore::new(config.artifact_dir.clone(), "py"),
        SandboxPolicy::from_config(&config),
        config.interpreter.clone(),
    ));
    Router::new(dispatcher, agent, config)
}

async fn spawn_http(router: Arc<Router>) -> std::net::SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(adjutant_channels::http::serve_on(router, listener));
    addr
}

async fn http_request(addr: std::net::SocketAddr, request: &str) -> (String, String) {
    let mut socket = TcpStream::connect(addr).await.unwrap();
    socket.write_all(request.as_bytes()).await.unwrap();

    let mut response = Vec::new();
    socket.read_to_end(&mut response).await.unwrap();
    let response = String::from_utf8_lossy(&response).to_string();

    let (head, body) = response.split_once("\r\n\r\n").unwrap_or((&response, ""));
    let status_line = head.lines().next().unwrap_or_default().to_string();
    (status_line, body.to_string())
}

#[tokio::test]
async fn health_endpoint_answers_ok() {
    let dir = tempfile::tempdir().unwrap();
    let addr = spawn_http(test_router(dir.path())).await;

    let (status, body) = http_request(
        addr,
        "GET /health HTTP/1.1\r\nHost: test\r\nConnection: close\r\n\r\n",
    )
    .await;
    assert!(status.contains("200"), "got: {status}");
    assert!(body.contains("\"ok\""));
}

#[tokio::test]
async fn status_endpoint_returns_metrics_json() {
    let dir = tempfile::tempdir().unwrap();
    let addr = spawn_http(test_router(dir.path())).await;

    let (status, body) = http_request(
        addr,
        "GET /api/status HTTP/1.1\r\nHost: test\r\nConnection: close\r\n\r\n",
    )
    .await;
    assert!(status.contains("200"));
    let parsed: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert!(parsed["memory_total_mb"].as_u64().unwrap() > 0);
}

#[tokio::test]
async fn command_endpoint_routes_through_parser() {
    let dir = tempfile::tempdir().unwrap();
    let addr = spawn_http(test_router(dir.path())).await;

    let payload = r#"{"command": "run command echo over-http"}"#;
    let request = format!(
        "POST /api/command HTTP/1.1\r\nHost: test\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        payload.len(),
        payload
    );
    let (status, body) = http_request(addr, &request).await;

    assert!(status.contains("200"));
    let parsed: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(parsed["status"], "ok");
    assert!(parsed["stdout"].as_str().unwrap().contains("over-http"));
    assert_eq!(parsed["exit_code"], 0);
}

#[tokio::test]
async fn malformed_command_body_is_bad_request() {
    let dir = tempfile::tempdir().unwrap();
    let addr = spawn_http(test_router(dir.path())).await;

    let request = "POST /api/command HTTP/1.1\r\nHost: test\r\nContent-Length: 9\r\nConnection: close\r\n\r\nnot json!";
    let (status, _) = http_request(addr, request).await;
    assert!(status.contains("400"), "got: {status}");
}

#[tokio::test]
async fn unknown_path_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let addr = spawn_http(test_router(dir.path())).await;

    let (status, _) = http_request(
        addr,
        "GET /nope HTTP/1.1\r\nHost: test\r\nConnection: close\r\n\r\n",
    )
    .await;
    assert!(status.contains("404"));
}

#[tokio::test]
async fn serial_session_speaks_newline_frames() {
    let dir = tempfile::tempdir().unwrap();
    let router = test_router(dir.path());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(adjutant_channels::serial::serve_on(router, listener));

    let socket = TcpStream::connect(addr).await.unwrap();
    let (read_half, mut write_half) = socket.into_split();
    let mut lines = BufReader::new(read_half).lines();

    let greeting = lines.next_line().await.unwrap().unwrap();
    assert!(greeting.contains("/help"));

    write_half.write_all(b"/cmd echo over-serial\n").await.unwrap();
    let reply = lines.next_line().await.unwrap().unwrap();
    assert!(reply.contains("over-serial"));

    write_half.write_all(b"/help\n").await.unwrap();
    let help_first = lines.next_line().await.unwrap().unwrap();
    assert!(help_first.contains("serial commands"));
}

#[tokio::test]
async fn two_serial_sessions_are_independent() {
    let dir = tempfile::tempdir().unwrap();
    let router = test_router(dir.path());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(adjutant_channels::serial::serve_on(router, listener));

    // Session A starts a slow command and hangs up without reading.
    let mut slow = TcpStream::connect(addr).await.unwrap();
    slow.write_all(b"/cmd sleep 2\n").await.unwrap();
    drop(slow);

    // Session B must be served promptly regardless.
    let socket = TcpStream::connect(addr).await.unwrap();
    let (read_half, mut write_half) = socket.into_split();
    let mut lines = BufReader::new(read_half).lines();
    let _greeting = lines.next_line().await.unwrap();

    let started = std::time::Instant::now();
    write_half.write_all(b"/cmd echo prompt-reply\n").await.unwrap();
    let reply = tokio::time::timeout(
        std::time::Duration::from_secs(1),
        lines.next_line(),
    )
    .await
    .expect("session B must not wait on session A")
    .unwrap()
    .unwrap();

    assert!(reply.contains("prompt-reply"));
    assert!(started.elapsed() < std::time::Duration::from_secs(1));
}
