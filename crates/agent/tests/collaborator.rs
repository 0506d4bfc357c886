//! Collaborator failure taxonomy against a real socket.

use adjutant_agent::{Collaborator, HttpLlmClient};
use adjutant_core::CoreError;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// One-shot HTTP stub that answers every request with a fixed response.
async fn serve_once(status_line: &'static str, body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        if let Ok((mut socket, _)) = listener.accept().await {
            let mut buffer = vec![0u8; 8192];
            let _ = socket.read(&mut buffer).await;
            let response = format!(
                "{}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            let _ = socket.write_all(response.as_bytes()).await;
        }
    });

    format!("http://{}", addr)
}

#[tokio::test]
async fn garbage_body_is_unusable() {
    let base = serve_once("HTTP/1.1 200 OK", "{\"not\": \"a chat response\"}").await;
    let client = HttpLlmClient::new(base, None);

    let err = client.complete("sys", "user", "m").await.unwrap_err();
    assert!(
        matches!(err, CoreError::CollaboratorUnusable(_)),
        "got: {err}"
    );
}

#[tokio::test]
async fn empty_content_is_unusable() {
    let base = serve_once(
        "HTTP/1.1 200 OK",
        "{\"choices\":[{\"message\":{\"content\":\"\"}}]}",
    )
    .await;
    let client = HttpLlmClient::new(base, None);

    let err = client.complete("sys", "user", "m").await.unwrap_err();
    assert!(matches!(err, CoreError::CollaboratorUnusable(_)));
    assert!(err.to_string().contains("empty content"));
}

#[tokio::test]
async fn server_error_is_unavailable() {
    let base = serve_once("HTTP/1.1 503 Service Unavailable", "overloaded").await;
    let client = HttpLlmClient::new(base, None);

    let err = client.complete("sys", "user", "m").await.unwrap_err();
    assert!(
        matches!(err, CoreError::CollaboratorUnavailable(_)),
        "got: {err}"
    );
}

#[tokio::test]
async fn well_formed_response_returns_content() {
    let base = serve_once(
        "HTTP/1.1 200 OK",
        "{\"choices\":[{\"message\":{\"content\":\"print(42)\"}}]}",
    )
    .await;
    let client = HttpLlmClient::new(base, None);

    let content = client.complete("sys", "user", "m").await.unwrap();
    assert_eq!(content, "print(42)");
}
