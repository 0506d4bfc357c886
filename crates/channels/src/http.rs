//! Phone-remote HTTP listener.
//!
//! Minimal request handling over a raw TCP socket: three endpoints, one
//! connection per session task, close after responding. The health
//! endpoint answers as long as the listener is reachable, independent of
//! executor state.

use crate::router::Router;
use adjutant_core::CoreError;
use serde_json::json;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{info, warn};

const MAX_REQUEST_BYTES: usize = 64 * 1024;

pub async fn serve(router: Arc<Router>, port: u16) -> Result<(), CoreError> {
    let listener = TcpListener::bind(("0.0.0.0", port)).await?;
    serve_on(router, listener).await
}

pub async fn serve_on(router: Arc<Router>, listener: TcpListener) -> Result<(), CoreError> {
    if let Ok(addr) = listener.local_addr() {
        info!("web listener on {}", addr);
    }

    loop {
        let (socket, peer) = listener.accept().await?;
        let router = router.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_connection(router, socket, &peer.to_string()).await {
                warn!(peer = %peer, "http session error: {}", e);
            }
        });
    }
}

async fn handle_connection(
    router: Arc<Router>,
    mut socket: TcpStream,
    peer: &str,
) -> std::io::Result<()> {
    let request = match read_request(&mut socket).await? {
        Some(request) => request,
        None => return Ok(()),
    };

    let (status, body) = respond(&router, &request, peer).await;
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );
    socket.write_all(response.as_bytes()).await?;
    socket.flush().await
}

struct Request {
    method: String,
    path: String,
    body: String,
}

async fn read_request(socket: &mut TcpStream) -> std::io::Result<Option<Request>> {
    let mut buffer = Vec::with_capacity(4096);
    let mut chunk = [0u8; 4096];

    // Read until the header terminator, then drain the declared body.
    let header_end = loop {
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            return Ok(None);
        }
        buffer.extend_from_slice(&chunk[..n]);
        if let Some(pos) = find_header_end(&buffer) {
            break pos;
        }
        if buffer.len() > MAX_REQUEST_BYTES {
            return Ok(None);
        }
    };

    let head = String::from_utf8_lossy(&buffer[..header_end]).to_string();
    let mut lines = head.lines();
    let request_line = lines.next().unwrap_or_default();
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let path = parts.next().unwrap_or_default().to_string();

    let content_length = lines
        .filter_map(|line| {
            let (name, value) = line.split_once(':')?;
            if name.trim().eq_ignore_ascii_case("content-length") {
                value.trim().parse::<usize>().ok()
            } else {
                None
            }
        })
        .next()
        .unwrap_or(0)
        .min(MAX_REQUEST_BYTES);

    let mut body = buffer[header_end + 4..].to_vec();
    while body.len() < content_length {
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&chunk[..n]);
    }
    body.truncate(content_length);

    Ok(Some(Request {
        method,
        path,
        body: String::from_utf8_lossy(&body).to_string(),
    }))
}

fn find_header_end(buffer: &[u8]) -> Option<usize> {
    buffer.windows(4).position(|w| w == b"\r\n\r\n")
}

async fn respond(router: &Arc<Router>, request: &Request, peer: &str) -> (&'static str, String) {
    match (request.method.as_str(), request.path.as_str()) {
        // Reachability probe; must not depend on executor state.
        ("GET", "/health") => ("200 OK", json!({"status": "ok"}).to_string()),
        ("GET", "/api/status") => {
            match adjutant_executor::system_actions::status_snapshot().await {
                Ok(snapshot) => (
                    "200 OK",
                    serde_json::to_string(&snapshot)
                        .unwrap_or_else(|_| json!({"error": "serialization failed"}).to_string()),
                ),
                Err(e) => ("500 Internal Server Error", json!({ "error": e }).to_string()),
            }
        }
        ("POST", "/api/command") => {
            let command = serde_json::from_str::<serde_json::Value>(&request.body)
                .ok()
                .and_then(|v| v.get("command").and_then(|c| c.as_str()).map(String::from));
            match command {
                Some(command) if !command.trim().is_empty() => {
                    let channel = format!("http:{}", peer);
                    let result = router.route_line(&channel, &command).await;
                    (
                        "200 OK",
                        serde_json::to_string(&result)
                            .unwrap_or_else(|_| json!({"error": "serialization failed"}).to_string()),
                    )
                }
                _ => (
                    "400 Bad Request",
                    json!({"error": "expected body {\"command\": \"...\"}"}).to_string(),
                ),
            }
        }
        _ => ("404 Not Found", json!({"error": "no such endpoint"}).to_string()),
    }
}
