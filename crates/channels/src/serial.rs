//! Bluetooth/serial bridge.
//!
//! Phones pair through a serial-terminal app that speaks newline-delimited
//! text; on the desk side the RFCOMM link surfaces as a local TCP port.
//! Frames in, frames out, a reduced slash vocabulary, and everything else
//! goes through the normal parse/route pipeline.

use crate::router::Router;
use adjutant_core::{Command, CoreError, ExecutionRequest};
use adjutant_executor::system_actions::status_snapshot;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tracing::{info, warn};

const SERIAL_HELP: &str = "adjutant serial commands:\n\
  /help     this message\n\
  /status   system status\n\
  /lock     lock the screen\n\
  /open X   open app X\n\
  /close X  close app X\n\
  /cmd X    run shell command X\n\
  /exit     close this link\n\
anything else is handled as a normal request";

pub async fn serve(router: Arc<Router>, port: u16) -> Result<(), CoreError> {
    let listener = TcpListener::bind(("0.0.0.0", port)).await?;
    serve_on(router, listener).await
}

pub async fn serve_on(router: Arc<Router>, listener: TcpListener) -> Result<(), CoreError> {
    if let Ok(addr) = listener.local_addr() {
        info!("serial bridge on {}", addr);
    }

    loop {
        let (socket, peer) = listener.accept().await?;
        let router = router.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_session(router, socket, &peer.to_string()).await {
                warn!(peer = %peer, "serial session error: {}", e);
            }
        });
    }
}

async fn handle_session(
    router: Arc<Router>,
    socket: TcpStream,
    peer: &str,
) -> std::io::Result<()> {
    let channel = format!("serial:{}", peer);
    info!(channel = %channel, "serial link opened");

    let (read_half, mut write_half) = socket.into_split();
    let mut lines = BufReader::new(read_half).lines();

    write_half
        .write_all(b"adjutant link ready. /help for commands.\n")
        .await?;

    while let Some(line) = lines.next_line().await? {
        let line = line.trim().to_string();
        if line.is_empty() {
            continue;
        }

        let reply = match handle_line(&router, &channel, &line).await {
            Some(reply) => reply,
            None => break, // /exit
        };

        // Delivery failure closes only this link; the error propagates to
        // the session task and is logged there.
        write_half.write_all(reply.as_bytes()).await?;
        write_half.write_all(b"\n").await?;
        write_half.flush().await?;
    }

    info!(channel = %channel, "serial link closed");
    Ok(())
}

/// Resolve one serial frame. `None` means the link should close.
pub async fn handle_line(router: &Arc<Router>, channel: &str, line: &str) -> Option<String> {
    let lower = line.to_ascii_lowercase();

    if lower == "/help" || lower == "help" || lower == "?" {
        return Some(SERIAL_HELP.to_string());
    }
    if lower == "/exit" || lower == "/quit" {
        return None;
    }
    if lower == "/status" {
        return Some(match status_snapshot().await {
            Ok(snapshot) => snapshot.render(),
            Err(e) => format!("status capture failed: {}", e),
        });
    }
    if lower == "/lock" {
        return Some(lock_screen().await);
    }
    if let Some(target) = strip_arg(line, "/open") {
        let request = ExecutionRequest::new(channel, Command::OpenApp(target));
        return Some(router.route(request).await.render());
    }
    if let Some(target) = strip_arg(line, "/close") {
        let request = ExecutionRequest::new(channel, Command::CloseApp(target));
        return Some(router.route(request).await.render());
    }
    if let Some(raw) = strip_arg(line, "/cmd") {
        let request = ExecutionRequest::new(channel, Command::RunShell(raw));
        return Some(router.route(request).await.render());
    }

    Some(router.route_line(channel, line).await.render())
}

fn strip_arg(line: &str, keyword: &str) -> Option<String> {
    if line.len() <= keyword.len() || !line.is_char_boundary(keyword.len()) {
        return None;
    }
    if !line[..keyword.len()].eq_ignore_ascii_case(keyword) {
        return None;
    }
    let rest = &line[keyword.len()..];
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let rest = rest.trim();
    if rest.is_empty() {
        None
    } else {
        Some(rest.to_string())
    }
}

async fn lock_screen() -> String {
    match tokio::process::Command::new("loginctl")
        .arg("lock-session")
        .output()
        .await
    {
        Ok(output) if output.status.success() => "screen locked".to_string(),
        Ok(output) => format!(
            "lock failed: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        ),
        Err(e) => format!("lock failed: {}", e),
    }
}
