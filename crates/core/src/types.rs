//! Request/result types shared by every component.

use crate::command::Command;
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::path::PathBuf;
use std::time::Duration;
use uuid::Uuid;

/// Outcome classification for one executed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecStatus {
    Ok,
    Failed,
    TimedOut,
    Blocked,
}

/// Ties a parsed command back to the channel that must receive the result.
///
/// Owned by the channel router for the request's lifetime and dropped once
/// the result has been delivered.
#[derive(Debug, Clone)]
pub struct ExecutionRequest {
    pub id: Uuid,
    pub channel: String,
    pub command: Command,
    pub received_at: DateTime<Utc>,
}

impl ExecutionRequest {
    pub fn new(channel: &str, command: Command) -> Self {
        Self {
            id: Uuid::new_v4(),
            channel: channel.to_string(),
            command,
            received_at: Utc::now(),
        }
    }
}

/// The single result produced for an execution request.
///
/// Every request yields exactly one of these; failure paths are converted
/// into a `Failed` result rather than propagated as errors.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionResult {
    pub status: ExecStatus,
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
    #[serde(rename = "duration_ms", serialize_with = "duration_ms")]
    pub duration: Duration,
    pub truncated: bool,
    /// Path of the generated artifact, when the result came from the code
    /// agent. Kept for traceability.
    pub artifact: Option<PathBuf>,
}

fn duration_ms<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u128(d.as_millis())
}

impl ExecutionResult {
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            status: ExecStatus::Ok,
            stdout: stdout.into(),
            stderr: String::new(),
            exit_code: Some(0),
            duration: Duration::ZERO,
            truncated: false,
            artifact: None,
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            status: ExecStatus::Failed,
            stdout: String::new(),
            stderr: reason.into(),
            exit_code: None,
            duration: Duration::ZERO,
            truncated: false,
            artifact: None,
        }
    }

    pub fn blocked(reason: impl Into<String>) -> Self {
        Self {
            status: ExecStatus::Blocked,
            stdout: String::new(),
            stderr: reason.into(),
            exit_code: None,
            duration: Duration::ZERO,
            truncated: false,
            artifact: None,
        }
    }

    pub fn timed_out(limit: Duration) -> Self {
        Self {
            status: ExecStatus::TimedOut,
            stdout: String::new(),
            stderr: format!("execution exceeded the {}s limit", limit.as_secs_f64()),
            exit_code: None,
            duration: limit,
            truncated: false,
            artifact: None,
        }
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn with_artifact(mut self, path: PathBuf) -> Self {
        self.artifact = Some(path);
        self
    }

    pub fn is_ok(&self) -> bool {
        self.status == ExecStatus::Ok
    }

    /// Human-readable rendering for text channels.
    pub fn render(&self) -> String {
        let mut out = String::new();
        match self.status {
            ExecStatus::Ok => {
                if self.stdout.is_empty() {
                    out.push_str("done");
                } else {
                    out.push_str(self.stdout.trim_end());
                }
            }
            ExecStatus::Failed => {
                out.push_str("failed");
                if let Some(code) = self.exit_code {
                    out.push_str(&format!(" (exit code {})", code));
                }
                if !self.stderr.is_empty() {
                    out.push_str(": ");
                    out.push_str(self.stderr.trim_end());
                }
                if !self.stdout.is_empty() {
                    out.push('\n');
                    out.push_str(self.stdout.trim_end());
                }
            }
            ExecStatus::TimedOut => {
                out.push_str("timed out: ");
                out.push_str(self.stderr.trim_end());
            }
            ExecStatus::Blocked => {
                out.push_str("blocked: ");
                out.push_str(self.stderr.trim_end());
            }
        }
        if self.truncated {
            out.push_str("\n[output truncated]");
        }
        if let Some(path) = &self.artifact {
            out.push_str(&format!("\n[artifact: {}]", path.display()));
        }
        out
    }
}
