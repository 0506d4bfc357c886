//! File-effect handlers: delete one file, sweep the temp root.

use crate::traits::{wrong_variant, ActionHandler};
use adjutant_core::{Command, CommandKind, ExecutionResult, RiskClass};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::fs;
use tracing::{info, warn};

pub struct DeleteFileAction;

#[async_trait]
impl ActionHandler for DeleteFileAction {
    fn kind(&self) -> CommandKind {
        CommandKind::DeleteFile
    }

    fn risk(&self) -> RiskClass {
        RiskClass::Destructive
    }

    async fn execute(&self, command: &Command) -> ExecutionResult {
        let Command::DeleteFile(path) = command else {
            return wrong_variant(self.kind(), command);
        };
        if path.as_os_str().is_empty() {
            return ExecutionResult::failed("no path given");
        }

        // No recycle-bin semantics: the file is gone or the call failed.
        match fs::remove_file(path).await {
            Ok(()) => {
                info!("deleted {}", path.display());
                ExecutionResult::ok(format!("deleted {}", path.display()))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => ExecutionResult::failed(format!(
                "not found: {}",
                path.display()
            )),
            Err(e) if e.kind() == ErrorKind::PermissionDenied => ExecutionResult::failed(
                format!("permission denied: {}", path.display()),
            ),
            Err(e) => ExecutionResult::failed(format!(
                "could not delete {}: {}",
                path.display(),
                e
            )),
        }
    }
}

/// Best-effort sweep of the configured temp root. A failing entry is
/// counted and skipped, never fatal.
pub struct CleanTempAction {
    root: PathBuf,
}

impl CleanTempAction {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }
}

#[async_trait]
impl ActionHandler for CleanTempAction {
    fn kind(&self) -> CommandKind {
        CommandKind::CleanTemp
    }

    fn risk(&self) -> RiskClass {
        RiskClass::Destructive
    }

    async fn execute(&self, _command: &Command) -> ExecutionResult {
        let mut entries = match fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) => {
                return ExecutionResult::failed(format!(
                    "cannot read temp root {}: {}",
                    self.root.display(),
                    e
                ));
            }
        };

        let mut cleaned = 0usize;
        let mut failed = 0usize;
        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    warn!("temp sweep read error: {}", e);
                    failed += 1;
                    break;
                }
            };

            let path = entry.path();
            let is_dir = entry
                .file_type()
                .await
                .map(|t| t.is_dir())
                .unwrap_or(false);
            let removed = if is_dir {
                fs::remove_dir_all(&path).await
            } else {
                fs::remove_file(&path).await
            };
            match removed {
                Ok(()) => cleaned += 1,
                Err(e) => {
                    warn!("could not remove {}: {}", path.display(), e);
                    failed += 1;
                }
            }
        }

        info!(
            "temp sweep of {}: {} removed, {} skipped",
            self.root.display(),
            cleaned,
            failed
        );
        ExecutionResult::ok(format!(
            "cleaned {} item(s) from {}; {} could not be removed",
            cleaned,
            self.root.display(),
            failed
        ))
    }
}
