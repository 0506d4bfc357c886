//! Write-once persistence for generated source.

use adjutant_core::CoreError;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tracing::info;
use uuid::Uuid;

/// Source produced by the collaborator, persisted before execution.
///
/// Artifacts are retained after execution regardless of outcome; the
/// directory is the audit trail for everything the agent ever ran.
#[derive(Debug, Clone)]
pub struct GeneratedArtifact {
    pub source: String,
    pub path: PathBuf,
    pub created_at: DateTime<Utc>,
}

/// Artifact directory shared by all agent invocations.
///
/// Filenames embed a timestamp and a random suffix, and files are opened
/// with `create_new`, so concurrent generations can never collide or
/// overwrite each other. No locking is needed: artifacts are write-once.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
    extension: String,
}

impl ArtifactStore {
    pub fn new(dir: PathBuf, extension: &str) -> Self {
        Self {
            dir,
            extension: extension.to_string(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn persist(&self, source: &str) -> Result<GeneratedArtifact, CoreError> {
        tokio::fs::create_dir_all(&self.dir).await?;

        // create_new guards the (vanishingly unlikely) suffix collision;
        // a fresh name is drawn and the write retried.
        for _ in 0..3 {
            let created_at = Utc::now();
            let name = format!(
                "generated_{}_{}.{}",
                created_at.format("%Y%m%d_%H%M%S"),
                short_suffix(),
                self.extension
            );
            let path = self.dir.join(&name);

            match tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => {
                    use tokio::io::AsyncWriteExt;
                    let mut file = file;
                    file.write_all(source.as_bytes()).await?;
                    file.flush().await?;
                    info!("artifact written: {}", path.display());
                    return Ok(GeneratedArtifact {
                        source: source.to_string(),
                        path,
                        created_at,
                    });
                }
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e.into()),
            }
        }

        Err(CoreError::OperationFailed(
            "could not find a free artifact filename".to_string(),
        ))
    }
}

fn short_suffix() -> String {
    let id = Uuid::new_v4().simple().to_string();
    id[..8].to_string()
}
