//! The generate -> validate -> persist -> execute pipeline.

use crate::artifact::ArtifactStore;
use crate::client::Collaborator;
use crate::codegen::extract_code;
use adjutant_core::{CoreError, ExecutionResult};
use adjutant_sandbox::{run, ExecSpec, SandboxPolicy};
use std::sync::Arc;
use tracing::{info, warn};

/// Fixed instruction constraining collaborator output to one code block.
const SYSTEM_PROMPT: &str = "You are an expert Python code generator.\n\
RULES:\n\
1. Output ONLY executable Python code, in a single code block.\n\
2. The code must be complete and runnable, with all imports at the top.\n\
3. Print results to stdout so they can be captured.\n\
4. For plots, save to a file instead of showing a window.\n\
5. Handle errors with try/except where sensible.\n\
Output nothing but the code block.";

pub struct CodeAgent {
    client: Arc<dyn Collaborator>,
    store: ArtifactStore,
    policy: SandboxPolicy,
    interpreter: String,
}

impl CodeAgent {
    pub fn new(
        client: Arc<dyn Collaborator>,
        store: ArtifactStore,
        policy: SandboxPolicy,
        interpreter: String,
    ) -> Self {
        Self {
            client,
            store,
            policy,
            interpreter,
        }
    }

    /// Turn a free-text goal into executed code.
    ///
    /// Never returns an error: collaborator failures, safety rejections
    /// and execution failures all fold into the single result the
    /// originating request receives. A safety rejection produces
    /// `Blocked` without writing anything to disk.
    pub async fn generate_and_run(&self, goal: &str, model: &str) -> ExecutionResult {
        let response = match self.client.complete(SYSTEM_PROMPT, goal, model).await {
            Ok(response) => response,
            Err(e) => {
                warn!("collaborator call failed: {}", e);
                return e.into_result();
            }
        };

        let source = match extract_code(&response) {
            Some(source) => source,
            None => {
                return CoreError::CollaboratorUnusable(
                    "no code block could be extracted from the response".to_string(),
                )
                .into_result();
            }
        };

        // Static denylist scan happens BEFORE any disk write.
        if let Err(e) = self.policy.scan_source(&source) {
            warn!("generated code rejected: {}", e);
            return e.into_result();
        }

        let artifact = match self.store.persist(&source).await {
            Ok(artifact) => artifact,
            Err(e) => return e.into_result(),
        };

        info!(
            "running generated artifact {} ({} bytes)",
            artifact.path.display(),
            artifact.source.len()
        );

        // The artifact stays on disk whatever happens next.
        let spec = ExecSpec::Interpreter {
            program: self.interpreter.clone(),
            script: artifact.path.clone(),
        };
        run(&spec, &self.policy)
            .await
            .with_artifact(artifact.path)
    }
}
