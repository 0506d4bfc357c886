use crate::registry::ActionRegistry;
use adjutant_core::{ExecutionRequest, ExecutionResult};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// Resolves a request through the registry with panic isolation.
///
/// The invariant enforced here: every request produces exactly one
/// result. A handler panic is caught at the task boundary and synthesized
/// into a `Failed` result; nothing propagates to the channel router as an
/// error. The sandbox timeout is the only cancellation primitive, so the
/// dispatcher itself imposes no additional deadline.
pub struct Dispatcher {
    registry: Arc<ActionRegistry>,
}

impl Dispatcher {
    pub fn new(registry: Arc<ActionRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ActionRegistry {
        &self.registry
    }

    pub async fn execute(&self, request: &ExecutionRequest) -> ExecutionResult {
        let kind = request.command.kind();
        let handler = match self.registry.get(kind) {
            Some(handler) => handler,
            None => {
                return ExecutionResult::failed(format!(
                    "no handler registered for {:?}",
                    kind
                ));
            }
        };

        info!(
            request = %request.id,
            channel = %request.channel,
            action = ?kind,
            risk = ?handler.risk(),
            "dispatching"
        );

        let started = Instant::now();
        let command = request.command.clone();
        let task = tokio::spawn(async move { handler.execute(&command).await });

        let result = match task.await {
            Ok(result) => result,
            Err(join_err) => {
                if join_err.is_panic() {
                    error!(request = %request.id, "handler panicked");
                    ExecutionResult::failed("handler panicked; action aborted")
                } else {
                    error!(request = %request.id, "handler task cancelled");
                    ExecutionResult::failed("handler task cancelled before completion")
                }
            }
        };

        let result = if result.duration.is_zero() {
            result.with_duration(started.elapsed())
        } else {
            result
        };

        info!(
            request = %request.id,
            status = ?result.status,
            elapsed_ms = result.duration.as_millis() as u64,
            "dispatched"
        );
        result
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::traits::ActionHandler;
    use adjutant_core::{Command, CommandKind, ExecStatus, RiskClass};
    use async_trait::async_trait;

    struct PanickingHandler;

    #[async_trait]
    impl ActionHandler for PanickingHandler {
        fn kind(&self) -> CommandKind {
            CommandKind::ListProcesses
        }

        fn risk(&self) -> RiskClass {
            RiskClass::ReadOnly
        }

        async fn execute(&self, _command: &Command) -> ExecutionResult {
            panic!("injected fault");
        }
    }

    #[tokio::test]
    async fn handler_panic_becomes_failed_result() {
        let mut registry = ActionRegistry::new();
        registry.register(std::sync::Arc::new(PanickingHandler));
        let dispatcher = Dispatcher::new(Arc::new(registry));

        let request = ExecutionRequest::new("test", Command::ListProcesses);
        let result = dispatcher.execute(&request).await;

        assert_eq!(result.status, ExecStatus::Failed);
        assert!(result.stderr.contains("panicked"));
    }

    #[tokio::test]
    async fn unregistered_command_becomes_failed_result() {
        let dispatcher = Dispatcher::new(Arc::new(ActionRegistry::new()));
        let request = ExecutionRequest::new("test", Command::DiskUsage);
        let result = dispatcher.execute(&request).await;

        assert_eq!(result.status, ExecStatus::Failed);
        assert!(result.stderr.contains("no handler"));
    }
}
