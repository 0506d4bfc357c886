use adjutant_core::{Command, CommandKind, ExecutionResult, RiskClass};
use async_trait::async_trait;

/// One executable handler per command variant.
///
/// Handlers convert every internal failure into an `ExecutionResult`;
/// `execute` is infallible at the type level so nothing can leak past the
/// dispatcher as an error.
#[async_trait]
pub trait ActionHandler: Send + Sync {
    /// Command variant this handler serves; registry key.
    fn kind(&self) -> CommandKind;

    /// Privilege/risk classification for this action.
    fn risk(&self) -> RiskClass;

    async fn execute(&self, command: &Command) -> ExecutionResult;
}

/// Result for a handler invoked with the wrong command variant. Only
/// reachable through a registry wiring bug, but handlers must not panic.
pub(crate) fn wrong_variant(expected: CommandKind, got: &Command) -> ExecutionResult {
    ExecutionResult::failed(format!(
        "handler for {:?} received {:?}",
        expected,
        got.kind()
    ))
}
