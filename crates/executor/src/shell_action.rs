//! Raw shell execution, delegated to the sandbox.

use crate::traits::{wrong_variant, ActionHandler};
use adjutant_core::{Command, CommandKind, ExecutionResult, RiskClass};
use adjutant_sandbox::{run, ExecSpec, SandboxPolicy};
use async_trait::async_trait;
use tracing::warn;

/// The shell's highest-risk surface: the raw line goes to `sh -c`
/// unmodified, with no allow-list. Callers restrict exposure at the
/// channel layer; the sandbox contributes only the timeout and output cap.
pub struct RunShellAction {
    policy: SandboxPolicy,
}

impl RunShellAction {
    pub fn new(policy: SandboxPolicy) -> Self {
        Self { policy }
    }
}

#[async_trait]
impl ActionHandler for RunShellAction {
    fn kind(&self) -> CommandKind {
        CommandKind::RunShell
    }

    fn risk(&self) -> RiskClass {
        RiskClass::Arbitrary
    }

    async fn execute(&self, command: &Command) -> ExecutionResult {
        let Command::RunShell(raw) = command else {
            return wrong_variant(self.kind(), command);
        };
        if raw.trim().is_empty() {
            return ExecutionResult::failed("no command given");
        }

        warn!("executing raw shell command: {:?}", raw);
        run(&ExecSpec::Shell(raw.clone()), &self.policy).await
    }
}
