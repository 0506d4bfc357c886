use crate::types::ExecutionResult;
use thiserror::Error;

/// Shared failure taxonomy.
///
/// Handlers convert every one of these into an `ExecutionResult` before
/// the channel router sees it; the router only formats and delivers.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("collaborator unavailable: {0}")]
    CollaboratorUnavailable(String),

    #[error("collaborator returned unusable output: {0}")]
    CollaboratorUnusable(String),

    #[error("blocked by safety policy: {0}")]
    ValidationBlocked(String),

    #[error("operation timed out")]
    TimedOut,

    #[error("failed to spawn process: {0}")]
    SpawnFailed(String),

    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("operation failed: {0}")]
    OperationFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// Convert the error into the result the originating request must
    /// still receive.
    pub fn into_result(self) -> ExecutionResult {
        match self {
            CoreError::TimedOut => {
                ExecutionResult::timed_out(std::time::Duration::ZERO)
            }
            CoreError::ValidationBlocked(reason) => ExecutionResult::blocked(reason),
            other => ExecutionResult::failed(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ExecStatus;

    #[test]
    fn blocked_error_maps_to_blocked_status() {
        let result = CoreError::ValidationBlocked("bad token".into()).into_result();
        assert_eq!(result.status, ExecStatus::Blocked);
        assert!(result.stderr.contains("bad token"));
    }

    #[test]
    fn timeout_maps_to_timed_out_status() {
        let result = CoreError::TimedOut.into_result();
        assert_eq!(result.status, ExecStatus::TimedOut);
    }

    #[test]
    fn spawn_failure_is_distinguishable_from_exit_failure() {
        let result = CoreError::SpawnFailed("no such interpreter".into()).into_result();
        assert_eq!(result.status, ExecStatus::Failed);
        assert!(result.stderr.contains("failed to spawn"));
    }
}
