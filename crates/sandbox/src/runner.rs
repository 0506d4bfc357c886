//! Subprocess runner enforcing the sandbox policy.

use crate::policy::SandboxPolicy;
use adjutant_core::{ExecStatus, ExecutionResult};
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Instant;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

/// What to spawn: a raw shell line, or an interpreter over a script file.
#[derive(Debug, Clone)]
pub enum ExecSpec {
    /// Passed to `sh -c` unmodified. Highest-risk surface; exposure is
    /// restricted at the channel layer, not here.
    Shell(String),
    /// `program script` with the script's directory as working directory.
    Interpreter { program: String, script: PathBuf },
}

impl ExecSpec {
    fn describe(&self) -> String {
        match self {
            ExecSpec::Shell(raw) => format!("sh -c {:?}", raw),
            ExecSpec::Interpreter { program, script } => {
                format!("{} {}", program, script.display())
            }
        }
    }
}

/// Spawn the subprocess described by `spec` under `policy`.
///
/// Never returns an error: every failure mode (spawn failure, non-zero
/// exit, timeout) is folded into the returned `ExecutionResult`. On
/// timeout the child's whole process group is killed so no orphan keeps
/// running.
pub async fn run(spec: &ExecSpec, policy: &SandboxPolicy) -> ExecutionResult {
    let mut cmd = match spec {
        ExecSpec::Shell(raw) => {
            let mut c = Command::new("sh");
            c.arg("-c").arg(raw);
            c
        }
        ExecSpec::Interpreter { program, script } => {
            let mut c = Command::new(program);
            c.arg(script);
            if let Some(dir) = script.parent() {
                c.current_dir(dir);
            }
            c
        }
    };

    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    // New session so a timeout can take the child's descendants down with it.
    #[cfg(unix)]
    {
        unsafe {
            cmd.pre_exec(|| {
                libc::setsid();
                Ok(())
            });
        }
    }

    debug!("sandbox run: {}", spec.describe());
    let started = Instant::now();

    let child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) => {
            // "Could not run" is a distinct failure from "ran and failed".
            warn!("sandbox spawn failed: {}", e);
            return ExecutionResult::failed(format!(
                "failed to spawn process: {}",
                e
            ));
        }
    };
    let pid = child.id();

    match timeout(policy.timeout, child.wait_with_output()).await {
        Ok(Ok(output)) => {
            let duration = started.elapsed();
            let (stdout, out_truncated) = cap_output(&output.stdout, policy.max_output_bytes);
            let (stderr, err_truncated) = cap_output(&output.stderr, policy.max_output_bytes);
            let exit_code = output.status.code();

            let status = if output.status.success() {
                ExecStatus::Ok
            } else {
                ExecStatus::Failed
            };

            ExecutionResult {
                status,
                stdout,
                stderr,
                exit_code,
                duration,
                truncated: out_truncated || err_truncated,
                artifact: None,
            }
        }
        Ok(Err(e)) => {
            ExecutionResult::failed(format!("failed to collect process output: {}", e))
                .with_duration(started.elapsed())
        }
        Err(_) => {
            warn!(
                "sandbox timeout after {:?}: {}",
                policy.timeout,
                spec.describe()
            );
            // Dropping the wait future killed the direct child
            // (kill_on_drop); sweep the rest of its session.
            #[cfg(unix)]
            if let Some(pid) = pid {
                unsafe {
                    libc::kill(-(pid as i32), libc::SIGKILL);
                }
            }
            ExecutionResult::timed_out(policy.timeout)
        }
    }
}

/// Truncate captured bytes at the policy cap, flagging the cut.
fn cap_output(bytes: &[u8], cap: usize) -> (String, bool) {
    if bytes.len() <= cap {
        (String::from_utf8_lossy(bytes).to_string(), false)
    } else {
        (String::from_utf8_lossy(&bytes[..cap]).to_string(), true)
    }
}
