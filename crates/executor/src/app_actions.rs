//! Application launch/terminate handlers.

use crate::traits::{wrong_variant, ActionHandler};
use adjutant_core::{Command, CommandKind, ExecutionResult, RiskClass};
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command as OsCommand;
use tokio::task;
use tracing::{debug, info};

/// Friendly names mapped to the binaries a desktop session actually has.
const APP_ALIASES: &[(&str, &str)] = &[
    ("browser", "firefox"),
    ("chrome", "google-chrome"),
    ("files", "nautilus"),
    ("file explorer", "nautilus"),
    ("editor", "gedit"),
    ("calculator", "gnome-calculator"),
    ("terminal", "x-terminal-emulator"),
    ("settings", "gnome-control-center"),
];

/// Resolve a target to something spawnable and launch it detached.
///
/// URIs and existing paths are handed to `xdg-open`; anything else is
/// spawned as a program after alias lookup. No retries on failure.
async fn launch(target: &str) -> Result<(), String> {
    let target = target.trim();
    if target.is_empty() {
        return Err("no application given".to_string());
    }

    let lower = target.to_lowercase();
    let resolved = APP_ALIASES
        .iter()
        .find(|(alias, _)| *alias == lower)
        .map(|(_, program)| *program);

    let (program, arg): (&str, Option<&str>) = if let Some(program) = resolved {
        (program, None)
    } else if target.contains("://") || Path::new(target).exists() {
        ("xdg-open", Some(target))
    } else {
        (target, None)
    };

    debug!("launching {} (target {:?})", program, target);

    let mut cmd = OsCommand::new(program);
    if let Some(arg) = arg {
        cmd.arg(arg);
    }
    cmd.stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());

    match cmd.spawn() {
        Ok(_) => Ok(()),
        Err(e) => Err(format!("could not launch {:?}: {}", target, e)),
    }
}

pub struct OpenAppAction;

#[async_trait]
impl ActionHandler for OpenAppAction {
    fn kind(&self) -> CommandKind {
        CommandKind::OpenApp
    }

    fn risk(&self) -> RiskClass {
        RiskClass::Launch
    }

    async fn execute(&self, command: &Command) -> ExecutionResult {
        let Command::OpenApp(target) = command else {
            return wrong_variant(self.kind(), command);
        };
        match launch(target).await {
            Ok(()) => ExecutionResult::ok(format!("launched {}", target)),
            Err(reason) => ExecutionResult::failed(reason),
        }
    }
}

pub struct OpenMultipleAction;

#[async_trait]
impl ActionHandler for OpenMultipleAction {
    fn kind(&self) -> CommandKind {
        CommandKind::OpenMultiple
    }

    fn risk(&self) -> RiskClass {
        RiskClass::Launch
    }

    async fn execute(&self, command: &Command) -> ExecutionResult {
        let Command::OpenMultiple(targets) = command else {
            return wrong_variant(self.kind(), command);
        };
        if targets.is_empty() {
            return ExecutionResult::failed(
                "no applications given; expected a comma-separated list",
            );
        }

        // Each target launches independently; one failure never aborts
        // the rest.
        let mut lines = Vec::with_capacity(targets.len());
        let mut failures = 0usize;
        for target in targets {
            match launch(target).await {
                Ok(()) => lines.push(format!("launched {}", target)),
                Err(reason) => {
                    failures += 1;
                    lines.push(format!("failed {}: {}", target, reason));
                }
            }
        }

        let breakdown = lines.join("\n");
        if failures == 0 {
            ExecutionResult::ok(breakdown)
        } else {
            let mut result = ExecutionResult::failed(format!(
                "{}/{} launches failed",
                failures,
                targets.len()
            ));
            result.stdout = breakdown;
            result
        }
    }
}

pub struct CloseAppAction;

#[async_trait]
impl ActionHandler for CloseAppAction {
    fn kind(&self) -> CommandKind {
        CommandKind::CloseApp
    }

    fn risk(&self) -> RiskClass {
        RiskClass::Destructive
    }

    async fn execute(&self, command: &Command) -> ExecutionResult {
        let Command::CloseApp(name) = command else {
            return wrong_variant(self.kind(), command);
        };
        let name = name.trim().to_string();
        if name.is_empty() {
            return ExecutionResult::failed("no process name given");
        }

        // Terminates every matching process; confirmation, if any, is a
        // channel-level concern.
        let target = name.clone();
        let killed = task::spawn_blocking(move || {
            let mut system = sysinfo::System::new_all();
            system.refresh_all();

            let mut killed = 0usize;
            for process in system.processes().values() {
                if process.name().eq_ignore_ascii_case(&target) && process.kill() {
                    killed += 1;
                }
            }
            killed
        })
        .await;

        match killed {
            Ok(0) => ExecutionResult::failed(format!(
                "no running process matches {:?}; use 'list processes' to find the exact name",
                name
            )),
            Ok(count) => {
                info!("terminated {} process(es) named {}", count, name);
                ExecutionResult::ok(format!("terminated {} process(es) named {}", count, name))
            }
            Err(e) => ExecutionResult::failed(format!("process scan failed: {}", e)),
        }
    }
}
