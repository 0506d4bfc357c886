//! Typed command set produced by the intent parser.

use std::path::PathBuf;

/// A structured, validated representation of a user instruction.
///
/// Immutable once parsed. `Unknown` is the designated fallback variant:
/// text that matches no keyword is carried verbatim and routed to the
/// code agent as a natural-language request, never rejected outright.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    OpenApp(String),
    OpenMultiple(Vec<String>),
    CloseApp(String),
    DeleteFile(PathBuf),
    RunShell(String),
    ListProcesses,
    SystemStatus,
    DiskUsage,
    CleanTemp,
    AgentGenerate(String),
    Unknown(String),
}

impl Command {
    pub fn kind(&self) -> CommandKind {
        match self {
            Command::OpenApp(_) => CommandKind::OpenApp,
            Command::OpenMultiple(_) => CommandKind::OpenMultiple,
            Command::CloseApp(_) => CommandKind::CloseApp,
            Command::DeleteFile(_) => CommandKind::DeleteFile,
            Command::RunShell(_) => CommandKind::RunShell,
            Command::ListProcesses => CommandKind::ListProcesses,
            Command::SystemStatus => CommandKind::SystemStatus,
            Command::DiskUsage => CommandKind::DiskUsage,
            Command::CleanTemp => CommandKind::CleanTemp,
            Command::AgentGenerate(_) => CommandKind::AgentGenerate,
            Command::Unknown(_) => CommandKind::Unknown,
        }
    }

    /// Whether this command is routed to the code agent instead of the
    /// system executor.
    pub fn is_agent_bound(&self) -> bool {
        matches!(self, Command::AgentGenerate(_) | Command::Unknown(_))
    }
}

/// Discriminant used as the action registry key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    OpenApp,
    OpenMultiple,
    CloseApp,
    DeleteFile,
    RunShell,
    ListProcesses,
    SystemStatus,
    DiskUsage,
    CleanTemp,
    AgentGenerate,
    Unknown,
}

/// Privilege/risk classification attached to each registered handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskClass {
    /// Read-only OS queries.
    ReadOnly,
    /// Spawns processes but does not destroy anything.
    Launch,
    /// Non-reversible effects: kill processes, delete files.
    Destructive,
    /// Arbitrary command or generated-code execution.
    Arbitrary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agent_bound_variants() {
        assert!(Command::Unknown("banana".into()).is_agent_bound());
        assert!(Command::AgentGenerate("plot a sine".into()).is_agent_bound());
        assert!(!Command::ListProcesses.is_agent_bound());
        assert!(!Command::RunShell("ls".into()).is_agent_bound());
    }

    #[test]
    fn kind_matches_variant() {
        assert_eq!(Command::DiskUsage.kind(), CommandKind::DiskUsage);
        assert_eq!(
            Command::OpenApp("firefox".into()).kind(),
            CommandKind::OpenApp
        );
    }
}
