use crate::traits::ActionHandler;
use adjutant_core::{CommandKind, RiskClass, RuntimeConfig};
use adjutant_sandbox::SandboxPolicy;
use std::collections::HashMap;
use std::sync::Arc;

/// Maps each command variant to its handler and risk class.
pub struct ActionRegistry {
    handlers: HashMap<CommandKind, Arc<dyn ActionHandler>>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Registry covering every executor-bound command variant, configured
    /// from the runtime config. Agent-bound variants (`AgentGenerate`,
    /// `Unknown`) are deliberately absent: the router owns that path.
    pub fn with_defaults(config: &RuntimeConfig) -> Self {
        let mut registry = Self::new();
        registry
            .register(Arc::new(crate::app_actions::OpenAppAction))
            .register(Arc::new(crate::app_actions::OpenMultipleAction))
            .register(Arc::new(crate::app_actions::CloseAppAction))
            .register(Arc::new(crate::file_actions::DeleteFileAction))
            .register(Arc::new(crate::file_actions::CleanTempAction::new(
                config.temp_root.clone(),
            )))
            .register(Arc::new(crate::shell_action::RunShellAction::new(
                SandboxPolicy::from_config(config),
            )))
            .register(Arc::new(crate::system_actions::ListProcessesAction))
            .register(Arc::new(crate::system_actions::SystemStatusAction))
            .register(Arc::new(crate::system_actions::DiskUsageAction));
        registry
    }

    pub fn register(&mut self, handler: Arc<dyn ActionHandler>) -> &mut Self {
        self.handlers.insert(handler.kind(), handler);
        self
    }

    pub fn get(&self, kind: CommandKind) -> Option<Arc<dyn ActionHandler>> {
        self.handlers.get(&kind).cloned()
    }

    pub fn risk_of(&self, kind: CommandKind) -> Option<RiskClass> {
        self.handlers.get(&kind).map(|h| h.risk())
    }

    pub fn count(&self) -> usize {
        self.handlers.len()
    }
}

impl Default for ActionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
