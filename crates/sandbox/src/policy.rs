use adjutant_core::{CoreError, RuntimeConfig};
use std::time::Duration;

/// Per-invocation execution constraints. Immutable once built.
#[derive(Debug, Clone)]
pub struct SandboxPolicy {
    pub timeout: Duration,
    pub blocked_tokens: Vec<String>,
    pub max_output_bytes: usize,
}

impl SandboxPolicy {
    pub fn new(timeout: Duration, blocked_tokens: Vec<String>, max_output_bytes: usize) -> Self {
        Self {
            timeout,
            blocked_tokens,
            max_output_bytes,
        }
    }

    pub fn from_config(config: &RuntimeConfig) -> Self {
        Self {
            timeout: config.sandbox_timeout(),
            blocked_tokens: config.blocked_tokens.clone(),
            max_output_bytes: config.max_output_bytes,
        }
    }

    /// Static denylist scan over generated source, case-insensitive.
    ///
    /// Callers run this before writing anything to disk; the runner itself
    /// never filters (raw shell commands pass through unmodified).
    pub fn scan_source(&self, source: &str) -> Result<(), CoreError> {
        let haystack = source.to_lowercase();
        for token in &self.blocked_tokens {
            if haystack.contains(&token.to_lowercase()) {
                return Err(CoreError::ValidationBlocked(format!(
                    "generated code contains blocked token {:?}",
                    token
                )));
            }
        }
        Ok(())
    }
}
