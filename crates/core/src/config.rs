//! Process-wide runtime configuration, set once at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Generated code is rejected outright when it contains any of these
/// substrings. A denylist is a known-weak control: it is the contract
/// inherited from the collaborator-facing safety check, not a jail.
pub const DEFAULT_BLOCKED_TOKENS: &[&str] = &[
    "rm -rf",
    "mkfs",
    "dd if=",
    "shutil.rmtree",
    "os.system",
    "subprocess.",
    "os.remove",
    "os.kill",
    "eval(",
    "exec(",
    "__import__",
    "shutdown",
    "reboot",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Model name forwarded to the language-model collaborator.
    pub model: String,
    /// Base URL of the collaborator's OpenAI-compatible endpoint.
    pub llm_base_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Sandbox wall-clock limit for spawned subprocesses.
    pub sandbox_timeout_secs: u64,
    /// Captured output cap per stream.
    pub max_output_bytes: usize,
    /// Substrings that reject generated code before it touches disk.
    pub blocked_tokens: Vec<String>,
    /// Directory receiving generated artifacts.
    pub artifact_dir: PathBuf,
    /// Interpreter used to run generated artifacts.
    pub interpreter: String,
    /// Root swept by the clean-temp action.
    pub temp_root: PathBuf,
    /// Phone-remote HTTP listener port.
    pub http_port: u16,
    /// Bluetooth/serial bridge listener port.
    pub serial_port: u16,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            model: "qwen2.5-coder".to_string(),
            llm_base_url: "http://localhost:11434/v1".to_string(),
            api_key: None,
            sandbox_timeout_secs: 30,
            max_output_bytes: 256 * 1024,
            blocked_tokens: DEFAULT_BLOCKED_TOKENS
                .iter()
                .map(|t| t.to_string())
                .collect(),
            artifact_dir: PathBuf::from("./data/artifacts"),
            interpreter: "python3".to_string(),
            temp_root: std::env::temp_dir(),
            http_port: 8888,
            serial_port: 8080,
        }
    }
}

impl RuntimeConfig {
    /// Load from a TOML file if present, then apply environment overrides.
    pub fn load(path: &Path) -> Result<Self, crate::CoreError> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            toml::from_str(&content)
                .map_err(|e| crate::CoreError::OperationFailed(format!("bad config: {}", e)))?
        } else {
            Self::default()
        };
        config.apply_env();
        Ok(config)
    }

    /// Environment overrides, applied after file load.
    pub fn apply_env(&mut self) {
        if let Ok(model) = std::env::var("ADJUTANT_MODEL") {
            self.model = model;
        }
        if let Ok(url) = std::env::var("ADJUTANT_LLM_URL") {
            self.llm_base_url = url;
        }
        if let Ok(key) = std::env::var("ADJUTANT_API_KEY") {
            self.api_key = Some(key);
        }
        if let Ok(secs) = std::env::var("ADJUTANT_TIMEOUT_SECS") {
            if let Ok(parsed) = secs.parse() {
                self.sandbox_timeout_secs = parsed;
            }
        }
        if let Ok(dir) = std::env::var("ADJUTANT_ARTIFACT_DIR") {
            self.artifact_dir = PathBuf::from(dir);
        }
        if let Ok(port) = std::env::var("ADJUTANT_HTTP_PORT") {
            if let Ok(parsed) = port.parse() {
                self.http_port = parsed;
            }
        }
        if let Ok(port) = std::env::var("ADJUTANT_SERIAL_PORT") {
            if let Ok(parsed) = port.parse() {
                self.serial_port = parsed;
            }
        }
    }

    pub fn sandbox_timeout(&self) -> Duration {
        Duration::from_secs(self.sandbox_timeout_secs)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = RuntimeConfig::default();
        assert_eq!(config.http_port, 8888);
        assert_eq!(config.serial_port, 8080);
        assert_eq!(config.sandbox_timeout(), Duration::from_secs(30));
        assert!(!config.blocked_tokens.is_empty());
    }

    #[test]
    fn round_trips_through_toml() {
        let config = RuntimeConfig::default();
        let serialized = toml::to_string_pretty(&config).unwrap();
        let parsed: RuntimeConfig = toml::from_str(&serialized).unwrap();
        assert_eq!(parsed.model, config.model);
        assert_eq!(parsed.blocked_tokens, config.blocked_tokens);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let config = RuntimeConfig::load(Path::new("/nonexistent/adjutant.toml")).unwrap();
        assert_eq!(config.http_port, RuntimeConfig::default().http_port);
    }

    #[test]
    fn partial_file_keeps_defaults_for_the_rest() {
        let parsed: RuntimeConfig = toml::from_str("model = \"llama3.1\"").unwrap();
        assert_eq!(parsed.model, "llama3.1");
        assert_eq!(parsed.http_port, RuntimeConfig::default().http_port);
        assert!(!parsed.blocked_tokens.is_empty());
    }
}
