//! Core data model for the adjutant command shell.
//!
//! Defines the typed command set, the request/result pair every channel
//! interaction reduces to, the shared error taxonomy, and the intent
//! parser that turns raw text lines into commands.

pub mod command;
pub mod config;
pub mod error;
pub mod intent;
pub mod types;

pub use command::{Command, CommandKind, RiskClass};
pub use config::RuntimeConfig;
pub use error::CoreError;
pub use intent::{parse, parse_directive, Directive};
pub use types::{ExecStatus, ExecutionRequest, ExecutionResult};
