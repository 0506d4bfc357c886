//! Code agent: free-text goal -> generated source -> sandboxed execution.
//!
//! The language-model backend is a black-box collaborator behind the
//! [`Collaborator`] trait. Generated source is statically scanned against
//! the blocked-token policy before anything is written to disk; artifacts
//! that pass are persisted write-once and retained after execution as an
//! audit trail.

pub mod agent;
pub mod artifact;
pub mod client;
pub mod codegen;

pub use agent::CodeAgent;
pub use artifact::{ArtifactStore, GeneratedArtifact};
pub use client::{Collaborator, HttpLlmClient};
pub use codegen::extract_code;
