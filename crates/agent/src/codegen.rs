//! Extracting a runnable code block from collaborator output.

/// Pull the generated source out of a model response.
///
/// Prefers the first fenced code block; otherwise strips leading prose
/// down to the first line that plausibly starts code. Returns `None`
/// when nothing code-like survives.
pub fn extract_code(response: &str) -> Option<String> {
    if let Some(block) = fenced_block(response) {
        let block = block.trim();
        if block.is_empty() {
            return None;
        }
        return Some(block.to_string());
    }

    let stripped = strip_leading_prose(response)?.trim();
    if stripped.is_empty() {
        None
    } else {
        Some(stripped.to_string())
    }
}

/// First ``` fenced block, language tag ignored.
fn fenced_block(response: &str) -> Option<&str> {
    let open = response.find("```")?;
    let after_fence = &response[open + 3..];
    // Skip the language tag line if present.
    let body_start = after_fence.find('\n').map(|i| i + 1).unwrap_or(0);
    let body = &after_fence[body_start..];
    let close = body.find("```")?;
    Some(&body[..close])
}

/// Drop leading chat prose: keep everything from the first line that
/// looks like code. `None` when no line does, meaning the response is
/// prose, not a program.
fn strip_leading_prose(response: &str) -> Option<&str> {
    for (offset, line) in line_offsets(response) {
        let trimmed = line.trim_start();
        if trimmed.starts_with("import ")
            || trimmed.starts_with("from ")
            || trimmed.starts_with("def ")
            || trimmed.starts_with("class ")
            || trimmed.starts_with('#')
            || is_assignment(trimmed)
        {
            return Some(&response[offset..]);
        }
    }
    None
}

fn line_offsets(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.split_inclusive('\n').scan(0usize, |offset, line| {
        let start = *offset;
        *offset += line.len();
        Some((start, line))
    })
}

fn is_assignment(line: &str) -> bool {
    let Some(eq) = line.find('=') else {
        return false;
    };
    let lhs = line[..eq].trim();
    !lhs.is_empty()
        && lhs
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !lhs.chars().next().is_some_and(|c| c.is_ascii_digit())
}
