//! Cleanup of code returned by the transformation flow.
//!
//! The flow tends to wrap its answer in markdown fences, prefix it with a
//! `lean` language label and sometimes returns escape sequences instead of
//! real characters. [`sanitize`] normalizes that deterministically. Each step
//! is its own function and the order in [`sanitize`] matters: escapes must be
//! resolved before fences are stripped, because a fence can be followed by a
//! literal `\n`.

const FENCE: &str = "```";
const LANGUAGE_TAG: &str = "lean";

/// Run every cleanup step in order.
pub fn sanitize(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    let code = raw.trim();
    let code = unescape(code);
    let code = strip_fences(&code);
    let mut lines: Vec<String> = code.split('\n').map(str::to_string).collect();
    drop_language_tag(&mut lines);
    let lines: Vec<&str> = lines.iter().map(|line| strip_backticks(line)).collect();
    lines.join("\n").trim().to_string()
}

/// Replace literal two-character escapes with the characters they stand for.
pub fn unescape(code: &str) -> String {
    code.replace("\\n", "\n")
        .replace("\\t", "\t")
        .replace("\\\"", "\"")
        .replace("\\'", "'")
}

/// Remove one leading and one trailing triple-backtick marker.
pub fn strip_fences(code: &str) -> &str {
    let code = code.strip_prefix(FENCE).unwrap_or(code);
    code.strip_suffix(FENCE).unwrap_or(code)
}

/// Handle a language label on the first line.
///
/// A first line that is only the label is dropped. A first line that merely
/// contains it is left-trimmed and loses the first exact lowercase `lean`.
/// Detection ignores case, removal does not, so `import Lean` survives.
pub fn drop_language_tag(lines: &mut Vec<String>) {
    let Some(first) = lines.first_mut() else {
        return;
    };

    if first.trim().to_lowercase() == LANGUAGE_TAG {
        lines.remove(0);
        return;
    }

    if first.to_ascii_lowercase().contains(LANGUAGE_TAG) {
        *first = first.replacen(LANGUAGE_TAG, "", 1).trim_start().to_string();
    }
}

/// Strip backticks from both ends of a single line.
pub fn strip_backticks(line: &str) -> &str {
    line.trim_start_matches('`').trim_end_matches('`')
}
