//! Structural pre-check for natural-language proofs.
//!
//! [`validate`] is a small rule-based "compiler" that rejects obviously
//! malformed proof text before any external service is contacted. Rules are
//! evaluated in a fixed order so the reported reason is deterministic:
//! emptiness, step count, hypothesis marker, inference marker, conclusion
//! marker, then per-line parenthesis balance.

use std::fmt;

/// Number of characters of an offending line quoted in the failure reason.
const LINE_PREFIX_CHARS: usize = 50;

const HYPOTHESIS_MARKERS: &[&str] = &["assume", "suppose"];
const INFERENCE_MARKERS: &[&str] = &["therefore", "then"];
const CONCLUSION_MARKERS: &[&str] = &["qed"];

/// Why a proof was rejected by the structural validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationFailure {
    /// Input is empty or whitespace-only.
    Empty,
    /// No non-blank line survived trimming.
    NoSteps,
    /// No line contains "assume" or "suppose".
    MissingHypothesis,
    /// No line contains "therefore" or "then".
    MissingInference,
    /// No line contains "qed".
    MissingConclusion,
    /// A line has differing counts of `(` and `)`.
    UnbalancedParentheses { line_prefix: String },
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationFailure::Empty => write!(f, "Proof text is empty."),
            ValidationFailure::NoSteps => write!(f, "Proof has no steps."),
            ValidationFailure::MissingHypothesis => {
                write!(f, "Missing 'Assume' or 'Suppose' block for hypotheses.")
            }
            ValidationFailure::MissingInference => {
                write!(f, "Missing 'Therefore' block for proof steps.")
            }
            ValidationFailure::MissingConclusion => {
                write!(f, "Missing 'QED' block to conclude the proof.")
            }
            ValidationFailure::UnbalancedParentheses { line_prefix } => {
                write!(f, "Unmatched parentheses in: {line_prefix}...")
            }
        }
    }
}

impl std::error::Error for ValidationFailure {}

/// Check the structure of a proof. Pure function of its input.
pub fn validate(text: &str) -> Result<(), ValidationFailure> {
    if text.trim().is_empty() {
        return Err(ValidationFailure::Empty);
    }

    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    if lines.is_empty() {
        return Err(ValidationFailure::NoSteps);
    }

    let lowered: Vec<String> = lines.iter().map(|line| line.to_lowercase()).collect();

    if !any_line_contains(&lowered, HYPOTHESIS_MARKERS) {
        return Err(ValidationFailure::MissingHypothesis);
    }
    if !any_line_contains(&lowered, INFERENCE_MARKERS) {
        return Err(ValidationFailure::MissingInference);
    }
    if !any_line_contains(&lowered, CONCLUSION_MARKERS) {
        return Err(ValidationFailure::MissingConclusion);
    }

    if let Some(line) = lines.iter().find(|line| !parentheses_balanced(line)) {
        return Err(ValidationFailure::UnbalancedParentheses {
            line_prefix: line.chars().take(LINE_PREFIX_CHARS).collect(),
        });
    }

    Ok(())
}

fn any_line_contains(lines: &[String], markers: &[&str]) -> bool {
    lines
        .iter()
        .any(|line| markers.iter().any(|marker| line.contains(marker)))
}

// Counts only, not nesting: ")(" is considered balanced.
fn parentheses_balanced(line: &str) -> bool {
    let open = line.matches('(').count();
    let close = line.matches(')').count();
    open == close
}
