//! Whitespace-only YAML formatter.
//!
//! Generated configuration is normalised before it is compared with the
//! current file and committed. Only layout is touched (line endings,
//! trailing whitespace, blank-line runs, final newline), so comments and key
//! order survive. Bodies of literal (`|`) and folded (`>`) block scalars are
//! copied through untouched, and the result must load to the same value as
//! the input.

use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

use crate::schema::load_yaml;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormatError {
    #[error("cannot format invalid YAML: {0}")]
    Invalid(String),

    #[error("formatting would change the document's value")]
    ValueChanged,
}

/// Matches a line that opens a block scalar: `key: |`, `- >-`, `key: |+2 # note`.
fn block_header_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?:^|[\s:\-?])[|>](?:[+-]?[1-9]?|[1-9][+-])(?:\s+#.*)?$")
            .expect("static regex is valid")
    })
}

fn indent_of(line: &str) -> usize {
    line.len() - line.trim_start_matches(' ').len()
}

/// Normalise `text`. Idempotent: `format_yaml(format_yaml(x)?)? == format_yaml(x)?`.
pub fn format_yaml(text: &str) -> Result<String, FormatError> {
    let before = load_yaml(text).map_err(|e| FormatError::Invalid(e.to_string()))?;

    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    let mut out = String::with_capacity(normalized.len() + 1);
    let mut blank_run = 0usize;
    // Indent of the line that opened the block scalar we are inside, if any.
    let mut block_indent: Option<usize> = None;

    for raw in normalized.lines() {
        if let Some(header) = block_indent {
            if raw.trim().is_empty() || indent_of(raw) > header {
                out.push_str(raw);
                out.push('\n');
                continue;
            }
            block_indent = None;
        }

        let line = raw.trim_end();
        if line.is_empty() {
            blank_run += 1;
            continue;
        }
        if blank_run > 0 && !out.is_empty() {
            out.push('\n');
        }
        blank_run = 0;
        out.push_str(line);
        out.push('\n');

        if block_header_pattern().is_match(line) {
            block_indent = Some(indent_of(line));
        }
    }

    let after = load_yaml(&out).map_err(|e| FormatError::Invalid(e.to_string()))?;
    if after != before {
        return Err(FormatError::ValueChanged);
    }
    Ok(out)
}
