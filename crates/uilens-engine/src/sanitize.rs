//! Pulls one JSON value out of free-form model text.

use std::collections::HashSet;

use serde_json::Value;

use crate::error::ExtractionError;

const PREVIEW_CHARS: usize = 200;

/// Returns the first complete top-level JSON object or array found in `text`,
/// with raw newlines, carriage returns and tabs inside string literals
/// escaped. The returned string is guaranteed to parse.
///
/// Candidates are found with a string-aware bracket counter. A balanced span
/// that still fails to parse (`{placeholder}` in prose) is skipped whole and
/// the scan resumes after it. Openers left open at end of input are
/// remembered and never rescanned, which keeps runs of stray brackets linear.
pub fn extract_json(text: &str) -> Result<String, ExtractionError> {
    if text.trim().is_empty() {
        return Err(ExtractionError::Empty);
    }

    let cleaned = strip_code_fences(text);
    let mut never_closes = HashSet::new();
    let mut first_parse_error = None;
    let mut search_from = 0;
    while let Some(offset) = cleaned[search_from..].find(|ch: char| ch == '{' || ch == '[') {
        let start = search_from + offset;
        if never_closes.contains(&start) {
            search_from = start + 1;
            continue;
        }
        let len = match scan_value_end(&cleaned[start..]) {
            Scan::Complete(len) => len,
            Scan::Mismatched => {
                search_from = start + 1;
                continue;
            }
            Scan::Unclosed(open) => {
                never_closes.extend(open.into_iter().map(|idx| start + idx));
                search_from = start + 1;
                continue;
            }
        };
        let repaired = escape_control_chars_in_strings(&cleaned[start..start + len]);
        match serde_json::from_str::<Value>(&repaired) {
            Ok(_) => return Ok(repaired),
            Err(err) => {
                first_parse_error.get_or_insert_with(|| err.to_string());
                search_from = start + len;
            }
        }
    }

    match first_parse_error {
        Some(message) => Err(ExtractionError::Unparseable { message }),
        None => Err(ExtractionError::NoJsonSpan {
            preview: preview(text),
        }),
    }
}

/// [`extract_json`] followed by the parse the caller wanted anyway.
pub fn extract_value(text: &str) -> Result<Value, ExtractionError> {
    let json = extract_json(text)?;
    serde_json::from_str(&json).map_err(|err| ExtractionError::Unparseable {
        message: err.to_string(),
    })
}

/// Drops every ```` ``` ```` fence marker, an immediately following `json`
/// tag (any case) and the whitespace after it.
fn strip_code_fences(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find("```") {
        out.push_str(&rest[..pos]);
        rest = &rest[pos + 3..];
        if rest
            .get(..4)
            .is_some_and(|tag| tag.eq_ignore_ascii_case("json"))
        {
            rest = &rest[4..];
        }
        rest = rest.trim_start();
    }
    out.push_str(rest);
    out
}

enum Scan {
    /// Byte length of the complete value.
    Complete(usize),
    Mismatched,
    /// Offsets of the openers still open at end of input. A scan started at
    /// any of them runs out the same way, so they are never worth retrying.
    Unclosed(Vec<usize>),
}

/// Scans the bracketed value at the start of `text`.
fn scan_value_end(text: &str) -> Scan {
    let mut open: Vec<(char, usize)> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for (idx, ch) in text.char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => open.push(('}', idx)),
            '[' => open.push((']', idx)),
            '}' | ']' => {
                if open.pop().map(|(closer, _)| closer) != Some(ch) {
                    return Scan::Mismatched;
                }
                if open.is_empty() {
                    return Scan::Complete(idx + ch.len_utf8());
                }
            }
            _ => {}
        }
    }
    Scan::Unclosed(open.into_iter().map(|(_, idx)| idx).collect())
}

fn escape_control_chars_in_strings(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    let mut in_string = false;
    let mut escaped = false;

    for ch in json.chars() {
        if !in_string {
            if ch == '"' {
                in_string = true;
            }
            out.push(ch);
            continue;
        }
        if escaped {
            escaped = false;
            out.push(ch);
            continue;
        }
        match ch {
            '\\' => {
                escaped = true;
                out.push(ch);
            }
            '"' => {
                in_string = false;
                out.push(ch);
            }
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(ch),
        }
    }
    out
}

fn preview(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= PREVIEW_CHARS {
        return trimmed.to_string();
    }
    trimmed.chars().take(PREVIEW_CHARS).collect::<String>() + "…"
}
