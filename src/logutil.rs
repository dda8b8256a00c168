//! Sanitizing for content and gameplay strings that end up in log lines.

use std::fmt::Write;

/// Longest preview, in characters, before a value is cut off.
const MAX_PREVIEW_CHARS: usize = 200;

/// Render `s` on one line: backslash, newline, carriage return and tab are
/// escaped, other control characters become `\xNN`, and values longer than
/// [`MAX_PREVIEW_CHARS`] are truncated with an ellipsis.
pub fn escape_log(s: &str) -> String {
    let mut out = String::with_capacity(s.len().min(MAX_PREVIEW_CHARS) + 4);
    for (count, ch) in s.chars().enumerate() {
        if count == MAX_PREVIEW_CHARS {
            out.push('…');
            break;
        }
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(out, "\\x{:02X}", c as u32);
            }
            c => out.push(c),
        }
    }
    out
}
