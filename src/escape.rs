//! Escaping for text embedded in script string literals.
//!
//! Captured process output ends up inside a double-quoted string literal in
//! the dispatched snippet. The escaper applies exactly five substitutions,
//! left to right, in a single pass:
//!
//! | input | output |
//! |-------|--------|
//! | `\`   | `\\`   |
//! | `"`   | `\"`   |
//! | LF    | `\n`   |
//! | CR    | `\r`   |
//! | TAB   | `\t`   |
//!
//! Everything else passes through unchanged, including other control
//! characters. This is sufficient only because the dispatcher embeds the
//! result exclusively inside double-quoted literals, never as raw markup.

/// Escape `input` for embedding inside a double-quoted script string literal.
pub fn escape_js_string(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(ch),
        }
    }
    out
}

/// Decode captured bytes as UTF-8 (lossily) and escape the result.
///
/// Invalid UTF-8 sequences become U+FFFD replacement characters before
/// escaping; the five substitutions themselves are byte-exact.
pub fn escape_captured(bytes: &[u8]) -> String {
    escape_js_string(&String::from_utf8_lossy(bytes))
}
