//! Value formatting for ExtendScript source text.
//!
//! Everything here is pure and independent of the script layout, so
//! escaping can be checked on its own.

use crate::style::{Color, LineBreak};

/// Quotes `lines` as one double-quoted string literal, joining them with
/// the `line_break` escape.
pub fn string_literal(lines: &[String], line_break: LineBreak) -> String {
    let body = lines
        .iter()
        .map(|line| escape(line, line_break))
        .collect::<Vec<_>>()
        .join(line_break.escape());
    format!("\"{}\"", body)
}

/// Escapes `text` for use between double quotes. Stray line breaks inside
/// `text` are spelled with `line_break` as well.
pub fn escape(text: &str, line_break: LineBreak) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\t' => out.push_str("\\t"),
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                out.push_str(line_break.escape());
            }
            '\n' => out.push_str(line_break.escape()),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c => out.push(c),
        }
    }
    out
}

/// A number with at most three decimals and no trailing zeros.
pub fn number(value: f64) -> String {
    let fixed = format!("{:.3}", value);
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    match trimmed {
        "-0" | "" => "0".to_string(),
        t => t.to_string(),
    }
}

/// A time in seconds, always with millisecond precision.
pub fn seconds(value: f64) -> String {
    format!("{:.3}", value)
}

pub fn color(color: Color) -> String {
    let [r, g, b] = color.unit_rgb();
    format!("[{}, {}, {}]", number(r), number(g), number(b))
}
