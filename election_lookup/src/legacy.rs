//! Tolerant readers for the historical export formats.
//!
//! Older exports stored result tables as Python `repr` strings (single quotes,
//! `None`, one row per line) and mixed numbers and strings for identifiers.
//! Everything that copes with those quirks lives here, so that the rest of the
//! crate only sees clean, typed records.

use log::debug;
use serde::de::{DeserializeOwned, Deserializer};
use serde::Deserialize;
use serde_json::Value as JSValue;
use std::iter::Peekable;
use std::str::Chars;

/// Parses a list of rows stored either as real JSON or in the legacy
/// single-quoted format.
///
/// An empty fragment, `[]`, or anything that cannot be read yields an empty
/// list. This function never fails.
pub fn parse_results<T: DeserializeOwned>(fragment: &str) -> Vec<T> {
    let trimmed = fragment.trim();
    if trimmed.is_empty() || trimmed == "[]" {
        return Vec::new();
    }
    if let Ok(rows) = serde_json::from_str::<Vec<T>>(trimmed) {
        return rows;
    }
    let converted = legacy_to_json(trimmed);
    match serde_json::from_str::<Vec<T>>(&converted) {
        Ok(rows) => rows,
        Err(e) => {
            debug!(
                "parse_results: dropping unreadable fragment ({} bytes): {}",
                trimmed.len(),
                e
            );
            Vec::new()
        }
    }
}

// Rewrites the Python-style notation into JSON, token by token.
// Quoted content is never touched by the keyword or newline rules.
fn legacy_to_json(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 16);
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\'' | '"' => copy_string(c, &mut chars, &mut out),
            '\n' | '\r' => {
                if needs_separator(&out, chars.clone()) {
                    out.push(',');
                }
            }
            c if c.is_alphabetic() || c == '_' => {
                let mut word = String::from(c);
                while let Some(&n) = chars.peek() {
                    if n.is_alphanumeric() || n == '_' {
                        word.push(n);
                        chars.next();
                    } else {
                        break;
                    }
                }
                out.push_str(match word.as_str() {
                    "None" | "nan" | "NaN" => "null",
                    "True" => "true",
                    "False" => "false",
                    w => w,
                });
            }
            c => out.push(c),
        }
    }
    out
}

fn copy_string(quote: char, chars: &mut Peekable<Chars>, out: &mut String) {
    out.push('"');
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                // JSON has no \' escape.
                Some('\'') => out.push('\''),
                Some(e) => {
                    out.push('\\');
                    out.push(e);
                }
                None => return,
            },
            c if c == quote => {
                out.push('"');
                return;
            }
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            c => out.push(c),
        }
    }
}

// A line break separates two rows only when a value ends before it and
// another value starts after it.
fn needs_separator(out: &str, rest: Peekable<Chars>) -> bool {
    let before = out.trim_end().chars().last();
    if matches!(before, None | Some('[') | Some('{') | Some(',') | Some(':')) {
        return false;
    }
    let mut rest = rest;
    let after = rest.find(|c| !c.is_whitespace());
    !matches!(after, None | Some(']') | Some('}') | Some(','))
}

fn value_to_u64(v: &JSValue) -> Option<u64> {
    match v {
        JSValue::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f.round() as u64)),
        JSValue::String(s) => {
            let s = s.trim();
            s.parse::<u64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|f| *f >= 0.0).map(|f| f.round() as u64))
        }
        _ => None,
    }
}

/// Reads an identifier that may be exported as `3`, `3.0` or `"3"`.
/// Anything unreadable becomes `0`, the "unset" identifier.
pub fn id_from_number_or_string<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
    let v = JSValue::deserialize(d)?;
    Ok(value_to_u64(&v).map(|x| x as u32).unwrap_or(0))
}

/// Optional counterpart of [id_from_number_or_string]: null, empty strings and
/// unreadable values become `None`.
pub fn opt_id_from_number_or_string<'de, D: Deserializer<'de>>(
    d: D,
) -> Result<Option<u32>, D::Error> {
    let v = JSValue::deserialize(d)?;
    Ok(value_to_u64(&v).map(|x| x as u32))
}

/// Reads a vote count that may have been exported as a float (`84808.0`).
pub fn opt_count<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u64>, D::Error> {
    let v = JSValue::deserialize(d)?;
    Ok(value_to_u64(&v))
}

/// Reads a list stored either as a JSON array or as a string holding the
/// list (JSON or legacy notation).
pub fn list_from_array_or_string<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let v = JSValue::deserialize(d)?;
    let res = match v {
        JSValue::Array(_) => match serde_json::from_value::<Vec<T>>(v) {
            Ok(rows) => rows,
            Err(e) => {
                debug!("list_from_array_or_string: dropping array: {}", e);
                Vec::new()
            }
        },
        JSValue::String(s) => parse_results(&s),
        _ => Vec::new(),
    };
    Ok(res)
}
