//! Canonical JSON encoding per RFC 8785 (JSON Canonicalization Scheme).
//!
//! This module implements the subset of JCS the log format needs:
//! - Object members sorted by UTF-16 code unit order
//! - No insignificant whitespace
//! - Minimal string escaping, lowercase hex for `\u` escapes
//! - Numbers restricted to integers within ±(2^53 − 1)
//! - UTF-8 output
//!
//! The canonical encoding is critical: it ensures that the same signable
//! view produces identical bytes (and thus identical digests and
//! signatures) across all platforms.
//!
//! **CRITICAL**: This encoding is FROZEN. Changes break all existing
//! signatures and chain links.

use serde_json::Value;
use thiserror::Error;

/// Largest integer magnitude representable exactly as a JSON number
/// (2^53 − 1, the ECMAScript safe-integer bound).
pub const MAX_SAFE_INTEGER: u64 = 9_007_199_254_740_991;

/// Error returned when a value cannot be canonicalized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CanonicalizationError {
    /// Non-integer number (float or non-finite); full ECMAScript number
    /// formatting is out of scope for this encoding.
    #[error("non-integer number cannot be canonicalized: {0}")]
    NonIntegerNumber(String),

    /// Integer magnitude exceeds 2^53 − 1 and would lose precision in
    /// JSON consumers.
    #[error("integer outside safe range: {0}")]
    IntegerOutOfRange(String),
}

/// Encode a JSON value to canonical UTF-8 bytes.
pub fn canonical_json(value: &Value) -> Result<Vec<u8>, CanonicalizationError> {
    let mut buf = Vec::new();
    encode_value(&mut buf, value)?;
    Ok(buf)
}

/// Recursively encode a JSON value.
fn encode_value(buf: &mut Vec<u8>, value: &Value) -> Result<(), CanonicalizationError> {
    match value {
        Value::Null => buf.extend_from_slice(b"null"),
        Value::Bool(true) => buf.extend_from_slice(b"true"),
        Value::Bool(false) => buf.extend_from_slice(b"false"),
        Value::Number(n) => encode_number(buf, n)?,
        Value::String(s) => encode_string(buf, s),
        Value::Array(items) => {
            buf.push(b'[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    buf.push(b',');
                }
                encode_value(buf, item)?;
            }
            buf.push(b']');
        }
        Value::Object(map) => {
            // JCS: members sorted by UTF-16 code units of the key
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.encode_utf16().cmp(b.0.encode_utf16()));

            buf.push(b'{');
            for (i, (key, val)) in entries.iter().enumerate() {
                if i > 0 {
                    buf.push(b',');
                }
                encode_string(buf, key);
                buf.push(b':');
                encode_value(buf, val)?;
            }
            buf.push(b'}');
        }
    }
    Ok(())
}

/// Encode a number. Only safe-range integers are representable.
fn encode_number(buf: &mut Vec<u8>, n: &serde_json::Number) -> Result<(), CanonicalizationError> {
    if let Some(u) = n.as_u64() {
        if u > MAX_SAFE_INTEGER {
            return Err(CanonicalizationError::IntegerOutOfRange(n.to_string()));
        }
        buf.extend_from_slice(u.to_string().as_bytes());
        return Ok(());
    }
    if let Some(i) = n.as_i64() {
        if i.unsigned_abs() > MAX_SAFE_INTEGER {
            return Err(CanonicalizationError::IntegerOutOfRange(n.to_string()));
        }
        buf.extend_from_slice(i.to_string().as_bytes());
        return Ok(());
    }
    Err(CanonicalizationError::NonIntegerNumber(n.to_string()))
}

/// Encode a string with JCS minimal escaping.
///
/// Two-character escapes for the popular control characters and for `"`
/// and `\`; `\u00xx` with lowercase hex for the remaining C0 controls;
/// every other character verbatim as UTF-8.
fn encode_string(buf: &mut Vec<u8>, s: &str) {
    buf.push(b'"');
    for c in s.chars() {
        match c {
            '"' => buf.extend_from_slice(b"\\\""),
            '\\' => buf.extend_from_slice(b"\\\\"),
            '\u{0008}' => buf.extend_from_slice(b"\\b"),
            '\u{0009}' => buf.extend_from_slice(b"\\t"),
            '\u{000A}' => buf.extend_from_slice(b"\\n"),
            '\u{000C}' => buf.extend_from_slice(b"\\f"),
            '\u{000D}' => buf.extend_from_slice(b"\\r"),
            c if (c as u32) < 0x20 => {
                buf.extend_from_slice(format!("\\u{:04x}", c as u32).as_bytes());
            }
            c => {
                let mut utf8 = [0u8; 4];
                buf.extend_from_slice(c.encode_utf8(&mut utf8).as_bytes());
            }
        }
    }
    buf.push(b'"');
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn canon_str(value: &Value) -> String {
        String::from_utf8(canonical_json(value).unwrap()).unwrap()
    }

    #[test]
    fn test_deterministic() {
        let value = json!({"b": 1, "a": "x", "c": [1, 2, 3]});
        assert_eq!(canonical_json(&value).unwrap(), canonical_json(&value).unwrap());
    }

    #[test]
    fn test_keys_sorted_no_whitespace() {
        let value = json!({"z": 1, "a": "hello", "m": {"y": 2, "x": 1}});
        assert_eq!(canon_str(&value), r#"{"a":"hello","m":{"x":1,"y":2},"z":1}"#);
    }

    #[test]
    fn test_utf16_key_order() {
        // U+10000 encodes as the surrogate pair D800 DC00 in UTF-16, which
        // sorts BEFORE U+E000 even though its UTF-8 bytes sort after.
        let value = json!({"\u{e000}": 1, "\u{10000}": 2});
        assert_eq!(
            canon_str(&value),
            format!(r#"{{"{}":2,"{}":1}}"#, '\u{10000}', '\u{e000}')
        );
    }

    #[test]
    fn test_string_escaping() {
        let value = json!("a\"b\\c\n\t\r\u{0008}\u{000C}\u{0001}");
        assert_eq!(canon_str(&value), "\"a\\\"b\\\\c\\n\\t\\r\\b\\f\\u0001\"");
    }

    #[test]
    fn test_unicode_passes_through() {
        let value = json!({"msg": "héllo 世界 🚀"});
        assert_eq!(canon_str(&value), "{\"msg\":\"héllo 世界 🚀\"}");
    }

    #[test]
    fn test_integers() {
        assert_eq!(canon_str(&json!(0)), "0");
        assert_eq!(canon_str(&json!(42)), "42");
        assert_eq!(canon_str(&json!(-7)), "-7");
        assert_eq!(canon_str(&json!(MAX_SAFE_INTEGER)), "9007199254740991");
    }

    #[test]
    fn test_rejects_unsafe_integer() {
        let result = canonical_json(&json!(MAX_SAFE_INTEGER + 1));
        assert!(matches!(result, Err(CanonicalizationError::IntegerOutOfRange(_))));
    }

    #[test]
    fn test_rejects_float() {
        let result = canonical_json(&json!(1.5));
        assert!(matches!(result, Err(CanonicalizationError::NonIntegerNumber(_))));
    }

    #[test]
    fn test_idempotent() {
        // canon(parse(canon(x))) == canon(x)
        let value = json!({"b": [1, {"d": "x", "c": ""}], "a": "é\n"});
        let first = canonical_json(&value).unwrap();
        let reparsed: Value = serde_json::from_slice(&first).unwrap();
        let second = canonical_json(&reparsed).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_values() {
        assert_eq!(canon_str(&json!({})), "{}");
        assert_eq!(canon_str(&json!([])), "[]");
        assert_eq!(canon_str(&json!("")), "\"\"");
    }
}
