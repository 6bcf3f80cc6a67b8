//! Fault-tolerant decoding of the model's JSON reply.
//!
//! Strict `serde_json` parsing is tried first. If that fails, a narrow
//! recovery scan looks for the two required string fields directly in the
//! raw text:
//!
//! ```text
//! field   := '"' NAME '"' WS* ':' WS* '"' content '"'
//! content := ( '\' <any char except a line terminator> | <any char except '"' and '\'> )*
//! ```
//!
//! The first occurrence of each field that completes this grammar wins.
//! Recovered content gets exactly two escapes undone: `\n` and `\"`.

use serde_json::{Map, Value};
use tracing::{error, info, warn};

use policysage_core::{Error, Result, COMMENTARY_FIELD, TABLE_FIELD};

/// Parse the raw reply, falling back to the recovery scan.
///
/// The returned value still has to pass [`crate::validate::validate_result`].
pub fn decode_response(raw: &str) -> Result<Value> {
    match serde_json::from_str::<Value>(raw) {
        Ok(value) => Ok(value),
        Err(e) => {
            warn!("Initial JSON parse failed ({}). Attempting recovery scan...", e);
            match recover_fields(raw) {
                Some(value) => {
                    info!("Recovered both fields from malformed JSON");
                    Ok(value)
                }
                None => {
                    error!("Could not recover fields from malformed model response");
                    error!("--- Raw AI Response ---\n{}\n--- End of Raw AI Response ---", raw);
                    Err(Error::Decode {
                        raw: raw.to_string(),
                    })
                }
            }
        }
    }
}

/// Locate and unescape both required fields. `None` unless both are found
/// with non-empty content.
pub fn recover_fields(raw: &str) -> Option<Value> {
    let commentary = find_string_field(raw, COMMENTARY_FIELD).filter(|c| !c.is_empty())?;
    let table = find_string_field(raw, TABLE_FIELD).filter(|t| !t.is_empty())?;

    let mut object = Map::new();
    object.insert(
        COMMENTARY_FIELD.to_string(),
        Value::String(unescape_recovered(commentary)),
    );
    object.insert(
        TABLE_FIELD.to_string(),
        Value::String(unescape_recovered(table)),
    );
    Some(Value::Object(object))
}

/// Raw (still escaped) content of the first `"key": "..."` pair in `text`.
pub fn find_string_field<'a>(text: &'a str, key: &str) -> Option<&'a str> {
    let needle = format!("\"{key}\"");
    let mut from = 0;
    while let Some(pos) = text[from..].find(&needle) {
        let start = from + pos;
        if let Some(content) = scan_value(&text[start + needle.len()..]) {
            return Some(content);
        }
        // Step past the opening quote only; occurrences may share a quote.
        from = start + 1;
    }
    None
}

/// Parse `WS* ':' WS* '"' content '"'` at the start of `rest`.
fn scan_value(rest: &str) -> Option<&str> {
    let rest = rest.trim_start_matches(is_gap).strip_prefix(':')?;
    let rest = rest.trim_start_matches(is_gap).strip_prefix('"')?;

    let mut chars = rest.char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '"' => return Some(&rest[..i]),
            '\\' => match chars.next() {
                Some((_, escaped)) if !is_line_terminator(escaped) => {}
                _ => return None,
            },
            _ => {}
        }
    }
    // Unterminated string.
    None
}

/// Whitespace between key, colon and value. Includes the byte-order mark.
fn is_gap(c: char) -> bool {
    c.is_whitespace() || c == '\u{FEFF}'
}

fn is_line_terminator(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

/// Undo `\n` then `\"`. Other escapes are left as they are.
pub fn unescape_recovered(content: &str) -> String {
    content.replace("\\n", "\n").replace("\\\"", "\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strict_json_passes_through_unchanged() {
        let raw = r#"{"aiCommentary": "Line one\nLine \"two\" \\n", "tableHtml": "<table><tr><td>1</td></tr></table>"}"#;
        let value = decode_response(raw).unwrap();
        assert_eq!(value, serde_json::from_str::<Value>(raw).unwrap());
        assert_eq!(value["aiCommentary"], "Line one\nLine \"two\" \\n");
    }

    #[test]
    fn test_recovery_from_raw_newlines() {
        // Literal newlines inside strings make this invalid JSON.
        let raw = "{\n  \"aiCommentary\": \"## İMM\nAllianz Advantage: 5.000.000 TL vs 1.000.000 TL.\\nSee \\\"Scenario\\\".\",\n  \"tableHtml\": \"<table>\n<tr><td style=\\\"color: red\\\">x</td></tr></table>\"\n}";
        assert!(serde_json::from_str::<Value>(raw).is_err());

        let value = decode_response(raw).unwrap();
        assert_eq!(
            value["aiCommentary"],
            "## İMM\nAllianz Advantage: 5.000.000 TL vs 1.000.000 TL.\nSee \"Scenario\"."
        );
        assert_eq!(
            value["tableHtml"],
            "<table>\n<tr><td style=\"color: red\">x</td></tr></table>"
        );
    }

    #[test]
    fn test_recovery_with_malformed_outer_structure() {
        let raw = r#"Sure! {"tableHtml" : "<b>t</b>", "aiCommentary":"c\tkept" trailing"#;
        let value = decode_response(raw).unwrap();
        assert_eq!(value["aiCommentary"], "c\\tkept");
        assert_eq!(value["tableHtml"], "<b>t</b>");
    }

    #[test]
    fn test_missing_field_fails_with_raw_text() {
        let raw = "The model rambled {\"aiCommentary\": \"only one\" and nothing else";
        match decode_response(raw) {
            Err(Error::Decode { raw: kept }) => assert_eq!(kept, raw),
            other => panic!("expected decode error, got {other:?}"),
        }

        let raw = "no fields at all";
        assert!(matches!(decode_response(raw), Err(Error::Decode { .. })));
    }

    #[test]
    fn test_empty_recovered_field_counts_as_missing() {
        let raw = "{\"aiCommentary\": \"\", \"tableHtml\": \"<t>\n</t>\",";
        assert_eq!(find_string_field(raw, "aiCommentary"), Some(""));
        assert!(recover_fields(raw).is_none());
        match decode_response(raw) {
            Err(Error::Decode { raw: kept }) => assert_eq!(kept, raw),
            other => panic!("expected decode error, got {other:?}"),
        }
    }

    #[test]
    fn test_unterminated_occurrence_is_skipped() {
        let text = r#"{"aiCommentary": 42, "aiCommentary": "second"}"#;
        assert_eq!(find_string_field(text, "aiCommentary"), Some("second"));

        let text = r#"{"aiCommentary": "never closed"#;
        assert_eq!(find_string_field(text, "aiCommentary"), None);
    }

    #[test]
    fn test_byte_order_mark_counts_as_whitespace() {
        let text = "{\"aiCommentary\"\u{FEFF}:\u{FEFF} \"kept\"}";
        assert_eq!(find_string_field(text, "aiCommentary"), Some("kept"));
    }

    #[test]
    fn test_backslash_before_line_break_stops_the_match() {
        let text = "{\"aiCommentary\": \"broken \\\n value\"}";
        assert_eq!(find_string_field(text, "aiCommentary"), None);
    }

    #[test]
    fn test_unescape_only_newline_and_quote() {
        assert_eq!(unescape_recovered(r#"a\nb\"c\"\t\u0041\\"#), "a\nb\"c\"\\t\\u0041\\\\");
        // Sequential replacement: an escaped backslash before `n` still turns into a newline.
        assert_eq!(unescape_recovered(r"x\\ny"), "x\\\ny");
    }
}
