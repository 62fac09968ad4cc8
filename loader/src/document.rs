//! Conversion of JSON documents into typed [`Document`]s.
//!
//! JSON has no date type and a single number type, so values are mapped as
//! follows:
//!
//! | JSON                                  | [`Value`]        |
//! |---------------------------------------|------------------|
//! | `null`                                | `Null`           |
//! | `true` / `false`                      | `Bool`           |
//! | integral number fitting in `i64`      | `Int`            |
//! | any other number                      | `Double`         |
//! | string                                | `String`         |
//! | `{"$date": "<RFC 3339>"}`             | `Date`           |
//! | `{"$date": <epoch millis>}`           | `Date`           |
//! | `{"$date": {"$numberLong": "<ms>"}}`  | `Date`           |
//!
//! Arrays and any other nested object are rejected.

use std::path::Path;

use chrono::{DateTime, Utc};
use docschema_core::{Document, Value};
use serde_json::Value as Json;
use tracing::debug;

use crate::error::{LoadError, Result};

/// Converts one JSON object into a [`Document`].
///
/// # Examples
///
/// ```
/// use docschema_core::{TypeTag, Value};
/// use docschema_loader::document_from_json;
///
/// let doc = document_from_json(&serde_json::json!({
///     "id": 3,
///     "score": 1.5,
///     "when": { "$date": "2024-01-15T10:30:00Z" },
///     "note": null
/// }))
/// .unwrap();
/// assert_eq!(doc.get("id"), Some(&Value::Int(3)));
/// assert_eq!(doc.get("score").unwrap().type_tag(), TypeTag::Double);
/// assert_eq!(doc.get("when").unwrap().type_tag(), TypeTag::Date);
/// assert!(doc.get("note").unwrap().is_null());
/// ```
pub fn document_from_json(json: &Json) -> Result<Document> {
    document_at(json, "document")
}

fn document_at(json: &Json, location: &str) -> Result<Document> {
    let object = json.as_object().ok_or_else(|| LoadError::InvalidDocument {
        location: location.to_string(),
        reason: "expected a JSON object".to_string(),
    })?;

    let mut doc = Document::new();
    for (name, raw) in object {
        let value = value_from_json(raw).map_err(|reason| LoadError::InvalidDocument {
            location: location.to_string(),
            reason: format!("field '{name}': {reason}"),
        })?;
        doc.insert(name, value);
    }
    Ok(doc)
}

fn value_from_json(json: &Json) -> std::result::Result<Value, String> {
    match json {
        Json::Null => Ok(Value::Null),
        Json::Bool(b) => Ok(Value::Bool(*b)),
        Json::Number(n) => Ok(match n.as_i64() {
            Some(i) => Value::Int(i),
            None => Value::Double(n.as_f64().unwrap_or(f64::NAN)),
        }),
        Json::String(s) => Ok(Value::String(s.clone())),
        Json::Object(map) => match map.get("$date") {
            Some(date) if map.len() == 1 => parse_date(date).map(Value::Date),
            _ => Err("nested objects are not supported".to_string()),
        },
        Json::Array(_) => Err("arrays are not supported".to_string()),
    }
}

fn parse_date(json: &Json) -> std::result::Result<DateTime<Utc>, String> {
    match json {
        Json::String(s) => DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|err| format!("invalid $date '{s}': {err}")),
        Json::Number(n) => n
            .as_i64()
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .ok_or_else(|| format!("invalid $date millis: {n}")),
        Json::Object(map) => match map.get("$numberLong").and_then(Json::as_str) {
            Some(ms) => ms
                .parse::<i64>()
                .ok()
                .and_then(DateTime::<Utc>::from_timestamp_millis)
                .ok_or_else(|| format!("invalid $numberLong: {ms}")),
            None => Err("unsupported $date form".to_string()),
        },
        other => Err(format!("unsupported $date value: {other}")),
    }
}

/// Parses a set of documents from text.
///
/// Content whose first non-blank character is `[` is read as a JSON array;
/// anything else as JSON lines, one object per non-blank line. Errors name
/// the offending array index or line number.
///
/// ```
/// use docschema_loader::parse_documents;
///
/// let docs = parse_documents("{\"id\": 1}\n\n{\"id\": 2}\n").unwrap();
/// assert_eq!(docs.len(), 2);
///
/// let docs = parse_documents("[{\"id\": 1}]").unwrap();
/// assert_eq!(docs.len(), 1);
/// ```
pub fn parse_documents(content: &str) -> Result<Vec<Document>> {
    let trimmed = content.trim_start();
    if trimmed.starts_with('[') {
        let items: Vec<Json> = serde_json::from_str(trimmed)?;
        return items
            .iter()
            .enumerate()
            .map(|(i, item)| document_at(item, &format!("index {i}")))
            .collect();
    }

    let mut docs = Vec::new();
    for (i, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let location = format!("line {}", i + 1);
        let json: Json = serde_json::from_str(line).map_err(|err| LoadError::InvalidDocument {
            location: location.clone(),
            reason: err.to_string(),
        })?;
        docs.push(document_at(&json, &location)?);
    }
    Ok(docs)
}

/// Reads documents from a JSON array or JSON-lines file.
pub fn read_documents(path: impl AsRef<Path>) -> Result<Vec<Document>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;
    let docs = parse_documents(&content)?;
    debug!(path = %path.display(), count = docs.len(), "read documents");
    Ok(docs)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_number_mapping() {
        let doc = document_from_json(&json!({
            "small": -4,
            "frac": 0.25,
            "whole_float": 2.0,
            "huge": 18446744073709551615u64
        }))
        .unwrap();
        assert_eq!(doc.get("small"), Some(&Value::Int(-4)));
        assert_eq!(doc.get("frac"), Some(&Value::Double(0.25)));
        assert_eq!(doc.get("whole_float"), Some(&Value::Double(2.0)));
        assert!(matches!(doc.get("huge"), Some(Value::Double(_))));
    }

    #[test]
    fn test_date_forms() {
        let expected = Utc.with_ymd_and_hms(2023, 11, 14, 22, 13, 20).unwrap();
        let doc = document_from_json(&json!({
            "a": { "$date": "2023-11-14T22:13:20Z" },
            "b": { "$date": 1_700_000_000_000i64 },
            "c": { "$date": { "$numberLong": "1700000000000" } },
            "d": { "$date": "2023-11-15T07:13:20+09:00" }
        }))
        .unwrap();
        for name in ["a", "b", "c", "d"] {
            assert_eq!(doc.get(name), Some(&Value::Date(expected)), "field {name}");
        }
    }

    #[test]
    fn test_bad_date_rejected() {
        let err = document_from_json(&json!({ "when": { "$date": "yesterday" } })).unwrap_err();
        assert!(err.to_string().contains("when"));
    }

    #[test]
    fn test_nested_values_rejected() {
        assert!(document_from_json(&json!({ "tags": ["a"] })).is_err());
        assert!(document_from_json(&json!({ "address": { "city": "x" } })).is_err());
    }

    #[test]
    fn test_root_must_be_object() {
        let err = document_from_json(&json!([1, 2])).unwrap_err();
        assert!(matches!(err, LoadError::InvalidDocument { .. }));
    }

    #[test]
    fn test_json_lines_error_names_line() {
        let err = parse_documents("{\"id\": 1}\n\n{\"id\": \n").unwrap_err();
        assert!(err.to_string().contains("line 3"), "{err}");
    }

    #[test]
    fn test_array_error_names_index() {
        let err = parse_documents("[{\"id\": 1}, 5]").unwrap_err();
        assert!(err.to_string().contains("index 1"), "{err}");
    }

    #[test]
    fn test_empty_content_has_no_documents() {
        assert!(parse_documents("  \n").unwrap().is_empty());
    }
}
