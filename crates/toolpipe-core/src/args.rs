use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Caller-supplied tool arguments: either an already-parsed object or a
/// JSON-encoded string.
///
/// Some callers pre-parse arguments and some forward them verbatim from their
/// own wire format, so both shapes are accepted at the boundary and resolved
/// exactly once by [`ToolArguments::normalize`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToolArguments {
    Map(serde_json::Map<String, serde_json::Value>),
    Raw(String),
}

impl ToolArguments {
    /// Wrap an arbitrary JSON value the way a loosely-typed host hands it over.
    ///
    /// `null` means "no arguments". Non-object, non-string values are kept as
    /// their raw JSON text so `normalize` can reject them with a useful message.
    pub fn from_value(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Self::Map(serde_json::Map::new()),
            serde_json::Value::Object(m) => Self::Map(m),
            serde_json::Value::String(s) => Self::Raw(s),
            other => Self::Raw(other.to_string()),
        }
    }

    /// Resolve into a plain key->value mapping.
    ///
    /// An empty/whitespace string is an expected "no arguments" case and maps
    /// to an empty object. Any other string that is not a JSON object is a
    /// precondition violation and fails with [`Error::MalformedArguments`].
    pub fn normalize(&self) -> Result<serde_json::Map<String, serde_json::Value>> {
        match self {
            Self::Map(m) => Ok(m.clone()),
            Self::Raw(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Ok(serde_json::Map::new());
                }
                match serde_json::from_str::<serde_json::Value>(trimmed) {
                    Ok(serde_json::Value::Object(m)) => Ok(m),
                    Ok(other) => Err(Error::MalformedArguments(format!(
                        "expected a JSON object, got {}",
                        json_kind(&other)
                    ))),
                    Err(e) => Err(Error::MalformedArguments(format!("invalid JSON: {e}"))),
                }
            }
        }
    }
}

fn json_kind(v: &serde_json::Value) -> &'static str {
    match v {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

/// Argument names that carry a human search phrase, in priority order.
///
/// The order encodes which parameter name each remote tool family uses; it is
/// deliberate and must not be sorted.
pub const KEYWORD_KEYS: [&str; 4] = ["keyword", "query", "search_keyword", "keywords"];

/// Scan normalized arguments for a usable search phrase.
///
/// Only non-empty string values count; a missing keyword is absence, not an
/// error (the dispatcher decides what absence means).
pub fn extract_keyword(args: &serde_json::Map<String, serde_json::Value>) -> Option<String> {
    for key in KEYWORD_KEYS {
        if let Some(serde_json::Value::String(s)) = args.get(key) {
            if !s.trim().is_empty() {
                return Some(s.clone());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, serde_json::Value)]) -> serde_json::Map<String, serde_json::Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn object_passes_through_unchanged() {
        let m = map(&[("keyword", serde_json::json!("AI")), ("count", serde_json::json!(3))]);
        let got = ToolArguments::Map(m.clone()).normalize().expect("normalize");
        assert_eq!(got, m);
    }

    #[test]
    fn empty_string_means_no_arguments() {
        for raw in ["", "   ", "\n\t"] {
            let got = ToolArguments::Raw(raw.to_string()).normalize().expect("normalize");
            assert!(got.is_empty());
        }
    }

    #[test]
    fn json_string_is_parsed() {
        let got = ToolArguments::Raw(r#"{"keyword":"AI","count":3}"#.to_string())
            .normalize()
            .expect("normalize");
        assert_eq!(got.get("keyword"), Some(&serde_json::json!("AI")));
        assert_eq!(got.get("count"), Some(&serde_json::json!(3)));
    }

    #[test]
    fn non_object_json_is_malformed() {
        for raw in ["null", "3", "\"x\"", "[1,2]", "true"] {
            let err = ToolArguments::Raw(raw.to_string()).normalize().unwrap_err();
            assert!(
                matches!(err, Error::MalformedArguments(_)),
                "raw={raw} err={err}"
            );
        }
    }

    #[test]
    fn invalid_json_is_malformed() {
        let err = ToolArguments::Raw("{not json".to_string()).normalize().unwrap_err();
        assert!(matches!(err, Error::MalformedArguments(_)));
    }

    #[test]
    fn from_value_accepts_null_object_and_string() {
        assert!(ToolArguments::from_value(serde_json::Value::Null)
            .normalize()
            .expect("null")
            .is_empty());
        let m = ToolArguments::from_value(serde_json::json!({"query":"q"}))
            .normalize()
            .expect("object");
        assert_eq!(m.get("query"), Some(&serde_json::json!("q")));
        let err = ToolArguments::from_value(serde_json::json!(42)).normalize().unwrap_err();
        assert!(matches!(err, Error::MalformedArguments(_)));
    }

    #[test]
    fn keyword_beats_query_regardless_of_insertion_order() {
        let m = map(&[
            ("query", serde_json::json!("second choice")),
            ("keyword", serde_json::json!("first choice")),
        ]);
        assert_eq!(extract_keyword(&m).as_deref(), Some("first choice"));
    }

    #[test]
    fn non_string_and_empty_values_are_skipped() {
        let m = map(&[
            ("keyword", serde_json::json!(42)),
            ("query", serde_json::json!("")),
            ("search_keyword", serde_json::json!("rust async")),
        ]);
        assert_eq!(extract_keyword(&m).as_deref(), Some("rust async"));
    }

    #[test]
    fn no_keyword_is_absence() {
        let m = map(&[("count", serde_json::json!(3))]);
        assert_eq!(extract_keyword(&m), None);
    }
}
