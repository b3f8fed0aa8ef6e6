use serde::Serialize;

pub(crate) fn warning_hint(code: &'static str) -> Option<&'static str> {
    match code {
        "fallback_search_used" => Some(
            "The primary platform tool failed, so these results came from a generic web search. They are not live platform data; treat titles/snippets as leads, not as platform records.",
        ),
        "empty_data_suspected" => Some(
            "The platform returned a structurally valid but empty result, which usually means anti-bot filtering or a query with no matches. Retrying the same call rarely helps; rephrase the keyword or try a different platform tool.",
        ),
        "string_arguments_parsed" => Some(
            "The arguments were passed as a JSON-encoded string and were parsed into an object. Prefer passing a plain JSON object to avoid double-encoding bugs.",
        ),
        _ => None,
    }
}

pub(crate) fn warning_hints_from(codes: &[&'static str]) -> serde_json::Value {
    let mut m = serde_json::Map::new();
    for c in codes {
        if let Some(h) = warning_hint(c) {
            m.insert((*c).to_string(), serde_json::json!(h));
        }
    }
    serde_json::Value::Object(m)
}

#[derive(Clone, Copy, Debug)]
pub(crate) enum ErrorCode {
    InvalidParams,
    MalformedArguments,
    NotConfigured,
    GatewayFailed,
    SearchFailed,
    DispatchExhausted,
    UnexpectedError,
}

impl ErrorCode {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::InvalidParams => "invalid_params",
            Self::MalformedArguments => "malformed_arguments",
            Self::NotConfigured => "not_configured",
            Self::GatewayFailed => "gateway_failed",
            Self::SearchFailed => "search_failed",
            Self::DispatchExhausted => "dispatch_exhausted",
            Self::UnexpectedError => "unexpected_error",
        }
    }

    pub(crate) fn retryable(self) -> bool {
        match self {
            Self::GatewayFailed | Self::SearchFailed | Self::DispatchExhausted => true,
            // Configuration + invalid input are not retryable without changing something.
            Self::InvalidParams
            | Self::MalformedArguments
            | Self::NotConfigured
            | Self::UnexpectedError => false,
        }
    }
}

pub(crate) fn add_envelope_fields(payload: &mut serde_json::Value, kind: &str, elapsed_ms: u128) {
    payload["schema_version"] = serde_json::json!(super::SCHEMA_VERSION);
    payload["kind"] = serde_json::json!(kind);
    payload["elapsed_ms"] = serde_json::json!(elapsed_ms);
    // Keep a small set of ubiquitous envelope keys stable so clients don't need
    // "missing vs present" branching.
    if payload.get("request").is_none() {
        payload["request"] = serde_json::Value::Null;
    }
}

pub(crate) fn error_obj(
    code: ErrorCode,
    message: impl ToString,
    hint: impl ToString,
) -> serde_json::Value {
    #[derive(Serialize)]
    struct ErrorObject {
        code: &'static str,
        message: String,
        hint: String,
        retryable: bool,
    }

    let e = ErrorObject {
        code: code.as_str(),
        message: message.to_string(),
        hint: hint.to_string(),
        retryable: code.retryable(),
    };
    match serde_json::to_value(e) {
        Ok(v) => v,
        Err(_) => serde_json::json!({
            "code": code.as_str(),
            "message": message.to_string(),
            "hint": hint.to_string(),
            "retryable": code.retryable()
        }),
    }
}
