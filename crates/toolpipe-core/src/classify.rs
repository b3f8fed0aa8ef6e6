use crate::{excerpt, GatewayReply, Result};
use std::collections::BTreeSet;

/// Why a remote call counted as failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The HTTP exchange itself did not complete (network error, timeout,
    /// non-2xx status, body that was not JSON).
    Transport,
    /// Transport succeeded but the gateway encoded an application-level error.
    UpstreamCode,
    /// Transport and code both looked fine, but the payload is structurally
    /// empty — the only observable signal of silent anti-bot blocking.
    EmptyData,
}

#[derive(Debug, Clone)]
pub enum Outcome {
    Success { payload: serde_json::Value },
    Failure { kind: FailureKind, reason: String },
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Key sets driving the recursive emptiness heuristic.
///
/// Configuration data, not control flow: new upstream tool families get
/// accommodated by extending these sets.
#[derive(Debug, Clone)]
pub struct EmptinessRules {
    /// Keys that carry metadata rather than payload. An object whose keys all
    /// come from this set is just a wrapper around nothing; `data`, when
    /// present, must itself be empty.
    pub metadata_keys: BTreeSet<String>,
    /// Conventional listing keys; an empty array under any of them marks the
    /// whole object as an empty listing.
    pub listing_keys: BTreeSet<String>,
}

impl Default for EmptinessRules {
    fn default() -> Self {
        let metadata_keys = ["code", "data", "message", "recordTime", "msg"]
            .into_iter()
            .map(str::to_string)
            .collect();
        let listing_keys = [
            "items",
            "item_list",
            "notes",
            "note_list",
            "list",
            "results",
            "video_list",
        ]
        .into_iter()
        .map(str::to_string)
        .collect();
        Self {
            metadata_keys,
            listing_keys,
        }
    }
}

/// Decides whether a raw gateway reply was a transport failure, an upstream
/// logic failure, a semantically-empty success, or a genuine success.
///
/// The upstream gateway returns HTTP 200 and `code: 200` even when the target
/// platform silently blocked the request, so the checks run in a strict order
/// and the emptiness heuristic is the last line of defense.
#[derive(Debug, Clone, Default)]
pub struct OutcomeClassifier {
    rules: EmptinessRules,
}

impl OutcomeClassifier {
    pub fn new(rules: EmptinessRules) -> Self {
        Self { rules }
    }

    pub fn classify(&self, tool_name: &str, reply: Result<GatewayReply>) -> Outcome {
        // 1. Transport: the exchange never completed.
        let reply = match reply {
            Ok(r) => r,
            Err(e) => {
                return Outcome::Failure {
                    kind: FailureKind::Transport,
                    reason: e.to_string(),
                }
            }
        };
        if !(200..300).contains(&reply.status) {
            return Outcome::Failure {
                kind: FailureKind::Transport,
                reason: format!(
                    "HTTP {}: {}",
                    reply.status,
                    excerpt(&reply.body_excerpt, 200)
                ),
            };
        }
        let Some(body) = reply.body else {
            return Outcome::Failure {
                kind: FailureKind::Transport,
                reason: format!(
                    "response body was not JSON: {}",
                    excerpt(&reply.body_excerpt, 200)
                ),
            };
        };

        // 2. Explicit top-level error string.
        if let Some(err) = body.get("error").and_then(|v| v.as_str()) {
            if !err.trim().is_empty() {
                return Outcome::Failure {
                    kind: FailureKind::UpstreamCode,
                    reason: err.to_string(),
                };
            }
        }

        let result = body.get("result");

        // 3. Upstream logic failure: truthy numeric code other than 200.
        if let Some(code) = result.and_then(|r| r.get("code")).and_then(|c| c.as_i64()) {
            if code != 0 && code != 200 {
                let message = result
                    .and_then(|r| r.get("message"))
                    .and_then(|m| m.as_str())
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or("error");
                return Outcome::Failure {
                    kind: FailureKind::UpstreamCode,
                    reason: format!("{tool_name} returned code {code}: {message}"),
                };
            }
        }

        // 4/5. Empty-data heuristic, then success. The value inspected here is
        // also the success payload: result.data if present, else the result
        // wrapper, else the whole response.
        let probe = match result {
            Some(r) => r.get("data").unwrap_or(r),
            None => &body,
        };
        if self.is_empty(probe) {
            return Outcome::Failure {
                kind: FailureKind::EmptyData,
                reason: format!("{tool_name} returned empty data (platform anti-bot)"),
            };
        }
        Outcome::Success {
            payload: probe.clone(),
        }
    }

    /// Recursive structural-emptiness test.
    ///
    /// Known false negative: a non-empty object carrying only irrelevant keys
    /// (e.g. `{"timestamp": 123}`) is treated as non-empty and classifies as
    /// success. Inferring anti-bot blocking from shape is approximate; we do
    /// not second-guess objects that carry any non-metadata information.
    pub fn is_empty(&self, v: &serde_json::Value) -> bool {
        match v {
            serde_json::Value::Null => true,
            serde_json::Value::Array(a) => a.is_empty(),
            serde_json::Value::Object(m) => {
                if m.is_empty() {
                    return true;
                }
                if m.keys().all(|k| self.rules.metadata_keys.contains(k)) {
                    // Metadata-only wrapper: empty unless a `data` key carries
                    // an actual payload. Covers `{"code": 200}` with no data.
                    return m.get("data").map_or(true, |d| self.is_empty(d));
                }
                m.iter().any(|(k, v)| {
                    self.rules.listing_keys.contains(k)
                        && matches!(v, serde_json::Value::Array(a) if a.is_empty())
                })
            }
            _ => false,
        }
    }
}
