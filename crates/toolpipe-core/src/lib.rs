use serde::{Deserialize, Serialize};
use std::time::Duration;

pub mod args;
pub mod classify;
pub mod dispatch;
pub mod fallback;
pub mod platform;

pub use args::{extract_keyword, ToolArguments, KEYWORD_KEYS};
pub use classify::{EmptinessRules, FailureKind, Outcome, OutcomeClassifier};
pub use dispatch::{DispatchResult, Dispatcher};
pub use fallback::{FallbackOutcome, FallbackQuery, FallbackSearchInvoker, FALLBACK_MARKER};
pub use platform::PlatformLabeler;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("malformed arguments: {0}")]
    MalformedArguments(String),
    #[error("gateway call failed: {0}")]
    Gateway(String),
    #[error("search failed: {0}")]
    Search(String),
    #[error("not configured: {0}")]
    NotConfigured(String),
    #[error("{0}")]
    Exhausted(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// One call against the remote tool gateway.
///
/// `tool_name` is opaque except for its first underscore-delimited segment,
/// which names the upstream platform (see [`PlatformLabeler`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayRequest {
    pub tool_name: String,
    pub arguments: serde_json::Map<String, serde_json::Value>,
    /// Timeout for the whole exchange (network + body read).
    pub timeout_ms: Option<u64>,
}

impl GatewayRequest {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

/// What came back from the gateway at the transport layer.
///
/// The gateway's JSON shape is untrusted and only partially documented, so the
/// body is kept as a raw `serde_json::Value` (`None` when it did not parse)
/// and classification happens later in [`OutcomeClassifier`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayReply {
    pub status: u16,
    /// Parsed JSON body, when the body was valid JSON.
    pub body: Option<serde_json::Value>,
    /// First ~200 chars of the raw body, for failure reasons.
    pub body_excerpt: String,
}

#[async_trait::async_trait]
pub trait ToolGateway: Send + Sync {
    async fn call(&self, req: &GatewayRequest) -> Result<GatewayReply>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    pub count: usize,
    /// Ask the search service to fetch each hit and attach page text.
    pub enrich: bool,
    /// Per-page character cap applied by the search service.
    pub max_chars: usize,
    pub timeout_ms: Option<u64>,
}

impl SearchRequest {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub snippet: Option<String>,
    /// Enriched page text, present when `enrich` was requested and the fetch
    /// succeeded for this hit.
    pub content: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchReply {
    pub query: String,
    pub provider: String,
    pub results: Vec<SearchHit>,
}

#[async_trait::async_trait]
pub trait SearchBackend: Send + Sync {
    async fn search(&self, req: &SearchRequest) -> Result<SearchReply>;
}

/// Truncate to at most `limit` chars without splitting a char boundary.
pub fn excerpt(s: &str, limit: usize) -> String {
    if s.chars().count() <= limit {
        return s.to_string();
    }
    let mut out: String = s.chars().take(limit).collect();
    out.push('…');
    out
}
