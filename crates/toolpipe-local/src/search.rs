use crate::{clamp_timeout_ms, env_nonempty};
use serde::Deserialize;
use std::time::Duration;
use toolpipe_core::{Error, Result, SearchBackend, SearchHit, SearchReply, SearchRequest};

fn search_endpoint_from_env() -> Option<String> {
    env_nonempty("TOOLPIPE_SEARCH_ENDPOINT")
}

fn search_api_key_from_env() -> Option<String> {
    env_nonempty("TOOLPIPE_SEARCH_API_KEY").or_else(|| env_nonempty("SEARCH_PROXY_API_KEY"))
}

/// Client for the generic search-and-enrich service the fallback path uses.
#[derive(Debug, Clone)]
pub struct SearchClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl SearchClient {
    pub fn new(client: reqwest::Client, endpoint: String, api_key: Option<String>) -> Result<Self> {
        url::Url::parse(&endpoint)
            .map_err(|e| Error::NotConfigured(format!("invalid search endpoint: {e}")))?;
        Ok(Self {
            client,
            endpoint: Self::endpoint_search_for(&endpoint),
            api_key,
        })
    }

    pub fn from_env(client: reqwest::Client) -> Result<Self> {
        let endpoint = search_endpoint_from_env().ok_or_else(|| {
            Error::NotConfigured("missing TOOLPIPE_SEARCH_ENDPOINT".to_string())
        })?;
        Self::new(client, endpoint, search_api_key_from_env())
    }

    pub fn configured() -> bool {
        search_endpoint_from_env().is_some()
    }

    fn endpoint_search_for(base_endpoint: &str) -> String {
        // Accept either a base URL or a full /search endpoint.
        let mut base = base_endpoint.trim().trim_end_matches('/').to_string();
        if !base.ends_with("/search") {
            base.push_str("/search");
        }
        base
    }
}

// The proxy's response shape; every field is optional on the wire.
#[derive(Debug, Deserialize)]
struct ProxySearchResponse {
    query: Option<String>,
    provider: Option<String>,
    results: Option<Vec<ProxySearchResult>>,
}

#[derive(Debug, Deserialize)]
struct ProxySearchResult {
    url: Option<String>,
    title: Option<String>,
    snippet: Option<String>,
    content: Option<String>,
}

#[async_trait::async_trait]
impl SearchBackend for SearchClient {
    async fn search(&self, req: &SearchRequest) -> Result<SearchReply> {
        let timeout_ms = clamp_timeout_ms(req.timeout_ms, 20_000);
        let body = serde_json::json!({
            "query": req.query,
            "count": req.count,
            "enrich": req.enrich,
            "max_chars": req.max_chars,
        });

        let mut http_req = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .timeout(Duration::from_millis(timeout_ms));
        if let Some(key) = self.api_key.as_deref() {
            http_req = http_req.header("X-API-Key", key);
        }

        let resp = http_req.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::Search(format!("search timed out after {timeout_ms}ms"))
            } else {
                Error::Search(e.to_string())
            }
        })?;
        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Search(format!("search HTTP {status}")));
        }

        let parsed: ProxySearchResponse =
            resp.json().await.map_err(|e| Error::Search(e.to_string()))?;

        let mut results = Vec::new();
        for r in parsed.results.unwrap_or_default().into_iter().take(req.count) {
            let Some(url) = r.url.filter(|u| !u.is_empty()) else {
                continue;
            };
            results.push(SearchHit {
                title: r.title.unwrap_or_default(),
                url,
                snippet: r.snippet.filter(|s| !s.is_empty()),
                content: r.content.filter(|c| !c.is_empty()),
            });
        }

        Ok(SearchReply {
            query: parsed.query.unwrap_or_else(|| req.query.clone()),
            provider: parsed.provider.unwrap_or_else(|| "unknown".to_string()),
            results,
        })
    }
}
