use crate::{excerpt, SearchBackend, SearchReply, SearchRequest};
use std::sync::Arc;

/// Marker prefixed to rendered fallback output so downstream consumers can
/// tell recovered results from primary tool data.
pub const FALLBACK_MARKER: &str = "[fallback web search]";

/// A search derived from a failed tool call's arguments. Ephemeral: lives for
/// one dispatch only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackQuery {
    pub keyword: String,
    pub platform_label: Option<String>,
}

impl FallbackQuery {
    pub fn search_string(&self) -> String {
        match self.platform_label.as_deref() {
            Some(label) => format!("{label} {}", self.keyword),
            None => self.keyword.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum FallbackOutcome {
    Success { text: String },
    Unavailable { reason: String },
}

/// Issues the secondary search-and-enrich request when a primary tool call
/// failed. Best-effort by contract: this path never propagates an error.
pub struct FallbackSearchInvoker {
    backend: Arc<dyn SearchBackend>,
    count: usize,
    max_chars: usize,
    timeout_ms: u64,
}

impl FallbackSearchInvoker {
    pub fn new(backend: Arc<dyn SearchBackend>) -> Self {
        Self {
            backend,
            // Small result count with full-text enrichment: recovered context
            // for the agent, not a search product.
            count: 5,
            max_chars: 5_000,
            timeout_ms: 20_000,
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        // The fallback bound stays at or under the primary call's 25s.
        self.timeout_ms = timeout_ms.min(25_000);
        self
    }

    pub async fn run(&self, query: &FallbackQuery) -> FallbackOutcome {
        let req = SearchRequest {
            query: query.search_string(),
            count: self.count,
            enrich: true,
            max_chars: self.max_chars,
            timeout_ms: Some(self.timeout_ms),
        };
        let reply = match self.backend.search(&req).await {
            Ok(r) => r,
            Err(e) => {
                return FallbackOutcome::Unavailable {
                    reason: e.to_string(),
                }
            }
        };
        if reply.results.is_empty() {
            return FallbackOutcome::Unavailable {
                reason: format!("search for {:?} returned no results", req.query),
            };
        }
        FallbackOutcome::Success {
            text: render_results(&req.query, &reply, self.max_chars),
        }
    }
}

fn render_results(query: &str, reply: &SearchReply, max_chars: usize) -> String {
    let mut out = format!(
        "{FALLBACK_MARKER} provider={} query={:?} ({} results)\n",
        reply.provider,
        query,
        reply.results.len()
    );
    for (i, hit) in reply.results.iter().enumerate() {
        out.push_str(&format!("\n{}. {}\n   {}\n", i + 1, hit.title, hit.url));
        if let Some(snippet) = hit.snippet.as_deref() {
            if !snippet.trim().is_empty() {
                out.push_str(&format!("   {}\n", excerpt(snippet, 500)));
            }
        }
        if let Some(content) = hit.content.as_deref() {
            if !content.trim().is_empty() {
                out.push_str(&format!("   {}\n", excerpt(content, max_chars)));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, Result, SearchHit};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CannedSearch {
        reply: Result<SearchReply>,
        calls: AtomicUsize,
    }

    impl CannedSearch {
        fn new(reply: Result<SearchReply>) -> Self {
            Self {
                reply,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait::async_trait]
    impl SearchBackend for CannedSearch {
        async fn search(&self, _req: &SearchRequest) -> Result<SearchReply> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.reply {
                Ok(r) => Ok(r.clone()),
                Err(e) => Err(Error::Search(e.to_string())),
            }
        }
    }

    fn two_hits() -> SearchReply {
        SearchReply {
            query: "TikTok AI".to_string(),
            provider: "tavily".to_string(),
            results: vec![
                SearchHit {
                    title: "AI on TikTok".to_string(),
                    url: "https://example.com/a".to_string(),
                    snippet: Some("a snippet".to_string()),
                    content: Some("full page text".to_string()),
                },
                SearchHit {
                    title: "More AI".to_string(),
                    url: "https://example.com/b".to_string(),
                    snippet: None,
                    content: None,
                },
            ],
        }
    }

    #[test]
    fn search_string_prefixes_label_when_present() {
        let q = FallbackQuery {
            keyword: "AI".to_string(),
            platform_label: Some("TikTok".to_string()),
        };
        assert_eq!(q.search_string(), "TikTok AI");
        let q = FallbackQuery {
            keyword: "AI".to_string(),
            platform_label: None,
        };
        assert_eq!(q.search_string(), "AI");
    }

    #[tokio::test]
    async fn renders_marker_and_all_hits() {
        let invoker = FallbackSearchInvoker::new(Arc::new(CannedSearch::new(Ok(two_hits()))));
        let q = FallbackQuery {
            keyword: "AI".to_string(),
            platform_label: Some("TikTok".to_string()),
        };
        match invoker.run(&q).await {
            FallbackOutcome::Success { text } => {
                assert!(text.starts_with(FALLBACK_MARKER), "text={text}");
                assert!(text.contains("TikTok AI"));
                assert!(text.contains("AI on TikTok"));
                assert!(text.contains("https://example.com/b"));
                assert!(text.contains("full page text"));
            }
            FallbackOutcome::Unavailable { reason } => panic!("unavailable: {reason}"),
        }
    }

    #[tokio::test]
    async fn zero_results_is_unavailable() {
        let empty = SearchReply {
            query: "q".to_string(),
            provider: "tavily".to_string(),
            results: vec![],
        };
        let invoker = FallbackSearchInvoker::new(Arc::new(CannedSearch::new(Ok(empty))));
        let q = FallbackQuery {
            keyword: "nothing matches this".to_string(),
            platform_label: None,
        };
        match invoker.run(&q).await {
            FallbackOutcome::Unavailable { reason } => {
                assert!(reason.contains("no results"), "reason={reason}")
            }
            FallbackOutcome::Success { text } => panic!("unexpected success: {text}"),
        }
    }

    #[tokio::test]
    async fn backend_error_is_absorbed_not_propagated() {
        let invoker = FallbackSearchInvoker::new(Arc::new(CannedSearch::new(Err(
            Error::Search("search HTTP 502".to_string()),
        ))));
        let q = FallbackQuery {
            keyword: "AI".to_string(),
            platform_label: None,
        };
        match invoker.run(&q).await {
            FallbackOutcome::Unavailable { reason } => {
                assert!(reason.contains("502"), "reason={reason}")
            }
            FallbackOutcome::Success { text } => panic!("unexpected success: {text}"),
        }
    }

    #[test]
    fn fallback_timeout_never_exceeds_primary_bound() {
        let invoker = FallbackSearchInvoker::new(Arc::new(CannedSearch::new(Ok(two_hits()))))
            .with_timeout_ms(60_000);
        assert_eq!(invoker.timeout_ms, 25_000);
    }
}
