use crate::{
    extract_keyword, EmptinessRules, Error, FallbackOutcome, FallbackQuery, FallbackSearchInvoker,
    GatewayRequest, Outcome, OutcomeClassifier, PlatformLabeler, Result, SearchBackend,
    ToolArguments, ToolGateway,
};
use std::sync::Arc;

/// The externally-visible result of one dispatch.
#[derive(Debug, Clone)]
pub enum DispatchResult {
    /// The remote tool produced usable data.
    Primary {
        tool_name: String,
        payload: serde_json::Value,
    },
    /// The remote tool failed but the fallback search recovered something.
    Fallback {
        tool_name: String,
        primary_reason: String,
        text: String,
    },
}

impl DispatchResult {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }

    /// Shared text rendering for hosts that surface plain text to the agent.
    pub fn render_text(&self) -> String {
        match self {
            Self::Primary { tool_name, payload } => {
                let body = serde_json::to_string_pretty(payload)
                    .unwrap_or_else(|_| payload.to_string());
                format!("{tool_name} result:\n{body}")
            }
            Self::Fallback {
                primary_reason,
                text,
                ..
            } => format!(
                "primary tool failed ({primary_reason}), results below are from fallback search.\n\n{text}"
            ),
        }
    }
}

/// The one shared dispatcher both hosts call.
///
/// One dispatch runs normalize -> call -> classify -> (fallback at most once).
/// The two network calls are strictly sequential; nothing here retries the
/// primary call, and no state outlives a single `dispatch` invocation.
pub struct Dispatcher {
    gateway: Arc<dyn ToolGateway>,
    classifier: OutcomeClassifier,
    labeler: PlatformLabeler,
    fallback: FallbackSearchInvoker,
    primary_timeout_ms: u64,
}

impl Dispatcher {
    pub fn new(gateway: Arc<dyn ToolGateway>, search: Arc<dyn SearchBackend>) -> Self {
        Self {
            gateway,
            classifier: OutcomeClassifier::default(),
            labeler: PlatformLabeler::default(),
            fallback: FallbackSearchInvoker::new(search),
            primary_timeout_ms: 25_000,
        }
    }

    pub fn with_emptiness_rules(mut self, rules: EmptinessRules) -> Self {
        self.classifier = OutcomeClassifier::new(rules);
        self
    }

    pub fn with_labeler(mut self, labeler: PlatformLabeler) -> Self {
        self.labeler = labeler;
        self
    }

    pub fn with_primary_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.primary_timeout_ms = timeout_ms.clamp(1_000, 25_000);
        self
    }

    /// One end-to-end attempt to satisfy a tool-call request.
    ///
    /// Never returns `Err` for ordinary remote-side failures; only for the
    /// malformed-arguments precondition and for fully exhausted fallback
    /// paths, both of which are contract outcomes rather than bugs.
    pub async fn dispatch(
        &self,
        tool_name: &str,
        arguments: ToolArguments,
    ) -> Result<DispatchResult> {
        // Normalization failure is fatal for the call; no fallback.
        let args = arguments.normalize()?;

        let req = GatewayRequest {
            tool_name: tool_name.to_string(),
            arguments: args.clone(),
            timeout_ms: Some(self.primary_timeout_ms),
        };
        // Network/timeout errors are captured and classified, not propagated.
        let reply = self.gateway.call(&req).await;

        let reason = match self.classifier.classify(tool_name, reply) {
            Outcome::Success { payload } => {
                return Ok(DispatchResult::Primary {
                    tool_name: tool_name.to_string(),
                    payload,
                })
            }
            Outcome::Failure { reason, .. } => reason,
        };

        let Some(keyword) = extract_keyword(&args) else {
            return Err(Error::Exhausted(format!(
                "{tool_name} failed: {reason}; no keyword available for fallback search"
            )));
        };
        let query = FallbackQuery {
            keyword,
            platform_label: self.labeler.label_for(tool_name).map(str::to_string),
        };
        match self.fallback.run(&query).await {
            FallbackOutcome::Success { text } => Ok(DispatchResult::Fallback {
                tool_name: tool_name.to_string(),
                primary_reason: reason,
                text,
            }),
            FallbackOutcome::Unavailable { reason: fallback_reason } => {
                Err(Error::Exhausted(format!(
                    "{tool_name} failed: {reason}; fallback search also failed: {fallback_reason}"
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GatewayReply, SearchHit, SearchReply, SearchRequest, FALLBACK_MARKER};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct MockGateway {
        reply: Box<dyn Fn() -> Result<GatewayReply> + Send + Sync>,
        calls: AtomicUsize,
    }

    impl MockGateway {
        fn json(body: serde_json::Value) -> Self {
            Self {
                reply: Box::new(move || {
                    Ok(GatewayReply {
                        status: 200,
                        body_excerpt: crate::excerpt(&body.to_string(), 200),
                        body: Some(body.clone()),
                    })
                }),
                calls: AtomicUsize::new(0),
            }
        }

        fn timeout() -> Self {
            Self {
                reply: Box::new(|| {
                    Err(Error::Gateway("request timed out after 25000ms".to_string()))
                }),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait::async_trait]
    impl ToolGateway for MockGateway {
        async fn call(&self, _req: &GatewayRequest) -> Result<GatewayReply> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.reply)()
        }
    }

    struct MockSearch {
        results: usize,
        calls: AtomicUsize,
        seen_queries: Mutex<Vec<String>>,
    }

    impl MockSearch {
        fn with_results(results: usize) -> Self {
            Self {
                results,
                calls: AtomicUsize::new(0),
                seen_queries: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait::async_trait]
    impl SearchBackend for MockSearch {
        async fn search(&self, req: &SearchRequest) -> Result<SearchReply> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen_queries
                .lock()
                .expect("lock")
                .push(req.query.clone());
            let results = (0..self.results)
                .map(|i| SearchHit {
                    title: format!("hit {i}"),
                    url: format!("https://example.com/{i}"),
                    snippet: Some("snippet".to_string()),
                    content: Some("page text".to_string()),
                })
                .collect();
            Ok(SearchReply {
                query: req.query.clone(),
                provider: "tavily".to_string(),
                results,
            })
        }
    }

    fn dispatcher(gateway: MockGateway, search: MockSearch) -> (Dispatcher, Arc<MockGateway>, Arc<MockSearch>) {
        let gateway = Arc::new(gateway);
        let search = Arc::new(search);
        let d = Dispatcher::new(gateway.clone(), search.clone());
        (d, gateway, search)
    }

    fn args(v: serde_json::Value) -> ToolArguments {
        ToolArguments::from_value(v)
    }

    #[tokio::test]
    async fn scenario_a_empty_item_list_falls_back_with_platform_label() {
        let body = serde_json::json!({"result": {"code": 200, "data": {"item_list": []}}});
        let (d, _gw, search) = dispatcher(MockGateway::json(body), MockSearch::with_results(2));
        let r = d
            .dispatch(
                "tiktok_web_fetch_search_video",
                args(serde_json::json!({"keyword": "AI", "count": 3})),
            )
            .await
            .expect("fallback success");
        assert!(r.is_fallback());
        let text = r.render_text();
        assert!(text.contains(FALLBACK_MARKER), "text={text}");
        assert!(text.contains("hit 0") && text.contains("hit 1"));
        let queries = search.seen_queries.lock().expect("lock");
        assert_eq!(queries.as_slice(), ["TikTok AI"]);
    }

    #[tokio::test]
    async fn scenario_b_upstream_code_failure_reason_reaches_fallback_result() {
        let body = serde_json::json!({"result": {"code": 400, "message": "rate limited"}});
        let (d, _gw, search) = dispatcher(MockGateway::json(body), MockSearch::with_results(1));
        let r = d
            .dispatch(
                "tiktok_web_fetch_search_video",
                args(serde_json::json!({"keyword": "AI", "count": 3})),
            )
            .await
            .expect("fallback success");
        match &r {
            DispatchResult::Fallback { primary_reason, .. } => {
                assert!(primary_reason.contains("code 400"), "{primary_reason}");
                assert!(primary_reason.contains("rate limited"), "{primary_reason}");
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert_eq!(search.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn scenario_c_no_keyword_is_fatal_and_search_is_never_called() {
        let body = serde_json::json!({"result": {"code": 400, "message": "rate limited"}});
        let (d, _gw, search) = dispatcher(MockGateway::json(body), MockSearch::with_results(5));
        let err = d
            .dispatch("weibo_trending", args(serde_json::json!({"count": 3})))
            .await
            .unwrap_err();
        match err {
            Error::Exhausted(msg) => {
                assert!(msg.contains("rate limited"), "msg={msg}");
                assert!(msg.contains("no keyword available"), "msg={msg}");
            }
            other => panic!("unexpected: {other}"),
        }
        assert_eq!(search.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn scenario_d_timeout_classifies_transport_and_falls_back() {
        let (d, _gw, _search) = dispatcher(MockGateway::timeout(), MockSearch::with_results(1));
        let r = d
            .dispatch(
                "douyin_search",
                args(serde_json::json!({"keyword": "cooking"})),
            )
            .await
            .expect("fallback success");
        match &r {
            DispatchResult::Fallback { primary_reason, .. } => {
                assert!(primary_reason.contains("timed out"), "{primary_reason}");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn scenario_e_fallback_exhaustion_reports_both_reasons() {
        let body = serde_json::json!({"result": {"code": 200, "data": {"notes": []}}});
        let (d, _gw, _search) = dispatcher(MockGateway::json(body), MockSearch::with_results(0));
        let err = d
            .dispatch(
                "xiaohongshu_search_notes",
                args(serde_json::json!({"keyword": "travel"})),
            )
            .await
            .unwrap_err();
        match err {
            Error::Exhausted(msg) => {
                assert!(msg.contains("empty data"), "msg={msg}");
                assert!(msg.contains("fallback search also failed"), "msg={msg}");
            }
            other => panic!("unexpected: {other}"),
        }
    }

    #[tokio::test]
    async fn success_never_touches_the_search_backend() {
        let body = serde_json::json!({"result": {"code": 200, "data": {"item_list": [{"id": 1}]}}});
        let (d, gw, search) = dispatcher(MockGateway::json(body), MockSearch::with_results(5));
        let r = d
            .dispatch(
                "tiktok_web_fetch_search_video",
                args(serde_json::json!({"keyword": "AI"})),
            )
            .await
            .expect("primary success");
        match &r {
            DispatchResult::Primary { tool_name, payload } => {
                assert_eq!(tool_name, "tiktok_web_fetch_search_video");
                assert_eq!(payload["item_list"][0]["id"], 1);
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert_eq!(gw.calls.load(Ordering::SeqCst), 1);
        assert_eq!(search.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn malformed_arguments_are_fatal_before_any_network_call() {
        let body = serde_json::json!({"result": {"code": 200, "data": {"items": [1]}}});
        let (d, gw, search) = dispatcher(MockGateway::json(body), MockSearch::with_results(5));
        let err = d
            .dispatch("tiktok_search", ToolArguments::Raw("{broken".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MalformedArguments(_)));
        assert_eq!(gw.calls.load(Ordering::SeqCst), 0);
        assert_eq!(search.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unknown_platform_prefix_searches_bare_keyword() {
        let body = serde_json::json!({"result": {"code": 500}});
        let (d, _gw, search) = dispatcher(MockGateway::json(body), MockSearch::with_results(1));
        d.dispatch("zhihu_hot", args(serde_json::json!({"keyword": "rust"})))
            .await
            .expect("fallback success");
        let queries = search.seen_queries.lock().expect("lock");
        assert_eq!(queries.as_slice(), ["rust"]);
    }

    #[tokio::test]
    async fn identical_inputs_give_identical_decisions() {
        let body = serde_json::json!({"result": {"code": 200, "data": {"item_list": []}}});
        let (d, gw, search) = dispatcher(MockGateway::json(body), MockSearch::with_results(2));
        for _ in 0..3 {
            let r = d
                .dispatch(
                    "tiktok_web_fetch_search_video",
                    args(serde_json::json!({"keyword": "AI", "count": 3})),
                )
                .await
                .expect("fallback success");
            assert!(r.is_fallback());
        }
        assert_eq!(gw.calls.load(Ordering::SeqCst), 3);
        assert_eq!(search.calls.load(Ordering::SeqCst), 3);
    }
}
