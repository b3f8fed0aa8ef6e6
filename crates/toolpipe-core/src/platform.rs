use std::collections::BTreeMap;

/// Maps a tool name's platform prefix to a display label for fallback queries.
///
/// The table is read-only configuration injected at construction; a missing
/// prefix is fine (the label is advisory decoration, never required).
#[derive(Debug, Clone)]
pub struct PlatformLabeler {
    labels: BTreeMap<String, String>,
}

impl Default for PlatformLabeler {
    fn default() -> Self {
        let labels = [
            ("douyin", "Douyin"),
            ("tiktok", "TikTok"),
            ("xiaohongshu", "Xiaohongshu"),
            ("weibo", "Weibo"),
            ("bilibili", "Bilibili"),
            ("instagram", "Instagram"),
            ("youtube", "YouTube"),
            ("twitter", "Twitter"),
            ("kuaishou", "Kuaishou"),
            ("reddit", "Reddit"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        Self { labels }
    }
}

impl PlatformLabeler {
    pub fn new(labels: BTreeMap<String, String>) -> Self {
        Self { labels }
    }

    /// Look up the first underscore-delimited segment of `tool_name`.
    pub fn label_for(&self, tool_name: &str) -> Option<&str> {
        let prefix = tool_name.split('_').next().unwrap_or_default();
        self.labels.get(&prefix.to_ascii_lowercase()).map(String::as_str)
    }
}
