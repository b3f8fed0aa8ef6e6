pub mod gateway;
pub mod search;

pub use gateway::GatewayClient;
pub use search::SearchClient;

/// Read an env var, treating empty/whitespace values the same as unset.
pub(crate) fn env_nonempty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Remote calls can hang indefinitely without an explicit timeout. Keep a
/// conservative cap even if callers pass something huge; 25s is the dispatch
/// contract's upper bound.
pub(crate) fn clamp_timeout_ms(requested: Option<u64>, default_ms: u64) -> u64 {
    requested.unwrap_or(default_ms).clamp(1_000, 25_000)
}

#[cfg(test)]
pub(crate) struct EnvGuard {
    k: &'static str,
    prev: Option<String>,
}

#[cfg(test)]
impl EnvGuard {
    pub(crate) fn set(k: &'static str, v: &str) -> Self {
        let prev = std::env::var(k).ok();
        std::env::set_var(k, v);
        Self { k, prev }
    }

    pub(crate) fn unset(k: &'static str) -> Self {
        let prev = std::env::var(k).ok();
        std::env::remove_var(k);
        Self { k, prev }
    }
}

#[cfg(test)]
impl Drop for EnvGuard {
    fn drop(&mut self) {
        if let Some(v) = self.prev.take() {
            std::env::set_var(self.k, v);
        } else {
            std::env::remove_var(self.k);
        }
    }
}
