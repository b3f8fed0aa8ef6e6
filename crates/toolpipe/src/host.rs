use std::sync::Arc;
use toolpipe_core::{DispatchResult, Dispatcher, Error, Result, ToolArguments};
use toolpipe_local::{GatewayClient, SearchClient};

/// In-process plugin host: the embeddable call site for agent runtimes that
/// link toolpipe directly instead of talking to the stdio server.
///
/// Both hosts share the same [`Dispatcher`]; this type only adds construction
/// and text rendering around it.
pub struct ToolHost {
    dispatcher: Dispatcher,
}

impl ToolHost {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }

    /// Build from `TOOLPIPE_GATEWAY_*` / `TOOLPIPE_SEARCH_*` environment
    /// configuration.
    pub fn from_env() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("toolpipe/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::NotConfigured(e.to_string()))?;
        let gateway = Arc::new(GatewayClient::from_env(client.clone())?);
        let search = Arc::new(SearchClient::from_env(client)?);
        Ok(Self::new(Dispatcher::new(gateway, search)))
    }

    /// Run one dispatch and return the structured result.
    ///
    /// `arguments` may be a JSON object, a JSON-encoded string, or `null`
    /// (no arguments); anything else fails with `MalformedArguments`.
    pub async fn dispatch(
        &self,
        tool_name: &str,
        arguments: serde_json::Value,
    ) -> Result<DispatchResult> {
        self.dispatcher
            .dispatch(tool_name, ToolArguments::from_value(arguments))
            .await
    }

    /// Run one dispatch and render the result as agent-facing text.
    pub async fn call(&self, tool_name: &str, arguments: serde_json::Value) -> Result<String> {
        Ok(self.dispatch(tool_name, arguments).await?.render_text())
    }
}
