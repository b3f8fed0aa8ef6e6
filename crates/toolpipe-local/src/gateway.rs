use crate::{clamp_timeout_ms, env_nonempty};
use std::time::Duration;
use toolpipe_core::{excerpt, Error, GatewayReply, GatewayRequest, Result, ToolGateway};

fn gateway_endpoint_from_env() -> Option<String> {
    env_nonempty("TOOLPIPE_GATEWAY_ENDPOINT")
}

fn gateway_api_key_from_env() -> Option<String> {
    env_nonempty("TOOLPIPE_GATEWAY_API_KEY").or_else(|| env_nonempty("GATEWAY_API_KEY"))
}

/// Client for the remote tool gateway: one POST endpoint fronting hundreds of
/// named platform operations.
///
/// This client reports what happened at the transport layer and nothing more;
/// deciding whether a reply actually succeeded is the classifier's job.
#[derive(Debug, Clone)]
pub struct GatewayClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl GatewayClient {
    pub fn new(client: reqwest::Client, endpoint: String, api_key: Option<String>) -> Result<Self> {
        url::Url::parse(&endpoint)
            .map_err(|e| Error::NotConfigured(format!("invalid gateway endpoint: {e}")))?;
        Ok(Self {
            client,
            endpoint,
            api_key,
        })
    }

    pub fn from_env(client: reqwest::Client) -> Result<Self> {
        let endpoint = gateway_endpoint_from_env().ok_or_else(|| {
            Error::NotConfigured("missing TOOLPIPE_GATEWAY_ENDPOINT".to_string())
        })?;
        Self::new(client, endpoint, gateway_api_key_from_env())
    }

    pub fn configured() -> bool {
        gateway_endpoint_from_env().is_some()
    }
}

#[async_trait::async_trait]
impl ToolGateway for GatewayClient {
    async fn call(&self, req: &GatewayRequest) -> Result<GatewayReply> {
        let timeout_ms = clamp_timeout_ms(req.timeout_ms, 25_000);
        let body = serde_json::json!({
            "tool_name": req.tool_name,
            "arguments": req.arguments,
        });

        let mut http_req = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .timeout(Duration::from_millis(timeout_ms));
        if let Some(key) = self.api_key.as_deref() {
            http_req = http_req.header(reqwest::header::AUTHORIZATION, format!("Bearer {key}"));
        }

        let map_err = |e: reqwest::Error| {
            if e.is_timeout() {
                Error::Gateway(format!("request timed out after {timeout_ms}ms"))
            } else {
                Error::Gateway(e.to_string())
            }
        };

        let resp = http_req.send().await.map_err(map_err)?;
        let status = resp.status().as_u16();
        let text = resp.text().await.map_err(map_err)?;

        Ok(GatewayReply {
            status,
            body: serde_json::from_str(&text).ok(),
            body_excerpt: excerpt(&text, 200),
        })
    }
}
