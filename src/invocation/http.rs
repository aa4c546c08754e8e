use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, error};
use url::Url;

use super::{InvocationRequest, InvocationResponse, ModelInvoker};
use crate::error::{BenchError, InvocationError};
use crate::settings::BenchSettings;

/// Longest error body kept in an `InvocationError` message.
const MAX_ERROR_BODY: usize = 1024;

/// JSON-over-HTTP client for the Model Invocation Service.
///
/// Each request is a POST of [`InvocationRequest`] to the configured
/// endpoint. The reply body must deserialize into [`InvocationResponse`].
pub struct HttpInvoker {
    client: reqwest::Client,
    endpoint: Url,
    api_key: Option<String>,
    timeout: Duration,
}

impl HttpInvoker {
    pub fn new(endpoint: Url, api_key: Option<String>, timeout: Duration) -> Result<Self, BenchError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("modelbench/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| BenchError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint,
            api_key,
            timeout,
        })
    }

    /// Build an invoker from settings. Requires `endpoint` to be set.
    pub fn from_settings(settings: &BenchSettings) -> Result<Self, BenchError> {
        settings.validate()?;
        let endpoint = settings
            .endpoint
            .clone()
            .ok_or_else(|| BenchError::Config("No invocation endpoint configured".to_string()))?;
        Self::new(endpoint, settings.api_key(), settings.invocation_timeout())
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl ModelInvoker for HttpInvoker {
    async fn invoke(&self, request: &InvocationRequest) -> Result<InvocationResponse, InvocationError> {
        debug!("Invoking model '{}' at {}", request.model_id, self.endpoint);

        let mut builder = self.client.post(self.endpoint.clone()).json(request);
        if let Some(ref key) = self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                InvocationError::Timeout { after: self.timeout }
            } else {
                InvocationError::transport(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<failed to read body>".to_string());
            let err = InvocationError::from_status(status.as_u16(), truncate(&body, MAX_ERROR_BODY));
            error!("Invocation of '{}' failed: {}", request.model_id, err);
            return Err(err);
        }

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                InvocationError::Timeout { after: self.timeout }
            } else {
                InvocationError::transport(format!("Failed to read response body: {}", e))
            }
        })?;

        parse_response_body(&body)
    }
}

/// Decode and validate an invocation service reply.
pub(crate) fn parse_response_body(body: &str) -> Result<InvocationResponse, InvocationError> {
    let parsed: InvocationResponse = serde_json::from_str(body).map_err(|e| {
        InvocationError::malformed(format!(
            "{}. Raw response (first 500 chars): {}",
            e,
            truncate(body, 500)
        ))
    })?;
    parsed.validate()?;
    Ok(parsed)
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let head: String = text.chars().take(max_chars).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}
