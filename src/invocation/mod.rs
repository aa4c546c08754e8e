//! The seam to the Model Invocation Service.
//!
//! The benchmark core only depends on [`ModelInvoker`]; [`HttpInvoker`] is
//! the JSON-over-HTTP implementation used in production, and tests supply
//! scripted invokers.

mod http;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::InvocationError;

pub use http::HttpInvoker;

/// Parameter overrides sent alongside a prompt.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InvocationParameters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

/// One request to the invocation service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvocationRequest {
    pub model_id: String,
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<InvocationParameters>,
}

/// Successful reply from the invocation service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvocationResponse {
    pub response_text: String,
    pub response_time_seconds: f64,
    pub cost_usd: f64,
    #[serde(default)]
    pub quality_score: Option<f64>,
}

impl InvocationResponse {
    /// Reject values the rest of the pipeline cannot interpret.
    pub fn validate(&self) -> Result<(), InvocationError> {
        if !self.response_time_seconds.is_finite() || self.response_time_seconds < 0.0 {
            return Err(InvocationError::malformed(format!(
                "response_time_seconds must be >= 0, got {}",
                self.response_time_seconds
            )));
        }
        if !self.cost_usd.is_finite() || self.cost_usd < 0.0 {
            return Err(InvocationError::malformed(format!(
                "cost_usd must be >= 0, got {}",
                self.cost_usd
            )));
        }
        if let Some(q) = self.quality_score {
            if !(0.0..=1.0).contains(&q) {
                return Err(InvocationError::malformed(format!(
                    "quality_score must be in [0, 1], got {}",
                    q
                )));
            }
        }
        Ok(())
    }
}

/// Anything that can run a prompt against a model.
///
/// Implementations must be safe to call from several tasks at once when the
/// executor runs with `max_concurrency > 1`.
#[async_trait]
pub trait ModelInvoker: Send + Sync {
    async fn invoke(&self, request: &InvocationRequest) -> Result<InvocationResponse, InvocationError>;
}
