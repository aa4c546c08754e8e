use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::InvocationError;
use crate::scenario::ScenarioCategory;

/// One successfully completed (model, scenario) invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub model_id: String,
    pub scenario_id: String,
    pub scenario_name: String,
    pub category: ScenarioCategory,
    /// Seconds, as reported by the invocation service
    pub response_time: f64,
    /// USD
    pub cost: f64,
    pub response_text: String,
    pub reported_quality_score: Option<f64>,
    /// Heuristic score in [0.5, 1.0]
    pub computed_quality_score: f64,
}

/// A pair that produced no record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairFailure {
    pub model_id: String,
    pub scenario_id: String,
    pub error: InvocationError,
}

/// Everything a finished (or cancelled) run produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Records in completion order
    pub results: Vec<ResultRecord>,
    pub failures: Vec<PairFailure>,
    pub total_pairs: usize,
    pub cancelled: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    /// Pairs that were attempted (succeeded or failed).
    pub fn attempted(&self) -> usize {
        self.results.len() + self.failures.len()
    }

    /// True when every pair was attempted and the run was not cancelled.
    pub fn is_complete(&self) -> bool {
        !self.cancelled && self.attempted() == self.total_pairs
    }

    pub fn authorization_failures(&self) -> impl Iterator<Item = &PairFailure> {
        self.failures.iter().filter(|f| f.error.is_authorization())
    }
}
