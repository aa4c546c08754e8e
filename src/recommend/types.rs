use serde::{Deserialize, Serialize};

use crate::scenario::ScenarioCategory;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    BestOverall,
    BestCategory,
}

/// One ranked recommendation derived from a run's results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationEntry {
    pub kind: RecommendationKind,
    /// Set only for `BestCategory`
    pub category: Option<ScenarioCategory>,
    pub model_id: String,
    /// Mean computed quality score
    pub score: f64,
    /// Number of records behind the mean
    pub sample_size: usize,
}

/// Per-model aggregate for result tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSummary {
    pub model_id: String,
    pub successes: usize,
    pub failures: usize,
    /// Mean computed quality score; 0.0 when the model has no successes
    pub avg_score: f64,
    /// Mean response time in seconds; 0.0 when the model has no successes
    pub avg_response_time: f64,
    pub total_cost: f64,
}
