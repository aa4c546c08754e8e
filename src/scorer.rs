//! Deterministic quality heuristic for a single model response.
//!
//! The score is additive and capped at 1.0:
//! base 0.5, a length-fit term (up to 0.3), a latency term (up to 0.2),
//! then the provider-reported quality score on top.

use crate::invocation::InvocationResponse;
use crate::scenario::Scenario;

/// Assumed characters per token when converting `expected_tokens` to a length.
pub const CHARS_PER_TOKEN: f64 = 4.0;

const BASE_SCORE: f64 = 0.5;

/// Length-fit bonus for a response whose size ratio to the expected length
/// falls in the tight band, the loose band, or neither.
fn length_fit(response_text: &str, expected_tokens: u32) -> f64 {
    let expected_chars = f64::from(expected_tokens) * CHARS_PER_TOKEN;
    let ratio = response_text.chars().count() as f64 / expected_chars;

    if (0.7..=1.3).contains(&ratio) {
        0.3
    } else if (0.5..=1.5).contains(&ratio) {
        0.2
    } else {
        0.1
    }
}

fn latency(response_time_seconds: f64) -> f64 {
    if response_time_seconds < 2.0 {
        0.2
    } else if response_time_seconds < 4.0 {
        0.1
    } else {
        0.0
    }
}

/// Score one response against the scenario it answered. Result is in [0.5, 1.0].
pub fn score(candidate: &InvocationResponse, scenario: &Scenario) -> f64 {
    let reported = candidate
        .quality_score
        .filter(|q| q.is_finite())
        .unwrap_or(0.0)
        .clamp(0.0, 1.0);

    let total = BASE_SCORE
        + length_fit(&candidate.response_text, scenario.expected_tokens)
        + latency(candidate.response_time_seconds)
        + reported;

    total.min(1.0)
}
