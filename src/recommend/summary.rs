use crate::executor::{PairFailure, ResultRecord};

use super::types::ModelSummary;

/// Per-model totals in first-seen order (results first, then models that
/// only appear among failures).
pub fn summarize(results: &[ResultRecord], failures: &[PairFailure]) -> Vec<ModelSummary> {
    let mut summaries: Vec<ModelSummary> = Vec::new();

    fn slot<'s>(summaries: &'s mut Vec<ModelSummary>, model_id: &str) -> &'s mut ModelSummary {
        let index = match summaries.iter().position(|s| s.model_id == model_id) {
            Some(i) => i,
            None => {
                summaries.push(ModelSummary {
                    model_id: model_id.to_string(),
                    successes: 0,
                    failures: 0,
                    avg_score: 0.0,
                    avg_response_time: 0.0,
                    total_cost: 0.0,
                });
                summaries.len() - 1
            }
        };
        &mut summaries[index]
    }

    // Sums first, divided into means below.
    for r in results {
        let s = slot(&mut summaries, &r.model_id);
        s.successes += 1;
        s.avg_score += r.computed_quality_score;
        s.avg_response_time += r.response_time;
        s.total_cost += r.cost;
    }
    for f in failures {
        slot(&mut summaries, &f.model_id).failures += 1;
    }

    for s in &mut summaries {
        if s.successes > 0 {
            s.avg_score /= s.successes as f64;
            s.avg_response_time /= s.successes as f64;
        }
    }
    summaries
}
