//! Aggregation and ranking of scored results.
//!
//! Ties are broken by first appearance in the result sequence: a later
//! model only wins with a strictly greater mean.

use tracing::{debug, info};

use crate::executor::ResultRecord;
use crate::scenario::ScenarioCategory;

use super::types::{RecommendationEntry, RecommendationKind};

/// Running mean for one model, kept in first-seen order.
struct ModelScore<'a> {
    model_id: &'a str,
    total: f64,
    count: usize,
}

impl ModelScore<'_> {
    fn mean(&self) -> f64 {
        self.total / self.count as f64
    }
}

/// Group records by model (first-seen order) and accumulate scores.
fn group_by_model<'a, I>(records: I) -> Vec<ModelScore<'a>>
where
    I: IntoIterator<Item = &'a ResultRecord>,
{
    let mut groups: Vec<ModelScore<'a>> = Vec::new();
    for record in records {
        match groups.iter_mut().find(|g| g.model_id == record.model_id) {
            Some(group) => {
                group.total += record.computed_quality_score;
                group.count += 1;
            }
            None => groups.push(ModelScore {
                model_id: &record.model_id,
                total: record.computed_quality_score,
                count: 1,
            }),
        }
    }
    groups
}

/// The group with the strictly greatest mean; earliest wins ties.
fn best<'a, 'g>(groups: &'g [ModelScore<'a>]) -> Option<&'g ModelScore<'a>> {
    let mut winner: Option<&ModelScore<'a>> = None;
    for group in groups {
        match winner {
            Some(w) if group.mean() <= w.mean() => {}
            _ => winner = Some(group),
        }
    }
    winner
}

fn entry(kind: RecommendationKind, category: Option<ScenarioCategory>, group: &ModelScore<'_>) -> RecommendationEntry {
    RecommendationEntry {
        kind,
        category,
        model_id: group.model_id.to_string(),
        score: group.mean(),
        sample_size: group.count,
    }
}

/// Produce ranked recommendations for a completed run.
///
/// Returns an empty list when `context_aware` is off or there are no
/// results. Otherwise the list is the best-overall entry followed by one
/// best-category entry per category (in [`ScenarioCategory::ALL`] order)
/// that has at least one record.
pub fn recommend(results: &[ResultRecord], context_aware: bool) -> Vec<RecommendationEntry> {
    if !context_aware {
        debug!("Context-aware recommendations disabled, skipping aggregation");
        return Vec::new();
    }
    if results.is_empty() {
        debug!("No results to aggregate");
        return Vec::new();
    }

    let mut recommendations = Vec::new();

    let overall = group_by_model(results);
    if let Some(top) = best(&overall) {
        recommendations.push(entry(RecommendationKind::BestOverall, None, top));
    }

    for category in ScenarioCategory::ALL {
        let groups = group_by_model(results.iter().filter(|r| r.category == category));
        if let Some(top) = best(&groups) {
            recommendations.push(entry(RecommendationKind::BestCategory, Some(category), top));
        }
    }

    info!(
        "Generated {} recommendations from {} results",
        recommendations.len(),
        results.len()
    );
    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(model: &str, category: ScenarioCategory, score: f64) -> ResultRecord {
        ResultRecord {
            model_id: model.to_string(),
            scenario_id: format!("{}-scenario", category),
            scenario_name: "Scenario".to_string(),
            category,
            response_time: 1.0,
            cost: 0.01,
            response_text: String::new(),
            reported_quality_score: None,
            computed_quality_score: score,
        }
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_disabled_returns_empty() {
        let results = vec![record("m1", ScenarioCategory::Evaluation, 0.9)];
        assert!(recommend(&results, false).is_empty());
    }

    #[test]
    fn test_no_results_returns_empty() {
        assert!(recommend(&[], true).is_empty());
    }

    #[test]
    fn test_two_models_single_category() {
        let results = vec![
            record("m1", ScenarioCategory::Evaluation, 0.9),
            record("m2", ScenarioCategory::Evaluation, 0.6),
        ];
        let recs = recommend(&results, true);
        assert_eq!(recs.len(), 2);

        assert_eq!(recs[0].kind, RecommendationKind::BestOverall);
        assert_eq!(recs[0].category, None);
        assert_eq!(recs[0].model_id, "m1");
        assert!(approx(recs[0].score, 0.9));
        assert_eq!(recs[0].sample_size, 1);

        assert_eq!(recs[1].kind, RecommendationKind::BestCategory);
        assert_eq!(recs[1].category, Some(ScenarioCategory::Evaluation));
        assert_eq!(recs[1].model_id, "m1");
        assert!(approx(recs[1].score, 0.9));
    }

    #[test]
    fn test_overall_uses_mean_across_records() {
        let results = vec![
            record("m1", ScenarioCategory::Analysis, 1.0),
            record("m1", ScenarioCategory::Summary, 0.6),
            record("m2", ScenarioCategory::Analysis, 0.9),
            record("m2", ScenarioCategory::Summary, 0.9),
        ];
        let recs = recommend(&results, true);
        assert_eq!(recs[0].model_id, "m2");
        assert!(approx(recs[0].score, 0.9));
        assert_eq!(recs[0].sample_size, 2);
    }

    #[test]
    fn test_ties_go_to_first_seen() {
        let results = vec![
            record("late", ScenarioCategory::Summary, 0.8),
            record("early", ScenarioCategory::Analysis, 0.8),
        ];
        let recs = recommend(&results, true);
        assert_eq!(recs[0].model_id, "late");
    }

    #[test]
    fn test_categories_in_fixed_order_and_empty_skipped() {
        let results = vec![
            record("m1", ScenarioCategory::Recommendation, 0.7),
            record("m2", ScenarioCategory::Evaluation, 0.8),
            record("m1", ScenarioCategory::Evaluation, 0.75),
            record("m2", ScenarioCategory::Recommendation, 0.95),
        ];
        let recs = recommend(&results, true);
        let categories: Vec<Option<ScenarioCategory>> = recs.iter().map(|r| r.category).collect();
        assert_eq!(
            categories,
            vec![
                None,
                Some(ScenarioCategory::Evaluation),
                Some(ScenarioCategory::Recommendation),
            ]
        );
        assert_eq!(recs[1].model_id, "m2");
        assert_eq!(recs[2].model_id, "m2");
    }

    #[test]
    fn test_category_winner_can_differ_from_overall() {
        let results = vec![
            record("generalist", ScenarioCategory::Analysis, 0.9),
            record("generalist", ScenarioCategory::Summary, 0.7),
            record("summarizer", ScenarioCategory::Analysis, 0.6),
            record("summarizer", ScenarioCategory::Summary, 0.95),
        ];
        let recs = recommend(&results, true);
        assert_eq!(recs[0].model_id, "generalist");
        let summary = recs
            .iter()
            .find(|r| r.category == Some(ScenarioCategory::Summary))
            .unwrap();
        assert_eq!(summary.model_id, "summarizer");
    }

    #[test]
    fn test_entries_reference_present_models() {
        let results = vec![
            record("a", ScenarioCategory::Analysis, 0.6),
            record("b", ScenarioCategory::Summary, 0.7),
            record("c", ScenarioCategory::Evaluation, 0.8),
        ];
        let recs = recommend(&results, true);
        let overall = recs
            .iter()
            .filter(|r| r.kind == RecommendationKind::BestOverall)
            .count();
        assert_eq!(overall, 1);
        for rec in &recs {
            assert!(results.iter().any(|r| r.model_id == rec.model_id));
        }
    }
}
