//! Type definitions for benchmark scenarios.
//!
//! These types support both TOML deserialization (for loading the scenario
//! set) and JSON serialization (for results and exported snapshots).

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::BenchError;

/// Coarse classification of a test prompt's task type.
///
/// Closed set: adding a category is a schema change, and every consumer
/// that walks [`ScenarioCategory::ALL`] picks it up in declared order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioCategory {
    Evaluation,
    Analysis,
    Summary,
    Recommendation,
}

impl ScenarioCategory {
    /// Fixed enumeration order used for per-category recommendations.
    pub const ALL: [ScenarioCategory; 4] = [
        ScenarioCategory::Evaluation,
        ScenarioCategory::Analysis,
        ScenarioCategory::Summary,
        ScenarioCategory::Recommendation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ScenarioCategory::Evaluation => "evaluation",
            ScenarioCategory::Analysis => "analysis",
            ScenarioCategory::Summary => "summary",
            ScenarioCategory::Recommendation => "recommendation",
        }
    }
}

impl fmt::Display for ScenarioCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_selected() -> bool {
    true
}

/// A named test case: a prompt plus the response shape it expects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Unique identifier (e.g., "executive_summary")
    pub id: String,
    /// Human-readable name for display
    pub name: String,
    /// Prompt sent to every model under test
    pub prompt: String,
    /// Expected response size in tokens (must be > 0)
    pub expected_tokens: u32,
    pub category: ScenarioCategory,
    /// Whether the scenario takes part in the next run
    #[serde(default = "default_selected")]
    pub selected: bool,
}

/// Root of a scenario TOML file.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ScenarioFile {
    pub scenarios: Vec<Scenario>,
}

/// Ordered collection of scenarios. Only the `selected` flag is mutable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioSet {
    scenarios: Vec<Scenario>,
}

impl ScenarioSet {
    /// Build a scenario set, rejecting duplicate ids and zero token budgets.
    pub fn new(scenarios: Vec<Scenario>) -> Result<Self, BenchError> {
        let mut seen = HashSet::new();
        for s in &scenarios {
            if !seen.insert(s.id.as_str()) {
                return Err(BenchError::Config(format!(
                    "Duplicate scenario id: {}",
                    s.id
                )));
            }
            if s.expected_tokens == 0 {
                return Err(BenchError::Config(format!(
                    "Scenario '{}' must expect at least one token",
                    s.id
                )));
            }
        }
        Ok(Self { scenarios })
    }

    /// All scenarios in declared order.
    pub fn list(&self) -> &[Scenario] {
        &self.scenarios
    }

    pub fn get(&self, id: &str) -> Option<&Scenario> {
        self.scenarios.iter().find(|s| s.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Flip the `selected` flag. Unknown ids are ignored.
    pub fn toggle(&mut self, id: &str) {
        if let Some(s) = self.scenarios.iter_mut().find(|s| s.id == id) {
            s.selected = !s.selected;
        }
    }

    pub fn count_selected(&self) -> usize {
        self.scenarios.iter().filter(|s| s.selected).count()
    }

    /// Selected scenarios in declared order.
    pub fn selected(&self) -> impl Iterator<Item = &Scenario> {
        self.scenarios.iter().filter(|s| s.selected)
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario(id: &str, category: ScenarioCategory) -> Scenario {
        Scenario {
            id: id.to_string(),
            name: id.to_uppercase(),
            prompt: format!("Prompt for {}", id),
            expected_tokens: 100,
            category,
            selected: true,
        }
    }

    #[test]
    fn test_category_deserialize() {
        let cat: ScenarioCategory = serde_json::from_str(r#""summary""#).unwrap();
        assert_eq!(cat, ScenarioCategory::Summary);
        let cat: ScenarioCategory = serde_json::from_str(r#""recommendation""#).unwrap();
        assert_eq!(cat, ScenarioCategory::Recommendation);
        assert!(serde_json::from_str::<ScenarioCategory>(r#""creative""#).is_err());
    }

    #[test]
    fn test_category_order_is_fixed() {
        let names: Vec<&str> = ScenarioCategory::ALL.iter().map(|c| c.as_str()).collect();
        assert_eq!(names, vec!["evaluation", "analysis", "summary", "recommendation"]);
    }

    #[test]
    fn test_toggle_flips_selected() {
        let mut set = ScenarioSet::new(vec![
            scenario("a", ScenarioCategory::Evaluation),
            scenario("b", ScenarioCategory::Analysis),
        ])
        .unwrap();
        assert_eq!(set.count_selected(), 2);

        set.toggle("a");
        assert_eq!(set.count_selected(), 1);
        assert!(!set.get("a").unwrap().selected);

        set.toggle("a");
        assert_eq!(set.count_selected(), 2);
    }

    #[test]
    fn test_toggle_unknown_id_is_noop() {
        let mut set = ScenarioSet::new(vec![scenario("a", ScenarioCategory::Summary)]).unwrap();
        let before = set.clone();
        set.toggle("missing");
        assert_eq!(set, before);
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let result = ScenarioSet::new(vec![
            scenario("a", ScenarioCategory::Summary),
            scenario("a", ScenarioCategory::Analysis),
        ]);
        let err = result.unwrap_err();
        assert!(err.to_string().contains("Duplicate scenario id"));
    }

    #[test]
    fn test_zero_expected_tokens_rejected() {
        let mut s = scenario("a", ScenarioCategory::Summary);
        s.expected_tokens = 0;
        assert!(ScenarioSet::new(vec![s]).is_err());
    }

    #[test]
    fn test_selected_preserves_declared_order() {
        let mut set = ScenarioSet::new(vec![
            scenario("c", ScenarioCategory::Summary),
            scenario("a", ScenarioCategory::Evaluation),
            scenario("b", ScenarioCategory::Analysis),
        ])
        .unwrap();
        set.toggle("a");
        let ids: Vec<&str> = set.selected().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "b"]);
    }
}
