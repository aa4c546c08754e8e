//! Run configuration and the selection commands that edit it.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::invocation::InvocationParameters;
use crate::scenario::{Scenario, ScenarioSet};

/// Temperature sent when `auto_optimize` is on.
pub const AUTO_OPTIMIZE_TEMPERATURE: f64 = 0.7;

/// Selection state captured at run start.
///
/// Both id sets are ordered so models iterate in a stable (sorted) order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    pub selected_models: BTreeSet<String>,
    pub selected_scenarios: BTreeSet<String>,
    pub auto_optimize: bool,
    pub context_aware: bool,
}

/// A single edit to a [`RunConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionCommand {
    ToggleScenario(String),
    ToggleModel(String),
    SetAutoOptimize(bool),
    SetContextAware(bool),
}

impl RunConfig {
    /// Seed the scenario selection from the `selected` flags of a scenario set.
    pub fn from_scenarios(scenarios: &ScenarioSet) -> Self {
        Self {
            selected_scenarios: scenarios.selected().map(|s| s.id.clone()).collect(),
            ..Default::default()
        }
    }

    pub fn with_models<I, S>(mut self, models: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selected_models.extend(models.into_iter().map(Into::into));
        self
    }

    pub fn apply(&mut self, command: SelectionCommand) {
        match command {
            SelectionCommand::ToggleScenario(id) => toggle(&mut self.selected_scenarios, id),
            SelectionCommand::ToggleModel(id) => toggle(&mut self.selected_models, id),
            SelectionCommand::SetAutoOptimize(on) => self.auto_optimize = on,
            SelectionCommand::SetContextAware(on) => self.context_aware = on,
        }
    }

    /// Overrides for one scenario: `{temperature: 0.7, max_tokens:
    /// expected_tokens}` under auto-optimize, nothing otherwise.
    pub fn parameters_for(&self, scenario: &Scenario) -> Option<InvocationParameters> {
        self.auto_optimize.then(|| InvocationParameters {
            temperature: Some(AUTO_OPTIMIZE_TEMPERATURE),
            max_tokens: Some(scenario.expected_tokens),
        })
    }

    pub fn total_pairs(&self) -> usize {
        self.selected_models.len() * self.selected_scenarios.len()
    }
}

fn toggle(set: &mut BTreeSet<String>, id: String) {
    if !set.remove(&id) {
        set.insert(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::default_scenarios;

    #[test]
    fn test_from_scenarios_takes_selected_only() {
        let mut scenarios = default_scenarios();
        scenarios.toggle("meeting_notes");
        let config = RunConfig::from_scenarios(&scenarios);
        assert_eq!(config.selected_scenarios.len(), scenarios.count_selected());
        assert!(!config.selected_scenarios.contains("meeting_notes"));
        assert!(config.selected_models.is_empty());
    }

    #[test]
    fn test_toggle_commands() {
        let mut config = RunConfig::default().with_models(["m1", "m2"]);
        config.apply(SelectionCommand::ToggleModel("m1".to_string()));
        config.apply(SelectionCommand::ToggleModel("m3".to_string()));
        let models: Vec<&str> = config.selected_models.iter().map(String::as_str).collect();
        assert_eq!(models, vec!["m2", "m3"]);

        config.apply(SelectionCommand::ToggleScenario("s1".to_string()));
        assert!(config.selected_scenarios.contains("s1"));
        config.apply(SelectionCommand::ToggleScenario("s1".to_string()));
        assert!(config.selected_scenarios.is_empty());
    }

    #[test]
    fn test_total_pairs_is_models_times_scenarios() {
        let scenarios = default_scenarios();
        let mut config = RunConfig::from_scenarios(&scenarios);
        assert_eq!(config.total_pairs(), 0);

        config = config.with_models(["m1", "m2", "m3"]);
        assert_eq!(config.total_pairs(), 3 * scenarios.len());

        config.apply(SelectionCommand::ToggleScenario("meeting_notes".to_string()));
        assert_eq!(config.total_pairs(), 3 * (scenarios.len() - 1));
    }

    #[test]
    fn test_flag_commands() {
        let mut config = RunConfig::default();
        config.apply(SelectionCommand::SetAutoOptimize(true));
        config.apply(SelectionCommand::SetContextAware(true));
        assert!(config.auto_optimize);
        assert!(config.context_aware);
    }

    #[test]
    fn test_parameters_for_auto_optimize() {
        let scenarios = default_scenarios();
        let scenario = scenarios.get("executive_summary").unwrap();

        let mut config = RunConfig::default();
        assert_eq!(config.parameters_for(scenario), None);

        config.auto_optimize = true;
        assert_eq!(
            config.parameters_for(scenario),
            Some(InvocationParameters {
                temperature: Some(0.7),
                max_tokens: Some(scenario.expected_tokens),
            })
        );
    }

    #[test]
    fn test_models_iterate_sorted() {
        let config = RunConfig::default().with_models(["zeta", "alpha", "mid"]);
        let models: Vec<&str> = config.selected_models.iter().map(String::as_str).collect();
        assert_eq!(models, vec!["alpha", "mid", "zeta"]);
    }
}
