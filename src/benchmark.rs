//! A benchmark session: selection state, the executor, and the outputs of
//! the most recent run. This is the entry point the surrounding
//! application drives.

use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;
use tracing::info;

use crate::error::BenchError;
use crate::executor::{CancelHandle, Executor, RunConfig, RunEvent, RunReport, SelectionCommand};
use crate::export::{self, Snapshot};
use crate::recommend::{self, ModelSummary, RecommendationEntry};
use crate::scenario::ScenarioSet;

/// Everything produced by one run.
#[derive(Debug, Clone, Serialize)]
pub struct RunOutcome {
    pub report: RunReport,
    /// Empty for cancelled runs and when context-aware mode is off
    pub recommendations: Vec<RecommendationEntry>,
    pub summaries: Vec<ModelSummary>,
}

pub struct Benchmark {
    executor: Executor,
    scenarios: ScenarioSet,
    config: RunConfig,
    last_run: Option<(RunConfig, RunOutcome)>,
}

impl Benchmark {
    /// Start a session with scenario selection taken from the set's flags
    /// and no models selected.
    pub fn new(executor: Executor, scenarios: ScenarioSet) -> Self {
        let config = RunConfig::from_scenarios(&scenarios);
        Self {
            executor,
            scenarios,
            config,
            last_run: None,
        }
    }

    pub fn scenarios(&self) -> &ScenarioSet {
        &self.scenarios
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn executor(&self) -> &Executor {
        &self.executor
    }

    pub fn last_outcome(&self) -> Option<&RunOutcome> {
        self.last_run.as_ref().map(|(_, outcome)| outcome)
    }

    /// Apply a selection command. Toggles naming an unknown scenario or
    /// model are ignored.
    pub fn apply(&mut self, command: SelectionCommand) {
        match command {
            SelectionCommand::ToggleScenario(id) => {
                if self.scenarios.contains(&id) {
                    self.scenarios.toggle(&id);
                    self.config.apply(SelectionCommand::ToggleScenario(id));
                }
            }
            SelectionCommand::ToggleModel(id) => {
                if self.executor.catalog().contains(&id) {
                    self.config.apply(SelectionCommand::ToggleModel(id));
                }
            }
            other => self.config.apply(other),
        }
    }

    /// Run the current selection, then aggregate unless the run was cancelled.
    pub async fn run(
        &mut self,
        events: Option<UnboundedSender<RunEvent>>,
        cancel: &CancelHandle,
    ) -> Result<&RunOutcome, BenchError> {
        let config = self.config.clone();
        let report = self
            .executor
            .run_with_cancel(&config, &self.scenarios, events, cancel)
            .await?;

        let recommendations = if report.cancelled {
            info!("Run was cancelled, skipping recommendations");
            Vec::new()
        } else {
            recommend::recommend(&report.results, config.context_aware)
        };
        let summaries = recommend::summarize(&report.results, &report.failures);

        let outcome = RunOutcome {
            report,
            recommendations,
            summaries,
        };
        let (_, outcome) = self.last_run.insert((config, outcome));
        Ok(outcome)
    }

    /// Freeze the last run's configuration, results and recommendations.
    /// Before any run, this captures the current configuration with empty
    /// results.
    pub fn snapshot(&self) -> Snapshot {
        match &self.last_run {
            Some((config, outcome)) => export::snapshot(
                config,
                &outcome.report.results,
                &outcome.recommendations,
            ),
            None => export::snapshot(&self.config, &[], &[]),
        }
    }
}
