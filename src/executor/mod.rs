//! Test matrix executor: runs every selected (model, scenario) pair.
//!
//! # Guarantees
//!
//! - Validation happens before any invocation: an empty or unknown model or
//!   scenario selection fails with [`BenchError::Validation`].
//! - Pairs are ordered by model id, then by scenario-set order.
//! - A pair's failure (error, timeout, panic) is recorded and never aborts
//!   the run or its siblings.
//! - Results and progress are only mutated by one collecting loop, so
//!   progress is monotonic even with `max_concurrency > 1`.
//! - One run at a time per executor; a second `run` while one is active is
//!   rejected with [`BenchError::RunInProgress`].

mod config;
mod progress;
mod types;

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinHandle, JoinSet};
use tracing::{debug, info, warn};

use crate::catalog::ModelCatalog;
use crate::error::{BenchError, InvocationError};
use crate::invocation::{InvocationRequest, InvocationResponse, ModelInvoker};
use crate::scenario::{Scenario, ScenarioSet};
use crate::scorer;
use crate::settings::BenchSettings;

use self::progress::{EventSink, ProgressTracker};

pub use config::{RunConfig, SelectionCommand, AUTO_OPTIMIZE_TEMPERATURE};
pub use progress::{CancelHandle, RunEvent};
pub use types::{PairFailure, ResultRecord, RunReport};

type PairOutcome = Result<InvocationResponse, InvocationError>;

/// One planned invocation.
#[derive(Debug, Clone)]
struct Pair {
    scenario: Scenario,
    request: InvocationRequest,
}

pub struct Executor {
    invoker: Arc<dyn ModelInvoker>,
    catalog: ModelCatalog,
    invocation_timeout: Duration,
    max_concurrency: usize,
    pair_delay: Duration,
    active: AtomicBool,
    completed: AtomicUsize,
    total: AtomicUsize,
}

impl Executor {
    pub fn new(
        invoker: Arc<dyn ModelInvoker>,
        catalog: ModelCatalog,
        settings: &BenchSettings,
    ) -> Result<Self, BenchError> {
        settings.validate()?;
        Ok(Self {
            invoker,
            catalog,
            invocation_timeout: settings.invocation_timeout(),
            max_concurrency: settings.max_concurrency,
            pair_delay: settings.pair_delay(),
            active: AtomicBool::new(false),
            completed: AtomicUsize::new(0),
            total: AtomicUsize::new(0),
        })
    }

    pub fn catalog(&self) -> &ModelCatalog {
        &self.catalog
    }

    pub fn is_running(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Fraction of the active run's pairs attempted so far; 0.0 when idle.
    pub fn progress(&self) -> f64 {
        let total = self.total.load(Ordering::SeqCst);
        if total == 0 {
            return 0.0;
        }
        self.completed.load(Ordering::SeqCst) as f64 / total as f64
    }

    /// Run every selected pair to completion.
    pub async fn run(
        &self,
        config: &RunConfig,
        scenarios: &ScenarioSet,
        events: Option<UnboundedSender<RunEvent>>,
    ) -> Result<RunReport, BenchError> {
        self.run_with_cancel(config, scenarios, events, &CancelHandle::new())
            .await
    }

    /// Run every selected pair, stopping early if `cancel` is triggered.
    ///
    /// In-flight pairs are allowed to finish; records collected before the
    /// cancellation are kept and the report is marked `cancelled`.
    pub async fn run_with_cancel(
        &self,
        config: &RunConfig,
        scenarios: &ScenarioSet,
        events: Option<UnboundedSender<RunEvent>>,
        cancel: &CancelHandle,
    ) -> Result<RunReport, BenchError> {
        let pairs = self.plan(config, scenarios)?;
        let _guard = self.begin(pairs.len())?;

        let started_at = Utc::now();
        info!(
            "Starting benchmark run: {} models x {} scenarios = {} pairs, concurrency={}",
            config.selected_models.len(),
            config.selected_scenarios.len(),
            config.total_pairs(),
            self.max_concurrency
        );

        let sink = EventSink::new(events);
        sink.emit(RunEvent::Started {
            total_pairs: pairs.len(),
        });

        let mut state = RunState {
            results: Vec::with_capacity(pairs.len()),
            failures: Vec::new(),
            tracker: ProgressTracker::new(pairs.len()),
            live_completed: &self.completed,
            sink,
        };

        let cancelled = if self.max_concurrency <= 1 {
            self.run_sequential(&pairs, &mut state, cancel).await
        } else {
            self.run_concurrent(&pairs, &mut state, cancel).await
        };

        info!(
            "Benchmark run {}: {} total, {} succeeded, {} failed",
            if cancelled { "cancelled" } else { "complete" },
            pairs.len(),
            state.results.len(),
            state.failures.len()
        );
        state.sink.emit(RunEvent::Finished {
            results: state.results.len(),
            failures: state.failures.len(),
            cancelled,
        });

        Ok(RunReport {
            results: state.results,
            failures: state.failures,
            total_pairs: pairs.len(),
            cancelled,
            started_at,
            finished_at: Utc::now(),
        })
    }

    /// Validate the selection and expand it into ordered pairs.
    fn plan(&self, config: &RunConfig, scenarios: &ScenarioSet) -> Result<Vec<Pair>, BenchError> {
        if config.selected_models.is_empty() {
            return Err(BenchError::Validation("No models selected".to_string()));
        }
        if config.selected_scenarios.is_empty() {
            return Err(BenchError::Validation("No scenarios selected".to_string()));
        }

        let unknown_models: Vec<&str> = config
            .selected_models
            .iter()
            .filter(|id| !self.catalog.contains(id))
            .map(String::as_str)
            .collect();
        if !unknown_models.is_empty() {
            return Err(BenchError::Validation(format!(
                "Unknown model(s): {}",
                unknown_models.join(", ")
            )));
        }

        let unknown_scenarios: Vec<&str> = config
            .selected_scenarios
            .iter()
            .filter(|id| !scenarios.contains(id))
            .map(String::as_str)
            .collect();
        if !unknown_scenarios.is_empty() {
            return Err(BenchError::Validation(format!(
                "Unknown scenario(s): {}",
                unknown_scenarios.join(", ")
            )));
        }

        let selected: Vec<&Scenario> = scenarios
            .list()
            .iter()
            .filter(|s| config.selected_scenarios.contains(&s.id))
            .collect();

        let mut pairs = Vec::with_capacity(config.selected_models.len() * selected.len());
        for model_id in &config.selected_models {
            for scenario in &selected {
                pairs.push(Pair {
                    scenario: (*scenario).clone(),
                    request: InvocationRequest {
                        model_id: model_id.clone(),
                        prompt: scenario.prompt.clone(),
                        parameters: config.parameters_for(scenario),
                    },
                });
            }
        }
        Ok(pairs)
    }

    fn begin(&self, total: usize) -> Result<RunGuard<'_>, BenchError> {
        if self
            .active
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            warn!("Rejected benchmark run: another run is active");
            return Err(BenchError::RunInProgress);
        }
        self.completed.store(0, Ordering::SeqCst);
        self.total.store(total, Ordering::SeqCst);
        Ok(RunGuard { executor: self })
    }

    /// Spawn one invocation with its own timeout. Running it as a separate
    /// task keeps a panicking invoker from unwinding the run.
    fn spawn_pair(&self, pair: &Pair) -> JoinHandle<PairOutcome> {
        let invoker = Arc::clone(&self.invoker);
        let request = pair.request.clone();
        let timeout = self.invocation_timeout;
        tokio::spawn(async move {
            match tokio::time::timeout(timeout, invoker.invoke(&request)).await {
                Ok(outcome) => outcome,
                Err(_) => Err(InvocationError::Timeout { after: timeout }),
            }
        })
    }

    async fn run_sequential(
        &self,
        pairs: &[Pair],
        state: &mut RunState<'_>,
        cancel: &CancelHandle,
    ) -> bool {
        for (i, pair) in pairs.iter().enumerate() {
            if cancel.is_cancelled() {
                info!("Run cancelled after {} of {} pairs", i, pairs.len());
                return true;
            }

            let outcome = join_pair(self.spawn_pair(pair)).await;
            state.record(pair, outcome);

            if !self.pair_delay.is_zero() && i + 1 < pairs.len() {
                tokio::time::sleep(self.pair_delay).await;
            }
        }
        false
    }

    async fn run_concurrent(
        &self,
        pairs: &[Pair],
        state: &mut RunState<'_>,
        cancel: &CancelHandle,
    ) -> bool {
        let slots = Arc::new(Semaphore::new(self.max_concurrency));
        let mut in_flight: JoinSet<(usize, PairOutcome)> = JoinSet::new();
        let mut pending = BTreeSet::new();
        let mut cancelled = false;

        for (index, pair) in pairs.iter().enumerate() {
            // Keep collecting finished pairs while every slot is busy.
            let acquired = loop {
                tokio::select! {
                    acquired = Arc::clone(&slots).acquire_owned() => break acquired,
                    Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                        collect(joined, pairs, &mut pending, state);
                    }
                }
            };
            let permit = match acquired {
                Ok(permit) => permit,
                Err(e) => {
                    warn!("Dispatch stopped, concurrency slots closed: {}", e);
                    break;
                }
            };

            // Checked after the wait for a slot so nothing starts once cancelled.
            if cancel.is_cancelled() {
                info!(
                    "Run cancelled after dispatching {} of {} pairs",
                    index,
                    pairs.len()
                );
                cancelled = true;
                break;
            }

            let handle = self.spawn_pair(pair);
            pending.insert(index);
            in_flight.spawn(async move {
                let _permit = permit;
                (index, join_pair(handle).await)
            });
        }

        while let Some(joined) = in_flight.join_next().await {
            collect(joined, pairs, &mut pending, state);
        }

        // A wrapper task that never reported back still counts as attempted.
        for index in pending {
            state.record(
                &pairs[index],
                Err(InvocationError::transport("Invocation task was lost")),
            );
        }
        cancelled
    }
}

/// Clears the active flag and live progress when a run ends, however it ends.
struct RunGuard<'a> {
    executor: &'a Executor,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.executor.completed.store(0, Ordering::SeqCst);
        self.executor.total.store(0, Ordering::SeqCst);
        self.executor.active.store(false, Ordering::SeqCst);
    }
}

/// Accumulated output of the active run.
struct RunState<'a> {
    results: Vec<ResultRecord>,
    failures: Vec<PairFailure>,
    tracker: ProgressTracker,
    live_completed: &'a AtomicUsize,
    sink: EventSink,
}

impl RunState<'_> {
    fn record(&mut self, pair: &Pair, outcome: PairOutcome) {
        let model_id = &pair.request.model_id;
        let scenario = &pair.scenario;

        let succeeded = match outcome {
            Ok(response) => {
                let computed = scorer::score(&response, scenario);
                debug!(
                    "  {} / {}: score {:.2}, {:.2}s, ${:.4}",
                    model_id, scenario.id, computed, response.response_time_seconds, response.cost_usd
                );
                self.results.push(ResultRecord {
                    model_id: model_id.clone(),
                    scenario_id: scenario.id.clone(),
                    scenario_name: scenario.name.clone(),
                    category: scenario.category,
                    response_time: response.response_time_seconds,
                    cost: response.cost_usd,
                    response_text: response.response_text,
                    reported_quality_score: response.quality_score,
                    computed_quality_score: computed,
                });
                true
            }
            Err(error) => {
                if error.is_authorization() {
                    warn!(
                        "Authorization failed for {} / {}: {}",
                        model_id, scenario.id, error
                    );
                } else {
                    warn!("Pair {} / {} failed: {}", model_id, scenario.id, error);
                }
                let failure = PairFailure {
                    model_id: model_id.clone(),
                    scenario_id: scenario.id.clone(),
                    error,
                };
                self.sink.emit(RunEvent::PairFailed(failure.clone()));
                self.failures.push(failure);
                false
            }
        };

        let fraction = self.tracker.advance();
        self.live_completed
            .store(self.tracker.completed(), Ordering::SeqCst);
        self.sink.emit(RunEvent::Progress {
            model_id: model_id.clone(),
            scenario_id: scenario.id.clone(),
            succeeded,
            completed: self.tracker.completed(),
            total: self.tracker.total(),
            fraction,
        });
    }
}

async fn join_pair(handle: JoinHandle<PairOutcome>) -> PairOutcome {
    match handle.await {
        Ok(outcome) => outcome,
        Err(e) => Err(InvocationError::transport(format!(
            "Invocation task failed: {}",
            e
        ))),
    }
}

fn collect(
    joined: Result<(usize, PairOutcome), JoinError>,
    pairs: &[Pair],
    pending: &mut BTreeSet<usize>,
    state: &mut RunState<'_>,
) {
    match joined {
        Ok((index, outcome)) => {
            pending.remove(&index);
            state.record(&pairs[index], outcome);
        }
        Err(e) => warn!("Pair task failed to report: {}", e),
    }
}
