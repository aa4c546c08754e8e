pub mod benchmark;
pub mod catalog;
pub mod error;
pub mod executor;
pub mod export;
pub mod invocation;
pub mod recommend;
pub mod scenario;
pub mod scorer;
pub mod settings;

pub use benchmark::{Benchmark, RunOutcome};
pub use catalog::{default_catalog, load_catalog, ModelCatalog, ModelDescriptor};
pub use error::{BenchError, InvocationError};
pub use executor::{
    CancelHandle, Executor, PairFailure, ResultRecord, RunConfig, RunEvent, RunReport,
    SelectionCommand,
};
pub use export::{snapshot, write_snapshot, Snapshot};
pub use invocation::{HttpInvoker, InvocationParameters, InvocationRequest, InvocationResponse, ModelInvoker};
pub use recommend::{recommend, summarize, ModelSummary, RecommendationEntry, RecommendationKind};
pub use scenario::{default_scenarios, load_scenarios, Scenario, ScenarioCategory, ScenarioSet};
pub use settings::{load_default_settings, load_settings, load_settings_or_default, BenchSettings};

/// Install a `tracing` subscriber for applications embedding the library.
/// Honors `RUST_LOG`, defaulting to `info`. Safe to call more than once.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init();
}
