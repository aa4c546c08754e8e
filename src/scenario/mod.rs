//! Benchmark scenarios: the prompts every selected model is run against.
//!
//! Scenarios come from an embedded TOML set (or a custom file) and are
//! read-only apart from their `selected` flag.

mod defaults;
mod types;

pub use defaults::{default_scenarios, load_scenarios, parse_scenarios};
pub use types::{Scenario, ScenarioCategory, ScenarioSet};
