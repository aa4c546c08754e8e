//! TOML loading for the scenario set.
//!
//! Provides two loading methods:
//! - `default_scenarios()` - Loads the scenarios compiled into the binary
//! - `load_scenarios(path)` - Loads a custom scenario set from a file path

use anyhow::{Context, Result};
use std::path::Path;

use super::types::{ScenarioFile, ScenarioSet};

/// Default scenarios embedded in the binary at compile time.
const DEFAULT_SCENARIOS: &str = include_str!("../../config/default_scenarios.toml");

/// Parse a scenario set from TOML text.
pub fn parse_scenarios(content: &str) -> Result<ScenarioSet> {
    let file: ScenarioFile = toml::from_str(content).context("Invalid scenario TOML")?;
    Ok(ScenarioSet::new(file.scenarios)?)
}

/// Load a scenario set from a TOML file at the given path.
pub fn load_scenarios(path: &Path) -> Result<ScenarioSet> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read scenarios from {:?}", path))?;
    parse_scenarios(&content)
}

/// Get the default scenario set embedded in the binary.
///
/// Two scenarios per category, all selected.
///
/// # Panics
/// Panics if the embedded TOML is invalid (this would be a compile-time bug).
pub fn default_scenarios() -> ScenarioSet {
    parse_scenarios(DEFAULT_SCENARIOS).expect("embedded default_scenarios.toml must be valid")
}
