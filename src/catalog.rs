//! The model catalog: which models can be selected for a run.
//!
//! Descriptors are read-only to the benchmark core. The declared
//! quality/speed scores are informational; ranking uses measured scores.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::BenchError;

const DEFAULT_MODELS: &str = include_str!("../config/default_models.toml");

/// Static attributes of a selectable model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    pub model_id: String,
    pub display_name: String,
    pub provider: String,
    /// Declared quality in [0, 1]
    pub quality_score: f64,
    /// Declared speed in [0, 1]
    pub speed_score: f64,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    models: Vec<ModelDescriptor>,
}

/// Models available for selection, in declared order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelCatalog {
    models: Vec<ModelDescriptor>,
}

impl ModelCatalog {
    pub fn new(models: Vec<ModelDescriptor>) -> Result<Self, BenchError> {
        let mut seen = HashSet::new();
        for m in &models {
            if !seen.insert(m.model_id.as_str()) {
                return Err(BenchError::Config(format!(
                    "Duplicate model id: {}",
                    m.model_id
                )));
            }
            for (field, value) in [("quality_score", m.quality_score), ("speed_score", m.speed_score)] {
                if !(0.0..=1.0).contains(&value) {
                    return Err(BenchError::Config(format!(
                        "Model '{}' has {} {} outside [0, 1]",
                        m.model_id, field, value
                    )));
                }
            }
        }
        Ok(Self { models })
    }

    pub fn models(&self) -> &[ModelDescriptor] {
        &self.models
    }

    pub fn get(&self, model_id: &str) -> Option<&ModelDescriptor> {
        self.models.iter().find(|m| m.model_id == model_id)
    }

    pub fn contains(&self, model_id: &str) -> bool {
        self.get(model_id).is_some()
    }

    pub fn by_provider<'a>(&'a self, provider: &'a str) -> impl Iterator<Item = &'a ModelDescriptor> {
        self.models.iter().filter(move |m| m.provider == provider)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

pub fn parse_catalog(content: &str) -> Result<ModelCatalog> {
    let file: CatalogFile = toml::from_str(content).context("Invalid model catalog TOML")?;
    Ok(ModelCatalog::new(file.models)?)
}

/// Load a model catalog from a TOML file.
pub fn load_catalog(path: &Path) -> Result<ModelCatalog> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read model catalog from {:?}", path))?;
    parse_catalog(&content)
}

/// The catalog compiled into the binary.
///
/// # Panics
/// Panics if the embedded TOML is invalid (this would be a compile-time bug).
pub fn default_catalog() -> ModelCatalog {
    parse_catalog(DEFAULT_MODELS).expect("embedded default_models.toml must be valid")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(id: &str, provider: &str) -> ModelDescriptor {
        ModelDescriptor {
            model_id: id.to_string(),
            display_name: id.to_string(),
            provider: provider.to_string(),
            quality_score: 0.8,
            speed_score: 0.6,
        }
    }

    #[test]
    fn test_default_catalog_loads() {
        let catalog = default_catalog();
        assert!(!catalog.is_empty());
        assert!(catalog.contains("gpt-4o"));
        assert_eq!(catalog.get("claude-sonnet-4").unwrap().provider, "anthropic");
    }

    #[test]
    fn test_by_provider() {
        let catalog = ModelCatalog::new(vec![
            descriptor("a1", "alpha"),
            descriptor("b1", "beta"),
            descriptor("a2", "alpha"),
        ])
        .unwrap();
        let ids: Vec<&str> = catalog.by_provider("alpha").map(|m| m.model_id.as_str()).collect();
        assert_eq!(ids, vec!["a1", "a2"]);
    }

    #[test]
    fn test_duplicate_model_rejected() {
        let result = ModelCatalog::new(vec![descriptor("a", "x"), descriptor("a", "y")]);
        assert!(result.is_err());
    }

    #[test]
    fn test_score_out_of_range_rejected() {
        let mut d = descriptor("a", "x");
        d.speed_score = 1.5;
        let err = ModelCatalog::new(vec![d]).unwrap_err();
        assert!(err.to_string().contains("speed_score"));
    }
}
