//! Exportable snapshot of a benchmark: configuration, results and
//! recommendations frozen exactly as last computed.

use std::io::Write;
use std::path::Path;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::info;

use crate::error::BenchError;
use crate::executor::{ResultRecord, RunConfig};
use crate::recommend::RecommendationEntry;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub test_config: RunConfig,
    pub test_results: Vec<ResultRecord>,
    pub smart_recommendations: Vec<RecommendationEntry>,
    pub timestamp: DateTime<Utc>,
}

/// Capture a snapshot stamped with the current time. Nothing is recomputed.
pub fn snapshot(
    config: &RunConfig,
    results: &[ResultRecord],
    recommendations: &[RecommendationEntry],
) -> Snapshot {
    snapshot_at(config, results, recommendations, Utc::now())
}

/// Capture a snapshot with an explicit timestamp.
pub fn snapshot_at(
    config: &RunConfig,
    results: &[ResultRecord],
    recommendations: &[RecommendationEntry],
    timestamp: DateTime<Utc>,
) -> Snapshot {
    Snapshot {
        test_config: config.clone(),
        test_results: results.to_vec(),
        smart_recommendations: recommendations.to_vec(),
        timestamp,
    }
}

impl Snapshot {
    pub fn to_json_pretty(&self) -> Result<String, BenchError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| BenchError::Export(format!("Failed to serialize snapshot: {}", e)))
    }

    pub fn from_json(json: &str) -> Result<Self, BenchError> {
        serde_json::from_str(json)
            .map_err(|e| BenchError::Export(format!("Failed to parse snapshot: {}", e)))
    }
}

/// Write a snapshot to disk atomically: temp file in the target directory,
/// then rename over the target.
pub fn write_snapshot(snapshot: &Snapshot, target_path: &Path) -> Result<()> {
    let json = snapshot.to_json_pretty()?;

    let parent = target_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(parent)?;

    let mut temp = NamedTempFile::new_in(parent)?;
    temp.write_all(json.as_bytes())?;
    temp.flush()?;
    temp.persist(target_path)?;

    info!(
        "Exported snapshot with {} results to {:?}",
        snapshot.test_results.len(),
        target_path
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recommend::RecommendationKind;
    use crate::scenario::ScenarioCategory;
    use chrono::TimeZone;

    fn sample() -> Snapshot {
        let config = RunConfig {
            auto_optimize: true,
            context_aware: true,
            ..Default::default()
        }
        .with_models(["m1"]);
        let results = vec![ResultRecord {
            model_id: "m1".to_string(),
            scenario_id: "s1".to_string(),
            scenario_name: "S1".to_string(),
            category: ScenarioCategory::Evaluation,
            response_time: 1.25,
            cost: 0.004,
            response_text: "answer".to_string(),
            reported_quality_score: Some(0.1),
            computed_quality_score: 0.9,
        }];
        let recs = vec![RecommendationEntry {
            kind: RecommendationKind::BestOverall,
            category: None,
            model_id: "m1".to_string(),
            score: 0.9,
            sample_size: 1,
        }];
        let ts = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        snapshot_at(&config, &results, &recs, ts)
    }

    #[test]
    fn test_snapshot_field_names() {
        let json: serde_json::Value = serde_json::from_str(&sample().to_json_pretty().unwrap()).unwrap();
        assert!(json.get("testConfig").is_some());
        assert!(json.get("testResults").is_some());
        assert!(json.get("smartRecommendations").is_some());
        assert_eq!(json["timestamp"], "2026-03-01T12:00:00Z");
        assert_eq!(json["testConfig"]["selected_models"][0], "m1");
    }

    #[test]
    fn test_snapshot_round_trip() {
        let snap = sample();
        let parsed = Snapshot::from_json(&snap.to_json_pretty().unwrap()).unwrap();
        assert_eq!(parsed, snap);
    }

    #[test]
    fn test_snapshot_copies_inputs_verbatim() {
        let snap = sample();
        assert_eq!(snap.test_results[0].computed_quality_score, 0.9);
        assert_eq!(snap.smart_recommendations.len(), 1);
        assert!(snap.test_config.context_aware);
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        let err = Snapshot::from_json("{\"testConfig\": 3}").unwrap_err();
        assert!(matches!(err, BenchError::Export(_)));
    }

    #[test]
    fn test_write_snapshot_atomic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("exports").join("run.json");
        let snap = sample();

        write_snapshot(&snap, &path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(Snapshot::from_json(&written).unwrap(), snap);

        // Only the target remains; the temp file was renamed into place.
        let entries = std::fs::read_dir(path.parent().unwrap()).unwrap().count();
        assert_eq!(entries, 1);
    }
}
