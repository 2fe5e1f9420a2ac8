//! Replay: serialize/deserialize run logs for offline analysis.
//!
//! A log carries the scenario inputs (filter parameters and readings) next
//! to what the filter produced, so a saved run can be re-filtered and
//! compared step by step.

use crate::runner::{run_filter, FilterSpec, RunOutcome, StepRecord};
use crate::scenarios::{Scenario, ScenarioStep};
use serde::{Deserialize, Serialize};
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// A full recorded run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunLog {
    pub scenario_name: String,
    pub seed: u64,
    pub filter: FilterSpec,
    /// Inputs, in chronological order
    pub steps: Vec<ScenarioStep>,
    /// Filter output, one per step
    pub records: Vec<StepRecord>,
}

impl RunLog {
    pub fn new(scenario: &Scenario, outcome: &RunOutcome) -> Self {
        Self {
            scenario_name: scenario.name.clone(),
            seed: scenario.seed,
            filter: scenario.filter.clone(),
            steps: scenario.steps.clone(),
            records: outcome.records.clone(),
        }
    }

    /// Run the logged readings through a fresh filter and report the first
    /// step whose estimate differs from the logged one. When one run is a
    /// prefix of the other, the divergence is the first step past the
    /// shorter run.
    pub fn replay(&self) -> anyhow::Result<(RunOutcome, Option<usize>)> {
        let outcome = run_filter(&self.filter, &self.steps)?;
        let first_divergence = outcome
            .records
            .iter()
            .zip(&self.records)
            .position(|(fresh, logged)| fresh.estimate != logged.estimate)
            .or_else(|| {
                let shared = outcome.records.len().min(self.records.len());
                (outcome.records.len() != self.records.len()).then_some(shared)
            });
        Ok((outcome, first_divergence))
    }
}

/// Save a run log to a JSON file.
pub fn save_run_log(log: &RunLog, path: &Path) -> anyhow::Result<()> {
    let file = std::fs::File::create(path)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, log)?;
    Ok(())
}

/// Load a run log from a JSON file.
pub fn load_run_log(path: &Path) -> anyhow::Result<RunLog> {
    let file = std::fs::File::open(path)?;
    let reader = BufReader::new(file);
    let log: RunLog = serde_json::from_reader(reader)?;
    Ok(log)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenarios::ScenarioKind;

    fn logged(kind: ScenarioKind) -> RunLog {
        let scenario = Scenario::build(kind, 3);
        let outcome = run_filter(&scenario.filter, &scenario.steps).unwrap();
        RunLog::new(&scenario, &outcome)
    }

    #[test]
    fn save_then_load() {
        let log = logged(ScenarioKind::PointTrackerNoised);
        let path = std::env::temp_dir().join(format!("kfilter_run_log_{}.json", std::process::id()));
        save_run_log(&log, &path).unwrap();
        let back = load_run_log(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(back.scenario_name, "point_tracker_noised");
        assert_eq!(back.filter, log.filter);
        assert_eq!(back.steps.len(), log.steps.len());
        assert_eq!(back.records.len(), log.records.len());
    }

    #[test]
    fn replay_matches_logged_run() {
        let log = logged(ScenarioKind::OneDimensional);
        let (outcome, divergence) = log.replay().unwrap();
        assert_eq!(divergence, None);
        assert_eq!(outcome.metrics.n_steps, 1000);
    }

    #[test]
    fn replay_reports_tampered_step() {
        let mut log = logged(ScenarioKind::TwoDimensional);
        log.records[7].estimate[0] += 1.0;
        let (_, divergence) = log.replay().unwrap();
        assert_eq!(divergence, Some(7));
    }

    #[test]
    fn truncated_log_diverges_after_shared_prefix() {
        let mut log = logged(ScenarioKind::PointTracker);
        log.records.truncate(40);
        let (outcome, divergence) = log.replay().unwrap();
        assert_eq!(outcome.records.len(), 111);
        assert_eq!(divergence, Some(40));
    }

    #[test]
    fn load_missing_file_fails() {
        assert!(load_run_log(Path::new("/nonexistent/kfilter/run.json")).is_err());
    }
}
