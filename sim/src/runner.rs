//! Runs a scenario's readings through the filter its spec names, recording
//! prediction and estimate at every step.
//!
//! A reading whose update fails with a singular innovation covariance is
//! skipped (the filter keeps its prediction) and counted in the metrics.

use crate::scenarios::ScenarioStep;
use anyhow::{ensure, Result};
use kalman_core::metrics::FilterMetrics;
use kalman_core::{
    DVec, Kalman1D, Kalman1DConfig, Kalman2D, Kalman2DConfig, KalmanError, PointTracker,
    PointTrackerConfig,
};
use serde::{Deserialize, Serialize};

/// Which filter to build, with its parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model")]
pub enum FilterSpec {
    #[serde(rename = "kalman_1d")]
    Kalman1D(Kalman1DConfig),
    #[serde(rename = "kalman_2d")]
    Kalman2D(Kalman2DConfig),
    #[serde(rename = "point_tracker")]
    PointTracker {
        config: PointTrackerConfig,
        /// [x, y, vx, vy] written before the first step
        initial_state: [f64; 4],
    },
}

/// Everything recorded for one step.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    pub t: f64,
    pub truth: Vec<f64>,
    pub measurement: Vec<f64>,
    /// A-priori position
    pub prediction: Vec<f64>,
    /// A-posteriori position
    pub estimate: Vec<f64>,
    /// True when the update was skipped on a singular innovation covariance
    #[serde(default)]
    pub rejected: bool,
}

/// Records and metrics of a finished run.
#[derive(Clone, Debug)]
pub struct RunOutcome {
    pub records: Vec<StepRecord>,
    pub metrics: FilterMetrics,
}

// ---------------------------------------------------------------------------
// Uniform stepping interface over the three models
// ---------------------------------------------------------------------------

trait StepFilter {
    fn observation_dim(&self) -> usize;
    /// Only the point tracker has a variable step; the others ignore it.
    fn set_time_step(&mut self, _dt: f64) -> kalman_core::Result<()> {
        Ok(())
    }
    fn predict(&mut self);
    fn update(&mut self, z: &[f64]) -> kalman_core::Result<()>;
    fn position(&self) -> Vec<f64>;
}

impl StepFilter for Kalman1D {
    fn observation_dim(&self) -> usize {
        1
    }

    fn predict(&mut self) {
        Kalman1D::predict(self);
    }

    fn update(&mut self, z: &[f64]) -> kalman_core::Result<()> {
        Kalman1D::update(self, z[0])
    }

    fn position(&self) -> Vec<f64> {
        vec![self.state()]
    }
}

impl StepFilter for Kalman2D {
    fn observation_dim(&self) -> usize {
        2
    }

    fn predict(&mut self) {
        Kalman2D::predict(self);
    }

    fn update(&mut self, z: &[f64]) -> kalman_core::Result<()> {
        Kalman2D::update(self, z[0], z[1])
    }

    fn position(&self) -> Vec<f64> {
        let (x, y) = self.state();
        vec![x, y]
    }
}

/// Point tracker plus its zero control and reusable measurement vector.
struct TrackerStepper {
    tracker: PointTracker,
    u: DVec,
    z: DVec,
}

impl StepFilter for TrackerStepper {
    fn observation_dim(&self) -> usize {
        2
    }

    fn set_time_step(&mut self, dt: f64) -> kalman_core::Result<()> {
        self.tracker.set_time_step(dt)
    }

    fn predict(&mut self) {
        self.tracker.predict(&self.u);
    }

    fn update(&mut self, z: &[f64]) -> kalman_core::Result<()> {
        self.z.copy_from_slice(z);
        self.tracker.update(&self.z)
    }

    fn position(&self) -> Vec<f64> {
        let (x, y) = self.tracker.state();
        vec![x, y]
    }
}

fn build(spec: &FilterSpec) -> kalman_core::Result<Box<dyn StepFilter>> {
    Ok(match spec {
        FilterSpec::Kalman1D(config) => Box::new(Kalman1D::new(config.clone())?),
        FilterSpec::Kalman2D(config) => Box::new(Kalman2D::new(config.clone())?),
        FilterSpec::PointTracker {
            config,
            initial_state: [x, y, vx, vy],
        } => {
            let mut tracker = PointTracker::new(config.clone())?;
            tracker.set_initial_state(*x, *y, *vx, *vy);
            Box::new(TrackerStepper {
                tracker,
                u: DVec::zeros(4),
                z: DVec::zeros(2),
            })
        }
    })
}

// ---------------------------------------------------------------------------
// Run
// ---------------------------------------------------------------------------

/// Filter every step of `steps` with a fresh filter built from `spec`.
pub fn run_filter(spec: &FilterSpec, steps: &[ScenarioStep]) -> Result<RunOutcome> {
    let mut filter = build(spec)?;
    let dim = filter.observation_dim();
    let mut records = Vec::with_capacity(steps.len());
    let mut metrics = FilterMetrics::default();

    for (k, step) in steps.iter().enumerate() {
        ensure!(
            step.measurement.len() == dim && step.truth.len() == dim,
            "step {k}: reading has {} components, filter observes {dim}",
            step.measurement.len()
        );

        filter.set_time_step(step.dt)?;
        filter.predict();
        let prediction = filter.position();

        let rejected = match filter.update(&step.measurement) {
            Ok(()) => false,
            Err(KalmanError::InversionFailure) => {
                tracing::warn!(step = k, t = step.t, "singular innovation covariance, reading skipped");
                metrics.record_inversion_failure();
                true
            }
            Err(err) => return Err(err.into()),
        };
        let estimate = filter.position();
        metrics.accumulate(&step.truth, &step.measurement, &estimate);

        records.push(StepRecord {
            t: step.t,
            truth: step.truth.clone(),
            measurement: step.measurement.clone(),
            prediction,
            estimate,
            rejected,
        });
    }

    tracing::info!(
        steps = metrics.n_steps,
        rmse_measurement = metrics.rmse_measurement(),
        rmse_estimate = metrics.rmse_estimate(),
        "run finished"
    );
    Ok(RunOutcome { records, metrics })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenarios::{Scenario, ScenarioKind};

    // Integer part of the point tracker's (x, y) after each step of the
    // noiseless recorded track.
    #[rustfmt::skip]
    const EXPECTED_NO_NOISE: [[i64; 2]; 111] = [
        [311, 5], [312, 7], [311, 9], [311, 11], [311, 12], [311, 12], [312, 13], [312, 15],
        [312, 16], [312, 17], [312, 18], [312, 19], [312, 20], [312, 20], [312, 21], [312, 22],
        [312, 23], [311, 23], [311, 24], [311, 25], [311, 25], [311, 26], [311, 28], [310, 29],
        [310, 31], [310, 33], [310, 35], [310, 37], [310, 40], [309, 43], [309, 46], [308, 51],
        [308, 54], [308, 55], [307, 58], [307, 58], [307, 61], [307, 64], [307, 67], [306, 68],
        [306, 72], [306, 75], [306, 78], [306, 80], [306, 84], [306, 85], [306, 89], [306, 87],
        [306, 90], [306, 93], [306, 95], [306, 98], [305, 99], [305, 102], [305, 105], [305, 108],
        [305, 110], [305, 111], [305, 113], [305, 116], [305, 117], [305, 117], [306, 119],
        [306, 121], [306, 123], [306, 125], [306, 128], [306, 129], [306, 132], [306, 132],
        [307, 133], [307, 135], [307, 135], [307, 136], [308, 138], [308, 139], [308, 140],
        [308, 143], [308, 146], [309, 149], [309, 151], [309, 154], [309, 156], [309, 160],
        [310, 163], [309, 167], [310, 170], [310, 173], [309, 173], [310, 176], [310, 178],
        [310, 180], [311, 182], [311, 183], [311, 184], [311, 185], [311, 186], [312, 186],
        [312, 187], [312, 187], [312, 187], [312, 187], [312, 187], [312, 187], [312, 187],
        [312, 186], [312, 186], [312, 186], [312, 185], [312, 185], [312, 185],
    ];

    #[test]
    fn point_tracker_reproduces_reference_estimates() {
        let scenario = Scenario::build(ScenarioKind::PointTracker, 1337);
        let outcome = run_filter(&scenario.filter, &scenario.steps).unwrap();
        assert_eq!(outcome.records.len(), EXPECTED_NO_NOISE.len());
        for (k, (rec, want)) in outcome.records.iter().zip(EXPECTED_NO_NOISE.iter()).enumerate() {
            let got = [rec.estimate[0] as i64, rec.estimate[1] as i64];
            assert_eq!(&got, want, "step {k}");
        }
        assert_eq!(outcome.metrics.inversion_failures, 0);
    }

    #[test]
    fn one_dimensional_run_beats_raw_readings() {
        let scenario = Scenario::build(ScenarioKind::OneDimensional, 1337);
        let outcome = run_filter(&scenario.filter, &scenario.steps).unwrap();
        let m = &outcome.metrics;
        assert_eq!(m.n_steps, 1000);
        assert!(
            m.rmse_estimate() < 0.6 * m.rmse_measurement(),
            "estimate rmse {} vs measurement rmse {}",
            m.rmse_estimate(),
            m.rmse_measurement()
        );
    }

    #[test]
    fn two_dimensional_run_records_every_step() {
        let scenario = Scenario::build(ScenarioKind::TwoDimensional, 0);
        let outcome = run_filter(&scenario.filter, &scenario.steps).unwrap();
        assert_eq!(outcome.records.len(), scenario.steps.len());
        for rec in &outcome.records {
            assert_eq!(rec.prediction.len(), 2);
            assert_eq!(rec.estimate.len(), 2);
            assert!(!rec.rejected);
        }
    }

    #[test]
    fn noised_runs_are_reproducible() {
        let a = Scenario::build(ScenarioKind::PointTrackerNoised, 9);
        let b = Scenario::build(ScenarioKind::PointTrackerNoised, 9);
        let ra = run_filter(&a.filter, &a.steps).unwrap();
        let rb = run_filter(&b.filter, &b.steps).unwrap();
        assert_eq!(ra.records, rb.records);
    }

    #[test]
    fn reading_of_wrong_width_is_an_error() {
        let scenario = Scenario::build(ScenarioKind::OneDimensional, 0);
        let spec = FilterSpec::Kalman2D(Kalman2DConfig::default());
        let err = run_filter(&spec, &scenario.steps).unwrap_err();
        assert!(err.to_string().contains("filter observes 2"));
    }

    #[test]
    fn singular_update_is_skipped_and_counted() {
        let spec = FilterSpec::PointTracker {
            config: PointTrackerConfig {
                process_noise: 0.0,
                measurement_noise: 0.0,
                ..PointTrackerConfig::default()
            },
            initial_state: [0.0; 4],
        };
        // First update with R = 0 collapses the position variance: the
        // second S is then exactly singular.
        let steps: Vec<ScenarioStep> = (0..3)
            .map(|k| ScenarioStep {
                t: k as f64,
                dt: 0.0,
                truth: vec![1.0, 1.0],
                measurement: vec![1.0, 1.0],
            })
            .collect();
        let outcome = run_filter(&spec, &steps).unwrap();
        assert!(!outcome.records[0].rejected);
        assert!(outcome.records[1].rejected);
        assert_eq!(outcome.records[1].estimate, outcome.records[1].prediction);
        assert_eq!(outcome.metrics.inversion_failures, 2);
    }

    #[test]
    fn non_finite_time_step_stops_the_run() {
        let scenario = Scenario::build(ScenarioKind::PointTracker, 0);
        let mut steps = scenario.steps.clone();
        steps[3].dt = f64::NAN;
        let err = run_filter(&scenario.filter, &steps).unwrap_err();
        assert!(err.to_string().contains("dt"), "{err}");
    }

    #[test]
    fn spec_round_trips_through_json() {
        let spec = FilterSpec::PointTracker {
            config: PointTrackerConfig::default(),
            initial_state: [311.0, 5.0, 0.0, 0.0],
        };
        let json = serde_json::to_string(&spec).unwrap();
        assert!(json.contains("\"model\":\"point_tracker\""));
        let back: FilterSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(back, spec);

        let parsed: FilterSpec =
            serde_json::from_str(r#"{"model":"kalman_1d","dt":0.2,"u":0.0,"accel_std":1.0,"meas_std":3.0}"#)
                .unwrap();
        assert_eq!(parsed, FilterSpec::Kalman1D(Kalman1DConfig::new(0.2, 0.0, 1.0, 3.0)));
    }
}
