//! Scenario definitions.
//!
//! Each scenario pairs a ground-truth track and a noise model with the
//! filter that should follow it. All scenarios are deterministic given the
//! same seed.

use crate::measurement_sim::{MeasurementSimulator, NoiseModel};
use crate::runner::FilterSpec;
use crate::target::{quadratic_track_1d, recorded_track_2d, TruthSample};
use kalman_core::{Kalman1DConfig, Kalman2DConfig, PointTrackerConfig};
use serde::{Deserialize, Serialize};

/// Which pre-defined scenario to load.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum)]
pub enum ScenarioKind {
    /// Quadratic 1-D path, 100 s at 10 Hz, ±50 uniform noise
    OneDimensional,
    /// Recorded pixel track through the 2-D constant-acceleration model
    TwoDimensional,
    /// Recorded pixel track through the point tracker, exact readings
    PointTracker,
    /// Recorded pixel track through the point tracker, biased noisy readings
    PointTrackerNoised,
}

/// One reading to filter, with the truth it was drawn from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScenarioStep {
    pub t: f64,
    /// Interval since the previous step (s)
    pub dt: f64,
    pub truth: Vec<f64>,
    pub measurement: Vec<f64>,
}

/// A fully configured scenario.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub seed: u64,
    pub filter: FilterSpec,
    pub steps: Vec<ScenarioStep>,
}

impl Scenario {
    /// Build the named scenario. Uses `seed` for repeatability.
    pub fn build(kind: ScenarioKind, seed: u64) -> Self {
        let scenario = match kind {
            ScenarioKind::OneDimensional => Self::one_dimensional(seed),
            ScenarioKind::TwoDimensional => Self::two_dimensional(seed),
            ScenarioKind::PointTracker => Self::point_tracker(seed, NoiseModel::None),
            ScenarioKind::PointTrackerNoised => {
                Self::point_tracker(seed, NoiseModel::Offset { amplitude: 10.0 })
            }
        };
        tracing::debug!(name = %scenario.name, seed, steps = scenario.steps.len(), "scenario built");
        scenario
    }

    /// Replace the filter parameters, keeping the model kind. Fails when
    /// `filter` names a different model than the scenario was built for.
    pub fn with_filter(mut self, filter: FilterSpec) -> anyhow::Result<Self> {
        anyhow::ensure!(
            std::mem::discriminant(&self.filter) == std::mem::discriminant(&filter),
            "scenario {} cannot run filter {:?}",
            self.name,
            filter
        );
        self.filter = filter;
        Ok(self)
    }

    // -----------------------------------------------------------------------
    // Scenario 1: 1-D constant acceleration
    // -----------------------------------------------------------------------
    fn one_dimensional(seed: u64) -> Self {
        let config = Kalman1DConfig::default();
        let truth = quadratic_track_1d(config.dt, 100.0);
        let noise = NoiseModel::Centered { amplitude: 100.0 };
        Self {
            name: "one_dimensional".into(),
            seed,
            steps: steps_from(&truth, noise, seed),
            filter: FilterSpec::Kalman1D(config),
        }
    }

    // -----------------------------------------------------------------------
    // Scenario 2: 2-D constant acceleration on the recorded track
    // -----------------------------------------------------------------------
    fn two_dimensional(seed: u64) -> Self {
        let [x0, y0] = crate::target::RECORDED_TRACK_2D[0];
        let config = Kalman2DConfig::default().with_initial_position(x0, y0);
        let truth = recorded_track_2d(config.dt);
        Self {
            name: "two_dimensional".into(),
            seed,
            steps: steps_from(&truth, NoiseModel::None, seed),
            filter: FilterSpec::Kalman2D(config),
        }
    }

    // -----------------------------------------------------------------------
    // Scenarios 3 & 4: point tracker, started on the first frame
    // -----------------------------------------------------------------------
    fn point_tracker(seed: u64, noise: NoiseModel) -> Self {
        let truth = recorded_track_2d(1.0);
        let name = match noise {
            NoiseModel::None => "point_tracker",
            _ => "point_tracker_noised",
        };
        let initial = &truth[0].position;
        let filter = FilterSpec::PointTracker {
            config: PointTrackerConfig::default(),
            initial_state: [initial[0], initial[1], 0.0, 0.0],
        };
        Self {
            name: name.into(),
            seed,
            steps: steps_from(&truth[1..], noise, seed),
            filter,
        }
    }
}

fn steps_from(truth: &[TruthSample], noise: NoiseModel, seed: u64) -> Vec<ScenarioStep> {
    let mut sim = MeasurementSimulator::new(noise, seed);
    truth
        .iter()
        .map(|s| ScenarioStep {
            t: s.t,
            dt: s.dt,
            truth: s.position.clone(),
            measurement: sim.measure(&s.position),
        })
        .collect()
}
