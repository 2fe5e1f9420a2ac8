//! `sim`: ground-truth tracks, noisy readings, filter runs and replay.

pub mod measurement_sim;
pub mod replay;
pub mod runner;
pub mod scenarios;
pub mod target;

pub use measurement_sim::{MeasurementSimulator, NoiseModel};
pub use replay::{load_run_log, save_run_log, RunLog};
pub use runner::{run_filter, FilterSpec, RunOutcome, StepRecord};
pub use scenarios::{Scenario, ScenarioKind, ScenarioStep};
pub use target::TruthSample;
