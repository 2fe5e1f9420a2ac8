//! Measurement simulator.
//!
//! Turns ground-truth positions into sensor readings with seeded, uniform
//! additive noise. All draws come from a `ChaCha8Rng`, so a run is
//! reproducible from its seed.

use crate::target::TruthSample;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Noise added independently to every axis of a reading.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum NoiseModel {
    /// Readings equal the truth
    #[default]
    None,
    /// Uniform in [−amplitude/2, amplitude/2)
    Centered { amplitude: f64 },
    /// Uniform in [0, amplitude), i.e. a biased sensor
    Offset { amplitude: f64 },
}

/// Generates noisy readings from ground truth.
pub struct MeasurementSimulator {
    pub noise: NoiseModel,
    rng: ChaCha8Rng,
}

impl MeasurementSimulator {
    pub fn new(noise: NoiseModel, seed: u64) -> Self {
        Self {
            noise,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// One reading of `truth`.
    pub fn measure(&mut self, truth: &[f64]) -> Vec<f64> {
        truth
            .iter()
            .map(|&v| match self.noise {
                NoiseModel::None => v,
                NoiseModel::Centered { amplitude } => {
                    v + self.rng.gen::<f64>() * amplitude - amplitude / 2.0
                }
                NoiseModel::Offset { amplitude } => v + self.rng.gen::<f64>() * amplitude,
            })
            .collect()
    }

    /// Readings for a whole track, in order.
    pub fn measure_track(&mut self, track: &[TruthSample]) -> Vec<Vec<f64>> {
        track.iter().map(|s| self.measure(&s.position)).collect()
    }
}
