//! Filtering metrics: RMSE of raw measurements and filtered estimates
//! against ground truth.

use serde::{Deserialize, Serialize};

/// Accumulated error statistics over a run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterMetrics {
    /// Number of steps accumulated
    pub n_steps: u64,
    /// Sum of squared measurement errors (for RMSE)
    pub sum_sq_meas_err: f64,
    /// Sum of squared estimate errors (for RMSE)
    pub sum_sq_est_err: f64,
    /// Measurements skipped because the update could not invert S
    pub inversion_failures: u64,
}

impl FilterMetrics {
    /// Accumulate one step. Positions are compared componentwise, so the
    /// slices may hold one coordinate (1-D) or two (2-D).
    pub fn accumulate(&mut self, truth: &[f64], measurement: &[f64], estimate: &[f64]) {
        self.n_steps += 1;
        self.sum_sq_meas_err += squared_distance(truth, measurement);
        self.sum_sq_est_err += squared_distance(truth, estimate);
    }

    pub fn record_inversion_failure(&mut self) {
        self.inversion_failures += 1;
    }

    /// Root-mean-square error of the raw measurements.
    pub fn rmse_measurement(&self) -> f64 {
        if self.n_steps == 0 {
            return 0.0;
        }
        (self.sum_sq_meas_err / self.n_steps as f64).sqrt()
    }

    /// Root-mean-square error of the filtered estimates.
    pub fn rmse_estimate(&self) -> f64 {
        if self.n_steps == 0 {
            return 0.0;
        }
        (self.sum_sq_est_err / self.n_steps as f64).sqrt()
    }
}

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}
