//! 2D point tracker: constant-velocity Kalman filter whose time step may
//! change between observations.
//!
//! ## State vector
//! x = [px, py, vx, vy]ᵀ
//!
//! ## Transition
//! A = I₄ with A[0,2] = A[1,3] = dt, rewritten by [`PointTracker::set_time_step`]
//! before each cycle. Nothing else in A ever changes.
//!
//! The control matrix is 4×4 zeros, so the control vector passed to
//! [`PointTracker::process`] has no effect beyond its length check.

use crate::error::{ensure_finite, ensure_std_dev, Result};
use crate::kf::{CovarianceUpdate, LinearKalmanFilter, LinearModel};
use crate::types::{DMat, DVec};
use serde::{Deserialize, Serialize};

/// Noise levels of the point tracker.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PointTrackerConfig {
    /// Diagonal of Q (variance added to every state component per cycle)
    pub process_noise: f64,
    /// Diagonal of R (variance of each position reading)
    pub measurement_noise: f64,
    #[serde(default)]
    pub covariance_update: CovarianceUpdate,
}

impl Default for PointTrackerConfig {
    fn default() -> Self {
        Self {
            process_noise: 1e-5,
            measurement_noise: 1e-1,
            covariance_update: CovarianceUpdate::Simple,
        }
    }
}

impl PointTrackerConfig {
    fn linear_model(&self) -> LinearModel {
        LinearModel {
            transition: DMat::identity(4, 4),
            control: DMat::zeros(4, 4),
            observation: DMat::from_row_slice(2, 4, &[1., 0., 0., 0., 0., 1., 0., 0.]),
            process_noise: DMat::identity(4, 4) * self.process_noise,
            measurement_noise: DMat::identity(2, 2) * self.measurement_noise,
            initial_state: DVec::zeros(4),
            initial_covariance: DMat::identity(4, 4),
            covariance_update: self.covariance_update,
        }
    }
}

/// Constant-velocity tracker for a single 2D point.
#[derive(Clone, Debug)]
pub struct PointTracker {
    filter: LinearKalmanFilter,
}

impl PointTracker {
    pub fn new(config: PointTrackerConfig) -> Result<Self> {
        // Both entries are variances, same admissible range as a deviation
        ensure_std_dev("process_noise", config.process_noise)?;
        ensure_std_dev("measurement_noise", config.measurement_noise)?;
        Ok(Self {
            filter: LinearKalmanFilter::new(config.linear_model())?,
        })
    }

    /// Set the interval to the next observation. Call once per cycle,
    /// before [`process`](Self::process). A non-finite `dt` is rejected and
    /// leaves the transition unchanged.
    pub fn set_time_step(&mut self, dt: f64) -> Result<()> {
        ensure_finite("dt", dt)?;
        self.filter.set_transition_entry(0, 2, dt);
        self.filter.set_transition_entry(1, 3, dt);
        Ok(())
    }

    /// Write [x, y, vx, vy] directly, bypassing predict/update.
    pub fn set_initial_state(&mut self, x: f64, y: f64, vx: f64, vy: f64) {
        self.filter.set_state(&DVec::from_vec(vec![x, y, vx, vy]));
    }

    /// Predict with `u` then correct with the position reading `z`; returns
    /// the posterior [x, y, vx, vy].
    ///
    /// # Panics
    /// If `u` is not length 4 or `z` is not length 2.
    pub fn process(&mut self, u: &DVec, z: &DVec) -> Result<DVec> {
        self.filter.step(u, z)
    }

    /// Prediction half of [`process`](Self::process), for callers that want
    /// the a-priori estimate.
    pub fn predict(&mut self, u: &DVec) {
        self.filter.predict(u);
    }

    /// Correction half of [`process`](Self::process).
    pub fn update(&mut self, z: &DVec) -> Result<()> {
        self.filter.update(z)
    }

    /// Current (x, y) estimate.
    pub fn state(&self) -> (f64, f64) {
        let x = self.filter.state();
        (x[0], x[1])
    }

    /// Copy of [x, y, vx, vy].
    pub fn state_vector(&self) -> DVec {
        self.filter.state()
    }

    pub fn filter(&self) -> &LinearKalmanFilter {
        &self.filter
    }
}
