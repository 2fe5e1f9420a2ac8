//! Kalman filter for independent X/Y axes: state [x, y, vx, vy], constant
//! acceleration control [ux, uy], position measurement [x, y].
//!
//! Each axis gets its own measurement deviation: R = diag(σmx², σmy²).

use crate::error::{ensure_finite, ensure_std_dev, Result};
use crate::kf::{CovarianceUpdate, LinearKalmanFilter, LinearModel};
use crate::types::{white_accel_terms, DMat, DVec};
use serde::{Deserialize, Serialize};

/// Physical parameters of the 2-D model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Kalman2DConfig {
    pub dt: f64,
    /// Constant acceleration along X
    pub ux: f64,
    /// Constant acceleration along Y
    pub uy: f64,
    /// Standard deviation of the acceleration noise (shared by both axes)
    pub accel_std: f64,
    /// Standard deviation of the X measurement
    pub meas_std_x: f64,
    /// Standard deviation of the Y measurement
    pub meas_std_y: f64,
    /// Starting [x, y]; velocity always starts at zero
    #[serde(default)]
    pub initial_position: Option<[f64; 2]>,
    #[serde(default)]
    pub covariance_update: CovarianceUpdate,
}

impl Default for Kalman2DConfig {
    fn default() -> Self {
        Self {
            dt: 0.04,
            ux: 1.0,
            uy: 1.0,
            accel_std: 2.0,
            meas_std_x: 0.1,
            meas_std_y: 0.1,
            initial_position: None,
            covariance_update: CovarianceUpdate::Simple,
        }
    }
}

impl Kalman2DConfig {
    pub fn new(dt: f64, ux: f64, uy: f64, accel_std: f64, meas_std_x: f64, meas_std_y: f64) -> Self {
        Self {
            dt,
            ux,
            uy,
            accel_std,
            meas_std_x,
            meas_std_y,
            ..Self::default()
        }
    }

    pub fn with_initial_position(mut self, x: f64, y: f64) -> Self {
        self.initial_position = Some([x, y]);
        self
    }

    fn validate(&self) -> Result<()> {
        ensure_finite("dt", self.dt)?;
        ensure_finite("ux", self.ux)?;
        ensure_finite("uy", self.uy)?;
        ensure_std_dev("accel_std", self.accel_std)?;
        ensure_std_dev("meas_std_x", self.meas_std_x)?;
        ensure_std_dev("meas_std_y", self.meas_std_y)
    }

    fn linear_model(&self) -> LinearModel {
        let dt = self.dt;
        let half_dt2 = 0.5 * dt * dt;
        let (q_pp, q_pv, q_vv) = white_accel_terms(dt, self.accel_std);
        let [x0, y0] = self.initial_position.unwrap_or([0.0, 0.0]);

        #[rustfmt::skip]
        let transition = DMat::from_row_slice(4, 4, &[
            1.0, 0.0, dt,  0.0,
            0.0, 1.0, 0.0, dt,
            0.0, 0.0, 1.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        ]);
        #[rustfmt::skip]
        let control = DMat::from_row_slice(4, 2, &[
            half_dt2, 0.0,
            0.0,      half_dt2,
            dt,       0.0,
            0.0,      dt,
        ]);
        #[rustfmt::skip]
        let process_noise = DMat::from_row_slice(4, 4, &[
            q_pp, 0.0,  q_pv, 0.0,
            0.0,  q_pp, 0.0,  q_pv,
            q_pv, 0.0,  q_vv, 0.0,
            0.0,  q_pv, 0.0,  q_vv,
        ]);
        let measurement_noise = DMat::from_diagonal(&DVec::from_vec(vec![
            self.meas_std_x * self.meas_std_x,
            self.meas_std_y * self.meas_std_y,
        ]));

        LinearModel {
            transition,
            control,
            observation: DMat::from_row_slice(2, 4, &[1., 0., 0., 0., 0., 1., 0., 0.]),
            process_noise,
            measurement_noise,
            initial_state: DVec::from_vec(vec![x0, y0, 0.0, 0.0]),
            initial_covariance: DMat::identity(4, 4),
            covariance_update: self.covariance_update,
        }
    }
}

/// 2-D constant-acceleration Kalman filter with a fixed control input.
#[derive(Clone, Debug)]
pub struct Kalman2D {
    filter: LinearKalmanFilter,
    u: DVec,
    z: DVec,
}

impl Kalman2D {
    pub fn new(config: Kalman2DConfig) -> Result<Self> {
        config.validate()?;
        let filter = LinearKalmanFilter::new(config.linear_model())?;
        tracing::debug!(dt = config.dt, ux = config.ux, uy = config.uy, "kalman 2d constructed");
        Ok(Self {
            filter,
            u: DVec::from_vec(vec![config.ux, config.uy]),
            z: DVec::zeros(2),
        })
    }

    /// Project ahead using the control input captured at construction.
    pub fn predict(&mut self) {
        self.filter.predict(&self.u);
    }

    /// Correct with a position measurement (zx, zy).
    pub fn update(&mut self, zx: f64, zy: f64) -> Result<()> {
        self.z[0] = zx;
        self.z[1] = zy;
        self.filter.update(&self.z)
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
