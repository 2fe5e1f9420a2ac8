//! Kalman filter for a single axis: state [position, velocity], constant
//! acceleration control, position-only measurement.
//!
//! ## Matrices
//! A = [[1, dt], [0, 1]]
//! B = [dt²/2, dt]ᵀ
//! H = [1, 0]
//! Q = σa² · [[dt⁴/4, dt³/2], [dt³/2, dt²]]
//! R = [σm²]

use crate::error::{ensure_finite, ensure_std_dev, Result};
use crate::kf::{CovarianceUpdate, LinearKalmanFilter, LinearModel};
use crate::types::{white_accel_terms, DMat, DVec};
use serde::{Deserialize, Serialize};

/// Physical parameters of the 1-D model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Kalman1DConfig {
    /// Time between consecutive steps (s)
    pub dt: f64,
    /// Constant acceleration applied on every predict
    pub u: f64,
    /// Standard deviation of the acceleration noise
    pub accel_std: f64,
    /// Standard deviation of the position measurement
    pub meas_std: f64,
    /// Starting [position, velocity]; zero when absent
    #[serde(default)]
    pub initial_state: Option<[f64; 2]>,
    #[serde(default)]
    pub covariance_update: CovarianceUpdate,
}

impl Default for Kalman1DConfig {
    fn default() -> Self {
        Self {
            dt: 0.1,
            u: 2.0,
            accel_std: 0.25,
            meas_std: 1.2,
            initial_state: None,
            covariance_update: CovarianceUpdate::Simple,
        }
    }
}

impl Kalman1DConfig {
    pub fn new(dt: f64, u: f64, accel_std: f64, meas_std: f64) -> Self {
        Self {
            dt,
            u,
            accel_std,
            meas_std,
            ..Self::default()
        }
    }

    pub fn with_initial_state(mut self, position: f64, velocity: f64) -> Self {
        self.initial_state = Some([position, velocity]);
        self
    }

    fn validate(&self) -> Result<()> {
        ensure_finite("dt", self.dt)?;
        ensure_finite("u", self.u)?;
        ensure_std_dev("accel_std", self.accel_std)?;
        ensure_std_dev("meas_std", self.meas_std)
    }

    fn linear_model(&self) -> LinearModel {
        let dt = self.dt;
        let (q_pp, q_pv, q_vv) = white_accel_terms(dt, self.accel_std);
        let [x0, v0] = self.initial_state.unwrap_or([0.0, 0.0]);
        LinearModel {
            transition: DMat::from_row_slice(2, 2, &[1.0, dt, 0.0, 1.0]),
            control: DMat::from_row_slice(2, 1, &[0.5 * dt * dt, dt]),
            observation: DMat::from_row_slice(1, 2, &[1.0, 0.0]),
            process_noise: DMat::from_row_slice(2, 2, &[q_pp, q_pv, q_pv, q_vv]),
            measurement_noise: DMat::from_element(1, 1, self.meas_std * self.meas_std),
            initial_state: DVec::from_vec(vec![x0, v0]),
            initial_covariance: DMat::identity(2, 2),
            covariance_update: self.covariance_update,
        }
    }
}

/// 1-D constant-acceleration Kalman filter with a fixed control input.
#[derive(Clone, Debug)]
pub struct Kalman1D {
    filter: LinearKalmanFilter,
    u: DVec,
    z: DVec,
}

impl Kalman1D {
    pub fn new(config: Kalman1DConfig) -> Result<Self> {
        config.validate()?;
        let filter = LinearKalmanFilter::new(config.linear_model())?;
        tracing::debug!(dt = config.dt, u = config.u, "kalman 1d constructed");
        Ok(Self {
            filter,
            u: DVec::from_element(1, config.u),
            z: DVec::zeros(1),
        })
    }

    /// Project ahead using the control input captured at construction.
    pub fn predict(&mut self) {
        self.filter.predict(&self.u);
    }

    /// Correct with a position measurement.
    pub fn update(&mut self, z: f64) -> Result<()> {
        self.z[0] = z;
        self.filter.update(&self.z)
    }

    /// Current position estimate.
    pub fn state(&self) -> f64 {
        self.filter.state()[0]
    }

    /// Copy of [position, velocity].
    pub fn state_vector(&self) -> DVec {
        self.filter.state()
    }

    /// The underlying engine, for inspecting covariance and model matrices.
    pub fn filter(&self) -> &LinearKalmanFilter {
        &self.filter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::KalmanError;
    use crate::types::white_accel_terms;
    use approx::assert_abs_diff_eq;
    use rand::prelude::*;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn matrices_follow_closed_form() {
        let kf = Kalman1D::new(Kalman1DConfig::new(0.1, 2.0, 0.25, 1.2)).unwrap();
        let f = kf.filter();
        assert_eq!(f.transition(), &DMat::from_row_slice(2, 2, &[1.0, 0.1, 0.0, 1.0]));
        assert_abs_diff_eq!(f.control()[(0, 0)], 0.005, epsilon = 1e-15);
        assert_abs_diff_eq!(f.control()[(1, 0)], 0.1, epsilon = 1e-15);
        assert_eq!(f.observation()[(0, 0)], 1.0);
        assert_eq!(f.observation()[(0, 1)], 0.0);

        let q = f.process_noise();
        let var = 0.25 * 0.25;
        assert_abs_diff_eq!(q[(0, 0)], var * 0.25 * 1e-4, epsilon = 1e-15);
        assert_abs_diff_eq!(q[(0, 1)], var * 0.5 * 1e-3, epsilon = 1e-15);
        assert_abs_diff_eq!(q[(1, 0)], var * 0.5 * 1e-3, epsilon = 1e-15);
        assert_abs_diff_eq!(q[(1, 1)], var * 1e-2, epsilon = 1e-15);
        assert_abs_diff_eq!(f.measurement_noise()[(0, 0)], 1.44, epsilon = 1e-12);
        assert_eq!(f.covariance(), DMat::identity(2, 2));
    }

    #[test]
    fn first_predict_from_rest() {
        let mut kf = Kalman1D::new(Kalman1DConfig::new(0.1, 2.0, 0.25, 1.2)).unwrap();
        kf.predict();
        let x = kf.state_vector();
        assert_abs_diff_eq!(x[0], 0.01, epsilon = 1e-12);
        assert_abs_diff_eq!(x[1], 0.2, epsilon = 1e-12);
        assert_abs_diff_eq!(kf.state(), 0.01, epsilon = 1e-12);
    }

    #[test]
    fn first_prior_covariance_closed_form() {
        let config = Kalman1DConfig::default();
        let (q_pp, q_pv, q_vv) = white_accel_terms(config.dt, config.accel_std);
        let mut kf = Kalman1D::new(config).unwrap();
        kf.predict();
        // A·I·Aᵀ = [[1 + dt², dt], [dt, 1]] with dt = 0.1
        let p = kf.filter().covariance();
        assert_abs_diff_eq!(p[(0, 0)], 1.01 + q_pp, epsilon = 1e-12);
        assert_abs_diff_eq!(p[(0, 1)], 0.1 + q_pv, epsilon = 1e-12);
        assert_abs_diff_eq!(p[(1, 0)], 0.1 + q_pv, epsilon = 1e-12);
        assert_abs_diff_eq!(p[(1, 1)], 1.0 + q_vv, epsilon = 1e-12);
    }

    #[test]
    fn first_update_matches_scalar_gain() {
        let config = Kalman1DConfig::default();
        let (q_pp, q_pv, q_vv) = white_accel_terms(config.dt, config.accel_std);
        let r = config.meas_std * config.meas_std;
        let mut kf = Kalman1D::new(config).unwrap();
        kf.predict();
        let prior = kf.state_vector();
        kf.update(1.0).unwrap();

        let (p00, p01, p11) = (1.01 + q_pp, 0.1 + q_pv, 1.0 + q_vv);
        let s = p00 + r;
        let (k0, k1) = (p00 / s, p01 / s);
        let y = 1.0 - prior[0];
        let x = kf.state_vector();
        assert_abs_diff_eq!(x[0], prior[0] + k0 * y, epsilon = 1e-12);
        assert_abs_diff_eq!(x[1], prior[1] + k1 * y, epsilon = 1e-12);

        let p = kf.filter().covariance();
        assert_abs_diff_eq!(p[(0, 0)], (1.0 - k0) * p00, epsilon = 1e-12);
        assert_abs_diff_eq!(p[(0, 1)], (1.0 - k0) * p01, epsilon = 1e-12);
        assert_abs_diff_eq!(p[(1, 1)], p11 - k1 * p01, epsilon = 1e-12);
    }

    #[test]
    fn initial_state_option() {
        let config = Kalman1DConfig::default().with_initial_state(5.0, -1.0);
        let kf = Kalman1D::new(config).unwrap();
        assert_eq!(kf.state_vector().as_slice(), &[5.0, -1.0]);
        assert_eq!(kf.state(), 5.0);
    }

    #[test]
    fn state_vector_is_a_copy() {
        let kf = Kalman1D::new(Kalman1DConfig::default()).unwrap();
        let mut x = kf.state_vector();
        x[0] = 99.0;
        assert_eq!(kf.state(), 0.0);
    }

    #[test]
    fn rejects_bad_parameters() {
        assert!(matches!(
            Kalman1D::new(Kalman1DConfig::new(f64::NAN, 2.0, 0.25, 1.2)),
            Err(KalmanError::InvalidParameter { name: "dt", .. })
        ));
        assert!(matches!(
            Kalman1D::new(Kalman1DConfig::new(0.1, 2.0, 0.25, -1.2)),
            Err(KalmanError::InvalidParameter { name: "meas_std", .. })
        ));
    }

    #[test]
    fn zero_measurement_noise_still_inverts() {
        // H·P·Hᵀ stays positive, so σm = 0 is legal here
        let mut kf = Kalman1D::new(Kalman1DConfig::new(0.1, 0.0, 0.0, 0.0)).unwrap();
        kf.predict();
        kf.update(3.0).unwrap();
        assert_abs_diff_eq!(kf.state(), 3.0, epsilon = 1e-12);
    }

    #[test]
    fn tracks_noisy_quadratic_path() {
        let dt = 0.1;
        let mut kf = Kalman1D::new(Kalman1DConfig::new(dt, 2.0, 0.25, 1.2)).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(1337);

        let mut sq_err_meas = 0.0;
        let mut sq_err_est = 0.0;
        for k in 1..=1000 {
            // x = t², i.e. the commanded 2 m/s² from rest
            let t = k as f64 * dt;
            let truth = t * t;
            let z = truth + rng.gen_range(-5.0..5.0);
            kf.predict();
            kf.update(z).unwrap();
            sq_err_meas += (z - truth).powi(2);
            sq_err_est += (kf.state() - truth).powi(2);
        }
        assert!(
            sq_err_est < sq_err_meas,
            "filtered error {sq_err_est} should beat raw error {sq_err_meas}"
        );
    }

    #[test]
    fn position_variance_settles() {
        let mut kf = Kalman1D::new(Kalman1DConfig::default()).unwrap();
        let mut variances = Vec::new();
        for _ in 0..500 {
            kf.predict();
            kf.update(0.0).unwrap();
            variances.push(kf.filter().covariance()[(0, 0)]);
        }
        // Posterior variance is bounded by the sensor variance and converges
        assert!(variances.iter().all(|v| *v <= 1.44));
        let last = variances[variances.len() - 1];
        let before = variances[variances.len() - 2];
        assert_abs_diff_eq!(last, before, epsilon = 1e-4);
        assert!(last < variances[0]);
    }
}
