//! Generic linear Kalman filter: predict and update steps.
//!
//! # Design choices
//! - One engine serves every motion model; the 1-D, 2-D and point-tracker
//!   types only build matrices and delegate here.
//! - Dimensions are dynamic (`DMat`/`DVec`) and validated once, at
//!   construction. A mismatched control or measurement vector at call time
//!   is a programmer error and panics.
//! - Every intermediate product lives in a [`Scratch`] sized at construction,
//!   so a predict/update cycle performs no allocation. `gemm`/`gemv` with a
//!   zero `beta` never read their output buffer, which keeps reuse invisible.
//!
//! ## Recursion
//! predict:  x ← A·x + B·u,  P ← A·P·Aᵀ + Q
//!
//! update:   S = H·P·Hᵀ + R,  K = P·Hᵀ·S⁻¹,  y = z − H·x,
//!           x ← x + K·y,  P ← (I − K·H)·P

use crate::error::{KalmanError, Result};
use crate::types::{DMat, DVec, Dimensions};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Model description
// ---------------------------------------------------------------------------

/// Form of the posterior covariance update.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CovarianceUpdate {
    /// P ← (I − K·H)·P
    #[default]
    Simple,
    /// P ← (I − K·H)·P·(I − K·H)ᵀ + K·R·Kᵀ
    Joseph,
}

/// The matrices defining a linear Gaussian system plus its starting estimate.
///
/// The state dimension n is the length of `initial_state`, the control
/// dimension m is the column count of `control`, and the observation
/// dimension p is the row count of `observation`. Everything else must agree.
#[derive(Clone, Debug)]
pub struct LinearModel {
    /// A (n×n)
    pub transition: DMat,
    /// B (n×m)
    pub control: DMat,
    /// H (p×n)
    pub observation: DMat,
    /// Q (n×n)
    pub process_noise: DMat,
    /// R (p×p)
    pub measurement_noise: DMat,
    /// x₀ (n)
    pub initial_state: DVec,
    /// P₀ (n×n)
    pub initial_covariance: DMat,
    pub covariance_update: CovarianceUpdate,
}

impl LinearModel {
    pub fn dimensions(&self) -> Dimensions {
        Dimensions {
            state: self.initial_state.len(),
            control: self.control.ncols(),
            observation: self.observation.nrows(),
        }
    }

    fn validate(&self) -> Result<Dimensions> {
        let d = self.dimensions();
        let (n, m, p) = (d.state, d.control, d.observation);
        check_shape("A", &self.transition, (n, n))?;
        check_shape("B", &self.control, (n, m))?;
        check_shape("H", &self.observation, (p, n))?;
        check_shape("Q", &self.process_noise, (n, n))?;
        check_shape("R", &self.measurement_noise, (p, p))?;
        check_shape("P", &self.initial_covariance, (n, n))?;
        Ok(d)
    }
}

fn check_shape(matrix: &'static str, m: &DMat, expected: (usize, usize)) -> Result<()> {
    let actual = m.shape();
    if actual == expected {
        Ok(())
    } else {
        Err(KalmanError::DimensionMismatch {
            matrix,
            expected,
            actual,
        })
    }
}

// ---------------------------------------------------------------------------
// Scratch space
// ---------------------------------------------------------------------------

/// Preallocated intermediate products, one buffer per term of the recursion.
#[derive(Clone, Debug)]
struct Scratch {
    /// Aᵀ (n×n), refreshed whenever A changes
    a_t: DMat,
    /// Hᵀ (n×p)
    h_t: DMat,
    /// A·x + B·u (n)
    ax: DVec,
    /// A·P (n×n)
    ap: DMat,
    /// H·P (p×n)
    hp: DMat,
    /// S (p×p)
    innovation_cov: DMat,
    /// S⁻¹ (p×p)
    s_inv: DMat,
    /// P·Hᵀ (n×p)
    pht: DMat,
    /// K (n×p)
    gain: DMat,
    /// y (p)
    innovation: DVec,
    /// Kᵀ (p×n), Joseph form only
    gain_t: DMat,
    /// I − K·H (n×n)
    i_kh: DMat,
    /// (I − K·H)ᵀ (n×n), Joseph form only
    i_kh_t: DMat,
    /// (I − K·H)·P (n×n), Joseph form only
    ikh_p: DMat,
    /// K·R (n×p), Joseph form only
    kr: DMat,
    /// posterior P before it is copied back (n×n)
    new_p: DMat,
}

impl Scratch {
    fn new(d: Dimensions, a: &DMat, h: &DMat) -> Self {
        let (n, p) = (d.state, d.observation);
        Self {
            a_t: a.transpose(),
            h_t: h.transpose(),
            ax: DVec::zeros(n),
            ap: DMat::zeros(n, n),
            hp: DMat::zeros(p, n),
            innovation_cov: DMat::zeros(p, p),
            s_inv: DMat::zeros(p, p),
            pht: DMat::zeros(n, p),
            gain: DMat::zeros(n, p),
            innovation: DVec::zeros(p),
            gain_t: DMat::zeros(p, n),
            i_kh: DMat::zeros(n, n),
            i_kh_t: DMat::zeros(n, n),
            ikh_p: DMat::zeros(n, n),
            kr: DMat::zeros(n, p),
            new_p: DMat::zeros(n, n),
        }
    }
}

// ---------------------------------------------------------------------------
// Filter
// ---------------------------------------------------------------------------

/// Discrete linear Kalman filter owning its model, estimate and scratch space.
#[derive(Clone, Debug)]
pub struct LinearKalmanFilter {
    dims: Dimensions,
    a: DMat,
    b: DMat,
    h: DMat,
    q: DMat,
    r: DMat,
    x: DVec,
    p: DMat,
    covariance_update: CovarianceUpdate,
    scratch: Scratch,
}

impl LinearKalmanFilter {
    /// Build a filter from `model`, failing with
    /// [`KalmanError::DimensionMismatch`] if any matrix disagrees with the
    /// dimensions implied by the others.
    pub fn new(model: LinearModel) -> Result<Self> {
        let dims = model.validate()?;
        let scratch = Scratch::new(dims, &model.transition, &model.observation);
        tracing::debug!(
            n = dims.state,
            m = dims.control,
            p = dims.observation,
            "linear kalman filter constructed"
        );
        Ok(Self {
            dims,
            a: model.transition,
            b: model.control,
            h: model.observation,
            q: model.process_noise,
            r: model.measurement_noise,
            x: model.initial_state,
            p: model.initial_covariance,
            covariance_update: model.covariance_update,
            scratch,
        })
    }

    /// Project the state and covariance one step ahead.
    ///
    /// # Panics
    /// If `u` does not have the control dimension.
    pub fn predict(&mut self, u: &DVec) {
        assert_eq!(
            u.len(),
            self.dims.control,
            "control vector has length {}, expected {}",
            u.len(),
            self.dims.control
        );
        let s = &mut self.scratch;

        // x = A·x + B·u
        s.ax.gemv(1.0, &self.a, &self.x, 0.0);
        s.ax.gemv(1.0, &self.b, u, 1.0);
        self.x.copy_from(&s.ax);

        // P = A·P·Aᵀ + Q
        s.ap.gemm(1.0, &self.a, &self.p, 0.0);
        self.p.copy_from(&self.q);
        self.p.gemm(1.0, &s.ap, &s.a_t, 1.0);

        tracing::trace!(state = ?self.x.as_slice(), "kalman predict");
    }

    /// Correct the estimate with measurement `z`.
    ///
    /// On [`KalmanError::InversionFailure`] neither the state nor the
    /// covariance has been touched.
    ///
    /// # Panics
    /// If `z` does not have the observation dimension.
    pub fn update(&mut self, z: &DVec) -> Result<()> {
        assert_eq!(
            z.len(),
            self.dims.observation,
            "measurement vector has length {}, expected {}",
            z.len(),
            self.dims.observation
        );
        let s = &mut self.scratch;

        // S = H·P·Hᵀ + R
        s.hp.gemm(1.0, &self.h, &self.p, 0.0);
        s.innovation_cov.copy_from(&self.r);
        s.innovation_cov.gemm(1.0, &s.hp, &s.h_t, 1.0);

        s.s_inv.copy_from(&s.innovation_cov);
        if !s.s_inv.try_inverse_mut() {
            tracing::warn!(
                innovation_cov = ?s.innovation_cov.as_slice(),
                "innovation covariance is singular, measurement rejected"
            );
            return Err(KalmanError::InversionFailure);
        }

        // K = P·Hᵀ·S⁻¹
        s.pht.gemm(1.0, &self.p, &s.h_t, 0.0);
        s.gain.gemm(1.0, &s.pht, &s.s_inv, 0.0);

        // y = z − H·x
        s.innovation.copy_from(z);
        s.innovation.gemv(-1.0, &self.h, &self.x, 1.0);

        // x = x + K·y
        self.x.gemv(1.0, &s.gain, &s.innovation, 1.0);

        // I − K·H
        s.i_kh.fill_with_identity();
        s.i_kh.gemm(-1.0, &s.gain, &self.h, 1.0);

        match self.covariance_update {
            CovarianceUpdate::Simple => {
                s.new_p.gemm(1.0, &s.i_kh, &self.p, 0.0);
            }
            CovarianceUpdate::Joseph => {
                s.ikh_p.gemm(1.0, &s.i_kh, &self.p, 0.0);
                s.kr.gemm(1.0, &s.gain, &self.r, 0.0);
                s.gain.transpose_to(&mut s.gain_t);
                s.i_kh.transpose_to(&mut s.i_kh_t);
                s.new_p.gemm(1.0, &s.kr, &s.gain_t, 0.0);
                s.new_p.gemm(1.0, &s.ikh_p, &s.i_kh_t, 1.0);
            }
        }
        self.p.copy_from(&s.new_p);

        tracing::trace!(innovation = ?s.innovation.as_slice(), "kalman update");
        Ok(())
    }

    /// One full cycle: `predict(u)` then `update(z)`. Returns a copy of the
    /// posterior state.
    pub fn step(&mut self, u: &DVec, z: &DVec) -> Result<DVec> {
        self.predict(u);
        self.update(z)?;
        Ok(self.state())
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dims
    }

    /// Copy of the current state estimate.
    pub fn state(&self) -> DVec {
        self.x.clone()
    }

    /// Copy of the current state covariance.
    pub fn covariance(&self) -> DMat {
        self.p.clone()
    }

    /// Overwrite the state estimate, leaving the covariance alone.
    ///
    /// # Panics
    /// If `x` does not have the state dimension.
    pub fn set_state(&mut self, x: &DVec) {
        assert_eq!(x.len(), self.dims.state, "state vector length");
        self.x.copy_from(x);
    }

    /// Overwrite the state covariance.
    ///
    /// # Panics
    /// If `p` is not n×n.
    pub fn set_covariance(&mut self, p: &DMat) {
        let n = self.dims.state;
        assert_eq!(p.shape(), (n, n), "covariance shape");
        self.p.copy_from(p);
    }

    pub fn transition(&self) -> &DMat {
        &self.a
    }

    pub fn control(&self) -> &DMat {
        &self.b
    }

    pub fn observation(&self) -> &DMat {
        &self.h
    }

    pub fn process_noise(&self) -> &DMat {
        &self.q
    }

    pub fn measurement_noise(&self) -> &DMat {
        &self.r
    }

    /// Write a single entry of A. Used by models whose transition depends on
    /// a time step that changes between cycles.
    pub(crate) fn set_transition_entry(&mut self, row: usize, col: usize, value: f64) {
        self.a[(row, col)] = value;
        self.scratch.a_t[(col, row)] = value;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
