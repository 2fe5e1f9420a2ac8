//! Matrix aliases used across the workspace.

use nalgebra::{DMatrix, DVector};

// ---------------------------------------------------------------------------
// All filter math runs in f64. Dimensions are chosen at construction, so the
// dynamic nalgebra types carry every matrix.
// ---------------------------------------------------------------------------

/// Dynamic-size column vector (state, control, measurement, innovation)
pub type DVec = DVector<f64>;

/// Dynamic-size matrix (A, B, H, P, Q, R and every intermediate product)
pub type DMat = DMatrix<f64>;

/// State, control and observation dimensions of a linear model.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Dimensions {
    /// n: length of the state vector
    pub state: usize,
    /// m: length of the control vector
    pub control: usize,
    /// p: length of the measurement vector
    pub observation: usize,
}

/// Build a symmetric block for one position/velocity axis pair driven by
/// white acceleration noise: [[dt⁴/4, dt³/2], [dt³/2, dt²]] scaled by σa².
pub(crate) fn white_accel_terms(dt: f64, accel_std: f64) -> (f64, f64, f64) {
    let q = accel_std * accel_std;
    let dt2 = dt * dt;
    let dt3 = dt2 * dt;
    let dt4 = dt3 * dt;
    (q * 0.25 * dt4, q * 0.5 * dt3, q * dt2)
}
