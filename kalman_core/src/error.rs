//! Error type shared by every filter in the crate.

use thiserror::Error;

/// Failures surfaced by filter construction and the update step.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum KalmanError {
    /// Innovation covariance S = H·P·Hᵀ + R could not be inverted.
    /// State and covariance are left exactly as they were before the call.
    #[error("innovation covariance is singular and cannot be inverted")]
    InversionFailure,

    /// A model matrix does not have the shape implied by the state,
    /// control and observation dimensions.
    #[error("{matrix} has shape {actual:?}, expected {expected:?}")]
    DimensionMismatch {
        matrix: &'static str,
        expected: (usize, usize),
        actual: (usize, usize),
    },

    /// A physical parameter is out of range (non-finite time step,
    /// negative or non-finite standard deviation).
    #[error("invalid parameter {name} = {value}")]
    InvalidParameter { name: &'static str, value: f64 },
}

pub type Result<T> = std::result::Result<T, KalmanError>;

/// Reject non-finite values.
pub(crate) fn ensure_finite(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(KalmanError::InvalidParameter { name, value })
    }
}

/// Reject negative or non-finite standard deviations.
pub(crate) fn ensure_std_dev(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(KalmanError::InvalidParameter { name, value })
    }
}
