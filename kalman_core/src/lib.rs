//! `kalman_core`: Discrete linear Kalman filtering.
//!
//! # Module layout
//! - [`types`]           Matrix aliases and model dimensions
//! - [`error`]           `KalmanError` and the crate `Result`
//! - [`kf`]              Generic predict / update engine
//! - [`kalman_1d`]       Single-axis constant-acceleration model
//! - [`kalman_2d`]       Two-axis constant-acceleration model
//! - [`point_tracker`]   2D constant-velocity tracker with variable time step
//! - [`metrics`]         RMSE against ground truth

pub mod error;
pub mod kalman_1d;
pub mod kalman_2d;
pub mod kf;
pub mod metrics;
pub mod point_tracker;
pub mod types;

pub use error::{KalmanError, Result};
pub use kalman_1d::{Kalman1D, Kalman1DConfig};
pub use kalman_2d::{Kalman2D, Kalman2DConfig};
pub use kf::{CovarianceUpdate, LinearKalmanFilter, LinearModel};
pub use point_tracker::{PointTracker, PointTrackerConfig};
pub use types::{DMat, DVec, Dimensions};
