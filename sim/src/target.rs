//! Ground-truth trajectories fed to the filters.
//!
//! Two sources:
//! - an analytic 1-D path x(t) = dt·(t² − t), sampled every `dt`
//! - a recorded 2-D pixel track (112 frames, Y axis pointing down)

use serde::{Deserialize, Serialize};

/// One ground-truth sample.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TruthSample {
    /// Sample time (s)
    pub t: f64,
    /// Interval since the previous sample (s)
    pub dt: f64,
    /// True position, one entry per axis
    pub position: Vec<f64>,
}

/// Sample x(t) = dt·(t² − t) for t = 0, dt, 2dt, … until `duration`.
pub fn quadratic_track_1d(dt: f64, duration: f64) -> Vec<TruthSample> {
    let iters = (duration / dt).round() as usize;
    (0..iters)
        .map(|k| {
            let t = k as f64 * dt;
            TruthSample {
                t,
                dt,
                position: vec![dt * (t * t - t)],
            }
        })
        .collect()
}

/// The recorded track, one sample every `dt`.
pub fn recorded_track_2d(dt: f64) -> Vec<TruthSample> {
    RECORDED_TRACK_2D
        .iter()
        .enumerate()
        .map(|(k, p)| TruthSample {
            t: k as f64 * dt,
            dt,
            position: p.to_vec(),
        })
        .collect()
}

/// Pixel positions of a tracked object, frame by frame.
#[rustfmt::skip]
pub const RECORDED_TRACK_2D: [[f64; 2]; 112] = [
    [311.0, 5.0], [312.0, 6.0], [313.0, 8.0], [311.0, 10.0], [311.0, 11.0], [312.0, 12.0],
    [312.0, 12.0], [313.0, 13.0], [312.0, 16.0], [312.0, 16.0], [312.0, 18.0], [312.0, 18.0],
    [312.0, 19.0], [312.0, 19.0], [312.0, 20.0], [312.0, 20.0], [312.0, 22.0], [312.0, 22.0],
    [311.0, 23.0], [311.0, 23.0], [311.0, 24.0], [311.0, 24.0], [311.0, 28.0], [310.0, 30.0],
    [311.0, 32.0], [311.0, 35.0], [311.0, 39.0], [310.0, 42.0], [310.0, 44.0], [308.0, 46.0],
    [307.0, 56.0], [308.0, 58.0], [308.0, 70.0], [308.0, 60.0], [307.0, 52.0], [307.0, 64.0],
    [307.0, 51.0], [308.0, 70.0], [307.0, 70.0], [307.0, 70.0], [307.0, 66.0], [307.0, 83.0],
    [307.0, 80.0], [308.0, 85.0], [307.0, 80.0], [309.0, 98.0], [306.0, 79.0], [307.0, 98.0],
    [306.0, 61.0], [307.0, 94.0], [308.0, 101.0], [306.0, 94.0], [306.0, 104.0], [306.0, 94.0],
    [305.0, 107.0], [307.0, 112.0], [307.0, 108.0], [307.0, 108.0], [306.0, 109.0],
    [306.0, 109.0], [306.0, 121.0], [307.0, 108.0], [307.0, 108.0], [308.0, 120.0],
    [307.0, 122.0], [307.0, 122.0], [308.0, 128.0], [307.0, 130.0], [306.0, 122.0],
    [308.0, 140.0], [309.0, 122.0], [309.0, 122.0], [309.0, 140.0], [309.0, 122.0],
    [308.0, 134.0], [309.0, 141.0], [309.0, 136.0], [309.0, 136.0], [308.0, 154.0],
    [311.0, 155.0], [311.0, 155.0], [307.0, 150.0], [311.0, 161.0], [307.0, 162.0],
    [313.0, 169.0], [311.0, 171.0], [307.0, 181.0], [311.0, 175.0], [311.0, 175.0],
    [306.0, 163.0], [312.0, 178.0], [312.0, 178.0], [312.0, 178.0], [312.0, 178.0],
    [312.0, 178.0], [312.0, 178.0], [312.0, 178.0], [312.0, 178.0], [312.0, 178.0],
    [312.0, 178.0], [312.0, 178.0], [312.0, 178.0], [312.0, 178.0], [312.0, 178.0],
    [312.0, 178.0], [312.0, 178.0], [312.0, 178.0], [312.0, 178.0], [312.0, 178.0],
    [312.0, 178.0], [312.0, 178.0], [312.0, 178.0],
];
