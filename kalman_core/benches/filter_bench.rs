use criterion::{black_box, criterion_group, criterion_main, Criterion};
use kalman_core::{
    DVec, Kalman1D, Kalman1DConfig, Kalman2D, Kalman2DConfig, PointTracker, PointTrackerConfig,
};

/// x = dt·(t² − t) sampled every `dt`, with a deterministic ripple as noise.
fn make_track_1d(dt: f64, n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| {
            let t = i as f64 * dt;
            dt * (t * t - t) + 25.0 * (i as f64 * 0.7).sin()
        })
        .collect()
}

fn make_track_2d(n: usize) -> Vec<(f64, f64)> {
    (0..n)
        .map(|i| {
            let t = i as f64;
            (311.0 + (t * 0.3).sin(), 5.0 + 1.6 * t)
        })
        .collect()
}

fn bench_filters(c: &mut Criterion) {
    let mut group = c.benchmark_group("filters");

    for n in [1_000, 10_000] {
        let track = make_track_1d(0.1, n);
        group.bench_function(format!("kalman_1d_{n}_steps"), |b| {
            b.iter(|| {
                let mut kf = Kalman1D::new(Kalman1DConfig::default()).unwrap();
                for &z in &track {
                    kf.predict();
                    kf.update(z).unwrap();
                }
                black_box(kf.state())
            });
        });

        let track = make_track_2d(n);
        group.bench_function(format!("kalman_2d_{n}_steps"), |b| {
            b.iter(|| {
                let config = Kalman2DConfig::default().with_initial_position(311.0, 5.0);
                let mut kf = Kalman2D::new(config).unwrap();
                for &(x, y) in &track {
                    kf.predict();
                    kf.update(x, y).unwrap();
                }
                black_box(kf.state())
            });
        });

        group.bench_function(format!("point_tracker_{n}_steps"), |b| {
            let u = DVec::zeros(4);
            let mut z = DVec::zeros(2);
            b.iter(|| {
                let mut tracker = PointTracker::new(PointTrackerConfig::default()).unwrap();
                tracker.set_initial_state(311.0, 5.0, 0.0, 0.0);
                for &(x, y) in &track {
                    tracker.set_time_step(1.0).unwrap();
                    z[0] = x;
                    z[1] = y;
                    black_box(tracker.process(&u, &z).unwrap());
                }
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_filters);
criterion_main!(benches);
