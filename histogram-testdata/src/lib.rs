//! Seeded value streams for histogram tests and benches.
//!
//! Values are left on their natural scale: bin bounds are checked against the raw min/max.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, LogNormal, Normal};

/// Shapes of input stream.
#[derive(Clone, Copy, Debug)]
pub enum DistKind {
    /// Flat over \[0, 1000)
    Uniform,
    /// Standard normal
    Normal,
    /// exp(N(0, sigma²)), a long right tail
    LogNormal { sigma: f64 },
    /// `count` tight clusters 100 apart over a thin uniform background
    Clusters { count: u32 },
    /// Only the integers `0..distinct`, repeated
    Spikes { distinct: u32 },
}

/// `n` values of the chosen shape, reproducible from `seed`.
pub fn gen_dataset(kind: DistKind, n: usize, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    match kind {
        DistKind::Uniform => (0..n).map(|_| rng.random_range(0.0..1000.0)).collect(),
        DistKind::Normal => {
            let dist = Normal::new(0.0, 1.0).expect("unit normal");
            (0..n).map(|_| dist.sample(&mut rng)).collect()
        }
        DistKind::LogNormal { sigma } => {
            let dist = LogNormal::new(0.0, sigma).expect("sigma must be finite and non-negative");
            (0..n).map(|_| dist.sample(&mut rng)).collect()
        }
        DistKind::Clusters { count } => {
            let count = count.max(1);
            let span = 100.0 * count as f64;
            let jitter = Normal::new(0.0, 0.5).expect("cluster jitter");
            (0..n)
                .map(|_| {
                    if rng.random_bool(0.05) {
                        rng.random_range(-50.0..span)
                    } else {
                        let c = rng.random_range(0..count) as f64 * 100.0;
                        c + jitter.sample(&mut rng)
                    }
                })
                .collect()
        }
        DistKind::Spikes { distinct } => {
            let distinct = distinct.max(1);
            (0..n)
                .map(|_| rng.random_range(0..distinct) as f64)
                .collect()
        }
    }
}

/// Split `values` into `parts` contiguous partitions of near-equal length.
pub fn partition(values: &[f64], parts: usize) -> Vec<Vec<f64>> {
    let parts = parts.max(1);
    let chunk = values.len().div_ceil(parts).max(1);
    values.chunks(chunk).map(|c| c.to_vec()).collect()
}
