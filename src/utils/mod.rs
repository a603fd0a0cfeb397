#[cfg(test)]
use std::fmt::Debug;
#[cfg(feature = "progressbar")]
use std::io::Stdout;

use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

use crate::utils::stats::RemovalStats;

pub mod logging;
pub mod random;
pub mod stats;

pub use random::RandomDecisions;

pub trait Tolerance {
    fn tol() -> Self;
}

impl Tolerance for f64 {
    fn tol() -> Self {
        0.001
    }
}

pub type Random = Pcg64Mcg;

pub fn create_seeded_rng(seed: i128) -> Random {
    let mut rng = Pcg64Mcg::from_seed(seed.to_le_bytes());
    // discard the first three
    rng.next_u64();
    rng.next_u64();
    rng.next_u64();
    rng
}

/// Independent generators for `n` trajectories, all derived from one seed.
pub fn trajectory_rngs(seed: i128, n: usize) -> Vec<Random> {
    let mut master = create_seeded_rng(seed);
    (0..n)
        .map(|_| {
            let stream = ((master.next_u64() as i128) << 64) | master.next_u64() as i128;
            create_seeded_rng(stream)
        })
        .collect()
}

pub trait IterationTracker {
    fn update(&mut self, stats: &RemovalStats);
    fn inc(&mut self);
}

pub struct DisabledTracker {}

impl DisabledTracker {
    pub fn new(_total: u64) -> Self {
        Self {}
    }
}

impl IterationTracker for DisabledTracker {
    fn update(&mut self, _: &RemovalStats) {}
    fn inc(&mut self) {}
}

#[cfg(feature = "progressbar")]
pub struct PBRTracker {
    progressbar: pbr::ProgressBar<Stdout>,
}

#[cfg(feature = "progressbar")]
impl PBRTracker {
    pub fn new(total: u64) -> Self {
        Self {
            progressbar: pbr::ProgressBar::new(total),
        }
    }
}

#[cfg(feature = "progressbar")]
impl Drop for PBRTracker {
    fn drop(&mut self) {
        self.progressbar.finish_println("");
    }
}

#[cfg(feature = "progressbar")]
impl IterationTracker for PBRTracker {
    fn update(&mut self, stats: &RemovalStats) {
        self.progressbar.message(
            format!(
                "removed {:.1} avg | spread {:.3} | degraded {} | ",
                stats.mean_size(),
                stats.mean_spread_ratio(),
                stats.degraded
            )
            .as_str(),
        );
    }

    fn inc(&mut self) {
        self.progressbar.inc();
    }
}

#[cfg(feature = "progressbar")]
pub type DefaultTracker = PBRTracker;

#[cfg(not(feature = "progressbar"))]
pub type DefaultTracker = DisabledTracker;

#[cfg(test)]
pub fn assert_vec_eq<T: PartialEq + Eq + Debug>(expect: &Vec<T>, actual: &Vec<T>) {
    assert_eq!(
        expect.len(),
        actual.len(),
        "sizes of the vecs differ (expect: {}, actual: {})",
        expect.len(),
        actual.len()
    );
    for (idx, (x, y)) in expect.iter().zip(actual.iter()).enumerate() {
        assert_eq!(
            x, y,
            "vecs differ at index {} ({:?} != {:?})\n expect: {:?}\n actual: {:?}",
            idx, x, y, &expect, &actual
        );
    }
}

#[cfg(test)]
mod tests {
    use rand::Rng;

    use super::*;

    #[test]
    fn same_seed_gives_same_stream() {
        let mut a = create_seeded_rng(42);
        let mut b = create_seeded_rng(42);
        for _ in 0..100 {
            assert_eq!(a.gen::<u64>(), b.gen::<u64>());
        }
    }

    #[test]
    fn trajectory_streams_differ() {
        let mut rngs = trajectory_rngs(42, 4);
        let firsts: Vec<u64> = rngs.iter_mut().map(|it| it.gen::<u64>()).collect();
        for i in 0..firsts.len() {
            for j in (i + 1)..firsts.len() {
                assert_ne!(firsts[i], firsts[j]);
            }
        }
    }

    #[test]
    fn trajectory_streams_are_reproducible() {
        let mut a = trajectory_rngs(5, 3);
        let mut b = trajectory_rngs(5, 3);
        for (x, y) in a.iter_mut().zip(b.iter_mut()) {
            assert_eq!(x.gen::<u64>(), y.gen::<u64>());
        }
    }
}
