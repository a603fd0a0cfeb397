//! Runs both operators repeatedly over synthetic instances and collects
//! statistics about what they produce. Removed customers are never
//! reinserted, so every iteration of a trajectory sees the same solution.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, info, warn};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::Serialize;
use took::Timer;

use crate::lns::destroy::RelatednessRemoval;
use crate::lns::repair::InsertionOrder;
use crate::problem::ProblemContext;
use crate::solution::construction::NearestNeighborTours;
use crate::utils::logging::{format_ids, format_log_method_stats_timed, format_log_removal};
use crate::utils::stats::RemovalStats;
use crate::utils::{trajectory_rngs, DefaultTracker, IterationTracker, Random};

/// Settings of the initial tours each trajectory destroys.
#[derive(Clone, Copy, Debug)]
pub struct TourSettings {
    pub capacity: u32,
    pub skip_probability: f64,
}

pub struct Harness<'a> {
    context: &'a ProblemContext,
    removal: RelatednessRemoval,
    ordering: InsertionOrder,
    tours: TourSettings,
    iterations: usize,
}

#[derive(Serialize, Debug)]
pub struct HarnessSummary {
    pub instance: String,
    pub variant: String,
    pub customers: usize,
    pub seed: String,
    pub iterations_per_trajectory: usize,
    pub took_ms: u64,
    pub total: RemovalStats,
    pub trajectories: Vec<RemovalStats>,
}

impl HarnessSummary {
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("cannot create summary file {}", path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)?;
        Ok(())
    }

    /// `iterations,mean size,mean spread,degraded,seconds`
    pub fn csv_line(&self) -> String {
        format!(
            "{},{:.3},{:.4},{},{:.3}",
            self.total.iterations,
            self.total.mean_size(),
            self.total.mean_spread_ratio(),
            self.total.degraded,
            self.took_ms as f64 / 1000.0
        )
    }
}

impl<'a> Harness<'a> {
    pub fn new(
        context: &'a ProblemContext,
        removal: RelatednessRemoval,
        ordering: InsertionOrder,
        tours: TourSettings,
        iterations: usize,
    ) -> Self {
        Self {
            context,
            removal,
            ordering,
            tours,
            iterations,
        }
    }

    pub fn run(&self, seed: i128, trajectories: usize) -> Result<HarnessSummary> {
        let timer = Timer::new();
        let rngs = trajectory_rngs(seed, trajectories);
        info!(
            "running {} trajectories with {} iterations each",
            trajectories, self.iterations
        );

        #[cfg(feature = "parallel")]
        let stats = rngs
            .into_par_iter()
            .enumerate()
            .map(|(id, rng)| self.run_trajectory(id, rng))
            .collect::<Result<Vec<_>>>()?;
        #[cfg(not(feature = "parallel"))]
        let stats = rngs
            .into_iter()
            .enumerate()
            .map(|(id, rng)| self.run_trajectory(id, rng))
            .collect::<Result<Vec<_>>>()?;

        let mut total = RemovalStats::new();
        for it in stats.iter() {
            total.merge(it);
        }
        let took = timer.took();
        let took_ms = took.as_std().as_millis() as u64;
        info!("{}", format_log_method_stats_timed("harness", &total, took));

        Ok(HarnessSummary {
            instance: self.context.name.clone(),
            variant: format!("{:?}", self.context.variant()),
            customers: self.context.customer_count(),
            seed: seed.to_string(),
            iterations_per_trajectory: self.iterations,
            took_ms,
            total,
            trajectories: stats,
        })
    }

    pub fn run_trajectory(&self, id: usize, mut rng: Random) -> Result<RemovalStats> {
        let timer = Timer::new();
        let solution = NearestNeighborTours::new(
            self.context,
            self.tours.capacity,
            self.tours.skip_probability,
        )
        .construct(&mut rng)
        .with_context(|| format!("initial tours of trajectory {}", id))?;

        let mut stats = RemovalStats::new();
        let mut tracker = DefaultTracker::new(self.iterations as u64);
        for iteration in 0..self.iterations {
            let removed = self.removal.select(self.context, &solution, &mut rng);
            if removed.is_degraded() {
                warn!(
                    "trajectory {} iteration {}: removal set {}",
                    id,
                    iteration,
                    format_log_removal(&removed)
                );
            }
            stats.record_removal(&removed, self.context);

            let order = self.ordering.order(removed.as_slice(), self.context, &mut rng);
            stats.record_ordering();
            debug!(
                "trajectory {} iteration {}: removed {}, insertion order {}",
                id,
                iteration,
                format_log_removal(&removed),
                format_ids(&order)
            );

            tracker.update(&stats);
            tracker.inc();
        }
        info!(
            "{}",
            format_log_method_stats_timed(&format!("trajectory {}", id), &stats, timer.took())
        );
        Ok(stats)
    }
}
