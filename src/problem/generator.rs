//! Synthetic instances for the operator harness and tests.

use std::f64::consts::PI;

use anyhow::{ensure, Result};
use clap::ValueEnum;
use log::debug;

use crate::problem::{Demand, ProblemContext, ProblemContextBuilder, ProblemVariant, TimeWindow};
use crate::utils::{Random, RandomDecisions};

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Layout {
    Uniform,
    Clustered,
}

#[derive(Clone, Debug)]
pub struct GeneratorSettings {
    pub customers: usize,
    pub layout: Layout,
    /// Number of clusters for [`Layout::Clustered`].
    pub clusters: usize,
    pub variant: ProblemVariant,
    pub num_neighbors: usize,
    pub include_depot_in_neighbors: bool,
    /// Side length of the square customers are placed in.
    pub extent: f64,
    pub max_demand: Demand,
    pub horizon: f64,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            customers: 100,
            layout: Layout::Uniform,
            clusters: 4,
            variant: ProblemVariant::Cvrp,
            num_neighbors: 32,
            include_depot_in_neighbors: false,
            extent: 1000.0,
            max_demand: 10,
            horizon: 1000.0,
        }
    }
}

/// Places the depot in the center and customers according to the layout.
pub fn generate_coordinates(settings: &GeneratorSettings, rng: &mut Random) -> Vec<(f64, f64)> {
    let extent = settings.extent;
    let mut coords = Vec::with_capacity(settings.customers + 1);
    coords.push((extent / 2.0, extent / 2.0));
    match settings.layout {
        Layout::Uniform => {
            for _ in 0..settings.customers {
                coords.push((
                    rng.random_fraction(0.0, extent),
                    rng.random_fraction(0.0, extent),
                ));
            }
        }
        Layout::Clustered => {
            let clusters = settings.clusters.max(1);
            let radius = extent / (4.0 * clusters as f64);
            let centers: Vec<(f64, f64)> = (0..clusters)
                .map(|_| {
                    (
                        rng.random_fraction(radius, extent - radius),
                        rng.random_fraction(radius, extent - radius),
                    )
                })
                .collect();
            for i in 0..settings.customers {
                let (cx, cy) = centers[i % clusters];
                let angle = rng.random_fraction(0.0, 2.0 * PI);
                let r = radius * rng.fraction().sqrt();
                coords.push((cx + r * angle.cos(), cy + r * angle.sin()));
            }
        }
    }
    coords
}

pub fn generate_instance(settings: &GeneratorSettings, rng: &mut Random) -> Result<ProblemContext> {
    ensure!(settings.extent > 0.0, "extent must be positive");
    ensure!(settings.max_demand >= 1, "max demand must be at least 1");

    let coords = generate_coordinates(settings, rng);
    let n = settings.customers;

    let mut demands = Vec::with_capacity(n + 1);
    demands.push(0);
    for _ in 0..n {
        demands.push(rng.random_int(1, settings.max_demand as usize) as Demand);
    }

    let mut builder = ProblemContextBuilder::with_demands(demands);
    builder
        .name(format!("{:?}-{:?}-n{}", settings.variant, settings.layout, n).to_lowercase())
        .euclidean_coordinates(&coords)
        .num_neighbors(settings.num_neighbors)
        .include_depot_in_neighbors(settings.include_depot_in_neighbors);

    match settings.variant {
        ProblemVariant::Cvrp => {}
        ProblemVariant::Pcvrp => {
            let mut prizes = vec![0.0];
            prizes.extend((0..n).map(|_| rng.random_fraction(1.0, 100.0).round()));
            builder.prizes(prizes);
        }
        ProblemVariant::Vrptw => {
            let horizon = settings.horizon;
            let mut time_windows = vec![TimeWindow {
                start: 0.0,
                width: horizon,
                service_time: 0.0,
            }];
            time_windows.extend((0..n).map(|_| {
                let width = rng.random_fraction(horizon * 0.02, horizon * 0.25).round();
                TimeWindow {
                    start: rng.random_fraction(0.0, horizon - width).round(),
                    width,
                    service_time: 10.0,
                }
            }));
            builder.time_windows(time_windows);
        }
    }

    let context = builder.build()?;
    debug!("generated instance {:?}", context);
    Ok(context)
}
