use std::ops::RangeInclusive;

use anyhow::{ensure, Result};
use clap::ValueEnum;
use derive_builder::Builder;
use serde::Deserialize;

use crate::utils::{Random, RandomDecisions};

/// Reseed draws per customer when no explicit bound is configured.
pub const DEFAULT_SEED_RETRY_FACTOR: usize = 2;

/// How many customers a single destroy call aims for.
#[derive(Clone, Debug, PartialEq)]
pub enum RemovalCount {
    Absolute(RangeInclusive<usize>),
    /// Fraction of the customer count, clamped to `floor..=ceiling`.
    Relative {
        fraction: RangeInclusive<f64>,
        floor: usize,
        ceiling: usize,
    },
}

impl RemovalCount {
    /// Draws a target size clamped to `1..=customer_count` (0 without customers).
    pub fn draw(&self, customer_count: usize, rng: &mut Random) -> usize {
        if customer_count == 0 {
            return 0;
        }
        let k = match self {
            RemovalCount::Absolute(range) => rng.random_int(*range.start(), *range.end()),
            RemovalCount::Relative {
                fraction,
                floor,
                ceiling,
            } => {
                let f = rng.random_fraction(*fraction.start(), *fraction.end());
                ((f * customer_count as f64).round() as usize).clamp(*floor, (*ceiling).max(*floor))
            }
        };
        k.clamp(1, customer_count)
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            RemovalCount::Absolute(range) => ensure!(
                range.start() <= range.end(),
                "removal count range {:?} is empty",
                range
            ),
            RemovalCount::Relative {
                fraction,
                floor,
                ceiling,
            } => {
                ensure!(
                    0.0 <= *fraction.start()
                        && fraction.start() <= fraction.end()
                        && *fraction.end() <= 1.0,
                    "removal fraction {:?} must be a non-empty range within [0, 1]",
                    fraction
                );
                ensure!(
                    floor <= ceiling,
                    "removal floor {} exceeds ceiling {}",
                    floor,
                    ceiling
                );
            }
        }
        Ok(())
    }
}

/// Where the first customer of a removal set comes from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SeedPolicy {
    Uniform,
    /// Picks a customer currently visited by a tour with the given probability.
    PreferVisited { probability: f64 },
    /// Picks a random non-empty tour, then a random customer in it.
    RandomTour,
}

#[derive(ValueEnum, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FrontierPolicy {
    Random,
    Fifo,
}

#[derive(ValueEnum, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FrontierRetention {
    /// Keep a customer in the frontier until its neighbor prefix runs dry.
    UntilExhausted,
    /// Drop a customer after one expansion attempt.
    SingleVisit,
}

/// Which of the unselected neighbor candidates join the removal set.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Acceptance {
    Nearest,
    Uniform,
    Probabilistic { probability: f64 },
    /// One candidate at index `floor(u^exponent * len)`.
    PowerBiased { exponent: f64 },
}

#[derive(Builder, Clone, Debug, PartialEq)]
#[builder(default)]
pub struct RelatednessRemovalParameters {
    pub removal_count: RemovalCount,
    pub seed_policy: SeedPolicy,
    pub frontier_policy: FrontierPolicy,
    pub frontier_retention: FrontierRetention,
    pub acceptance: Acceptance,
    /// Number of entries of a neighbor list inspected per expansion.
    pub neighbor_prefix: RangeInclusive<usize>,
    pub tour_neighbor_probability: f64,
    pub random_jump_probability: f64,
    pub min_selected_for_jump: usize,
    /// `None` allows `DEFAULT_SEED_RETRY_FACTOR * customer_count` draws.
    pub max_seed_retries: Option<usize>,
    pub max_idle_expansions: usize,
}

impl Default for RelatednessRemovalParameters {
    fn default() -> Self {
        Self {
            removal_count: RemovalCount::Absolute(10..=30),
            seed_policy: SeedPolicy::Uniform,
            frontier_policy: FrontierPolicy::Random,
            frontier_retention: FrontierRetention::UntilExhausted,
            acceptance: Acceptance::Nearest,
            neighbor_prefix: 3..=10,
            tour_neighbor_probability: 0.0,
            random_jump_probability: 0.0,
            min_selected_for_jump: 3,
            max_seed_retries: None,
            max_idle_expansions: 32,
        }
    }
}

pub(crate) fn validate_probability(name: &str, p: f64) -> Result<()> {
    ensure!(
        (0.0..=1.0).contains(&p),
        "{} must be a probability in [0, 1], got {}",
        name,
        p
    );
    Ok(())
}

impl RelatednessRemovalParameters {
    pub fn validate(&self) -> Result<()> {
        self.removal_count.validate()?;
        if let SeedPolicy::PreferVisited { probability } = self.seed_policy {
            validate_probability("seed probability", probability)?;
        }
        match self.acceptance {
            Acceptance::Probabilistic { probability } => {
                validate_probability("acceptance probability", probability)?
            }
            Acceptance::PowerBiased { exponent } => ensure!(
                exponent.is_finite() && exponent > 0.0,
                "acceptance exponent must be positive, got {}",
                exponent
            ),
            Acceptance::Nearest | Acceptance::Uniform => {}
        }
        ensure!(
            self.neighbor_prefix.start() <= self.neighbor_prefix.end(),
            "neighbor prefix range {:?} is empty",
            self.neighbor_prefix
        );
        validate_probability("tour neighbor probability", self.tour_neighbor_probability)?;
        validate_probability("random jump probability", self.random_jump_probability)?;
        Ok(())
    }

    pub(crate) fn seed_retries(&self, customer_count: usize) -> usize {
        self.max_seed_retries
            .unwrap_or(DEFAULT_SEED_RETRY_FACTOR * customer_count)
    }
}
