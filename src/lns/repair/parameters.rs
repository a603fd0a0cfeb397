use anyhow::{ensure, Result};
use derive_builder::Builder;

use crate::lns::destroy::parameters::validate_probability;
use crate::lns::repair::diversify::Diversification;
use crate::lns::repair::scoring::{Criterion, Jitter, ScoreWeights, SortDirection};
use crate::problem::ProblemVariant;

#[derive(Clone, Debug, PartialEq)]
pub enum OrderingStrategy {
    Score(ScoreWeights),
    GreedyChain(ScoreWeights),
    Shuffle,
}

#[derive(Clone, Debug, PartialEq)]
pub struct WeightedStrategy {
    pub strategy: OrderingStrategy,
    pub weight: u32,
}

impl WeightedStrategy {
    pub fn new(strategy: OrderingStrategy, weight: u32) -> Self {
        Self { strategy, weight }
    }
}

#[derive(Builder, Clone, Debug, PartialEq)]
#[builder(default)]
pub struct InsertionOrderParameters {
    pub strategies: Vec<WeightedStrategy>,
    pub direction: SortDirection,
    pub jitter: Jitter,
    pub diversification: Diversification,
}

impl Default for InsertionOrderParameters {
    fn default() -> Self {
        Self::default_for_variant(ProblemVariant::Cvrp)
    }
}

impl InsertionOrderParameters {
    /// Random, demand, far and close orders for every variant, plus prize
    /// orders for prize-collecting and window orders for time-windowed
    /// instances.
    pub fn default_for_variant(variant: ProblemVariant) -> Self {
        use OrderingStrategy::*;
        let score = |criterion, weight| Score(ScoreWeights::single(criterion, weight));
        let mut strategies = vec![
            WeightedStrategy::new(Shuffle, 4),
            WeightedStrategy::new(score(Criterion::Demand, 1.0), 4),
            WeightedStrategy::new(score(Criterion::DepotDistance, 1.0), 2),
            WeightedStrategy::new(score(Criterion::DepotDistance, -1.0), 1),
        ];
        match variant {
            ProblemVariant::Cvrp => {}
            ProblemVariant::Pcvrp => {
                strategies.push(WeightedStrategy::new(score(Criterion::Prize, 1.0), 2));
                strategies.push(WeightedStrategy::new(score(Criterion::PrizePerDemand, 1.0), 2));
            }
            ProblemVariant::Vrptw => {
                strategies.push(WeightedStrategy::new(
                    score(Criterion::TimeWindowTightness, 1.0),
                    2,
                ));
                strategies.push(WeightedStrategy::new(score(Criterion::TimeWindowStart, -1.0), 2));
                strategies.push(WeightedStrategy::new(score(Criterion::Urgency, 1.0), 2));
            }
        }
        Self {
            strategies,
            direction: SortDirection::Descending,
            jitter: Jitter::None,
            diversification: Diversification::disabled(),
        }
    }

    /// A single deterministic score order.
    pub fn by_score(weights: ScoreWeights) -> Self {
        Self {
            strategies: vec![WeightedStrategy::new(OrderingStrategy::Score(weights), 1)],
            direction: SortDirection::Descending,
            jitter: Jitter::None,
            diversification: Diversification::disabled(),
        }
    }

    pub fn total_weight(&self) -> u32 {
        self.strategies.iter().map(|it| it.weight).sum()
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.total_weight() > 0,
            "at least one ordering strategy needs a positive weight"
        );
        for ws in &self.strategies {
            if let OrderingStrategy::Score(w) | OrderingStrategy::GreedyChain(w) = &ws.strategy {
                ensure!(
                    w.weights.values().all(|v| v.is_finite()),
                    "criterion weights must be finite"
                );
            }
        }
        match self.jitter {
            Jitter::None => {}
            Jitter::Uniform(m) | Jitter::Relative(m) => ensure!(
                m.is_finite() && m >= 0.0,
                "jitter magnitude must be finite and non-negative, got {}",
                m
            ),
        }
        let d = &self.diversification;
        validate_probability("reverse probability", d.reverse_probability)?;
        validate_probability("shuffle probability", d.shuffle_probability)?;
        validate_probability("swap probability", d.swap_probability)?;
        Ok(())
    }
}
