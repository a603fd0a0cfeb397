use std::cmp::Ordering;

use clap::ValueEnum;
use enum_map::{Enum, EnumMap};
use serde::Deserialize;

use crate::problem::context::Attribute;
use crate::problem::{CustomerId, ProblemContext};
use crate::utils::{Random, RandomDecisions};

/// Customer properties an insertion order can be derived from.
#[derive(Enum, Deserialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    /// `1 / (width + eps)`, largest for the narrowest windows.
    TimeWindowTightness,
    TimeWindowStart,
    /// Negated latest departure from the depot that still reaches the window.
    Urgency,
    Demand,
    Prize,
    /// `prize / (1 + demand)`.
    PrizePerDemand,
    DepotDistance,
    ServiceTime,
}

#[derive(ValueEnum, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    /// Highest score first.
    Descending,
    Ascending,
}

impl Default for SortDirection {
    fn default() -> Self {
        SortDirection::Descending
    }
}

/// Random perturbation added to every score before sorting.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Jitter {
    None,
    /// Adds `u * magnitude`.
    Uniform(f64),
    /// Adds `u * magnitude * |score|`.
    Relative(f64),
}

impl Jitter {
    pub fn is_none(&self) -> bool {
        match *self {
            Jitter::None => true,
            Jitter::Uniform(m) | Jitter::Relative(m) => m == 0.0,
        }
    }

    fn apply(&self, score: f64, rng: &mut Random) -> f64 {
        match *self {
            Jitter::None => score,
            Jitter::Uniform(m) => score + rng.fast_fraction() as f64 * m,
            Jitter::Relative(m) => score + rng.fast_fraction() as f64 * m * score.abs(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ScoreWeights {
    pub weights: EnumMap<Criterion, f64>,
    /// Min-max normalize attributes with the context's attribute ranges.
    pub normalize: bool,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            weights: EnumMap::default(),
            normalize: true,
        }
    }
}

impl ScoreWeights {
    pub fn single(criterion: Criterion, weight: f64) -> Self {
        Self::default().with(criterion, weight)
    }

    pub fn with(mut self, criterion: Criterion, weight: f64) -> Self {
        self.weights[criterion] = weight;
        self
    }

    pub fn raw(mut self) -> Self {
        self.normalize = false;
        self
    }

    pub fn score(&self, context: &ProblemContext, customer: CustomerId) -> f64 {
        if !context.is_customer(customer) {
            return 0.0;
        }
        self.weights
            .iter()
            .filter(|(_, w)| **w != 0.0)
            .map(|(criterion, &w)| w * self.criterion_value(context, criterion, customer))
            .sum()
    }

    /// Value of a single criterion; 0 if the context lacks the attribute.
    fn criterion_value(
        &self,
        context: &ProblemContext,
        criterion: Criterion,
        customer: CustomerId,
    ) -> f64 {
        let attr = |attribute: Attribute| {
            context.attribute(attribute, customer).map(|v| {
                if self.normalize {
                    context.attribute_range(attribute).normalize(v)
                } else {
                    v
                }
            })
        };
        let value = match criterion {
            Criterion::TimeWindowTightness => attr(Attribute::TimeWindowTightness),
            Criterion::TimeWindowStart => attr(Attribute::TimeWindowStart),
            Criterion::Urgency => attr(Attribute::LatestDeparture).map(|departure| -departure),
            Criterion::Demand => attr(Attribute::Demand),
            Criterion::Prize => attr(Attribute::Prize),
            Criterion::PrizePerDemand => attr(Attribute::PrizePerDemand),
            Criterion::DepotDistance => attr(Attribute::DepotDistance),
            Criterion::ServiceTime => attr(Attribute::ServiceTime),
        };
        value.filter(|v| v.is_finite()).unwrap_or(0.0)
    }
}

/// Score of a customer within one ordering call.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ScoreKey {
    pub score: f64,
    pub customer: CustomerId,
}

pub(crate) fn score_keys(
    customers: &[CustomerId],
    weights: &ScoreWeights,
    jitter: Jitter,
    context: &ProblemContext,
    rng: &mut Random,
) -> Vec<ScoreKey> {
    customers
        .iter()
        .map(|&customer| ScoreKey {
            score: jitter.apply(weights.score(context, customer), rng),
            customer,
        })
        .collect()
}

/// Orders keys by score in the given direction, ties by ascending id.
pub(crate) fn compare_keys(a: &ScoreKey, b: &ScoreKey, direction: SortDirection) -> Ordering {
    let by_score = match direction {
        SortDirection::Descending => b.score.total_cmp(&a.score),
        SortDirection::Ascending => a.score.total_cmp(&b.score),
    };
    by_score.then(a.customer.cmp(&b.customer))
}
