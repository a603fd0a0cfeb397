//! Operator parameters from a TOML file. Every key is optional; missing keys
//! keep the in-code defaults.
//!
//! ```toml
//! [destroy]
//! removal_count = { min = 10, max = 30 }
//! seed = "prefer_visited"
//! seed_probability = 0.8
//! acceptance = "power_biased"
//! acceptance_exponent = 2.0
//!
//! [repair]
//! jitter = "uniform"
//! jitter_magnitude = 0.1
//!
//! [[repair.strategies]]
//! kind = "score"
//! weight = 4
//! criteria = { time_window_tightness = 1.0, demand = 0.2 }
//! ```

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::de::IntoDeserializer;
use serde::Deserialize;

use crate::lns::destroy::{
    Acceptance, FrontierPolicy, FrontierRetention, RelatednessRemovalParameters, RemovalCount,
    SeedPolicy,
};
use crate::lns::repair::{
    Criterion, InsertionOrderParameters, Jitter, OrderingStrategy, ScoreWeights, SortDirection,
    WeightedStrategy,
};
use crate::problem::ProblemVariant;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OperatorConfig {
    #[serde(default)]
    pub destroy: DestroyConfig,
    #[serde(default)]
    pub repair: RepairConfig,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RemovalCountConfig {
    Absolute {
        min: usize,
        max: usize,
    },
    Relative {
        min_fraction: f64,
        max_fraction: f64,
        floor: usize,
        ceiling: usize,
    },
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedKind {
    Uniform,
    PreferVisited,
    RandomTour,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AcceptanceKind {
    Nearest,
    Uniform,
    Probabilistic,
    PowerBiased,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DestroyConfig {
    pub removal_count: Option<RemovalCountConfig>,
    pub seed: Option<SeedKind>,
    pub seed_probability: Option<f64>,
    pub frontier: Option<FrontierPolicy>,
    pub retention: Option<FrontierRetention>,
    pub acceptance: Option<AcceptanceKind>,
    pub acceptance_probability: Option<f64>,
    pub acceptance_exponent: Option<f64>,
    pub neighbor_prefix: Option<[usize; 2]>,
    pub tour_neighbor_probability: Option<f64>,
    pub random_jump_probability: Option<f64>,
    pub min_selected_for_jump: Option<usize>,
    pub max_seed_retries: Option<usize>,
    pub max_idle_expansions: Option<usize>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    Score,
    GreedyChain,
    Shuffle,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StrategyConfig {
    pub kind: StrategyKind,
    pub weight: u32,
    /// Criterion names to weights. Map keys are plain strings in TOML.
    #[serde(default)]
    pub criteria: BTreeMap<String, f64>,
    pub normalize: Option<bool>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JitterKind {
    None,
    Uniform,
    Relative,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RepairConfig {
    pub strategies: Option<Vec<StrategyConfig>>,
    pub direction: Option<SortDirection>,
    pub jitter: Option<JitterKind>,
    pub jitter_magnitude: Option<f64>,
    pub reverse_probability: Option<f64>,
    pub shuffle_probability: Option<f64>,
    pub max_adjacent_swaps: Option<usize>,
    pub swap_probability: Option<f64>,
}

impl OperatorConfig {
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut s = String::new();
        File::open(path)
            .and_then(|mut f| f.read_to_string(&mut s))
            .with_context(|| format!("cannot read config file {}", path.display()))?;
        Self::parse(&s).with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn parse(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    pub fn destroy_parameters(&self) -> Result<RelatednessRemovalParameters> {
        let cfg = &self.destroy;
        let mut params = RelatednessRemovalParameters::default();
        if let Some(count) = &cfg.removal_count {
            params.removal_count = match *count {
                RemovalCountConfig::Absolute { min, max } => RemovalCount::Absolute(min..=max),
                RemovalCountConfig::Relative {
                    min_fraction,
                    max_fraction,
                    floor,
                    ceiling,
                } => RemovalCount::Relative {
                    fraction: min_fraction..=max_fraction,
                    floor,
                    ceiling,
                },
            };
        }
        if let Some(seed) = cfg.seed {
            params.seed_policy = match seed {
                SeedKind::Uniform => SeedPolicy::Uniform,
                SeedKind::PreferVisited => SeedPolicy::PreferVisited {
                    probability: cfg.seed_probability.unwrap_or(0.8),
                },
                SeedKind::RandomTour => SeedPolicy::RandomTour,
            };
        } else if cfg.seed_probability.is_some() {
            bail!("seed_probability requires seed = \"prefer_visited\"");
        }
        if let Some(frontier) = cfg.frontier {
            params.frontier_policy = frontier;
        }
        if let Some(retention) = cfg.retention {
            params.frontier_retention = retention;
        }
        if let Some(acceptance) = cfg.acceptance {
            params.acceptance = match acceptance {
                AcceptanceKind::Nearest => Acceptance::Nearest,
                AcceptanceKind::Uniform => Acceptance::Uniform,
                AcceptanceKind::Probabilistic => Acceptance::Probabilistic {
                    probability: cfg
                        .acceptance_probability
                        .context("acceptance = \"probabilistic\" needs acceptance_probability")?,
                },
                AcceptanceKind::PowerBiased => Acceptance::PowerBiased {
                    exponent: cfg.acceptance_exponent.unwrap_or(2.0),
                },
            };
        }
        if let Some([lo, hi]) = cfg.neighbor_prefix {
            params.neighbor_prefix = lo..=hi;
        }
        if let Some(p) = cfg.tour_neighbor_probability {
            params.tour_neighbor_probability = p;
        }
        if let Some(p) = cfg.random_jump_probability {
            params.random_jump_probability = p;
        }
        if let Some(m) = cfg.min_selected_for_jump {
            params.min_selected_for_jump = m;
        }
        if cfg.max_seed_retries.is_some() {
            params.max_seed_retries = cfg.max_seed_retries;
        }
        if let Some(m) = cfg.max_idle_expansions {
            params.max_idle_expansions = m;
        }
        params.validate().context("invalid destroy configuration")?;
        Ok(params)
    }

    pub fn repair_parameters(&self, variant: ProblemVariant) -> Result<InsertionOrderParameters> {
        let cfg = &self.repair;
        let mut params = InsertionOrderParameters::default_for_variant(variant);
        if let Some(strategies) = &cfg.strategies {
            params.strategies = strategies
                .iter()
                .map(|s| -> Result<WeightedStrategy> {
                    let mut weights = ScoreWeights::default();
                    for (name, &w) in s.criteria.iter() {
                        weights.weights[parse_criterion(name)?] = w;
                    }
                    if let Some(normalize) = s.normalize {
                        weights.normalize = normalize;
                    }
                    let strategy = match s.kind {
                        StrategyKind::Score => OrderingStrategy::Score(weights),
                        StrategyKind::GreedyChain => OrderingStrategy::GreedyChain(weights),
                        StrategyKind::Shuffle => OrderingStrategy::Shuffle,
                    };
                    Ok(WeightedStrategy::new(strategy, s.weight))
                })
                .collect::<Result<Vec<_>>>()?;
        }
        if let Some(direction) = cfg.direction {
            params.direction = direction;
        }
        let magnitude = cfg.jitter_magnitude.unwrap_or(0.0);
        params.jitter = match cfg.jitter {
            None | Some(JitterKind::None) => Jitter::None,
            Some(JitterKind::Uniform) => Jitter::Uniform(magnitude),
            Some(JitterKind::Relative) => Jitter::Relative(magnitude),
        };
        let d = &mut params.diversification;
        if let Some(p) = cfg.reverse_probability {
            d.reverse_probability = p;
        }
        if let Some(p) = cfg.shuffle_probability {
            d.shuffle_probability = p;
        }
        if let Some(m) = cfg.max_adjacent_swaps {
            d.max_adjacent_swaps = m;
        }
        if let Some(p) = cfg.swap_probability {
            d.swap_probability = p;
        }
        params.validate().context("invalid repair configuration")?;
        Ok(params)
    }
}

fn parse_criterion(name: &str) -> Result<Criterion> {
    let de: serde::de::value::StrDeserializer<serde::de::value::Error> = name.into_deserializer();
    Criterion::deserialize(de).with_context(|| format!("unknown criterion {:?}", name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_keeps_defaults() -> Result<()> {
        let config = OperatorConfig::parse("")?;
        assert_eq!(
            RelatednessRemovalParameters::default(),
            config.destroy_parameters()?
        );
        assert_eq!(
            InsertionOrderParameters::default_for_variant(ProblemVariant::Pcvrp),
            config.repair_parameters(ProblemVariant::Pcvrp)?
        );
        Ok(())
    }

    #[test]
    fn destroy_section_maps_into_parameters() -> Result<()> {
        let config = OperatorConfig::parse(
            r#"
            [destroy]
            removal_count = { min_fraction = 0.1, max_fraction = 0.3, floor = 5, ceiling = 40 }
            seed = "prefer_visited"
            seed_probability = 0.8
            frontier = "fifo"
            retention = "single_visit"
            acceptance = "power_biased"
            acceptance_exponent = 3.0
            neighbor_prefix = [2, 6]
            tour_neighbor_probability = 0.25
            max_seed_retries = 0
            "#,
        )?;
        let params = config.destroy_parameters()?;
        assert_eq!(
            RemovalCount::Relative {
                fraction: 0.1..=0.3,
                floor: 5,
                ceiling: 40
            },
            params.removal_count
        );
        assert_eq!(SeedPolicy::PreferVisited { probability: 0.8 }, params.seed_policy);
        assert_eq!(FrontierPolicy::Fifo, params.frontier_policy);
        assert_eq!(FrontierRetention::SingleVisit, params.frontier_retention);
        assert_eq!(Acceptance::PowerBiased { exponent: 3.0 }, params.acceptance);
        assert_eq!(2..=6, params.neighbor_prefix);
        assert_eq!(0.25, params.tour_neighbor_probability);
        assert_eq!(Some(0), params.max_seed_retries);
        Ok(())
    }

    #[test]
    fn repair_section_maps_into_parameters() -> Result<()> {
        let config = OperatorConfig::parse(
            r#"
            [repair]
            direction = "ascending"
            jitter = "relative"
            jitter_magnitude = 0.05
            swap_probability = 0.5
            max_adjacent_swaps = 2

            [[repair.strategies]]
            kind = "greedy_chain"
            weight = 3
            normalize = false
            criteria = { urgency = 1.0, demand = -0.5 }

            [[repair.strategies]]
            kind = "shuffle"
            weight = 1
            "#,
        )?;
        let params = config.repair_parameters(ProblemVariant::Vrptw)?;
        assert_eq!(2, params.strategies.len());
        assert_eq!(4, params.total_weight());
        let expected = ScoreWeights::single(Criterion::Urgency, 1.0)
            .with(Criterion::Demand, -0.5)
            .raw();
        assert_eq!(
            OrderingStrategy::GreedyChain(expected),
            params.strategies[0].strategy
        );
        assert_eq!(SortDirection::Ascending, params.direction);
        assert_eq!(Jitter::Relative(0.05), params.jitter);
        assert_eq!(2, params.diversification.max_adjacent_swaps);
        Ok(())
    }

    #[test]
    fn documented_strategy_criteria_are_read() -> Result<()> {
        let config = OperatorConfig::parse(
            r#"
            [[repair.strategies]]
            kind = "score"
            weight = 4
            criteria = { time_window_tightness = 1.0, demand = 0.2, prize_per_demand = 0.5 }
            "#,
        )?;
        let params = config.repair_parameters(ProblemVariant::Pcvrp)?;
        let expected = ScoreWeights::single(Criterion::TimeWindowTightness, 1.0)
            .with(Criterion::Demand, 0.2)
            .with(Criterion::PrizePerDemand, 0.5);
        assert_eq!(
            vec![WeightedStrategy::new(OrderingStrategy::Score(expected), 4)],
            params.strategies
        );
        Ok(())
    }

    #[test]
    fn unknown_criterion_is_rejected() -> Result<()> {
        let config = OperatorConfig::parse(
            r#"
            [[repair.strategies]]
            kind = "score"
            weight = 1
            criteria = { lateness = 1.0 }
            "#,
        )?;
        let err = config
            .repair_parameters(ProblemVariant::Vrptw)
            .expect_err("lateness is not a criterion");
        assert!(format!("{:#}", err).contains("lateness"));
        Ok(())
    }

    #[test]
    fn invalid_probabilities_are_rejected() -> Result<()> {
        let config = OperatorConfig::parse("[destroy]\nrandom_jump_probability = 1.5\n")?;
        assert!(config.destroy_parameters().is_err());
        let config = OperatorConfig::parse("[repair]\nreverse_probability = -0.1\n")?;
        assert!(config.repair_parameters(ProblemVariant::Cvrp).is_err());
        let config = OperatorConfig::parse(
            "[destroy]\nacceptance = \"probabilistic\"\nacceptance_probability = 2.0\n",
        )?;
        assert!(config.destroy_parameters().is_err());
        Ok(())
    }

    #[test]
    fn malformed_config_is_rejected() {
        assert!(OperatorConfig::parse("[destroy]\nunknown_key = 1\n").is_err());
        assert!(OperatorConfig::parse("[destroy]\nseed = \"everywhere\"\n").is_err());
        assert!(OperatorConfig::parse("[destroy]\nremoval_count = { min = 5 }\n").is_err());
        let config = OperatorConfig::parse("[destroy]\nremoval_count = { min = 5, max = 2 }\n");
        assert!(config.map(|c| c.destroy_parameters().is_err()).unwrap_or(false));
    }

    #[test]
    fn missing_file_is_reported() {
        assert!(OperatorConfig::read("/nonexistent/operators.toml").is_err());
    }
}
