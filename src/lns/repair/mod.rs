use log::trace;
use rand::seq::SliceRandom;
use rand::Rng;

pub use diversify::Diversification;
pub use parameters::{
    InsertionOrderParameters, InsertionOrderParametersBuilder, OrderingStrategy, WeightedStrategy,
};
pub use scoring::{Criterion, Jitter, ScoreWeights, SortDirection};

use crate::problem::{CustomerId, ProblemContext};
use crate::utils::Random;

mod diversify;
mod greedy_chain;
pub mod parameters;
mod scoring;

/// Decides in which order removed customers are handed to the reinsertion
/// procedure. Never reads a solution.
pub struct InsertionOrder {
    params: InsertionOrderParameters,
}

impl InsertionOrder {
    pub fn new(params: InsertionOrderParameters) -> Self {
        Self { params }
    }

    pub fn parameters(&self) -> &InsertionOrderParameters {
        &self.params
    }

    pub fn order(
        &self,
        customers: &[CustomerId],
        context: &ProblemContext,
        rng: &mut Random,
    ) -> Vec<CustomerId> {
        if customers.len() < 2 {
            return customers.to_vec();
        }
        let strategy = match self.pick_strategy(rng) {
            Some(strategy) => strategy,
            None => return customers.to_vec(),
        };
        let direction = self.params.direction;

        let mut order = match strategy {
            OrderingStrategy::Shuffle => {
                let mut order = customers.to_vec();
                order.shuffle(rng);
                order
            }
            OrderingStrategy::Score(weights) => {
                let mut keys =
                    scoring::score_keys(customers, weights, self.params.jitter, context, rng);
                keys.sort_by(|a, b| scoring::compare_keys(a, b, direction));
                keys.into_iter().map(|key| key.customer).collect()
            }
            OrderingStrategy::GreedyChain(weights) => {
                let keys =
                    scoring::score_keys(customers, weights, self.params.jitter, context, rng);
                greedy_chain::greedy_chain(&keys, direction, context)
            }
        };
        self.params.diversification.apply(&mut order, rng);

        trace!("insertion order ({}): {:?}", strategy_name(strategy), order);
        order
    }

    /// Draws a strategy proportional to its weight.
    fn pick_strategy(&self, rng: &mut Random) -> Option<&OrderingStrategy> {
        let strategies = &self.params.strategies;
        match strategies.len() {
            0 => None,
            1 => Some(&strategies[0].strategy),
            _ => {
                let total = self.params.total_weight();
                if total == 0 {
                    return None;
                }
                let w = rng.gen_range(0..total);
                strategies
                    .iter()
                    .scan(0, |acc, it| {
                        *acc += it.weight;
                        Some((*acc, &it.strategy))
                    })
                    .find(|(accumulated, _)| *accumulated > w)
                    .map(|(_, strategy)| strategy)
            }
        }
    }
}

fn strategy_name(strategy: &OrderingStrategy) -> &'static str {
    match strategy {
        OrderingStrategy::Score(_) => "score",
        OrderingStrategy::GreedyChain(_) => "greedy chain",
        OrderingStrategy::Shuffle => "shuffle",
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use proptest::prelude::*;
    use rand::Rng;

    use crate::problem::generator::{generate_instance, GeneratorSettings};
    use crate::problem::{ProblemContextBuilder, ProblemVariant, TimeWindow};
    use crate::utils::{assert_vec_eq, create_seeded_rng};

    use super::*;

    fn vrptw_context(seed: i128) -> ProblemContext {
        let settings = GeneratorSettings {
            customers: 30,
            variant: ProblemVariant::Vrptw,
            ..GeneratorSettings::default()
        };
        generate_instance(&settings, &mut create_seeded_rng(seed)).unwrap()
    }

    #[test]
    fn tightest_window_first() -> Result<()> {
        let widths = [(7, 5.0), (3, 50.0), (9, 1.0)];
        let mut windows = vec![
            TimeWindow {
                start: 0.0,
                width: 100.0,
                service_time: 0.0,
            };
            10
        ];
        for (c, width) in widths {
            windows[c].width = width;
        }
        let coords: Vec<(f64, f64)> = (0..10).map(|i| (i as f64, 0.0)).collect();
        let mut builder = ProblemContextBuilder::with_demands(vec![1; 10]);
        builder.euclidean_coordinates(&coords).time_windows(windows);
        let context = builder.build()?;

        let op = InsertionOrder::new(InsertionOrderParameters::by_score(ScoreWeights::single(
            Criterion::TimeWindowTightness,
            1.0,
        )));
        for seed in 0..10 {
            let mut rng = create_seeded_rng(seed);
            assert_eq!(vec![9, 7, 3], op.order(&[7, 3, 9], &context, &mut rng));
        }
        Ok(())
    }

    #[test]
    fn default_pcvrp_ratio_order_follows_raw_prize_per_demand() -> Result<()> {
        let mut builder = ProblemContextBuilder::with_demands(vec![0, 1, 100]);
        builder
            .euclidean_coordinates(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)])
            .prizes(vec![0.0, 10.0, 20.0]);
        let context = builder.build()?;
        let op = InsertionOrder::new(InsertionOrderParameters::by_score(ScoreWeights::single(
            Criterion::PrizePerDemand,
            1.0,
        )));
        let mut rng = create_seeded_rng(0);
        assert_eq!(vec![1, 2], op.order(&[2, 1], &context, &mut rng));
        Ok(())
    }

    #[test]
    fn earliest_latest_departure_is_most_urgent() -> Result<()> {
        let windows = [1000.0, 1000.0, 100.0]
            .into_iter()
            .map(|width| TimeWindow {
                start: 0.0,
                width,
                service_time: 0.0,
            })
            .collect();
        let mut builder = ProblemContextBuilder::with_demands(vec![0, 1, 1]);
        builder
            .euclidean_coordinates(&[(0.0, 0.0), (90.0, 0.0), (10.0, 0.0)])
            .time_windows(windows);
        let context = builder.build()?;
        let op = InsertionOrder::new(InsertionOrderParameters::by_score(ScoreWeights::single(
            Criterion::Urgency,
            1.0,
        )));
        let mut rng = create_seeded_rng(0);
        assert_eq!(vec![2, 1], op.order(&[1, 2], &context, &mut rng));
        Ok(())
    }

    #[test]
    fn empty_and_singleton_are_returned_unchanged() {
        let context = vrptw_context(1);
        let op = InsertionOrder::new(InsertionOrderParameters::default_for_variant(
            ProblemVariant::Vrptw,
        ));
        let mut rng = create_seeded_rng(1);
        let mut untouched = create_seeded_rng(1);
        assert!(op.order(&[], &context, &mut rng).is_empty());
        assert_eq!(vec![4], op.order(&[4], &context, &mut rng));
        assert_eq!(untouched.gen::<u64>(), rng.gen::<u64>());
    }

    #[test]
    fn without_jitter_order_ignores_the_generator() {
        let context = vrptw_context(2);
        let weights = ScoreWeights::single(Criterion::Urgency, 1.0).with(Criterion::Demand, 0.2);
        let customers: Vec<usize> = (1..=30).rev().collect();
        for op in [
            InsertionOrder::new(InsertionOrderParameters::by_score(weights.clone())),
            InsertionOrder::new(InsertionOrderParameters {
                strategies: vec![WeightedStrategy::new(
                    OrderingStrategy::GreedyChain(weights.clone()),
                    1,
                )],
                ..InsertionOrderParameters::by_score(weights.clone())
            }),
        ] {
            let expected = op.order(&customers, &context, &mut create_seeded_rng(0));
            for seed in 1..10 {
                assert_eq!(
                    expected,
                    op.order(&customers, &context, &mut create_seeded_rng(seed))
                );
            }
        }
    }

    #[test]
    fn equal_scores_keep_ascending_ids() -> Result<()> {
        let context = vrptw_context(3);
        let op = InsertionOrder::new(InsertionOrderParameters::by_score(ScoreWeights::single(
            Criterion::Prize,
            1.0,
        )));
        let mut rng = create_seeded_rng(0);
        assert_vec_eq(&vec![2, 5, 8, 11], &op.order(&[8, 2, 11, 5], &context, &mut rng));
        Ok(())
    }

    #[test]
    fn same_seed_same_order_with_jitter() -> Result<()> {
        let context = vrptw_context(4);
        let params = InsertionOrderParametersBuilder::default()
            .strategies(
                InsertionOrderParameters::default_for_variant(ProblemVariant::Vrptw).strategies,
            )
            .jitter(Jitter::Relative(0.3))
            .diversification(Diversification {
                reverse_probability: 0.2,
                shuffle_probability: 0.1,
                max_adjacent_swaps: 2,
                swap_probability: 0.5,
            })
            .build()?;
        let op = InsertionOrder::new(params);
        let customers: Vec<usize> = (1..=30).collect();
        for seed in 0..20 {
            assert_eq!(
                op.order(&customers, &context, &mut create_seeded_rng(seed)),
                op.order(&customers, &context, &mut create_seeded_rng(seed))
            );
        }
        Ok(())
    }

    #[test]
    fn strategies_are_drawn_by_weight() {
        let context = vrptw_context(5);
        let weights = ScoreWeights::single(Criterion::DepotDistance, 1.0);
        let op = InsertionOrder::new(InsertionOrderParameters {
            strategies: vec![
                WeightedStrategy::new(OrderingStrategy::Shuffle, 0),
                WeightedStrategy::new(OrderingStrategy::Score(weights.clone()), 3),
            ],
            ..InsertionOrderParameters::by_score(weights)
        });
        let customers: Vec<usize> = (1..=30).collect();
        let expected = op.order(&customers, &context, &mut create_seeded_rng(0));
        let mut rng = create_seeded_rng(8);
        for _ in 0..20 {
            assert_eq!(expected, op.order(&customers, &context, &mut rng));
        }
    }

    proptest! {
        #[test]
        fn order_is_a_permutation(
            ids in proptest::sample::subsequence((1usize..=30).collect::<Vec<_>>(), 0..30),
            seed in 0i128..1000,
        ) {
            let context = vrptw_context(6);
            let mut params = InsertionOrderParameters::default_for_variant(ProblemVariant::Vrptw);
            params.strategies.push(WeightedStrategy::new(
                OrderingStrategy::GreedyChain(ScoreWeights::single(Criterion::Urgency, 1.0)),
                3,
            ));
            params.jitter = Jitter::Uniform(0.05);
            params.diversification.swap_probability = 0.5;
            params.diversification.max_adjacent_swaps = 2;
            let op = InsertionOrder::new(params);
            let mut rng = create_seeded_rng(seed);
            let mut shuffled = ids.clone();
            shuffled.shuffle(&mut rng);
            let mut order = op.order(&shuffled, &context, &mut rng);
            prop_assert_eq!(shuffled.len(), order.len());
            order.sort();
            prop_assert_eq!(ids, order);
        }
    }
}
