use std::ops::RangeInclusive;

use clap::Parser;

use crate::lns::destroy::{FrontierPolicy, FrontierRetention, RelatednessRemovalParameters, RemovalCount};
use crate::lns::repair::{InsertionOrderParameters, SortDirection};
use crate::problem::generator::{GeneratorSettings, Layout};
use crate::problem::ProblemVariant;

#[derive(Parser, Debug)]
#[command(version)]
pub struct ProgramArguments {
    #[arg(long, help = "rng seed")]
    pub seed: Option<i128>,

    #[command(flatten)]
    pub instance: InstanceArguments,

    #[command(flatten)]
    pub harness: HarnessArguments,

    #[arg(long, help = "toml file with operator parameters")]
    pub config: Option<String>,

    #[command(flatten)]
    pub overrides: OperatorOverrides,

    #[arg(long, help = "file to store the json summary")]
    pub summary_file: Option<String>,

    #[arg(long, help = "print summary to stdout", default_value = "false")]
    pub print_summary_to_stdout: bool,
}

#[derive(clap::Args, Clone, Debug)]
pub struct InstanceArguments {
    #[arg(long, default_value = "200")]
    pub customers: usize,
    #[arg(long, value_enum, default_value = "uniform")]
    pub layout: Layout,
    #[arg(long, default_value = "4")]
    pub clusters: usize,
    #[arg(long, value_enum, default_value = "cvrp")]
    pub variant: ProblemVariant,
    #[arg(long, help = "length of the nearest neighbor lists", default_value = "32")]
    pub neighbors: usize,
    #[arg(long, default_value = "false")]
    pub include_depot_in_neighbors: bool,
}

#[derive(clap::Args, Clone, Debug)]
pub struct HarnessArguments {
    #[arg(long, default_value = "1000")]
    pub iterations: usize,
    #[arg(long, help = "independent search trajectories", default_value = "1")]
    pub trajectories: usize,
    #[arg(long, help = "vehicle capacity of the initial tours", default_value = "50")]
    pub capacity: u32,
    #[arg(
        long,
        help = "probability of leaving a customer unvisited in the initial tours",
        default_value = "0.0"
    )]
    pub skip_probability: f64,
}

#[derive(clap::Args, Clone, Debug)]
pub struct OperatorOverrides {
    #[arg(long, value_delimiter = ' ', num_args = 2..=2)]
    pub removal_range: Option<Vec<usize>>,
    #[arg(long, value_enum)]
    pub frontier: Option<FrontierPolicy>,
    #[arg(long, value_enum)]
    pub retention: Option<FrontierRetention>,
    #[arg(long, value_enum)]
    pub direction: Option<SortDirection>,
}

impl InstanceArguments {
    pub fn generator_settings(&self) -> GeneratorSettings {
        GeneratorSettings {
            customers: self.customers,
            layout: self.layout,
            clusters: self.clusters,
            variant: self.variant,
            num_neighbors: self.neighbors,
            include_depot_in_neighbors: self.include_depot_in_neighbors,
            ..GeneratorSettings::default()
        }
    }
}

impl OperatorOverrides {
    pub(crate) fn removal_range(&self) -> Option<RangeInclusive<usize>> {
        self.removal_range
            .as_ref()
            .map(|r| r[0].min(r[1])..=r[1].max(r[0]))
    }

    /// Command-line values win over the configuration file.
    pub fn apply(
        &self,
        destroy: &mut RelatednessRemovalParameters,
        repair: &mut InsertionOrderParameters,
    ) {
        if let Some(range) = self.removal_range() {
            destroy.removal_count = RemovalCount::Absolute(range);
        }
        if let Some(frontier) = self.frontier {
            destroy.frontier_policy = frontier;
        }
        if let Some(retention) = self.retention {
            destroy.frontier_retention = retention;
        }
        if let Some(direction) = self.direction {
            repair.direction = direction;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        ProgramArguments::command().debug_assert()
    }

    #[test]
    fn overrides_replace_configured_values() {
        let args = ProgramArguments::parse_from([
            "relatedness-lns",
            "--removal-range",
            "30",
            "5",
            "--frontier",
            "fifo",
            "--direction",
            "ascending",
            "--variant",
            "vrptw",
            "--layout",
            "clustered",
        ]);
        let mut destroy = RelatednessRemovalParameters::default();
        let mut repair = InsertionOrderParameters::default();
        args.overrides.apply(&mut destroy, &mut repair);
        assert_eq!(RemovalCount::Absolute(5..=30), destroy.removal_count);
        assert_eq!(FrontierPolicy::Fifo, destroy.frontier_policy);
        assert_eq!(FrontierRetention::UntilExhausted, destroy.frontier_retention);
        assert_eq!(SortDirection::Ascending, repair.direction);

        let settings = args.instance.generator_settings();
        assert_eq!(ProblemVariant::Vrptw, settings.variant);
        assert_eq!(Layout::Clustered, settings.layout);
        assert_eq!(200, settings.customers);
    }
}
