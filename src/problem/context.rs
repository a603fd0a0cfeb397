use std::fmt::{Debug, Formatter};
use std::ops::RangeInclusive;

use anyhow::{ensure, Context, Result};
use clap::ValueEnum;
use enum_map::{Enum, EnumMap};

use crate::problem::neighbors::NeighborGraph;
use crate::problem::travel_matrix::{FixSizedTravelMatrix, TravelMatrix};
use crate::problem::{CustomerId, Demand, DEPOT};

/// Guard against degenerate (constant) attributes when normalizing.
const MIN_ATTRIBUTE_SPAN: f64 = 1e-6;
const TIGHTNESS_EPSILON: f64 = 1e-3;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProblemVariant {
    Cvrp,
    Pcvrp,
    Vrptw,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeWindow {
    pub start: f64,
    pub width: f64,
    pub service_time: f64,
}

impl TimeWindow {
    pub fn end(&self) -> f64 {
        self.start + self.width
    }
}

/// Per-customer attributes the scoring model can read.
///
/// Derived attributes are computed from raw values and get their own range,
/// so normalizing them never mixes the scales of their inputs.
#[derive(Enum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Attribute {
    Demand,
    Prize,
    DepotDistance,
    TimeWindowStart,
    TimeWindowWidth,
    TimeWindowEnd,
    ServiceTime,
    /// `1 / (width + eps)`
    TimeWindowTightness,
    /// Window end minus service time minus depot distance.
    LatestDeparture,
    /// `prize / (1 + demand)`
    PrizePerDemand,
}

/// Minimum and maximum of an attribute over all customers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AttributeRange {
    pub min: f64,
    pub max: f64,
}

impl Default for AttributeRange {
    fn default() -> Self {
        Self { min: 0.0, max: 0.0 }
    }
}

impl AttributeRange {
    /// Min-max normalization to `[0, 1]`; constant attributes use a unit span.
    pub fn normalize(&self, value: f64) -> f64 {
        let span = self.max - self.min;
        let span = if span < MIN_ATTRIBUTE_SPAN { 1.0 } else { span };
        (value - self.min) / span
    }
}

/// Read-only problem data shared by both operators and across trajectories.
pub struct ProblemContext {
    pub name: String,
    customer_count: usize,
    demands: Vec<Demand>,
    prizes: Option<Vec<f64>>,
    time_windows: Option<Vec<TimeWindow>>,
    travel_matrix: FixSizedTravelMatrix,
    neighbors: NeighborGraph,
    ranges: EnumMap<Attribute, AttributeRange>,
}

impl Debug for ProblemContext {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "problem context {} ({:?}):", self.name, self.variant())
            .and(writeln!(f, "{} customers", self.customer_count))
            .and(write!(f, "attribute ranges: {:?}", self.ranges))
    }
}

impl ProblemContext {
    pub fn customer_count(&self) -> usize {
        self.customer_count
    }
    #[inline(always)]
    pub fn is_customer(&self, id: usize) -> bool {
        id != DEPOT && id <= self.customer_count
    }
    pub fn iter_customers(&self) -> RangeInclusive<CustomerId> {
        1..=self.customer_count
    }
    pub fn variant(&self) -> ProblemVariant {
        if self.time_windows.is_some() {
            ProblemVariant::Vrptw
        } else if self.prizes.is_some() {
            ProblemVariant::Pcvrp
        } else {
            ProblemVariant::Cvrp
        }
    }
    pub fn demand(&self, id: usize) -> Demand {
        self.demands[id]
    }
    pub fn prize(&self, id: usize) -> Option<f64> {
        self.prizes.as_ref().map(|it| it[id])
    }
    pub fn time_window(&self, id: usize) -> Option<&TimeWindow> {
        self.time_windows.as_ref().map(|it| &it[id])
    }
    #[inline(always)]
    pub fn distance(&self, from: usize, to: usize) -> f64 {
        self.travel_matrix.distance(from, to)
    }
    pub fn depot_distance(&self, id: usize) -> f64 {
        self.distance(DEPOT, id)
    }
    pub fn max_distance(&self) -> f64 {
        self.travel_matrix.max_distance()
    }
    #[inline(always)]
    pub fn neighbors(&self, id: usize) -> &[usize] {
        self.neighbors.neighbors(id)
    }
    pub fn attribute_range(&self, attribute: Attribute) -> &AttributeRange {
        &self.ranges[attribute]
    }

    /// Raw attribute value of a customer, `None` if the variant lacks it.
    pub fn attribute(&self, attribute: Attribute, id: usize) -> Option<f64> {
        match attribute {
            Attribute::Demand => Some(self.demand(id) as f64),
            Attribute::Prize => self.prize(id),
            Attribute::DepotDistance => Some(self.depot_distance(id)),
            Attribute::TimeWindowStart => self.time_window(id).map(|tw| tw.start),
            Attribute::TimeWindowWidth => self.time_window(id).map(|tw| tw.width),
            Attribute::TimeWindowEnd => self.time_window(id).map(|tw| tw.end()),
            Attribute::ServiceTime => self.time_window(id).map(|tw| tw.service_time),
            Attribute::TimeWindowTightness => self
                .time_window(id)
                .map(|tw| 1.0 / (tw.width + TIGHTNESS_EPSILON)),
            Attribute::LatestDeparture => self
                .time_window(id)
                .map(|tw| tw.end() - tw.service_time - self.depot_distance(id)),
            Attribute::PrizePerDemand => self
                .prize(id)
                .map(|prize| prize / (1.0 + self.demand(id) as f64)),
        }
    }

    fn compute_ranges(&mut self) {
        let mut ranges: EnumMap<Attribute, AttributeRange> = EnumMap::default();
        for (attribute, range) in ranges.iter_mut() {
            let (min, max) = self
                .iter_customers()
                .flat_map(|id| self.attribute(attribute, id))
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                    (lo.min(v), hi.max(v))
                });
            if min <= max {
                *range = AttributeRange { min, max };
            }
        }
        self.ranges = ranges;
    }
}

/// Assembles and validates a [`ProblemContext`].
///
/// Attribute vectors are indexed by node id, so they hold `customer_count + 1`
/// entries with the depot at index 0.
pub struct ProblemContextBuilder {
    name: String,
    demands: Vec<Demand>,
    prizes: Option<Vec<f64>>,
    time_windows: Option<Vec<TimeWindow>>,
    travel_matrix: Option<FixSizedTravelMatrix>,
    neighbor_lists: Option<Vec<Vec<usize>>>,
    num_neighbors: usize,
    include_depot_in_neighbors: bool,
}

impl ProblemContextBuilder {
    pub fn with_demands(demands: Vec<Demand>) -> Self {
        Self {
            name: String::from("unnamed"),
            demands,
            prizes: None,
            time_windows: None,
            travel_matrix: None,
            neighbor_lists: None,
            num_neighbors: 32,
            include_depot_in_neighbors: false,
        }
    }
    pub fn name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = name.into();
        self
    }
    pub fn prizes(&mut self, prizes: Vec<f64>) -> &mut Self {
        self.prizes = Some(prizes);
        self
    }
    pub fn time_windows(&mut self, time_windows: Vec<TimeWindow>) -> &mut Self {
        self.time_windows = Some(time_windows);
        self
    }
    pub fn travel_matrix(&mut self, travel_matrix: FixSizedTravelMatrix) -> &mut Self {
        self.travel_matrix = Some(travel_matrix);
        self
    }
    pub fn euclidean_coordinates(&mut self, coords: &[(f64, f64)]) -> &mut Self {
        self.travel_matrix(FixSizedTravelMatrix::with_euclidean_distances(coords))
    }
    /// Length of the precomputed neighbor lists.
    pub fn num_neighbors(&mut self, num_neighbors: usize) -> &mut Self {
        self.num_neighbors = num_neighbors;
        self
    }
    pub fn include_depot_in_neighbors(&mut self, include: bool) -> &mut Self {
        self.include_depot_in_neighbors = include;
        self
    }
    /// Uses the given adjacency instead of computing it from the matrix.
    pub fn neighbor_lists(&mut self, lists: Vec<Vec<usize>>) -> &mut Self {
        self.neighbor_lists = Some(lists);
        self
    }

    pub fn build(self) -> Result<ProblemContext> {
        let num_nodes = self.demands.len();
        ensure!(num_nodes >= 1, "demands must at least contain the depot entry");
        let customer_count = num_nodes - 1;

        let travel_matrix = self
            .travel_matrix
            .context("a travel matrix or coordinates are required")?;
        ensure!(
            travel_matrix.num_nodes() == num_nodes,
            "travel matrix covers {} nodes, expected {}",
            travel_matrix.num_nodes(),
            num_nodes
        );
        travel_matrix
            .validate()
            .context("invalid travel matrix")?;

        if let Some(prizes) = &self.prizes {
            ensure!(
                prizes.len() == num_nodes,
                "{} prizes given, expected {}",
                prizes.len(),
                num_nodes
            );
            ensure!(
                prizes.iter().all(|p| p.is_finite() && *p >= 0.0),
                "prizes must be finite and non-negative"
            );
        }
        if let Some(time_windows) = &self.time_windows {
            ensure!(
                time_windows.len() == num_nodes,
                "{} time windows given, expected {}",
                time_windows.len(),
                num_nodes
            );
            for (id, tw) in time_windows.iter().enumerate() {
                ensure!(
                    tw.width >= 0.0 && tw.service_time >= 0.0,
                    "time window of node {} has negative width or service time",
                    id
                );
            }
        }

        let neighbors = match self.neighbor_lists {
            Some(lists) => {
                ensure!(
                    lists.len() == num_nodes,
                    "{} neighbor lists given, expected {}",
                    lists.len(),
                    num_nodes
                );
                NeighborGraph::from_lists(lists)?
            }
            None => NeighborGraph::with_nearest(
                &travel_matrix,
                self.num_neighbors,
                self.include_depot_in_neighbors,
            ),
        };

        let mut context = ProblemContext {
            name: self.name,
            customer_count,
            demands: self.demands,
            prizes: self.prizes,
            time_windows: self.time_windows,
            travel_matrix,
            neighbors,
            ranges: EnumMap::default(),
        };
        context.compute_ranges();
        Ok(context)
    }
}
