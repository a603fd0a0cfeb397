pub mod context;
pub mod generator;
pub mod neighbors;
pub mod travel_matrix;

pub use context::{ProblemContext, ProblemContextBuilder, ProblemVariant, TimeWindow};

pub type CustomerId = usize;
pub type Demand = u32;

/// Node id of the depot; customers are `1..=customer_count`.
pub const DEPOT: usize = 0;

pub struct Arc {
    pub from: usize,
    pub to: usize,
    pub distance: f64,
}
