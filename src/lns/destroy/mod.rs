mod frontier;
pub mod parameters;
mod relatedness_removal;
mod removal_set;

pub use parameters::{
    Acceptance, FrontierPolicy, FrontierRetention, RelatednessRemovalParameters,
    RelatednessRemovalParametersBuilder, RemovalCount, SeedPolicy,
};
pub use relatedness_removal::RelatednessRemoval;
pub use removal_set::RemovalSet;
