pub mod cli;
pub mod config;
pub mod harness;
pub mod lns;
pub mod problem;
pub mod solution;
pub mod utils;
