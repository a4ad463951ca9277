//! Subcommand implementations

pub mod check;
pub mod migrate;
pub mod seed;
pub mod serve;
