//! Route handlers organized by resource

pub mod health;
pub mod recommendations;
pub mod sections;
pub mod stats;
