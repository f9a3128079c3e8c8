//! Command implementations for the Gantry CLI.

pub mod check;
pub mod completions;
pub mod describe;
