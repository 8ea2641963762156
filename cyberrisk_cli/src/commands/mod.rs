//! CLI subcommand implementations.

pub mod args;
pub mod categories;
pub mod compare;
pub mod filter;
pub mod map;
pub mod predict;
pub mod rank;
pub mod regions;
