//! Subcommand implementations.

pub mod catalog;
pub mod check;
pub mod config;
pub mod helpers;
