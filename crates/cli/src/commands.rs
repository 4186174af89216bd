//! CLI subcommand implementations.

pub mod cart;
