//! Subcommand implementations. Each returns the text written to stdout.

pub mod render;
pub mod simulate;
