//! Command-line driver for signature decoration
//!
//! Renders overlays for annotations stored as JSON and replays signing
//! scenarios against the in-memory host.

pub mod commands;
pub mod config;

pub use config::AppConfig;
