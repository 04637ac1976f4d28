//! afternil core - configuration, file discovery, suppression and the
//! check/fix pipeline around the analyzer.

pub mod config;
pub mod discover;
pub mod orchestrator;
pub mod suppress;
