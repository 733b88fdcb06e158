//! CLI command implementations

pub mod config;
pub mod scores;
pub mod simulate;
pub mod submit;
pub mod volume;
