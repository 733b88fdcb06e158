//! Neon Core - Foundational types for the Neon Lines runner
//!
//! This crate provides the core types that all other Neon crates depend on:
//! - `EntityId` - Stable handles for pooled and scripted entities
//! - `Vec2`, `Rect` - Planar spatial types
//! - `Color` - RGBA color used by shared color variables
//! - Error types and Result alias

mod error;
mod id;
mod types;

pub use error::{NeonError, Result};
pub use id::EntityId;
pub use types::{Color, Rect, Vec2};
