//! Shared types used across the duckview crates.

mod color;
mod types;

pub use color::{Color, ColorParseError};
pub use types::{NodeId, Transform};
