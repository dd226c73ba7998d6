//! Error types for the movesync protocol layer.

mod engine;
mod host;

pub use engine::*;
pub use host::*;
