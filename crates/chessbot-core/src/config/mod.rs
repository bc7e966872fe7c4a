//! Configuration module for the chessbot controller
//!
//! Settings come from an optional YAML file, then environment overrides,
//! then command-line flags applied by the binary.

pub mod types;
pub mod loader;

pub use types::*;
pub use loader::*;
