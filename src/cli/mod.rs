//! Command-line interface definitions and command implementations.

mod args;
pub mod cache;
pub mod process;
pub mod sanitize;

pub use args::{CacheAction, Cli, Commands};
