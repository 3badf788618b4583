//! Command-line interface.
//!
//! Flag parsing only; the flags are folded into [`crate::config::Settings`]
//! as the highest-precedence layer.

pub mod args;

pub use args::Cli;
