//! CLI surface: argument parsing and command dispatch

pub mod args;
pub mod commands;

pub use args::{Cli, Commands};
