//! Command line front-end for the Sweet Shop.
//!
//! Wraps [`sweetshop_client`] with a persistent session file, interactive
//! prompts and terminal rendering.

pub mod cli;
pub mod commands;
pub mod config;
pub mod render;

pub use cli::{Cli, Commands};
pub use commands::App;
pub use config::CliConfig;
