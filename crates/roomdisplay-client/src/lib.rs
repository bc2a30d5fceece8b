//! CLI, configuration, status rendering and the polling display loop
//!
//! This crate provides the `roomdisplay` command-line interface.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;

pub use cli::Cli;
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
