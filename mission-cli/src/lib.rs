//! Mission Control CLI
//!
//! The `mc` client: layered configuration, logging setup, the command
//! surface and its dispatcher, and the line formats used for output.
//! Every command is a thin caller of [`mission_coord::Coordinator`].

pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;
pub mod seed;

pub use commands::{execute, Cli, Command};
pub use config::{ConfigError, MissionConfig, StoreKind};
pub use error::CliError;
