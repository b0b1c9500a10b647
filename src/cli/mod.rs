//! # CLI Module
//!
//! Command-line interface:
//! - init: write a default configuration file
//! - serve: boot the runtime and enter the serving loop

mod args;
mod commands;
mod errors;

pub use args::{Cli, Command};
pub use commands::{init, load_config, run, serve};
pub use errors::{CliError, CliResult};
