//! # CLI Arguments
//!
//! Commands:
//! - tourbase init --config <path>
//! - tourbase serve --config <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// tourbase - A self-hostable tour booking REST backend
#[derive(Parser, Debug)]
#[command(name = "tourbase")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write a default configuration file
    Init {
        /// Path to configuration file
        #[arg(long, default_value = "./tourbase.json")]
        config: PathBuf,
    },

    /// Start the HTTP server
    Serve {
        /// Path to configuration file
        #[arg(long, default_value = "./tourbase.json")]
        config: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
