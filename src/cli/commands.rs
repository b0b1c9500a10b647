//! # CLI Commands
//!
//! `init` writes a default configuration file; `serve` loads it, applies
//! environment overrides once, builds the runtime and runs the server until
//! interrupted. All boot logic lives here, not in `main.rs`.

use std::fs;
use std::path::Path;

use crate::http_server::{HttpServer, ServerConfig};

use super::args::{Cli, Command};
use super::errors::{CliError, CliResult};

/// Parses arguments and dispatches to the chosen command.
pub fn run() -> CliResult<()> {
    match Cli::parse_args().command {
        Command::Init { config } => init(&config),
        Command::Serve { config } => serve(&config),
    }
}

/// Writes a default configuration file, refusing to clobber an existing one.
pub fn init(path: &Path) -> CliResult<()> {
    if path.exists() {
        return Err(CliError::Config(format!(
            "{} already exists",
            path.display()
        )));
    }
    let config = ServerConfig::default();
    let body =
        serde_json::to_string_pretty(&config).map_err(|e| CliError::Config(e.to_string()))?;
    fs::write(path, body)?;
    println!("Wrote {}", path.display());
    Ok(())
}

/// Boots the runtime and serves until interrupted.
pub fn serve(path: &Path) -> CliResult<()> {
    let config = load_config(path)?.apply_env();
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(HttpServer::with_config(config).start())?;
    Ok(())
}

/// Reads the config file, falling back to defaults when it does not exist.
pub fn load_config(path: &Path) -> CliResult<ServerConfig> {
    if !path.exists() {
        return Ok(ServerConfig::default());
    }
    let body = fs::read_to_string(path)?;
    serde_json::from_str(&body)
        .map_err(|e| CliError::Config(format!("{}: {}", path.display(), e)))
}
