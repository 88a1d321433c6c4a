//! domsift - compact, identifier-stable digests of DOM snapshots.
//!
//! Main entry point for the domsift CLI.

mod cli;
mod cmd_digest;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use tracing::{debug, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use domsift_config::{Config, ConfigLoader, ConfigValidator, LoggingConfig};

use cli::{Cli, Commands};
use cmd_digest::DigestArgs;

/// Load the configuration. A missing file is only tolerated at the default
/// location.
fn load_config(explicit: Option<&Path>) -> anyhow::Result<(Config, PathBuf)> {
    match explicit {
        Some(path) => {
            let config = ConfigLoader::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?;
            Ok((config, path.to_path_buf()))
        }
        None => {
            let path = ConfigLoader::default_path();
            let config = ConfigLoader::load_or_default(&path)
                .with_context(|| format!("Failed to load config {}", path.display()))?;
            Ok((config, path))
        }
    }
}

fn init_tracing(logging: &LoggingConfig) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    // Optional file layer (daily rotation, text without colors)
    let file_layer = match &logging.dir {
        Some(dir) => {
            let log_dir = PathBuf::from(ConfigLoader::expand_path(&dir.to_string_lossy()));
            std::fs::create_dir_all(&log_dir)
                .with_context(|| format!("Failed to create log dir {}", log_dir.display()))?;

            let file_appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix("domsift")
                .filename_suffix("log")
                .max_log_files(14)
                .build(&log_dir)?;

            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
                std::sync::OnceLock::new();
            let _ = GUARD.set(guard);

            Some(fmt::layer().with_writer(non_blocking).with_ansi(false))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        // Console layer on stderr; stdout carries the digest.
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true),
        )
        .with(file_layer)
        .init();

    Ok(())
}

/// Print every validation error and warning. Fails when there are errors.
fn handle_validate(config: &Config, path: &Path) -> anyhow::Result<()> {
    let result = ConfigValidator::validate(config);
    for warning in &result.warnings {
        println!("warning: {}: {}", warning.path, warning.message);
    }
    for error in &result.errors {
        println!("error: {}: {}", error.path, error.message);
    }
    if !result.is_valid() {
        anyhow::bail!(
            "{} has {} configuration error(s)",
            path.display(),
            result.errors.len()
        );
    }
    println!("{}: OK", path.display());
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let (config, config_path) = load_config(cli.config.as_deref())?;
    init_tracing(&config.logging)?;
    debug!(config = %config_path.display(), "configuration loaded");

    match cli.command {
        Commands::Validate => handle_validate(&config, &config_path),
        Commands::Digest {
            snapshot,
            words,
            write_back,
            in_place,
            text_limit,
        } => {
            let warnings = ConfigValidator::validate(&config).into_result()?;
            for warning in warnings {
                warn!(field = %warning.path, "{}", warning.message);
            }

            let args = DigestArgs {
                snapshot,
                words,
                write_back,
                in_place,
                text_limit,
            };
            let text = cmd_digest::run(&config, &args)?;
            if !text.is_empty() {
                println!("{}", text);
            }
            Ok(())
        }
    }
}
