//! imgcache - Image resizing and a content-addressed disk cache.
//!
//! This binary wires the CLI to the library services.

use clap::Parser;
use std::process::ExitCode;
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use imgcache::{
    cache::{DiskCache, FileCache},
    config::{CacheAction, CacheConfig, Cli, Command, DetectConfig, ResizeConfig},
    format::detect_format,
    io::LocalFs,
    resize::ResizeService,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Resize(config) => run_resize(config).await,
        Command::Detect(config) => run_detect(config).await,
        Command::Cache(config) => run_cache(config).await,
    }
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "imgcache=debug"
    } else {
        "imgcache=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

// =============================================================================
// Resize Command
// =============================================================================

async fn run_resize(config: ResizeConfig) -> ExitCode {
    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let options = match config.resize_options() {
        Ok(options) => options,
        Err(e) => {
            error!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let service = ResizeService::new(config.workers);
    let result = service
        .resize_file(
            &config.input,
            &config.output,
            config.width,
            config.height,
            options,
            &CancellationToken::new(),
        )
        .await;

    match result {
        Ok(outcome) => {
            info!(
                "Wrote {} ({}x{} {}, {} bytes)",
                config.output.display(),
                outcome.width,
                outcome.height,
                outcome.format,
                outcome.bytes_written
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Resize failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

// =============================================================================
// Detect Command
// =============================================================================

async fn run_detect(config: DetectConfig) -> ExitCode {
    let input = match tokio::fs::File::open(&config.input).await {
        Ok(file) => file,
        Err(e) => {
            error!("Failed to open {}: {}", config.input.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let format = match detect_format(input).await {
        Ok((format, _)) => format,
        Err(e) => {
            error!("{}: {}", config.input.display(), e);
            return ExitCode::FAILURE;
        }
    };

    if config.json {
        let json = serde_json::json!({
            "format": format.name(),
            "mime_type": format.mime_type(),
            "extension": format.extension(),
        });
        match serde_json::to_string_pretty(&json) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                error!("Failed to serialize result: {}", e);
                return ExitCode::FAILURE;
            }
        }
    } else {
        println!("{}", format);
    }

    ExitCode::SUCCESS
}

// =============================================================================
// Cache Command
// =============================================================================

async fn run_cache(config: CacheConfig) -> ExitCode {
    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let cache = FileCache::new(LocalFs::new(), config.root());

    match config.action {
        CacheAction::Store { key, file } => {
            let data = match tokio::fs::read(&file).await {
                Ok(data) => data,
                Err(e) => {
                    error!("Failed to read {}: {}", file.display(), e);
                    return ExitCode::FAILURE;
                }
            };
            if let Err(e) = cache.store(&key, &data).await {
                error!("Store failed: {}", e);
                return ExitCode::FAILURE;
            }
            info!("Stored {} bytes under {:?}", data.len(), key);
        }
        CacheAction::Load { key, output } => {
            let data = match cache.load(&key).await {
                Ok(Some(data)) => data,
                Ok(None) => {
                    error!("Key {:?} is not cached", key);
                    return ExitCode::FAILURE;
                }
                Err(e) => {
                    error!("Load failed: {}", e);
                    return ExitCode::FAILURE;
                }
            };
            let written = match output {
                Some(path) => tokio::fs::write(&path, &data).await,
                None => {
                    let mut stdout = tokio::io::stdout();
                    match stdout.write_all(&data).await {
                        Ok(()) => stdout.flush().await,
                        Err(e) => Err(e),
                    }
                }
            };
            if let Err(e) = written {
                error!("Failed to write output: {}", e);
                return ExitCode::FAILURE;
            }
        }
        CacheAction::Delete { key } => {
            if let Err(e) = cache.delete(&key).await {
                error!("Delete failed: {}", e);
                return ExitCode::FAILURE;
            }
            info!("Deleted {:?}", key);
        }
        CacheAction::Path { key } => {
            println!("{}", cache.path_for(&key).display());
        }
    }

    ExitCode::SUCCESS
}
