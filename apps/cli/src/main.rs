//! chunkdrop entry point.

mod cli;
mod config;
mod render;

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use chunkdrop_transfer::FileDescriptor;
use chunkdrop_uploader::Uploader;

use cli::Cli;
use config::ClientConfig;
use render::{FileLabel, Renderer};

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,chunkdrop=debug")),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting chunkdrop");

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            tracing::error!(error = %e, "upload aborted");
            eprintln!("chunkdrop: {e:#}");
            ExitCode::from(2)
        }
    }
}

/// Uploads every file on the command line. Returns `false` if any file was
/// rejected or failed.
fn run(cli: Cli) -> anyhow::Result<bool> {
    let loaded = match &cli.config {
        Some(path) => ClientConfig::load_from(path),
        None => ClientConfig::load(),
    };
    let mut config = match loaded {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!(error = %e, "failed to load config, using defaults");
            ClientConfig::default()
        }
    };
    cli.apply(&mut config);
    tracing::info!(server = %config.server_url, concurrency = config.concurrency, "configuration loaded");

    let files = cli
        .files
        .iter()
        .map(|path| {
            FileDescriptor::from_path(path).with_context(|| format!("cannot read {}", path.display()))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;
    let labels = files
        .iter()
        .map(|f| FileLabel {
            name: f.name().to_string(),
            size: f.size(),
        })
        .collect();

    let uploader = Uploader::http(&config.server_url, config.uploader_config())?;

    let rt = tokio::runtime::Runtime::new().context("failed to start tokio runtime")?;
    rt.block_on(async move {
        let mut handle = uploader.submit_batch(files);
        let mut events = handle
            .take_events()
            .context("event stream already taken")?;

        let cancel = handle.cancel_token();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("interrupted, cancelling uploads");
                cancel.cancel();
            }
        });

        let mut renderer = Renderer::new(std::io::stdout(), labels);
        while let Some(event) = events.recv().await {
            renderer.handle(&event)?;
        }

        let outcome = handle.wait().await;
        renderer.summary(&outcome)?;
        Ok(outcome.is_complete() && outcome.rejected.is_empty())
    })
}
