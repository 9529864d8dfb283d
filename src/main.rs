mod api;
mod cli;
mod config;
mod error;
mod gumloop;
mod jobs;
mod pipeline;
mod sanitizer;
mod ui;
mod validator;
mod verifier;

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use cli::{Cli, Command};
use config::TheoremicaConfig;
use gumloop::GumloopClient;
use jobs::JobScheduler;
use pipeline::ConversionPipeline;
use verifier::LeanVerifier;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = TheoremicaConfig::load(cli.config.as_deref())?;

    match cli.command {
        Command::Serve { addr, workers } => {
            if let Some(addr) = addr {
                config.server.addr = addr;
            }
            if let Some(workers) = workers {
                config.scheduler.workers = workers;
            }
            config.validate()?;
            serve(config).await
        }
        Command::Convert { input } => {
            let proof = cli::read_input(&input)?;
            let pipeline = build_pipeline(&config)?;

            let progress = ui::ConversionProgress::start("Converting proof to Lean...");
            let outcome = pipeline.convert(&proof).await;
            progress.complete(&outcome);

            if outcome?.valid {
                Ok(())
            } else {
                bail!("generated code did not pass verification")
            }
        }
        Command::Check { input } => {
            let proof = cli::read_input(&input)?;
            let outcome = validator::validate(&proof);
            ui::print_check(&outcome);
            outcome.map_err(Into::into)
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn build_pipeline(
    config: &TheoremicaConfig,
) -> Result<ConversionPipeline<GumloopClient, LeanVerifier>> {
    let transformer =
        GumloopClient::new(config.gumloop.clone()).context("failed to build Gumloop client")?;
    let verifier = LeanVerifier::new(config.verifier.clone());
    Ok(ConversionPipeline::new(transformer, verifier))
}

async fn serve(config: TheoremicaConfig) -> Result<()> {
    let pipeline = build_pipeline(&config)?;
    let scheduler = Arc::new(JobScheduler::start(pipeline, &config.scheduler));
    let app = api::router(Arc::clone(&scheduler));

    let listener = tokio::net::TcpListener::bind(&config.server.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.server.addr))?;
    info!(addr = %config.server.addr, "theoremica server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("draining job queue");
    scheduler.shutdown().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
