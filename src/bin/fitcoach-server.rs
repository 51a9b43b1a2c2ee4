// ABOUTME: Server binary for the FitCoach API
// ABOUTME: Loads environment configuration, opens the database, and serves HTTP until shutdown
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

//! # FitCoach API Server Binary
//!
//! Configuration comes from the environment (optionally a `.env` file); the
//! only flag is `--http-port`, which overrides `HTTP_PORT`.

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use fitcoach_server::{config::ServerConfig, logging, resources::ServerResources, server};
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "fitcoach-server")]
#[command(about = "FitCoach API - AI-assisted workout and diet coaching backend")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    logging::init_from_env()?;

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }
    config.validate()?;

    info!("Starting FitCoach API");
    info!("{}", config.summary());

    let resources = Arc::new(ServerResources::from_config(config).await?);
    info!(
        ai_coach = resources.coach.is_available(),
        "Server resources initialized"
    );

    match resources.coach.check_provider().await {
        Ok(Some(true) | None) => {}
        Ok(Some(false)) => warn!("LLM endpoint rejected the health check; coach calls may fail"),
        Err(e) => warn!(error = %e, "LLM endpoint unreachable at startup"),
    }

    if let Err(e) = server::run(resources).await {
        error!(error = %e, "Server error");
        return Err(e.into());
    }

    info!("FitCoach API stopped");
    Ok(())
}
