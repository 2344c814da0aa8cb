// ABOUTME: Server binary for the Amara Spa booking API
// ABOUTME: Loads configuration, initializes logging and the database, and serves HTTP
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Amara Wellness

//! # Amara Spa API Server Binary
//!
//! Starts the booking API with user authentication, the service catalog,
//! appointment scheduling, and payment capture.

use amara_spa_server::{
    auth::{generate_jwt_secret, AuthManager},
    config::environment::ServerConfig,
    database::Database,
    gateway::PayPalGateway,
    logging,
    notifications::LoggingNotifier,
    resources::ServerResources,
    server::BookingServer,
};
use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "amara-spa-server")]
#[command(about = "Amara Spa - booking and payments API for spa and salon services")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,

    /// Override database URL
    #[arg(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration from environment
    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }
    if let Some(database_url) = args.database_url {
        config.database.url = database_url;
    }

    // Initialize production logging
    logging::init_from_env()?;

    info!("Starting Amara Spa API server");
    info!("{}", config.summary());

    // JWT secret from the environment, or a fresh one per process. A
    // generated secret invalidates outstanding tokens on restart.
    let jwt_secret = match &config.auth.jwt_secret {
        Some(secret) => secret.clone().into_bytes(),
        None => {
            warn!("JWT_SECRET not set; generating an ephemeral secret");
            generate_jwt_secret().to_vec()
        }
    };

    let database = Arc::new(Database::new(&config.database.url).await?);
    info!("Database initialized: {}", config.database.url);

    let auth_manager = Arc::new(AuthManager::new(jwt_secret, config.auth.token_expiry_hours));
    let gateway = Arc::new(PayPalGateway::new(config.gateway.clone()));
    let notifier = Arc::new(LoggingNotifier);
    let config = Arc::new(config);

    let resources = Arc::new(ServerResources::new(
        database,
        auth_manager,
        gateway,
        notifier,
        config,
    ));

    let server = BookingServer::new(resources);
    server.run().await?;

    info!("Server stopped");
    Ok(())
}
