// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! bcast coordinator
//!
//! # Usage
//!
//! ```bash
//! # Defaults: HTTP on :8080, broadcasts to 255.255.255.255:9999, 5s window
//! bcast-server
//!
//! # Send broadcasts from a specific adapter with a 2s window
//! bcast-server --broadcast-iface eth1 --timeout-ms 2000
//!
//! # Only count acknowledgments that name the current packet
//! bcast-server --ack-matching packet-id
//!
//! # Using a configuration file
//! bcast-server --config server.json
//! ```

use bcast_server::reconcile::AckMatching;
use bcast_server::{server, BroadcastService, ServerConfig, SystemResolver};
use clap::Parser;
use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Broadcast delivery confirmation coordinator
#[derive(Parser, Debug)]
#[command(name = "bcast-server")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file (JSON format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// HTTP server port
    #[arg(short, long, default_value = "8080")]
    port: u16,

    /// Bind address (0.0.0.0 for all interfaces)
    #[arg(short, long, default_value = "0.0.0.0")]
    bind: IpAddr,

    /// Network interface for HTTP traffic
    #[arg(long = "http-iface")]
    http_interface: Option<String>,

    /// Broadcast port
    #[arg(long, default_value = "9999")]
    broadcast_port: u16,

    /// Network interface for broadcast traffic
    #[arg(long = "broadcast-iface")]
    broadcast_interface: Option<String>,

    /// Acknowledgment window in milliseconds
    #[arg(long, default_value = "5000")]
    timeout_ms: u64,

    /// Acknowledgment rule (last-seen, packet-id)
    #[arg(long, default_value = "last-seen")]
    ack_matching: AckMatching,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let config = if let Some(config_path) = args.config {
        info!("Loading config from {:?}", config_path);
        ServerConfig::from_file(&config_path)?
    } else {
        let config = ServerConfig {
            bind_address: args.bind,
            port: args.port,
            http_interface: args.http_interface,
            broadcast_port: args.broadcast_port,
            broadcast_interface: args.broadcast_interface,
            timeout_ms: args.timeout_ms,
            ack_matching: args.ack_matching,
            ..Default::default()
        };
        config.validate()?;
        config
    };

    let addr = server::listen_address(&config, &SystemResolver)?;

    info!("bcast-server v{}", env!("CARGO_PKG_VERSION"));
    info!("HTTP:      {}", addr);
    info!("Broadcast: {}", config.broadcast_destination());
    info!(
        "Interface: {}",
        config.broadcast_interface.as_deref().unwrap_or("default route")
    );
    info!("Window:    {}ms ({})", config.timeout_ms, config.ack_matching);

    let service = Arc::new(BroadcastService::from_config(&config));
    let listener = server::bind(addr).await?;

    server::serve(listener, service, async {
        tokio::signal::ctrl_c().await.ok();
        info!("Shutdown signal received, stopping server...");
    })
    .await?;

    Ok(())
}
