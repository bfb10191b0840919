// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! bcast receiver
//!
//! Registers with a coordinator, then acknowledges every broadcast packet it
//! hears.
//!
//! # Usage
//!
//! ```bash
//! # Coordinator on localhost, random client id
//! bcast-receiver
//!
//! # Fixed id, listen on a specific adapter
//! bcast-receiver --server http://10.0.0.1:8080 --id rack-3 --broadcast-iface eth1
//! ```

mod listener;
mod net;
mod reporter;

use clap::Parser;
use listener::BroadcastListener;
use reporter::Reporter;
use thiserror::Error;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Receiver errors.
#[derive(Debug, Error)]
pub enum ReceiverError {
    #[error("Failed to get broadcast interface IP for {0}: {1}")]
    Interface(String, String),

    #[error("Request to server failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server rejected request: {0}")]
    Rejected(reqwest::StatusCode),

    #[error("Socket error: {0}")]
    Socket(#[from] std::io::Error),
}

/// Broadcast delivery confirmation receiver
#[derive(Parser, Debug)]
#[command(name = "bcast-receiver")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Coordinator URL
    #[arg(short, long, default_value = "http://localhost:8080")]
    server: String,

    /// Broadcast port
    #[arg(long, default_value = "9999")]
    broadcast_port: u16,

    /// Network interface for broadcast traffic
    #[arg(long = "broadcast-iface")]
    broadcast_interface: Option<String>,

    /// Client ID (random when omitted)
    #[arg(long)]
    id: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() {
    let args = Args::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    if let Err(e) = run(args) {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), ReceiverError> {
    let client_id = args
        .id
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let reporter = Reporter::new(args.server, client_id);
    reporter.register(&net::local_ip())?;

    let bind_ip = match args.broadcast_interface.as_deref() {
        Some(name) => {
            let ip = net::interface_ip(name)?;
            info!("Using broadcast interface {} with IP {}", name, ip);
            Some(ip)
        }
        None => None,
    };

    let mut listener = BroadcastListener::bind(args.broadcast_port, bind_ip)?;
    info!("Listening for broadcasts on {}", listener.local_addr()?);

    loop {
        match listener.recv() {
            Ok(Some((packet, from))) => {
                info!(
                    "Received broadcast packet {} from {} ({} bytes payload)",
                    packet.id,
                    from,
                    packet.payload.len()
                );
                reporter.spawn_report(packet.id);
            }
            Ok(None) => {}
            Err(e) => error!("Error reading UDP: {}", e),
        }
    }
}
