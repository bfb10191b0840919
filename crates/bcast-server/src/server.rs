// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! HTTP server lifecycle.

use crate::config::{ConfigError, ServerConfig};
use crate::iface::{InterfaceResolver, ResolveError};
use crate::routes::build_router;
use crate::service::BroadcastService;
use std::future::Future;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::info;

/// Server error types.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to get HTTP interface IP: {0}")]
    Interface(#[from] ResolveError),

    #[error("Bind error: {0}")]
    Bind(std::io::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Address the HTTP API listens on.
///
/// A configured HTTP interface wins over `bind_address`.
pub fn listen_address(
    config: &ServerConfig,
    resolver: &dyn InterfaceResolver,
) -> Result<SocketAddr, ServerError> {
    let ip = match config.http_interface.as_deref() {
        Some(name) => {
            let ip = resolver.resolve(name)?;
            info!("Using HTTP interface {} with IP {}", name, ip);
            IpAddr::V4(ip)
        }
        None => config.bind_address,
    };
    Ok(SocketAddr::new(ip, config.port))
}

/// Bind the HTTP listener.
pub async fn bind(addr: SocketAddr) -> Result<TcpListener, ServerError> {
    TcpListener::bind(addr).await.map_err(ServerError::Bind)
}

/// Serve the API on `listener` until `shutdown` resolves.
///
/// An in-flight broadcast request is allowed to finish its window.
pub async fn serve(
    listener: TcpListener,
    service: Arc<BroadcastService>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), ServerError> {
    let addr = listener.local_addr()?;
    info!("Starting HTTP server on {}", addr);

    let app = build_router(service);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("HTTP server stopped");
    Ok(())
}
