// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Broadcast delivery confirmation coordinator.
//!
//! Sends one timestamped packet over UDP broadcast to an open set of
//! registered receivers, then works out within a fixed time window which of
//! them acknowledged it.
//!
//! # Components
//!
//! - **Client registry**: concurrent store of receivers ([`ClientRegistry`])
//! - **Interface resolver**: adapter name to source address ([`iface`])
//! - **Broadcast emitter**: builds and sends one packet ([`BroadcastEmitter`])
//! - **Reconciliation loop**: classifies receivers until the deadline ([`reconcile`])
//! - **Report ingestor**: applies acknowledgments ([`ReportIngestor`])
//!
//! # HTTP API
//!
//! - `POST /register` - register a receiver
//! - `POST /report` - submit an acknowledgment
//! - `GET /status` - clients and current broadcast
//! - `POST /broadcast` - emit and wait for the delivery result
//! - `GET /health` - liveness

pub mod config;
pub mod emitter;
pub mod handlers;
pub mod iface;
pub mod ingest;
pub mod reconcile;
pub mod registry;
pub mod routes;
pub mod server;
pub mod service;

pub use config::{ConfigError, ServerConfig};
pub use emitter::{BroadcastEmitter, BroadcastTransport, EmitError, UdpBroadcastTransport};
pub use iface::{InterfaceResolver, ResolveError, SystemResolver};
pub use ingest::ReportIngestor;
pub use reconcile::{AckMatching, DeliveryTracker, ReconcileSettings};
pub use registry::{ClientRegistry, RegistryError, RegistrySnapshot};
pub use routes::build_router;
pub use server::ServerError;
pub use service::{BroadcastService, ServiceError};

/// Shared handler state.
pub type AppState = std::sync::Arc<BroadcastService>;
