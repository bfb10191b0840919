// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Coordinator HTTP client.

use crate::ReceiverError;
use bcast_proto::{AcknowledgmentReport, Registration};
use std::thread::JoinHandle;
use tracing::{info, warn};
use uuid::Uuid;

/// Registers this receiver and reports received packets.
#[derive(Debug, Clone)]
pub struct Reporter {
    http: reqwest::blocking::Client,
    server: String,
    client_id: String,
}

impl Reporter {
    pub fn new(server: impl Into<String>, client_id: impl Into<String>) -> Self {
        Self {
            http: reqwest::blocking::Client::new(),
            server: server.into().trim_end_matches('/').to_string(),
            client_id: client_id.into(),
        }
    }

    fn post<T: serde::Serialize>(&self, path: &str, body: &T) -> Result<(), ReceiverError> {
        let url = format!("{}{}", self.server, path);
        let resp = self.http.post(&url).json(body).send()?;
        if !resp.status().is_success() {
            return Err(ReceiverError::Rejected(resp.status()));
        }
        Ok(())
    }

    /// POST /register with this receiver's id and advertised address.
    pub fn register(&self, ip: &str) -> Result<(), ReceiverError> {
        self.post("/register", &Registration::new(self.client_id.as_str(), ip))?;
        info!("Registered with server as {}", self.client_id);
        Ok(())
    }

    /// POST /report for `packet_id`, stamped with the current time.
    pub fn report(&self, packet_id: Uuid) -> Result<(), ReceiverError> {
        let report = AcknowledgmentReport::now(self.client_id.as_str(), packet_id);
        self.post("/report", &report)?;
        info!("Reported packet {} to server", packet_id);
        Ok(())
    }

    /// Report on a separate thread so the listener keeps draining the socket.
    ///
    /// Failures are logged and not retried.
    pub fn spawn_report(&self, packet_id: Uuid) -> JoinHandle<()> {
        let reporter = self.clone();
        std::thread::spawn(move || {
            if let Err(e) = reporter.report(packet_id) {
                warn!("Failed to report packet {}: {}", packet_id, e);
            }
        })
    }
}
