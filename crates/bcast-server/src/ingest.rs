// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Acknowledgment report intake.

use crate::registry::{ClientRegistry, RegistryError};
use bcast_proto::AcknowledgmentReport;
use std::sync::Arc;
use tracing::{info, warn};

/// Applies receiver reports to the registry.
///
/// Knows nothing about in-flight broadcasts; reconciliation runs pick the
/// changes up on their next registry sample.
#[derive(Debug, Clone)]
pub struct ReportIngestor {
    registry: Arc<ClientRegistry>,
}

impl ReportIngestor {
    pub fn new(registry: Arc<ClientRegistry>) -> Self {
        Self { registry }
    }

    pub fn submit(&self, report: &AcknowledgmentReport) -> Result<(), RegistryError> {
        match self.registry.record_acknowledgment(
            &report.client_id,
            report.packet_id,
            report.observed_at,
        ) {
            Ok(()) => {
                info!(
                    "Received report from {} for packet {} at {}",
                    report.client_id,
                    report.packet_id,
                    report.observed_at.to_rfc3339()
                );
                Ok(())
            }
            Err(e) => {
                warn!("Rejected report for packet {}: {}", report.packet_id, e);
                Err(e)
            }
        }
    }
}
