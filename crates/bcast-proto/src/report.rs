// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Acknowledgment reports submitted by receivers.

use crate::error::{check_id, Validate, ValidationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A receiver's claim of having received a packet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcknowledgmentReport {
    pub client_id: String,
    pub packet_id: Uuid,

    /// Receiver-local observation time.
    #[serde(rename = "timestamp", alias = "observed_at")]
    pub observed_at: DateTime<Utc>,
}

impl AcknowledgmentReport {
    /// Report for `packet_id` observed now.
    pub fn now(client_id: impl Into<String>, packet_id: Uuid) -> Self {
        Self {
            client_id: client_id.into(),
            packet_id,
            observed_at: Utc::now(),
        }
    }
}

impl Validate for AcknowledgmentReport {
    fn validate(&self) -> Result<(), ValidationError> {
        check_id("client_id", &self.client_id)
    }
}
