// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Registered receivers.

use crate::error::{check_id, Validate, ValidationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Metadata key holding the id of the most recently acknowledged packet.
pub const LAST_PACKET_ID_KEY: &str = "last_packet_id";

/// A registered receiver as tracked by the coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientRecord {
    /// Caller-supplied identifier (last write wins).
    pub id: String,

    /// Reported address, informational only.
    #[serde(rename = "ip", alias = "address", default)]
    pub address: String,

    /// Most recent contact (registration or acknowledgment).
    pub last_seen: DateTime<Utc>,

    /// Set on registration, never cleared.
    #[serde(default)]
    pub connected: bool,

    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, String>,
}

impl ClientRecord {
    /// Id of the last packet this client acknowledged, if any.
    pub fn last_packet_id(&self) -> Option<&str> {
        self.metadata.get(LAST_PACKET_ID_KEY).map(String::as_str)
    }
}

/// Register request body sent by a receiver.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Registration {
    pub id: String,

    #[serde(rename = "ip", alias = "address", default)]
    pub address: String,

    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, String>,
}

impl Registration {
    pub fn new(id: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            address: address.into(),
            metadata: HashMap::new(),
        }
    }

    /// Build the stored record, marking it connected as of `now`.
    ///
    /// `last_packet_id` is only ever written by acknowledgment reports, so a
    /// registration carrying it has the entry dropped.
    pub fn into_record(mut self, now: DateTime<Utc>) -> ClientRecord {
        self.metadata.remove(LAST_PACKET_ID_KEY);
        ClientRecord {
            id: self.id,
            address: self.address,
            last_seen: now,
            connected: true,
            metadata: self.metadata,
        }
    }
}

impl Validate for Registration {
    fn validate(&self) -> Result<(), ValidationError> {
        check_id("id", &self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registration_accepts_full_client_body() {
        // Receivers may post a whole client object with zero-valued fields.
        let body = br#"{"id":"rx-1","ip":"192.168.1.20","last_seen":"0001-01-01T00:00:00Z","connected":false}"#;
        let reg: Registration = crate::decode(body).unwrap();
        assert_eq!(reg.id, "rx-1");
        assert_eq!(reg.address, "192.168.1.20");
    }

    #[test]
    fn test_into_record_marks_connected() {
        let now = Utc::now();
        let record = Registration::new("rx-1", "10.0.0.1").into_record(now);
        assert!(record.connected);
        assert_eq!(record.last_seen, now);
        assert_eq!(record.last_packet_id(), None);
    }

    #[test]
    fn test_registration_cannot_set_last_packet_id() {
        let body = br#"{"id":"rx-1","ip":"10.0.0.1","metadata":{"last_packet_id":"abc","rack":"3"}}"#;
        let reg: Registration = crate::decode(body).unwrap();
        let record = reg.into_record(Utc::now());
        assert_eq!(record.last_packet_id(), None);
        assert_eq!(record.metadata.get("rack").map(String::as_str), Some("3"));
    }

    #[test]
    fn test_record_omits_empty_metadata() {
        let record = Registration::new("rx-1", "10.0.0.1").into_record(Utc::now());
        let value = serde_json::to_value(&record).unwrap();
        assert!(value.get("metadata").is_none());
        assert_eq!(value["ip"], "10.0.0.1");
    }
}
