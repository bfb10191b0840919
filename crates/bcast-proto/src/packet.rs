// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Broadcast packet and the request that triggers one.

use crate::error::{Validate, ValidationError};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Payload sent when the trigger request does not carry one.
pub const DEFAULT_PAYLOAD: &[u8] = b"broadcast test";

/// Receive buffer size used by listeners; larger datagrams are truncated.
pub const MAX_DATAGRAM_SIZE: usize = 2048;

/// One emission over the broadcast transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastPacket {
    /// Unique packet identifier, generated at emission time.
    pub id: Uuid,

    /// Emission time.
    #[serde(rename = "timestamp", alias = "sent_at")]
    pub sent_at: DateTime<Utc>,

    /// Opaque payload (base64 on the wire).
    #[serde(rename = "data", alias = "payload", with = "base64_bytes", default)]
    pub payload: Vec<u8>,
}

impl BroadcastPacket {
    /// Stamp a fresh packet with a new id and the current time.
    pub fn new(payload: Vec<u8>) -> Self {
        Self {
            id: Uuid::new_v4(),
            sent_at: Utc::now(),
            payload,
        }
    }

    /// Serialize into a single datagram.
    pub fn to_datagram(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Parse a received datagram.
    pub fn from_datagram(buf: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(buf)
    }
}

/// Body of a TriggerBroadcast request. Both fields are optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BroadcastRequest {
    /// Base64-encoded payload. Defaults to [`DEFAULT_PAYLOAD`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<String>,

    /// Network interface to send from, overriding the configured one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interface: Option<String>,
}

impl BroadcastRequest {
    /// Decoded payload bytes.
    pub fn payload_bytes(&self) -> Result<Vec<u8>, ValidationError> {
        match &self.payload {
            Some(encoded) => Ok(STANDARD.decode(encoded)?),
            None => Ok(DEFAULT_PAYLOAD.to_vec()),
        }
    }

    /// Parse a request body; an empty body means "all defaults".
    pub fn from_body(body: &[u8]) -> Result<Self, ValidationError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        crate::decode(body)
    }
}

impl Validate for BroadcastRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        if let Some(iface) = &self.interface {
            if iface.trim().is_empty() {
                return Err(ValidationError::Missing("interface"));
            }
        }
        let payload = self.payload_bytes()?;
        // The JSON envelope adds roughly a third on top of the base64 text.
        if payload.len() > MAX_DATAGRAM_SIZE / 2 {
            return Err(ValidationError::TooLong {
                field: "payload",
                max: MAX_DATAGRAM_SIZE / 2,
            });
        }
        Ok(())
    }
}

mod base64_bytes {
    use super::STANDARD;
    use base64::Engine as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&STANDARD.encode(bytes))
    }

    // Peers that send an empty payload may encode it as `null`.
    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
        match Option::<String>::deserialize(d)? {
            Some(s) => STANDARD.decode(s).map_err(serde::de::Error::custom),
            None => Ok(Vec::new()),
        }
    }
}
