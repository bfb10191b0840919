// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! QueryStatus response.

use crate::client::ClientRecord;
use crate::packet::BroadcastPacket;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// A client record with its last acknowledged packet lifted out of metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientStatus {
    #[serde(flatten)]
    pub record: ClientRecord,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_packet_id: Option<String>,
}

impl From<ClientRecord> for ClientStatus {
    fn from(record: ClientRecord) -> Self {
        let last_packet_id = record.last_packet_id().map(str::to_owned);
        Self {
            record,
            last_packet_id,
        }
    }
}

/// All registered clients plus the current broadcast, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusView {
    pub clients: BTreeMap<String, ClientStatus>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_broadcast: Option<BroadcastPacket>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_packet_id: Option<Uuid>,
}

impl StatusView {
    pub fn new(
        records: impl IntoIterator<Item = ClientRecord>,
        current_broadcast: Option<BroadcastPacket>,
    ) -> Self {
        let clients = records
            .into_iter()
            .map(|r| (r.id.clone(), ClientStatus::from(r)))
            .collect();
        let last_packet_id = current_broadcast.as_ref().map(|p| p.id);
        Self {
            clients,
            current_broadcast,
            last_packet_id,
        }
    }
}
