// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Client registry shared by request handlers and reconciliation runs.
//!
//! All access goes through a single reader/writer lock: registrations and
//! acknowledgments take it exclusively, snapshots take it shared and copy
//! the records out so nothing escapes the lock by reference.

use bcast_proto::{ClientRecord, Registration, LAST_PACKET_ID_KEY};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::{BTreeSet, HashMap};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

/// Registry errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Client not registered: {0}")]
    NotRegistered(String),
}

/// Concurrent store of registered receivers, keyed by client id.
#[derive(Debug, Default)]
pub struct ClientRegistry {
    clients: RwLock<HashMap<String, ClientRecord>>,
}

impl ClientRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or fully replace the record for `registration.id`.
    ///
    /// The stored record is marked connected with `last_seen` set to now,
    /// whatever was there before. Returns a copy of what was stored.
    pub fn register(&self, registration: Registration) -> ClientRecord {
        let record = registration.into_record(Utc::now());
        let mut clients = self.clients.write();
        let replaced = clients.insert(record.id.clone(), record.clone()).is_some();
        debug!(client = %record.id, replaced, "client record stored");
        record
    }

    /// Apply an acknowledgment to an existing record.
    ///
    /// Only `last_seen` and the `last_packet_id` metadata entry change.
    pub fn record_acknowledgment(
        &self,
        client_id: &str,
        packet_id: Uuid,
        observed_at: DateTime<Utc>,
    ) -> Result<(), RegistryError> {
        let mut clients = self.clients.write();
        let record = clients
            .get_mut(client_id)
            .ok_or_else(|| RegistryError::NotRegistered(client_id.to_string()))?;
        record.last_seen = observed_at;
        record
            .metadata
            .insert(LAST_PACKET_ID_KEY.to_string(), packet_id.to_string());
        Ok(())
    }

    /// Copy of every record, taken under a single read lock.
    pub fn snapshot(&self) -> RegistrySnapshot {
        let clients = self.clients.read();
        RegistrySnapshot {
            records: clients.clone(),
        }
    }

    /// Copy of one record.
    pub fn get(&self, client_id: &str) -> Option<ClientRecord> {
        self.clients.read().get(client_id).cloned()
    }

    /// Number of registered clients.
    pub fn len(&self) -> usize {
        self.clients.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.read().is_empty()
    }
}

/// Point-in-time copy of the registry.
#[derive(Debug, Clone, Default)]
pub struct RegistrySnapshot {
    records: HashMap<String, ClientRecord>,
}

impl RegistrySnapshot {
    pub fn get(&self, client_id: &str) -> Option<&ClientRecord> {
        self.records.get(client_id)
    }

    /// Ids of clients flagged connected.
    pub fn connected_ids(&self) -> BTreeSet<String> {
        self.records
            .values()
            .filter(|r| r.connected)
            .map(|r| r.id.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_records(self) -> impl Iterator<Item = ClientRecord> {
        self.records.into_values()
    }
}
