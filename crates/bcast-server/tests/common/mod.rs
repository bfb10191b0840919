// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Shared fixtures for integration tests.

#![allow(dead_code)]

use bcast_proto::{BroadcastPacket, BroadcastRequest, DeliveryResult};
use bcast_server::{
    AckMatching, BroadcastEmitter, BroadcastService, BroadcastTransport, InterfaceResolver,
    ReconcileSettings, ResolveError, ServiceError,
};
use parking_lot::Mutex;
use std::collections::{BTreeSet, HashMap};
use std::io;
use std::net::{Ipv4Addr, SocketAddrV4};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

pub const ETH0: Ipv4Addr = Ipv4Addr::new(192, 168, 1, 10);

/// Knows only `eth0`.
pub struct StaticResolver(HashMap<String, Ipv4Addr>);

impl Default for StaticResolver {
    fn default() -> Self {
        Self([("eth0".to_string(), ETH0)].into_iter().collect())
    }
}

impl InterfaceResolver for StaticResolver {
    fn resolve(&self, name: &str) -> Result<Ipv4Addr, ResolveError> {
        self.0
            .get(name)
            .copied()
            .ok_or_else(|| ResolveError::NotFound(name.to_string()))
    }
}

/// Records every datagram instead of putting it on the wire.
#[derive(Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<(Option<Ipv4Addr>, Vec<u8>)>>,
}

impl RecordingTransport {
    pub fn count(&self) -> usize {
        self.sent.lock().len()
    }

    pub fn packets(&self) -> Vec<BroadcastPacket> {
        self.sent
            .lock()
            .iter()
            .map(|(_, bytes)| BroadcastPacket::from_datagram(bytes).unwrap())
            .collect()
    }

    pub fn sources(&self) -> Vec<Option<Ipv4Addr>> {
        self.sent.lock().iter().map(|(src, _)| *src).collect()
    }
}

impl BroadcastTransport for RecordingTransport {
    fn send(
        &self,
        source: Option<Ipv4Addr>,
        _destination: SocketAddrV4,
        datagram: &[u8],
    ) -> io::Result<usize> {
        self.sent.lock().push((source, datagram.to_vec()));
        Ok(datagram.len())
    }
}

pub fn service_with(
    timeout_ms: u64,
    matching: AckMatching,
) -> (Arc<BroadcastService>, Arc<RecordingTransport>) {
    let transport = Arc::new(RecordingTransport::default());
    let emitter = BroadcastEmitter::new(
        Arc::new(StaticResolver::default()),
        transport.clone(),
        SocketAddrV4::new(Ipv4Addr::BROADCAST, 9999),
        None,
    );
    let settings = ReconcileSettings {
        timeout: Duration::from_millis(timeout_ms),
        poll_interval: Duration::from_millis(100),
        matching,
    };
    (Arc::new(BroadcastService::new(emitter, settings)), transport)
}

pub fn service(timeout_ms: u64) -> (Arc<BroadcastService>, Arc<RecordingTransport>) {
    service_with(timeout_ms, AckMatching::LastSeen)
}

pub fn spawn_broadcast(
    service: &Arc<BroadcastService>,
    request: BroadcastRequest,
) -> JoinHandle<Result<DeliveryResult, ServiceError>> {
    let service = service.clone();
    tokio::spawn(async move { service.trigger_broadcast(&request).await })
}

/// Yield until a broadcast other than `previous` has been emitted.
pub async fn wait_for_packet(
    service: &BroadcastService,
    previous: Option<uuid::Uuid>,
) -> BroadcastPacket {
    loop {
        if let Some(packet) = service.current_broadcast() {
            if Some(packet.id) != previous {
                return packet;
            }
        }
        tokio::task::yield_now().await;
    }
}

/// `acknowledged_by` and `missed_by` split the universe exactly.
pub fn assert_partition(result: &DeliveryResult) {
    let acked: BTreeSet<&String> = result.acknowledged_by.keys().collect();
    let missed: BTreeSet<&String> = result.missed_by.iter().collect();

    assert_eq!(missed.len(), result.missed_by.len(), "duplicate in missed_by");
    assert!(acked.is_disjoint(&missed), "client both acked and missed");
    assert_eq!(acked.len() + missed.len(), result.total_clients);
}
