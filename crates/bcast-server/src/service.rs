// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Broadcast service - owns all coordinator state.
//!
//! One instance lives for the whole process and is shared by every HTTP
//! handler. It holds two independently guarded values: the client registry
//! and the current-broadcast slot.
//!
//! ```text
//!   TriggerBroadcast ──► gate ──► snapshot(U) ──► emit ──► slot ──► reconcile ──► result
//!                                                                      ▲
//!   SubmitAcknowledgment ──► ingestor ──► registry ────── samples ─────┘
//! ```

use crate::config::ServerConfig;
use crate::emitter::{BroadcastEmitter, EmitError, UdpBroadcastTransport};
use crate::iface::SystemResolver;
use crate::ingest::ReportIngestor;
use crate::reconcile::{self, DeliveryTracker, ReconcileSettings};
use crate::registry::{ClientRegistry, RegistryError};
use bcast_proto::{
    AcknowledgmentReport, BroadcastPacket, BroadcastRequest, ClientRecord, DeliveryResult,
    Registration, StatusView, Validate, ValidationError,
};
use parking_lot::RwLock;
use std::io;
use std::sync::Arc;
use thiserror::Error;
use tokio::time::Instant;
use tracing::{info, warn};

/// Errors surfaced by service operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Invalid request: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    NotRegistered(#[from] RegistryError),

    #[error(transparent)]
    Emit(#[from] EmitError),
}

/// Coordinator state and operations.
pub struct BroadcastService {
    registry: Arc<ClientRegistry>,
    ingestor: ReportIngestor,
    emitter: BroadcastEmitter,
    settings: ReconcileSettings,
    current: RwLock<Option<BroadcastPacket>>,
    /// Held for emission plus reconciliation: one run at a time.
    gate: tokio::sync::Mutex<()>,
}

impl BroadcastService {
    pub fn new(emitter: BroadcastEmitter, settings: ReconcileSettings) -> Self {
        let registry = Arc::new(ClientRegistry::new());
        Self {
            ingestor: ReportIngestor::new(registry.clone()),
            registry,
            emitter,
            settings,
            current: RwLock::new(None),
            gate: tokio::sync::Mutex::new(()),
        }
    }

    /// Service sending real UDP broadcasts as configured.
    pub fn from_config(config: &ServerConfig) -> Self {
        let emitter = BroadcastEmitter::new(
            Arc::new(SystemResolver),
            Arc::new(UdpBroadcastTransport),
            config.broadcast_destination(),
            config.broadcast_interface.clone(),
        );
        let settings = ReconcileSettings {
            timeout: config.timeout(),
            poll_interval: config.poll_interval(),
            matching: config.ack_matching,
        };
        Self::new(emitter, settings)
    }

    pub fn registry(&self) -> &Arc<ClientRegistry> {
        &self.registry
    }

    pub fn settings(&self) -> &ReconcileSettings {
        &self.settings
    }

    /// Register (or re-register) a receiver.
    pub fn register(&self, registration: Registration) -> Result<ClientRecord, ServiceError> {
        registration.validate()?;
        let record = self.registry.register(registration);
        info!("Client registered: {} from {}", record.id, record.address);
        Ok(record)
    }

    /// Apply a receiver's acknowledgment report.
    pub fn submit_acknowledgment(&self, report: &AcknowledgmentReport) -> Result<(), ServiceError> {
        report.validate()?;
        self.ingestor.submit(report)?;
        Ok(())
    }

    /// Most recently emitted packet.
    pub fn current_broadcast(&self) -> Option<BroadcastPacket> {
        self.current.read().clone()
    }

    /// All clients plus the current broadcast.
    pub fn status(&self) -> StatusView {
        let snapshot = self.registry.snapshot();
        StatusView::new(snapshot.into_records(), self.current_broadcast())
    }

    /// Interface lookup and the UDP send are blocking syscalls; run them on
    /// the blocking pool.
    async fn emit(
        &self,
        payload: Vec<u8>,
        interface: Option<String>,
    ) -> Result<BroadcastPacket, EmitError> {
        let emitter = self.emitter.clone();
        tokio::task::spawn_blocking(move || emitter.emit(payload, interface.as_deref()))
            .await
            .map_err(|e| EmitError::Transmission(io::Error::new(io::ErrorKind::Other, e)))?
    }

    /// Emit one packet and wait out the reconciliation budget.
    ///
    /// Fails immediately, without touching the current broadcast, if the
    /// packet could not be sent. Otherwise returns after the full timeout.
    pub async fn trigger_broadcast(
        &self,
        request: &BroadcastRequest,
    ) -> Result<DeliveryResult, ServiceError> {
        request.validate()?;
        let payload = request.payload_bytes()?;

        let _gate = self.gate.lock().await;

        let snapshot = self.registry.snapshot();
        let packet = match self.emit(payload, request.interface.clone()).await {
            Ok(packet) => packet,
            Err(e) => {
                warn!("Broadcast aborted: {}", e);
                return Err(e.into());
            }
        };
        let started = Instant::now();

        *self.current.write() = Some(packet.clone());

        let tracker = DeliveryTracker::from_snapshot(&packet, &snapshot, &self.settings);
        info!(
            "Broadcast sent: {} to {} clients",
            packet.id,
            tracker.total()
        );

        let result = reconcile::run(&self.registry, tracker, &self.settings, started).await;
        info!(
            "Broadcast {} complete. Received by {}/{} clients",
            packet.id,
            result.acknowledged_by.len(),
            result.total_clients
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emitter::test_support::{RecordingTransport, StaticResolver};
    use crate::iface::ResolveError;
    use crate::reconcile::AckMatching;
    use std::net::{Ipv4Addr, SocketAddrV4};
    use std::time::Duration;
    use uuid::Uuid;

    fn service(transport: Arc<RecordingTransport>, timeout_ms: u64) -> Arc<BroadcastService> {
        let emitter = BroadcastEmitter::new(
            Arc::new(StaticResolver::default()),
            transport,
            SocketAddrV4::new(Ipv4Addr::BROADCAST, 9999),
            None,
        );
        Arc::new(BroadcastService::new(
            emitter,
            ReconcileSettings {
                timeout: Duration::from_millis(timeout_ms),
                poll_interval: Duration::from_millis(100),
                matching: AckMatching::LastSeen,
            },
        ))
    }

    #[test]
    fn test_register_rejects_blank_id() {
        let svc = service(Arc::default(), 1000);
        let err = svc.register(Registration::new("", "10.0.0.1")).unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert!(svc.registry().is_empty());
    }

    #[test]
    fn test_submit_unknown_client() {
        let svc = service(Arc::default(), 1000);
        let err = svc
            .submit_acknowledgment(&AcknowledgmentReport::now("ghost", Uuid::new_v4()))
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::NotRegistered(RegistryError::NotRegistered(_))
        ));
    }

    #[test]
    fn test_status_empty() {
        let svc = service(Arc::default(), 1000);
        let status = svc.status();
        assert!(status.clients.is_empty());
        assert!(status.current_broadcast.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_trigger_sets_current_broadcast() {
        let transport = Arc::new(RecordingTransport::default());
        let svc = service(transport.clone(), 300);
        svc.register(Registration::new("a", "10.0.0.1")).unwrap();

        let result = svc
            .trigger_broadcast(&BroadcastRequest::default())
            .await
            .unwrap();

        let current = svc.current_broadcast().unwrap();
        assert_eq!(current.id, result.packet_id);
        assert_eq!(current.payload, bcast_proto::DEFAULT_PAYLOAD);
        assert_eq!(transport.sent.lock().len(), 1);
        assert_eq!(result.missed_by, vec!["a"]);
        assert_eq!(svc.status().last_packet_id, Some(result.packet_id));
    }

    /// Records which thread performed the send.
    #[derive(Default)]
    struct SenderThreadTransport(parking_lot::Mutex<Option<std::thread::ThreadId>>);

    impl crate::emitter::BroadcastTransport for SenderThreadTransport {
        fn send(
            &self,
            _source: Option<Ipv4Addr>,
            _destination: SocketAddrV4,
            datagram: &[u8],
        ) -> std::io::Result<usize> {
            *self.0.lock() = Some(std::thread::current().id());
            Ok(datagram.len())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_send_runs_off_the_runtime_thread() {
        let transport = Arc::new(SenderThreadTransport::default());
        let emitter = BroadcastEmitter::new(
            Arc::new(StaticResolver::default()),
            transport.clone(),
            SocketAddrV4::new(Ipv4Addr::BROADCAST, 9999),
            None,
        );
        let svc = BroadcastService::new(
            emitter,
            ReconcileSettings {
                timeout: Duration::from_millis(100),
                poll_interval: Duration::from_millis(100),
                matching: AckMatching::LastSeen,
            },
        );

        svc.trigger_broadcast(&BroadcastRequest::default())
            .await
            .unwrap();

        let sender = transport.0.lock().expect("send was called");
        assert_ne!(sender, std::thread::current().id());
    }

    #[tokio::test(start_paused = true)]
    async fn test_trigger_unknown_interface_fails_fast() {
        let transport = Arc::new(RecordingTransport::default());
        let svc = service(transport.clone(), 1000);
        let request = BroadcastRequest {
            payload: None,
            interface: Some("eth3".into()),
        };

        let started = Instant::now();
        let err = svc.trigger_broadcast(&request).await.unwrap_err();

        assert!(matches!(
            err,
            ServiceError::Emit(EmitError::InterfaceResolution(ResolveError::NotFound(_)))
        ));
        assert_eq!(started.elapsed(), Duration::ZERO);
        assert!(svc.current_broadcast().is_none());
        assert!(transport.sent.lock().is_empty());
    }
}
