// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Broadcast emission.
//!
//! Builds a fresh [`BroadcastPacket`] and sends it exactly once as a single
//! UDP datagram. There is no retry: a failed send is reported to the caller
//! and nothing else happens.

use crate::iface::{InterfaceResolver, ResolveError};
use bcast_proto::BroadcastPacket;
use socket2::{Domain, Protocol, Socket, Type};
use std::io;
use std::net::{Ipv4Addr, SocketAddrV4};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Emission errors. None of them leave a packet behind.
#[derive(Debug, Error)]
pub enum EmitError {
    #[error("Failed to get broadcast interface IP: {0}")]
    InterfaceResolution(#[from] ResolveError),

    #[error("Failed to encode packet: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Failed to send broadcast: {0}")]
    Transmission(#[from] io::Error),
}

/// Sends one datagram over a best-effort broadcast medium.
pub trait BroadcastTransport: Send + Sync {
    /// Send `datagram` to `destination`, leaving from `source` when given.
    fn send(
        &self,
        source: Option<Ipv4Addr>,
        destination: SocketAddrV4,
        datagram: &[u8],
    ) -> io::Result<usize>;
}

/// UDP transport with `SO_BROADCAST` enabled on a per-send socket.
#[derive(Debug, Clone, Copy, Default)]
pub struct UdpBroadcastTransport;

impl BroadcastTransport for UdpBroadcastTransport {
    fn send(
        &self,
        source: Option<Ipv4Addr>,
        destination: SocketAddrV4,
        datagram: &[u8],
    ) -> io::Result<usize> {
        let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))?;
        socket.set_broadcast(true)?;

        // Port 0: let the system pick the source port.
        let bind_addr = SocketAddrV4::new(source.unwrap_or(Ipv4Addr::UNSPECIFIED), 0);
        socket.bind(&bind_addr.into())?;
        debug!("[UDP] broadcast socket bound to {}", bind_addr);

        socket.send_to(datagram, &destination.into())
    }
}

/// Builds packets and hands them to the transport.
#[derive(Clone)]
pub struct BroadcastEmitter {
    resolver: Arc<dyn InterfaceResolver>,
    transport: Arc<dyn BroadcastTransport>,
    destination: SocketAddrV4,
    default_interface: Option<String>,
}

impl BroadcastEmitter {
    pub fn new(
        resolver: Arc<dyn InterfaceResolver>,
        transport: Arc<dyn BroadcastTransport>,
        destination: SocketAddrV4,
        default_interface: Option<String>,
    ) -> Self {
        Self {
            resolver,
            transport,
            destination,
            default_interface,
        }
    }

    pub fn destination(&self) -> SocketAddrV4 {
        self.destination
    }

    /// Emit `payload` once.
    ///
    /// `interface` overrides the configured broadcast interface. Without
    /// either, the routing table picks the outgoing interface.
    pub fn emit(
        &self,
        payload: Vec<u8>,
        interface: Option<&str>,
    ) -> Result<BroadcastPacket, EmitError> {
        let source = match interface.or(self.default_interface.as_deref()) {
            Some(name) => {
                let ip = self.resolver.resolve(name)?;
                info!("Using broadcast interface {} with IP {}", name, ip);
                Some(ip)
            }
            None => None,
        };

        let packet = BroadcastPacket::new(payload);
        let datagram = packet.to_datagram()?;

        let sent = self.transport.send(source, self.destination, &datagram)?;
        if sent != datagram.len() {
            return Err(EmitError::Transmission(io::Error::new(
                io::ErrorKind::WriteZero,
                format!("short send: {} of {} bytes", sent, datagram.len()),
            )));
        }

        debug!(
            "Broadcast {} sent to {} ({} bytes)",
            packet.id, self.destination, sent
        );
        Ok(packet)
    }
}
