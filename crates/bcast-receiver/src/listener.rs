// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! UDP broadcast listener.

use bcast_proto::{BroadcastPacket, MAX_DATAGRAM_SIZE};
use socket2::{Domain, Protocol, Socket, Type};
use std::io;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4, UdpSocket};
use tracing::{debug, warn};

/// Socket receiving coordinator broadcasts.
pub struct BroadcastListener {
    socket: UdpSocket,
    buf: Vec<u8>,
}

impl BroadcastListener {
    /// Bind `ip:port` (`0.0.0.0` when no interface address is given).
    ///
    /// Address reuse lets several receivers share a host.
    pub fn bind(port: u16, ip: Option<Ipv4Addr>) -> io::Result<Self> {
        let addr = SocketAddrV4::new(ip.unwrap_or(Ipv4Addr::UNSPECIFIED), port);
        let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))?;
        socket.set_reuse_address(true)?;
        socket.set_broadcast(true)?;
        socket.bind(&addr.into())?;

        Ok(Self {
            socket: socket.into(),
            buf: vec![0u8; MAX_DATAGRAM_SIZE],
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    #[cfg(test)]
    fn set_read_timeout(&self, timeout: std::time::Duration) -> io::Result<()> {
        self.socket.set_read_timeout(Some(timeout))
    }

    /// Block for the next datagram.
    ///
    /// Returns `Ok(None)` for datagrams that are not broadcast packets; those
    /// are logged and dropped.
    pub fn recv(&mut self) -> io::Result<Option<(BroadcastPacket, SocketAddr)>> {
        let (len, from) = self.socket.recv_from(&mut self.buf)?;
        let datagram = &self.buf[..len];
        debug!("Received {} bytes from {}", len, from);

        match BroadcastPacket::from_datagram(datagram) {
            Ok(packet) => Ok(Some((packet, from))),
            Err(e) => {
                warn!("Failed to parse broadcast packet from {}: {}", from, e);
                Ok(None)
            }
        }
    }
}
