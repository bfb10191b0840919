// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Local address discovery.

use crate::ReceiverError;
use std::net::{IpAddr, Ipv4Addr};

/// First non-loopback IPv4 address matching `filter`.
fn first_ipv4(
    interfaces: impl IntoIterator<Item = (String, IpAddr)>,
    mut filter: impl FnMut(&str) -> bool,
) -> Option<Ipv4Addr> {
    interfaces.into_iter().find_map(|(name, ip)| match ip {
        IpAddr::V4(v4) if !v4.is_loopback() && filter(&name) => Some(v4),
        _ => None,
    })
}

/// Address advertised at registration. Empty when none can be found.
pub fn local_ip() -> String {
    local_ip_address::list_afinet_netifas()
        .ok()
        .and_then(|ifaces| first_ipv4(ifaces, |_| true))
        .map(|ip| ip.to_string())
        .unwrap_or_default()
}

/// IPv4 address of the named interface.
pub fn interface_ip(name: &str) -> Result<Ipv4Addr, ReceiverError> {
    let interfaces = local_ip_address::list_afinet_netifas()
        .map_err(|e| ReceiverError::Interface(name.to_string(), e.to_string()))?;
    first_ipv4(interfaces, |iface| iface == name).ok_or_else(|| {
        ReceiverError::Interface(name.to_string(), "no IPv4 address found".to_string())
    })
}
