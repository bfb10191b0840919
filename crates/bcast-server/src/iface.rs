// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Network interface name to IPv4 address resolution.

use std::net::{IpAddr, Ipv4Addr};
use thiserror::Error;
use tracing::debug;

/// Interface resolution errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("failed to list network interfaces: {0}")]
    Enumerate(String),

    #[error("interface {0} not found")]
    NotFound(String),

    #[error("no IPv4 address found on interface {0}")]
    NoIpv4(String),
}

/// Resolves an interface name to the address traffic should leave from.
pub trait InterfaceResolver: Send + Sync {
    fn resolve(&self, name: &str) -> Result<Ipv4Addr, ResolveError>;
}

/// Resolver backed by the host's interface table.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemResolver;

impl InterfaceResolver for SystemResolver {
    fn resolve(&self, name: &str) -> Result<Ipv4Addr, ResolveError> {
        let interfaces = local_ip_address::list_afinet_netifas()
            .map_err(|e| ResolveError::Enumerate(e.to_string()))?;
        pick_ipv4(name, interfaces)
    }
}

/// First non-loopback IPv4 address bound to `name`.
fn pick_ipv4(
    name: &str,
    interfaces: impl IntoIterator<Item = (String, IpAddr)>,
) -> Result<Ipv4Addr, ResolveError> {
    let mut found = false;
    for (iface, ip) in interfaces {
        if iface != name {
            continue;
        }
        found = true;
        if let IpAddr::V4(ipv4) = ip {
            if !ipv4.is_loopback() {
                debug!("Resolved interface {} to {}", name, ipv4);
                return Ok(ipv4);
            }
        }
    }

    if found {
        Err(ResolveError::NoIpv4(name.to_string()))
    } else {
        Err(ResolveError::NotFound(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv6Addr;

    fn table() -> Vec<(String, IpAddr)> {
        vec![
            ("lo".into(), IpAddr::V4(Ipv4Addr::LOCALHOST)),
            ("eth0".into(), IpAddr::V6(Ipv6Addr::LOCALHOST)),
            ("eth0".into(), IpAddr::V4(Ipv4Addr::new(192, 168, 1, 10))),
            ("wlan0".into(), IpAddr::V6("fe80::1".parse().unwrap())),
        ]
    }

    #[test]
    fn test_pick_first_ipv4() {
        assert_eq!(
            pick_ipv4("eth0", table()),
            Ok(Ipv4Addr::new(192, 168, 1, 10))
        );
    }

    #[test]
    fn test_loopback_only_interface() {
        assert_eq!(
            pick_ipv4("lo", table()),
            Err(ResolveError::NoIpv4("lo".into()))
        );
    }

    #[test]
    fn test_ipv6_only_interface() {
        assert_eq!(
            pick_ipv4("wlan0", table()),
            Err(ResolveError::NoIpv4("wlan0".into()))
        );
    }

    #[test]
    fn test_unknown_interface() {
        assert_eq!(
            pick_ipv4("eth9", table()),
            Err(ResolveError::NotFound("eth9".into()))
        );
    }

    #[test]
    fn test_system_resolver_unknown_interface() {
        let err = SystemResolver
            .resolve("bcast-test-no-such-iface0")
            .unwrap_err();
        assert!(matches!(
            err,
            ResolveError::NotFound(_) | ResolveError::Enumerate(_)
        ));
    }
}
