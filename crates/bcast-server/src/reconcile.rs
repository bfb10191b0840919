// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Time-bounded reconciliation of acknowledgments.
//!
//! After a packet is emitted, the set of clients connected at that moment
//! (the universe) is fixed. The loop then samples the registry on a short
//! interval until the timeout expires and moves every universe member whose
//! record shows an acknowledgment from `missed_by` into `acknowledged_by`.
//!
//! # Acknowledgment rules
//!
//! - [`AckMatching::LastSeen`]: any contact strictly after the packet's send
//!   time counts. A re-registration or a late report for an older packet is
//!   attributed to the current one.
//! - [`AckMatching::PacketId`]: the client's last acknowledged packet id must
//!   equal the current packet id. Receiver timestamps are not compared.
//!
//! Clients registering after emission are never part of the run.

use crate::registry::{ClientRegistry, RegistrySnapshot};
use bcast_proto::{BroadcastPacket, ClientRecord, DeliveryResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;
use uuid::Uuid;

/// Rule deciding whether a record acknowledges the packet being tracked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AckMatching {
    /// `last_seen` strictly after the packet's send time.
    #[default]
    LastSeen,
    /// Last acknowledged packet id equals the tracked packet id.
    PacketId,
}

impl FromStr for AckMatching {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "last-seen" => Ok(Self::LastSeen),
            "packet-id" => Ok(Self::PacketId),
            other => Err(format!(
                "unknown ack matching '{}' (expected last-seen or packet-id)",
                other
            )),
        }
    }
}

impl fmt::Display for AckMatching {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LastSeen => write!(f, "last-seen"),
            Self::PacketId => write!(f, "packet-id"),
        }
    }
}

/// Timing and matching parameters for one run.
#[derive(Debug, Clone, Copy)]
pub struct ReconcileSettings {
    pub timeout: Duration,
    pub poll_interval: Duration,
    pub matching: AckMatching,
}

impl Default for ReconcileSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            poll_interval: Duration::from_millis(100),
            matching: AckMatching::LastSeen,
        }
    }
}

/// Classification state for one packet. Owned by a single run.
#[derive(Debug)]
pub struct DeliveryTracker {
    packet_id: Uuid,
    packet_id_str: String,
    sent_at: DateTime<Utc>,
    /// Last instant inside the window.
    window_end: DateTime<Utc>,
    timeout: Duration,
    matching: AckMatching,
    universe: BTreeSet<String>,
    acknowledged: BTreeMap<String, DateTime<Utc>>,
    missed: Vec<String>,
}

impl DeliveryTracker {
    /// Start tracking `packet` for every id in `universe`; all begin as missed.
    pub fn new(
        packet: &BroadcastPacket,
        universe: BTreeSet<String>,
        timeout: Duration,
        matching: AckMatching,
    ) -> Self {
        let missed = universe.iter().cloned().collect();
        let window = chrono::Duration::from_std(timeout).unwrap_or(chrono::Duration::MAX);
        let window_end = packet
            .sent_at
            .checked_add_signed(window - chrono::Duration::nanoseconds(1))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
            .max(packet.sent_at);
        Self {
            packet_id: packet.id,
            packet_id_str: packet.id.to_string(),
            sent_at: packet.sent_at,
            window_end,
            timeout,
            matching,
            universe,
            acknowledged: BTreeMap::new(),
            missed,
        }
    }

    /// Universe taken from a snapshot: every connected client.
    pub fn from_snapshot(
        packet: &BroadcastPacket,
        snapshot: &RegistrySnapshot,
        settings: &ReconcileSettings,
    ) -> Self {
        Self::new(
            packet,
            snapshot.connected_ids(),
            settings.timeout,
            settings.matching,
        )
    }

    fn acknowledges(&self, record: &ClientRecord) -> bool {
        match self.matching {
            AckMatching::LastSeen => record.last_seen > self.sent_at,
            AckMatching::PacketId => record.last_packet_id() == Some(self.packet_id_str.as_str()),
        }
    }

    /// Time recorded for an acknowledgment classified at `sampled_at`.
    ///
    /// The receiver's timestamp is kept when it falls inside the window.
    /// Otherwise (clock skew, or packet-id matching of an old-looking report)
    /// the sample time is used, bounded to the window.
    fn acknowledged_at(&self, record: &ClientRecord, sampled_at: DateTime<Utc>) -> DateTime<Utc> {
        if (self.sent_at..=self.window_end).contains(&record.last_seen) {
            record.last_seen
        } else {
            sampled_at.clamp(self.sent_at, self.window_end)
        }
    }

    /// Apply one registry sample. Returns how many clients were newly acknowledged.
    pub fn observe(&mut self, snapshot: &RegistrySnapshot) -> usize {
        let sampled_at = Utc::now();
        let newly: Vec<(String, DateTime<Utc>)> = self
            .universe
            .iter()
            .filter(|id| !self.acknowledged.contains_key(*id))
            .filter_map(|id| snapshot.get(id))
            .filter(|record| self.acknowledges(record))
            .map(|record| (record.id.clone(), self.acknowledged_at(record, sampled_at)))
            .collect();

        for (id, seen) in &newly {
            self.missed.retain(|m| m != id);
            self.acknowledged.insert(id.clone(), *seen);
            debug!("Client {} acknowledged packet {} at {}", id, self.packet_id, seen);
        }
        newly.len()
    }

    pub fn total(&self) -> usize {
        self.universe.len()
    }

    pub fn pending(&self) -> usize {
        self.universe.len() - self.acknowledged.len()
    }

    /// Close the run and produce the result.
    pub fn finish(mut self) -> DeliveryResult {
        self.missed.sort();
        self.missed.dedup();
        DeliveryResult {
            packet_id: self.packet_id,
            sent_at: self.sent_at,
            timeout_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
            acknowledged_by: self.acknowledged,
            missed_by: self.missed,
            total_clients: self.universe.len(),
        }
    }
}

/// Sample `registry` every poll interval until `timeout` has elapsed since
/// `started`, then return the classification.
///
/// A last sample is always taken at the deadline itself. There is no early
/// exit: the call takes the full budget even when everyone has answered.
pub async fn run(
    registry: &ClientRegistry,
    mut tracker: DeliveryTracker,
    settings: &ReconcileSettings,
    started: Instant,
) -> DeliveryResult {
    let deadline = started + settings.timeout;
    let mut next_tick = started + settings.poll_interval;

    loop {
        let wake = next_tick.min(deadline);
        tokio::time::sleep_until(wake).await;

        let newly = tracker.observe(&registry.snapshot());
        if newly > 0 {
            debug!(
                "{} new acknowledgments, {} of {} pending",
                newly,
                tracker.pending(),
                tracker.total()
            );
        }

        if wake >= deadline {
            break;
        }
        next_tick += settings.poll_interval;
    }

    tracker.finish()
}
