// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Outcome of one reconciliation run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Which receivers acknowledged a broadcast within its time budget.
///
/// `acknowledged_by` and `missed_by` partition the set of receivers that
/// were connected when the packet was emitted; `total_clients` is the size
/// of that set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryResult {
    pub packet_id: Uuid,
    pub sent_at: DateTime<Utc>,
    pub timeout_ms: u64,

    /// Client id -> time the acknowledgment was observed.
    pub acknowledged_by: BTreeMap<String, DateTime<Utc>>,

    /// Clients that had not acknowledged by the deadline (sorted, unique).
    pub missed_by: Vec<String>,

    pub total_clients: usize,
}

impl DeliveryResult {
    /// Fraction of tracked receivers that acknowledged (1.0 when none were tracked).
    pub fn delivery_ratio(&self) -> f64 {
        if self.total_clients == 0 {
            return 1.0;
        }
        self.acknowledged_by.len() as f64 / self.total_clients as f64
    }

    pub fn is_complete(&self) -> bool {
        self.missed_by.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(acked: &[&str], missed: &[&str]) -> DeliveryResult {
        let now = Utc::now();
        DeliveryResult {
            packet_id: Uuid::new_v4(),
            sent_at: now,
            timeout_ms: 1000,
            acknowledged_by: acked.iter().map(|id| (id.to_string(), now)).collect(),
            missed_by: missed.iter().map(|id| id.to_string()).collect(),
            total_clients: acked.len() + missed.len(),
        }
    }

    #[test]
    fn test_delivery_ratio() {
        assert_eq!(result(&["a", "b"], &["c", "d"]).delivery_ratio(), 0.5);
        assert_eq!(result(&[], &[]).delivery_ratio(), 1.0);
    }

    #[test]
    fn test_is_complete() {
        assert!(result(&["a"], &[]).is_complete());
        assert!(!result(&["a"], &["b"]).is_complete());
    }
}
