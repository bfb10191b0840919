// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Wire types for broadcast delivery confirmation.
//!
//! Shared between the coordinator (`bcast-server`) and the receivers
//! (`bcast-receiver`). Everything here is plain JSON over either HTTP
//! (registration, reports, status, results) or a single UDP datagram
//! (the broadcast packet itself).
//!
//! # Datagram format
//!
//! ```text
//! {"id":"<uuid>","timestamp":"<rfc3339>","data":"<base64>"}
//! ```

pub mod client;
pub mod delivery;
pub mod error;
pub mod packet;
pub mod report;
pub mod status;

pub use client::{ClientRecord, Registration, LAST_PACKET_ID_KEY};
pub use delivery::DeliveryResult;
pub use error::{decode, Validate, ValidationError};
pub use packet::{BroadcastPacket, BroadcastRequest, DEFAULT_PAYLOAD, MAX_DATAGRAM_SIZE};
pub use report::AcknowledgmentReport;
pub use status::{ClientStatus, StatusView};

/// Upper bound on client identifiers accepted at the boundary.
pub const MAX_CLIENT_ID_LEN: usize = 256;
