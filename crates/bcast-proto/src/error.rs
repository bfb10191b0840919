// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Boundary validation.

use serde::de::DeserializeOwned;
use thiserror::Error;

/// Malformed registration, report or broadcast request.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("missing field: {0}")]
    Missing(&'static str),

    #[error("{field} exceeds {max} bytes")]
    TooLong { field: &'static str, max: usize },

    #[error("invalid base64 payload: {0}")]
    Payload(#[from] base64::DecodeError),
}

/// Checks a decoded request before it is allowed to touch any state.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

/// Decode a JSON body and validate it in one step.
pub fn decode<T>(body: &[u8]) -> Result<T, ValidationError>
where
    T: DeserializeOwned + Validate,
{
    let value: T = serde_json::from_slice(body)?;
    value.validate()?;
    Ok(value)
}

pub(crate) fn check_id(field: &'static str, id: &str) -> Result<(), ValidationError> {
    if id.trim().is_empty() {
        return Err(ValidationError::Missing(field));
    }
    if id.len() > crate::MAX_CLIENT_ID_LEN {
        return Err(ValidationError::TooLong {
            field,
            max: crate::MAX_CLIENT_ID_LEN,
        });
    }
    Ok(())
}
