//! Internal helpers for model validation and conversion.
//!
//! These utilities are **not** part of the public API.

use uuid::Uuid;

use crate::{EngineError, ResultEngine};

/// Parse a UUID from storage and return a labeled error on failure.
pub(crate) fn parse_uuid(value: &str, label: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value).map_err(|_| EngineError::InvalidData(format!("invalid {label} id")))
}

/// Trim a free-text field; empty input stays empty.
pub(crate) fn normalize_text(value: &str) -> String {
    value.trim().to_string()
}
