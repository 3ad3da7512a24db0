// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Vigil Project Contributors

use vigil_core::{Classify, ErrorClass};

/// Errors surfaced while decoding or encoding a bus item (§6, §7).
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// Malformed XML, or a recognized root element missing a required
    /// field. Permanent: the message is dropped and logged, not retried
    /// (§7, `InvalidMessage`).
    #[error("invalid message: {0}")]
    InvalidMessage(String),
    #[error("xml parse error: {0}")]
    Xml(#[from] quick_xml::Error),
}

impl Classify for WireError {
    fn class(&self) -> ErrorClass {
        ErrorClass::Permanent
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
