// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Vigil Project Contributors

//! Supervised items: a host, or a host/service pair.

use crate::define_id;
use serde::{Deserialize, Serialize};

define_id! {
    /// Identifies a [`SupItem`] row.
    pub struct SupItemId("sup-");
}

/// A supervised item: either a host (`service` empty) or a host/service
/// pair. High-level services are represented with `host: None` (§3).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SupItem {
    pub id: SupItemId,
    pub host: Option<String>,
    pub service: Option<String>,
}

impl SupItem {
    pub fn host(id: SupItemId, host: impl Into<String>) -> Self {
        Self { id, host: Some(host.into()), service: None }
    }

    pub fn service(id: SupItemId, host: impl Into<String>, service: impl Into<String>) -> Self {
        Self { id, host: Some(host.into()), service: Some(service.into()) }
    }

    /// High-level service carrier: no host, only a service name (§3, Message).
    pub fn hls(id: SupItemId, service: impl Into<String>) -> Self {
        Self { id, host: None, service: Some(service.into()) }
    }

    pub fn is_hls(&self) -> bool {
        self.host.is_none()
    }

    /// The (host, service) key this SupItem is looked up by.
    pub fn key(&self) -> (Option<&str>, Option<&str>) {
        (self.host.as_deref(), self.service.as_deref())
    }
}

#[cfg(any(test, feature = "test-support"))]
pub mod test_support {
    use super::*;

    pub fn host_supitem(host: &str) -> SupItem {
        SupItem::host(SupItemId::new(), host)
    }

    pub fn service_supitem(host: &str, service: &str) -> SupItem {
        SupItem::service(SupItemId::new(), host, service)
    }
}

#[cfg(test)]
#[path = "supitem_tests.rs"]
mod tests;
