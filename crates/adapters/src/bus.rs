// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Vigil Project Contributors

//! The bus transport boundary (§1, §4.7): publish-only from the core's
//! point of view (inbound delivery reaches the Dispatcher through
//! `forward(raw_xml)`, which is itself the documented boundary — §4.7). The
//! transport (XMPP/pub-sub client, credentials, retries below this layer)
//! is an external collaborator; this crate only specifies the interface.

use crate::BusError;
use async_trait::async_trait;

#[async_trait]
pub trait BusAdapter: Send + Sync {
    /// Publish one outbound item (state republication or correvent
    /// notification, already XML-encoded by `vigil-wire`) to the bus.
    async fn publish(&self, xml: &str) -> Result<(), BusError>;
}

/// A [`BusAdapter`] that logs every publish instead of sending it anywhere.
/// Ships as the daemon's default until a deployment links in a real
/// transport client behind this trait (§1: the transport itself is an
/// external collaborator, out of this core's scope), the same way
/// [`vigil_context::InMemoryContextStore`] stands in for a memcached-class
/// backend.
#[derive(Debug, Default)]
pub struct LoggingBusAdapter;

impl LoggingBusAdapter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl BusAdapter for LoggingBusAdapter {
    async fn publish(&self, xml: &str) -> Result<(), BusError> {
        tracing::info!(item = %xml, "publish (no bus transport configured)");
        Ok(())
    }
}

#[cfg(any(test, feature = "test-support"))]
pub mod test_support {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    /// Records every published item instead of sending it anywhere; used by
    /// Dispatcher/Engine tests (§8).
    #[derive(Default)]
    pub struct InMemoryBusAdapter {
        published: Arc<Mutex<Vec<String>>>,
        fail_next: Mutex<u32>,
    }

    impl InMemoryBusAdapter {
        pub fn new() -> Self {
            Self::default()
        }

        /// The next `n` publish calls fail with `BusError::Unavailable`,
        /// simulating a bus outage mid-pipeline (§7, `TransientBus`).
        pub fn fail_next_publishes(&self, n: u32) {
            *self.fail_next.lock() = n;
        }

        pub fn published(&self) -> Vec<String> {
            self.published.lock().clone()
        }
    }

    #[async_trait]
    impl BusAdapter for InMemoryBusAdapter {
        async fn publish(&self, xml: &str) -> Result<(), BusError> {
            let mut remaining = self.fail_next.lock();
            if *remaining > 0 {
                *remaining -= 1;
                return Err(BusError::Unavailable("simulated outage".to_string()));
            }
            drop(remaining);
            self.published.lock().push(xml.to_string());
            Ok(())
        }
    }
}

#[cfg(test)]
#[path = "bus_tests.rs"]
mod tests;
