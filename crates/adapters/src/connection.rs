// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Vigil Project Contributors

//! Bus connection lifecycle (§4.3, §4.7, §5): `connectionInitialized` starts
//! the rule runner pool and resumes queue draining; `connectionLost` stops
//! the pool and pauses draining. Modeled as a `tokio::sync::watch` boolean
//! so any number of components (pool, dispatcher) can observe the current
//! state and react to transitions independently.

use tokio::sync::watch;

/// The writer half, held by whatever drives the real bus connection (out of
/// this crate's scope, §1) or by a test harness.
#[derive(Clone)]
pub struct ConnectionHandle {
    tx: watch::Sender<bool>,
}

impl ConnectionHandle {
    pub fn set_connected(&self, connected: bool) {
        // A `watch` send only fails if every receiver has been dropped; the
        // lifecycle has nothing useful to do with that.
        let _ = self.tx.send(connected);
    }
}

/// The reader half, held by the Rule Runner Pool and the Dispatcher.
#[derive(Clone)]
pub struct ConnectionWatch {
    rx: watch::Receiver<bool>,
}

impl ConnectionWatch {
    pub fn is_connected(&self) -> bool {
        *self.rx.borrow()
    }

    /// Waits for the connection state to change and returns the new value.
    pub async fn changed(&mut self) -> bool {
        if self.rx.changed().await.is_err() {
            // Handle dropped: treat as a permanent disconnect.
            return false;
        }
        *self.rx.borrow()
    }
}

/// Build a connection-state channel, initially `connected`.
pub fn connection_channel(connected: bool) -> (ConnectionHandle, ConnectionWatch) {
    let (tx, rx) = watch::channel(connected);
    (ConnectionHandle { tx }, ConnectionWatch { rx })
}

#[cfg(test)]
#[path = "connection_tests.rs"]
mod tests;
