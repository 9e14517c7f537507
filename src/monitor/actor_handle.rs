//! MonitorHandle - Public API for the monitor
//!
//! Cheap to clone and safe to use from any thread. Snapshot delivery is
//! synchronous so backend threads outside the Tokio runtime can call it
//! directly.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};

use super::commands::MonitorCommand;
use crate::config::PrivacyConfig;
use crate::nodes::{AggregateFlags, DeviceNode, NodeCategory, NodeClassifier};
use crate::visibility::VisibilityState;

/// Handle for interacting with the monitor
///
/// # Backend-thread methods (synchronous)
/// - `nodes_changed` - Rebuild buckets from a snapshot and request a recompute
/// - `flags` / `nodes` - Read the current buckets
///
/// # Query methods (async with response)
/// - `visibility` - Container state after all queued work
#[derive(Clone)]
pub struct MonitorHandle {
    /// Command channel to the MonitorActor
    cmd_tx: mpsc::UnboundedSender<MonitorCommand>,
    /// Buckets shared with the actor
    classifier: Arc<NodeClassifier>,
}

impl MonitorHandle {
    pub(crate) fn new(
        cmd_tx: mpsc::UnboundedSender<MonitorCommand>,
        classifier: Arc<NodeClassifier>,
    ) -> Self {
        Self { cmd_tx, classifier }
    }

    /// Spawn a new monitor and return a handle
    ///
    /// This is a convenience wrapper around `MonitorActor::spawn`.
    pub fn spawn<S>(config: &PrivacyConfig, sink: S) -> Self
    where
        S: crate::presentation::PresentationSink + 'static,
    {
        super::actor::MonitorActor::spawn(config, sink)
    }

    // =========================================================================
    // Backend-thread methods
    // =========================================================================

    /// Deliver a full-replacement snapshot from the backend
    ///
    /// Rebuilds the buckets on the calling thread, then queues the recompute
    /// on the monitor task. Never blocks beyond the bucket lock.
    pub fn nodes_changed(&self, snapshot: &[Arc<DeviceNode>]) {
        self.classifier.rebuild(snapshot);
        let _ = self.cmd_tx.send(MonitorCommand::FlagsChanged);
    }

    /// Current aggregate flags, read straight from the buckets
    pub fn flags(&self) -> AggregateFlags {
        self.classifier.snapshot_flags()
    }

    /// Nodes currently in use for a category (for detail rows)
    pub fn nodes(&self, category: NodeCategory) -> Vec<Arc<DeviceNode>> {
        self.classifier.nodes(category)
    }

    // =========================================================================
    // Query methods
    // =========================================================================

    /// Container visibility once every previously queued command is handled
    ///
    /// Returns None if the monitor has shut down.
    pub async fn visibility(&self) -> Option<VisibilityState> {
        let (response_tx, response_rx) = oneshot::channel();
        let cmd = MonitorCommand::GetVisibility {
            response: response_tx,
        };

        if self.cmd_tx.send(cmd).is_err() {
            return None;
        }

        response_rx.await.ok()
    }

    // =========================================================================
    // Lifecycle methods
    // =========================================================================

    /// Apply a reloaded configuration
    ///
    /// Fire-and-forget: visibility is re-evaluated against the new tracked set.
    pub fn reconfigure(&self, config: PrivacyConfig) {
        let _ = self.cmd_tx.send(MonitorCommand::Reconfigure(config));
    }

    /// Check if the monitor is still alive
    pub fn is_alive(&self) -> bool {
        !self.cmd_tx.is_closed()
    }

    /// Signal the monitor to shut down
    ///
    /// Pending hide timers are dropped; the container keeps its last state.
    pub fn shutdown(&self) {
        let _ = self.cmd_tx.send(MonitorCommand::Shutdown);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_is_clone_and_send() {
        fn assert_clone_send<T: Clone + Send + Sync>() {}
        assert_clone_send::<MonitorHandle>();
    }

    #[tokio::test]
    async fn test_is_alive_when_channel_closed() {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = MonitorHandle::new(tx, Arc::new(NodeClassifier::new()));
        assert!(handle.is_alive());

        drop(rx);
        assert!(!handle.is_alive());
        assert_eq!(handle.visibility().await, None);
    }
}
