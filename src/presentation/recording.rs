//! Recording sink - captures every transition for inspection
//!
//! Used by tests and by embedders that poll the monitor instead of
//! receiving callbacks. Clones share the same event log.

use parking_lot::Mutex;
use std::sync::Arc;
use tokio::time::Instant;

use super::{PresentationSink, SinkEvent};
use crate::nodes::NodeCategory;

/// A sink event with the instant it was received
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordedEvent {
    pub at: Instant,
    pub event: SinkEvent,
}

/// Sink that records everything it receives
#[derive(Clone, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<RecordedEvent>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded events, oldest first
    pub fn events(&self) -> Vec<SinkEvent> {
        self.events.lock().iter().map(|r| r.event).collect()
    }

    /// All recorded events with timestamps
    pub fn recorded(&self) -> Vec<RecordedEvent> {
        self.events.lock().clone()
    }

    /// Drain the log
    pub fn take(&self) -> Vec<SinkEvent> {
        std::mem::take(&mut *self.events.lock())
            .into_iter()
            .map(|r| r.event)
            .collect()
    }

    /// Container visibility transitions only
    pub fn container_events(&self) -> Vec<RecordedEvent> {
        self.events
            .lock()
            .iter()
            .filter(|r| matches!(r.event, SinkEvent::ContainerVisible(_)))
            .copied()
            .collect()
    }

    fn push(&self, event: SinkEvent) {
        self.events.lock().push(RecordedEvent {
            at: Instant::now(),
            event,
        });
    }
}

impl PresentationSink for RecordingSink {
    fn name(&self) -> &str {
        "recording"
    }

    fn set_category_active(&mut self, category: NodeCategory, active: bool) {
        self.push(SinkEvent::CategoryActive(category, active));
    }

    fn set_container_visible(&mut self, visible: bool) {
        self.push(SinkEvent::ContainerVisible(visible));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_log() {
        let sink = RecordingSink::new();
        let mut writer = sink.clone();

        writer.apply(SinkEvent::CategoryActive(NodeCategory::AudioInput, true));
        writer.apply(SinkEvent::ContainerVisible(true));

        assert_eq!(
            sink.events(),
            vec![
                SinkEvent::CategoryActive(NodeCategory::AudioInput, true),
                SinkEvent::ContainerVisible(true),
            ]
        );
        assert_eq!(sink.container_events().len(), 1);

        assert_eq!(sink.take().len(), 2);
        assert!(sink.events().is_empty());
    }
}
