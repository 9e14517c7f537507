//! Presentation sinks (console log, status-line JSON, recording)
//!
//! The monitor never renders anything itself; it pushes indicator and
//! container transitions into a [`PresentationSink`].

use crate::config::PrivacyConfig;
use crate::nodes::NodeCategory;

pub mod console;
pub mod recording;
pub mod status_line;

pub use console::ConsoleSink;
pub use recording::{RecordedEvent, RecordingSink};
pub use status_line::StatusLineSink;

/// One transition pushed to a sink
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkEvent {
    /// Per-category indicator state, sent on every recompute
    CategoryActive(NodeCategory, bool),
    /// Whole-container visibility, debounced on hide
    ContainerVisible(bool),
}

/// Sink trait - every presentation layer implements this
///
/// Methods are called from the monitor's single cooperative task and never
/// while the node lock is held, so implementations may query the monitor.
pub trait PresentationSink: Send {
    /// Sink name for logs (e.g., "console", "status-line")
    fn name(&self) -> &str;

    /// Apply (or re-apply after a reload) the cosmetic configuration
    ///
    /// Default implementation: no-op (sink has no cosmetic settings)
    fn configure(&mut self, _config: &PrivacyConfig) {}

    /// Indicator for `category` is now `active`
    fn set_category_active(&mut self, category: NodeCategory, active: bool);

    /// Show or hide the whole indicator container
    fn set_container_visible(&mut self, visible: bool);

    /// Dispatch a [`SinkEvent`] to the matching method
    fn apply(&mut self, event: SinkEvent) {
        match event {
            SinkEvent::CategoryActive(category, active) => {
                self.set_category_active(category, active)
            }
            SinkEvent::ContainerVisible(visible) => self.set_container_visible(visible),
        }
    }
}

impl<S: PresentationSink + ?Sized> PresentationSink for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn configure(&mut self, config: &PrivacyConfig) {
        (**self).configure(config)
    }

    fn set_category_active(&mut self, category: NodeCategory, active: bool) {
        (**self).set_category_active(category, active)
    }

    fn set_container_visible(&mut self, visible: bool) {
        (**self).set_container_visible(visible)
    }
}
