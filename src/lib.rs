//! Privacy monitor - debounced camera/microphone/screen-share indicators
//!
//! A media backend publishes full snapshots of device nodes from its own
//! thread. The [`nodes::NodeClassifier`] buckets the running ones by
//! category, and the [`visibility::VisibilityDebouncer`] turns the resulting
//! flags into indicator updates plus a container that shows immediately and
//! hides only after a quiet period.

pub mod backend;
pub mod cli;
pub mod config;
pub mod monitor;
pub mod nodes;
pub mod paths;
pub mod presentation;
pub mod visibility;

pub use config::PrivacyConfig;
pub use monitor::{MonitorActor, MonitorHandle};
pub use nodes::{AggregateFlags, DeviceNode, NodeCategory, NodeState};
pub use visibility::VisibilityState;
