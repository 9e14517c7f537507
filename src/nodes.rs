//! Device node model and classification
//!
//! Holds the records published by the media-session backend and the
//! classifier that sorts running nodes into the video-input, audio-input and
//! audio-output buckets.

mod classifier;
mod types;

pub use classifier::NodeClassifier;
pub use types::{AggregateFlags, DeviceNode, NodeCategory, NodeId, NodeSnapshot, NodeState};
