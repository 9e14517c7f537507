//! Node classifier - partitions backend snapshots into per-category buckets
//!
//! The backend thread calls [`NodeClassifier::rebuild`] with every snapshot;
//! the monitor actor reads [`NodeClassifier::snapshot_flags`] when it
//! recomputes visibility. A single lock guards all three buckets so readers
//! never observe a half-rebuilt set.

use parking_lot::RwLock;
use std::sync::Arc;
use tracing::trace;

use super::types::{AggregateFlags, DeviceNode, NodeCategory};

/// The three category buckets, rebuilt together
#[derive(Debug, Default)]
struct Buckets {
    video_input: Vec<Arc<DeviceNode>>,
    audio_input: Vec<Arc<DeviceNode>>,
    audio_output: Vec<Arc<DeviceNode>>,
}

impl Buckets {
    fn clear(&mut self) {
        self.video_input.clear();
        self.audio_input.clear();
        self.audio_output.clear();
    }

    fn get(&self, category: NodeCategory) -> Option<&Vec<Arc<DeviceNode>>> {
        match category {
            NodeCategory::VideoInput => Some(&self.video_input),
            NodeCategory::AudioInput => Some(&self.audio_input),
            NodeCategory::AudioOutput => Some(&self.audio_output),
            NodeCategory::None => None,
        }
    }

    fn get_mut(&mut self, category: NodeCategory) -> Option<&mut Vec<Arc<DeviceNode>>> {
        match category {
            NodeCategory::VideoInput => Some(&mut self.video_input),
            NodeCategory::AudioInput => Some(&mut self.audio_input),
            NodeCategory::AudioOutput => Some(&mut self.audio_output),
            NodeCategory::None => None,
        }
    }
}

/// Categorized storage of currently running nodes
///
/// Shared between the backend thread (writer) and the monitor actor (reader)
/// behind an `Arc`. The lock is never held across a call out of this type.
#[derive(Debug, Default)]
pub struct NodeClassifier {
    buckets: RwLock<Buckets>,
}

impl NodeClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all bucket contents with the running nodes of `snapshot`
    ///
    /// Nodes that are not running, or whose category is `None`, are dropped.
    /// Order within a bucket follows snapshot order.
    pub fn rebuild(&self, snapshot: &[Arc<DeviceNode>]) {
        let mut buckets = self.buckets.write();
        buckets.clear();

        for node in snapshot {
            if !node.state.is_active() {
                continue;
            }
            if let Some(bucket) = buckets.get_mut(node.category) {
                bucket.push(Arc::clone(node));
            }
        }

        trace!(
            video_input = buckets.video_input.len(),
            audio_input = buckets.audio_input.len(),
            audio_output = buckets.audio_output.len(),
            "Buckets rebuilt from {} nodes",
            snapshot.len()
        );
    }

    /// Whether each bucket currently holds at least one node
    pub fn snapshot_flags(&self) -> AggregateFlags {
        let buckets = self.buckets.read();
        AggregateFlags {
            video_input: !buckets.video_input.is_empty(),
            audio_input: !buckets.audio_input.is_empty(),
            audio_output: !buckets.audio_output.is_empty(),
        }
    }

    /// Copy of the nodes currently in a category's bucket
    pub fn nodes(&self, category: NodeCategory) -> Vec<Arc<DeviceNode>> {
        self.buckets
            .read()
            .get(category)
            .cloned()
            .unwrap_or_default()
    }

    /// Number of nodes in a category's bucket
    pub fn len(&self, category: NodeCategory) -> usize {
        self.buckets.read().get(category).map_or(0, Vec::len)
    }

    /// True when no bucket holds a node
    pub fn is_empty(&self) -> bool {
        !self.snapshot_flags().any()
    }
}
