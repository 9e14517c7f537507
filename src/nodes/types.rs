//! Device node type definitions
//!
//! Defines the records delivered by the media-session backend: node identity,
//! privacy category and lifecycle state.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Backend-assigned node identifier, unique per device session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Privacy category a node belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeCategory {
    /// Camera or screen capture
    VideoInput,
    /// Microphone capture
    AudioInput,
    /// Audio playback
    AudioOutput,
    /// Anything the backend could not classify; never bucketed
    None,
}

// Unknown names degrade to `None` instead of failing the whole snapshot.
impl<'de> Deserialize<'de> for NodeCategory {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        Ok(NodeCategory::from_name(&name))
    }
}

impl NodeCategory {
    /// The three categories that own a bucket, in display order
    pub fn tracked() -> &'static [NodeCategory] {
        &[
            NodeCategory::VideoInput,
            NodeCategory::AudioInput,
            NodeCategory::AudioOutput,
        ]
    }

    /// Parse a module type name as used in the config file
    pub fn from_module_type(s: &str) -> Option<Self> {
        match s {
            "screenshare" => Some(NodeCategory::VideoInput),
            "audio-in" => Some(NodeCategory::AudioInput),
            "audio-out" => Some(NodeCategory::AudioOutput),
            _ => None,
        }
    }

    /// Parse either a category name or a module type name
    pub fn from_name(s: &str) -> Self {
        match s {
            "video-input" => NodeCategory::VideoInput,
            "audio-input" => NodeCategory::AudioInput,
            "audio-output" => NodeCategory::AudioOutput,
            other => Self::from_module_type(other).unwrap_or(NodeCategory::None),
        }
    }

    /// Module type name as used in the config file
    pub fn module_type(&self) -> &'static str {
        match self {
            NodeCategory::VideoInput => "screenshare",
            NodeCategory::AudioInput => "audio-in",
            NodeCategory::AudioOutput => "audio-out",
            NodeCategory::None => "none",
        }
    }
}

impl std::fmt::Display for NodeCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.module_type())
    }
}

/// Lifecycle state reported by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeState {
    Error,
    Creating,
    Suspended,
    Idle,
    Running,
    /// Any state name this crate does not know (e.g. "closed"); never active
    Unknown,
}

// Like categories, an unrecognised state must not reject the snapshot.
impl<'de> Deserialize<'de> for NodeState {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        Ok(NodeState::from_str(&name).unwrap_or(NodeState::Unknown))
    }
}

impl NodeState {
    /// Parse from string (case-insensitive)
    ///
    /// Returns None for names outside the known set; deserialization maps
    /// those to `Unknown` instead.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "error" => Some(NodeState::Error),
            "creating" => Some(NodeState::Creating),
            "suspended" => Some(NodeState::Suspended),
            "idle" | "paused" => Some(NodeState::Idle),
            "running" => Some(NodeState::Running),
            _ => None,
        }
    }

    /// Only running nodes count as "in use"
    pub fn is_active(&self) -> bool {
        matches!(self, NodeState::Running)
    }
}

impl std::fmt::Display for NodeState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            NodeState::Error => "error",
            NodeState::Creating => "creating",
            NodeState::Suspended => "suspended",
            NodeState::Idle => "idle",
            NodeState::Running => "running",
            NodeState::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// A device node as delivered by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceNode {
    pub id: NodeId,
    pub category: NodeCategory,
    pub state: NodeState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_name: Option<String>,
}

impl DeviceNode {
    pub fn new(id: u32, category: NodeCategory, state: NodeState) -> Self {
        Self {
            id: NodeId(id),
            category,
            state,
            node_name: None,
            application_name: None,
            media_name: None,
        }
    }

    pub fn with_application(mut self, name: impl Into<String>) -> Self {
        self.application_name = Some(name.into());
        self
    }

    /// Best human-readable label for detail rows
    pub fn display_name(&self) -> String {
        self.application_name
            .as_deref()
            .or(self.node_name.as_deref())
            .or(self.media_name.as_deref())
            .map(str::to_string)
            .unwrap_or_else(|| self.id.to_string())
    }
}

/// Full-replacement set of nodes published by the backend
pub type NodeSnapshot = Vec<Arc<DeviceNode>>;

/// Per-category "in use" flags derived from the buckets
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateFlags {
    pub video_input: bool,
    pub audio_input: bool,
    pub audio_output: bool,
}

impl AggregateFlags {
    /// Flag for a single category (`None` is never active)
    pub fn get(&self, category: NodeCategory) -> bool {
        match category {
            NodeCategory::VideoInput => self.video_input,
            NodeCategory::AudioInput => self.audio_input,
            NodeCategory::AudioOutput => self.audio_output,
            NodeCategory::None => false,
        }
    }

    /// Whether any of the given categories is active
    pub fn any_of(&self, categories: &[NodeCategory]) -> bool {
        categories.iter().any(|c| self.get(*c))
    }

    pub fn any(&self) -> bool {
        self.video_input || self.audio_input || self.audio_output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_module_names() {
        for category in NodeCategory::tracked() {
            assert_eq!(
                NodeCategory::from_module_type(category.module_type()),
                Some(*category)
            );
        }
        assert_eq!(NodeCategory::from_module_type("webcam"), None);
    }

    #[test]
    fn test_unknown_category_deserializes_to_none() {
        let node: DeviceNode =
            serde_yaml::from_str("{id: 3, category: bluetooth, state: running}").unwrap();
        assert_eq!(node.category, NodeCategory::None);

        let node: DeviceNode =
            serde_yaml::from_str("{id: 4, category: screenshare, state: running}").unwrap();
        assert_eq!(node.category, NodeCategory::VideoInput);
    }

    #[test]
    fn test_unknown_state_deserializes_to_unknown() {
        let node: DeviceNode =
            serde_yaml::from_str("{id: 5, category: audio-input, state: closed}").unwrap();
        assert_eq!(node.state, NodeState::Unknown);
        assert!(!node.state.is_active());

        let node: DeviceNode =
            serde_yaml::from_str("{id: 6, category: video-input, state: Paused}").unwrap();
        assert_eq!(node.state, NodeState::Idle);
    }

    #[test]
    fn test_only_running_is_active() {
        assert!(NodeState::Running.is_active());
        for state in [
            NodeState::Error,
            NodeState::Creating,
            NodeState::Suspended,
            NodeState::Idle,
            NodeState::Unknown,
        ] {
            assert!(!state.is_active());
        }
        assert_eq!(NodeState::from_str("Paused"), Some(NodeState::Idle));
    }

    #[test]
    fn test_flags_ignore_untracked_categories() {
        let flags = AggregateFlags {
            video_input: false,
            audio_input: false,
            audio_output: true,
        };
        assert!(flags.any());
        assert!(!flags.any_of(&[NodeCategory::VideoInput, NodeCategory::AudioInput]));
        assert!(flags.any_of(&[NodeCategory::AudioOutput]));
        assert!(!flags.get(NodeCategory::None));
    }

    #[test]
    fn test_display_name_fallbacks() {
        let node = DeviceNode::new(7, NodeCategory::AudioInput, NodeState::Running);
        assert_eq!(node.display_name(), "#7");
        let node = node.with_application("Firefox");
        assert_eq!(node.display_name(), "Firefox");
    }
}
