//! Scenario replay source
//!
//! Scenarios are YAML files describing a timeline of full snapshots:
//!
//! ```yaml
//! name: camera flicker
//! steps:
//!   - after_ms: 0
//!     nodes:
//!       - { id: 42, category: video-input, state: running, application_name: OBS }
//!   - after_ms: 150
//!     nodes:
//!       - { id: 42, category: video-input, state: idle }
//!   - after_ms: 500
//!     nodes: []
//! ```
//!
//! `after_ms` is relative to the previous step.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

use super::NodeSource;
use crate::monitor::MonitorHandle;
use crate::nodes::DeviceNode;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("failed to read scenario {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid scenario: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("scenario has no steps")]
    Empty,
}

/// One point on the scenario timeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioStep {
    /// Delay since the previous step
    #[serde(default)]
    pub after_ms: u64,
    /// Full replacement snapshot published at this step
    #[serde(default)]
    pub nodes: Vec<DeviceNode>,
}

impl ScenarioStep {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.after_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub name: Option<String>,
    pub steps: Vec<ScenarioStep>,
}

impl Scenario {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ScenarioError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&contents)
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = serde_yaml::from_str(contents)?;
        if scenario.steps.is_empty() {
            return Err(ScenarioError::Empty);
        }
        Ok(scenario)
    }

    /// Sum of all step delays
    pub fn duration(&self) -> Duration {
        self.steps.iter().map(ScenarioStep::delay).sum()
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("unnamed")
    }
}

/// Replays a [`Scenario`] against the monitor in wall-clock time
pub struct ReplaySource {
    scenario: Scenario,
}

impl ReplaySource {
    pub fn new(scenario: Scenario) -> Self {
        Self { scenario }
    }
}

impl NodeSource for ReplaySource {
    fn name(&self) -> &str {
        "replay"
    }

    fn run(self: Box<Self>, monitor: MonitorHandle) -> anyhow::Result<()> {
        let scenario = self.scenario;
        info!(
            "▶️  Replaying scenario '{}' ({} steps, {:?})",
            scenario.display_name(),
            scenario.steps.len(),
            scenario.duration()
        );

        for (index, step) in scenario.steps.into_iter().enumerate() {
            if !step.delay().is_zero() {
                std::thread::sleep(step.delay());
            }

            if !monitor.is_alive() {
                debug!("Monitor gone, stopping replay at step {}", index);
                return Ok(());
            }

            let snapshot: Vec<Arc<DeviceNode>> = step.nodes.into_iter().map(Arc::new).collect();
            debug!("Step {}: publishing {} node(s)", index, snapshot.len());
            monitor.nodes_changed(&snapshot);
        }

        info!("Scenario finished");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PrivacyConfig;
    use crate::nodes::{NodeCategory, NodeState};
    use crate::presentation::{RecordingSink, SinkEvent};
    use crate::visibility::VisibilityState;
    use std::io::Write;

    const FLICKER: &str = r#"
name: camera flicker
steps:
  - after_ms: 0
    nodes:
      - { id: 42, category: video-input, state: running, application_name: OBS }
  - after_ms: 5
    nodes:
      - { id: 42, category: video-input, state: paused }
      - { id: 7, category: audio-input, state: running }
"#;

    #[test]
    fn test_parse_scenario() {
        let scenario = Scenario::from_yaml_str(FLICKER).unwrap();
        assert_eq!(scenario.display_name(), "camera flicker");
        assert_eq!(scenario.steps.len(), 2);
        assert_eq!(scenario.duration(), Duration::from_millis(5));

        let first = &scenario.steps[0].nodes[0];
        assert_eq!(first.category, NodeCategory::VideoInput);
        assert_eq!(first.state, NodeState::Running);
        assert_eq!(first.display_name(), "OBS");
        assert_eq!(scenario.steps[1].nodes[0].state, NodeState::Idle);
    }

    #[test]
    fn test_empty_scenario_rejected() {
        let err = Scenario::from_yaml_str("steps: []").unwrap_err();
        assert!(matches!(err, ScenarioError::Empty));
    }

    #[test]
    fn test_missing_steps_is_parse_error() {
        let err = Scenario::from_yaml_str("name: nothing").unwrap_err();
        assert!(matches!(err, ScenarioError::Parse(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(FLICKER.as_bytes()).unwrap();

        let scenario = Scenario::load(file.path()).unwrap();
        assert_eq!(scenario.steps.len(), 2);

        let err = Scenario::load(file.path().with_extension("missing")).unwrap_err();
        assert!(matches!(err, ScenarioError::Io { .. }));
        assert!(err.to_string().contains("failed to read scenario"));
    }

    #[tokio::test]
    async fn test_replay_publishes_every_step() {
        let sink = RecordingSink::new();
        let config = PrivacyConfig::default();
        let monitor = MonitorHandle::spawn(&config, sink.clone());

        let source: Box<dyn NodeSource> =
            Box::new(ReplaySource::new(Scenario::from_yaml_str(FLICKER).unwrap()));
        assert_eq!(source.name(), "replay");

        let backend = monitor.clone();
        tokio::task::spawn_blocking(move || source.run(backend))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(monitor.visibility().await, Some(VisibilityState::Visible));
        let flags = monitor.flags();
        assert!(!flags.video_input);
        assert!(flags.audio_input);
        assert!(sink
            .events()
            .contains(&SinkEvent::CategoryActive(NodeCategory::AudioInput, true)));
    }
}
