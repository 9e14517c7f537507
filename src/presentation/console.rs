//! Console sink - logs all transitions for testing and debugging

use colored::*;
use std::collections::HashMap;
use tracing::{debug, info};

use super::PresentationSink;
use crate::config::PrivacyConfig;
use crate::nodes::NodeCategory;

/// ConsoleSink logs indicator and container transitions
///
/// Per-category events arrive on every recompute; only actual changes are
/// logged at info level so the output stays readable.
pub struct ConsoleSink {
    name: String,
    indicators: HashMap<NodeCategory, bool>,
    visible: Option<bool>,
    /// Transition counter for debugging
    transition_count: u64,
}

impl ConsoleSink {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            indicators: HashMap::new(),
            visible: None,
            transition_count: 0,
        }
    }

    fn icon(category: NodeCategory) -> &'static str {
        match category {
            NodeCategory::VideoInput => "🖥️",
            NodeCategory::AudioInput => "🎤",
            NodeCategory::AudioOutput => "🔊",
            NodeCategory::None => "?",
        }
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new("console")
    }
}

impl PresentationSink for ConsoleSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn configure(&mut self, config: &PrivacyConfig) {
        let modules = config
            .tracked_categories()
            .iter()
            .map(|c| format!("{} {}", Self::icon(*c), c))
            .collect::<Vec<_>>()
            .join(", ");

        info!(
            "🔌 ConsoleSink '{}' configured: [{}] (icon size {}, spacing {}, transition {}ms)",
            self.name, modules, config.icon_size, config.icon_spacing, config.transition_duration
        );
    }

    fn set_category_active(&mut self, category: NodeCategory, active: bool) {
        let previous = self.indicators.insert(category, active);
        if previous == Some(active) {
            debug!("[{}] {} unchanged ({})", self.name, category, active);
            return;
        }

        self.transition_count += 1;
        let state = if active {
            "in use".red().bold()
        } else {
            "idle".green()
        };
        info!(
            "{} [{}] {} {} → {} [#{}]",
            Self::icon(category),
            chrono::Local::now().format("%H:%M:%S%.3f"),
            self.name,
            category,
            state,
            self.transition_count
        );
    }

    fn set_container_visible(&mut self, visible: bool) {
        self.visible = Some(visible);
        self.transition_count += 1;
        let state = if visible {
            "shown".yellow().bold()
        } else {
            "hidden".dimmed()
        };
        info!(
            "📦 [{}] {} container {} [#{}]",
            chrono::Local::now().format("%H:%M:%S%.3f"),
            self.name,
            state,
            self.transition_count
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_sink_counts_real_changes() {
        let mut sink = ConsoleSink::default();
        sink.configure(&PrivacyConfig::default());

        sink.set_category_active(NodeCategory::AudioInput, true);
        sink.set_category_active(NodeCategory::AudioInput, true);
        sink.set_container_visible(true);

        assert_eq!(sink.transition_count, 2);
        assert_eq!(sink.visible, Some(true));
        assert_eq!(sink.name(), "console");
    }
}
