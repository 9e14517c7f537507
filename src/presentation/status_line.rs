//! Status-line sink - one JSON object per change, for status bars
//!
//! Output format (one line each time the rendered state changes):
//!
//! ```text
//! {"text":"🎤","class":["audio-in"],"visible":true,"categories":{"audio-in":true,"screenshare":false}}
//! ```

use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::io::Write;
use tracing::{trace, warn};

use super::PresentationSink;
use crate::config::PrivacyConfig;
use crate::nodes::NodeCategory;

pub struct StatusLineSink<W: Write + Send> {
    out: W,
    tracked: Vec<NodeCategory>,
    icon_spacing: u32,
    indicators: HashMap<NodeCategory, bool>,
    visible: bool,
    last_line: Option<String>,
}

impl StatusLineSink<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> StatusLineSink<W> {
    pub fn new(out: W) -> Self {
        let config = PrivacyConfig::default();
        Self {
            out,
            tracked: config.tracked_categories(),
            icon_spacing: config.icon_spacing,
            indicators: HashMap::new(),
            visible: false,
            last_line: None,
        }
    }

    /// Consume the sink and return the writer
    pub fn into_inner(self) -> W {
        self.out
    }

    fn glyph(category: NodeCategory) -> &'static str {
        match category {
            NodeCategory::VideoInput => "🖥️",
            NodeCategory::AudioInput => "🎤",
            NodeCategory::AudioOutput => "🔊",
            NodeCategory::None => "",
        }
    }

    fn render(&self) -> Value {
        let active: Vec<NodeCategory> = self
            .tracked
            .iter()
            .copied()
            .filter(|c| self.indicators.get(c).copied().unwrap_or(false))
            .collect();

        let separator = " ".repeat(self.icon_spacing as usize);
        let text = if self.visible {
            active
                .iter()
                .map(|c| Self::glyph(*c))
                .collect::<Vec<_>>()
                .join(separator.as_str())
        } else {
            String::new()
        };

        let class: Vec<&str> = if self.visible {
            active.iter().map(|c| c.module_type()).collect()
        } else {
            vec!["hidden"]
        };

        let categories: Map<String, Value> = self
            .tracked
            .iter()
            .map(|c| {
                let on = self.indicators.get(c).copied().unwrap_or(false);
                (c.module_type().to_string(), Value::Bool(on))
            })
            .collect();

        json!({
            "text": text,
            "class": class,
            "visible": self.visible,
            "categories": categories,
        })
    }

    fn emit(&mut self) {
        let line = self.render().to_string();
        if self.last_line.as_deref() == Some(line.as_str()) {
            return;
        }

        trace!("Status line: {}", line);
        if let Err(e) = writeln!(self.out, "{}", line).and_then(|_| self.out.flush()) {
            warn!("Failed to write status line: {}", e);
        }
        self.last_line = Some(line);
    }
}

impl<W: Write + Send> PresentationSink for StatusLineSink<W> {
    fn name(&self) -> &str {
        "status-line"
    }

    fn configure(&mut self, config: &PrivacyConfig) {
        self.tracked = config.tracked_categories();
        self.icon_spacing = config.icon_spacing;
        let tracked = &self.tracked;
        self.indicators.retain(|c, _| tracked.contains(c));
        self.emit();
    }

    fn set_category_active(&mut self, category: NodeCategory, active: bool) {
        self.indicators.insert(category, active);
        self.emit();
    }

    fn set_container_visible(&mut self, visible: bool) {
        self.visible = visible;
        self.emit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(sink: StatusLineSink<Vec<u8>>) -> Vec<Value> {
        String::from_utf8(sink.into_inner())
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn test_only_changes_are_written() {
        let mut sink = StatusLineSink::new(Vec::new());
        sink.set_category_active(NodeCategory::AudioInput, true);
        sink.set_category_active(NodeCategory::AudioInput, true);
        sink.set_container_visible(true);

        let out = lines(sink);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0]["visible"], json!(false));
        assert_eq!(out[0]["class"], json!(["hidden"]));
        assert_eq!(out[1]["visible"], json!(true));
        assert_eq!(out[1]["class"], json!(["audio-in"]));
        assert_eq!(out[1]["categories"]["audio-in"], json!(true));
        assert_eq!(out[1]["categories"]["screenshare"], json!(false));
    }

    #[test]
    fn test_text_uses_configured_spacing() {
        for (spacing, expected) in [(0, "🖥️🎤"), (3, "🖥️   🎤")] {
            let mut sink = StatusLineSink::new(Vec::new());
            let config = PrivacyConfig {
                icon_spacing: spacing,
                ..PrivacyConfig::default()
            };
            sink.configure(&config);
            sink.set_category_active(NodeCategory::VideoInput, true);
            sink.set_category_active(NodeCategory::AudioInput, true);
            sink.set_container_visible(true);

            let out = lines(sink);
            assert_eq!(out.last().unwrap()["text"], json!(expected), "spacing {}", spacing);
        }
    }

    #[test]
    fn test_configure_limits_categories() {
        let mut sink = StatusLineSink::new(Vec::new());
        let config = PrivacyConfig::from_yaml_str("modules:\n  - type: audio-out\n").unwrap();
        sink.configure(&config);

        let out = lines(sink);
        let categories = out[0]["categories"].as_object().unwrap();
        assert_eq!(categories.len(), 1);
        assert!(categories.contains_key("audio-out"));
    }
}
