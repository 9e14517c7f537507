//! JSON-lines source
//!
//! Each line is a full snapshot as a JSON array of nodes:
//!
//! ```text
//! [{"id":42,"category":"video-input","state":"running","application_name":"OBS"}]
//! []
//! ```
//!
//! Blank lines and lines starting with `#` are ignored. A malformed line is
//! logged and skipped; the previous snapshot stays in effect.

use std::io::BufRead;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::NodeSource;
use crate::monitor::MonitorHandle;
use crate::nodes::DeviceNode;

pub struct JsonLinesSource<R: BufRead + Send> {
    reader: R,
}

impl JsonLinesSource<std::io::BufReader<std::io::Stdin>> {
    pub fn stdin() -> Self {
        Self::new(std::io::BufReader::new(std::io::stdin()))
    }
}

impl<R: BufRead + Send> JsonLinesSource<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

/// Parse one input line; `Ok(None)` for blank and comment lines
fn parse_line(line: &str) -> serde_json::Result<Option<Vec<Arc<DeviceNode>>>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let nodes: Vec<DeviceNode> = serde_json::from_str(line)?;
    Ok(Some(nodes.into_iter().map(Arc::new).collect()))
}

impl<R: BufRead + Send> NodeSource for JsonLinesSource<R> {
    fn name(&self) -> &str {
        "stdin"
    }

    fn run(self: Box<Self>, monitor: MonitorHandle) -> anyhow::Result<()> {
        info!("Reading node snapshots as JSON lines");
        let mut published = 0u64;

        for (index, line) in self.reader.lines().enumerate() {
            let line = line?;
            match parse_line(&line) {
                Ok(Some(snapshot)) => {
                    if !monitor.is_alive() {
                        break;
                    }
                    debug!("Line {}: publishing {} node(s)", index + 1, snapshot.len());
                    monitor.nodes_changed(&snapshot);
                    published += 1;
                }
                Ok(None) => {}
                Err(e) => warn!("Skipping line {}: {}", index + 1, e),
            }
        }

        info!("Input closed after {} snapshot(s)", published);
        Ok(())
    }
}
