//! Node sources - feed device snapshots into the monitor
//!
//! A real media-session backend lives outside this crate. What ships here are
//! sources that stand in for it: a scripted scenario replay, a JSON-lines
//! reader for piping in snapshots, and the interactive REPL in [`crate::cli`].
//!
//! Every source runs on its own OS thread and only talks to the monitor
//! through [`MonitorHandle::nodes_changed`], the same way a backend callback
//! would.

use anyhow::Result;

use crate::monitor::MonitorHandle;

pub mod replay;
pub mod stdin;

pub use replay::{ReplaySource, Scenario, ScenarioError, ScenarioStep};
pub use stdin::JsonLinesSource;

/// NodeSource trait - everything that publishes snapshots implements this
///
/// `run` blocks the calling thread until the source is exhausted, the user
/// quits, or the monitor goes away. Run it on a dedicated OS thread, not
/// `spawn_blocking`: a source parked on a stdin read would keep the runtime
/// from shutting down.
pub trait NodeSource: Send {
    /// Source name for logs (e.g., "replay", "stdin", "repl")
    fn name(&self) -> &str;

    /// Publish snapshots until done
    fn run(self: Box<Self>, monitor: MonitorHandle) -> Result<()>;
}
