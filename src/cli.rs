//! Interactive REPL node source
//!
//! Keeps a local node table and publishes the whole table as a snapshot after
//! every mutation, exactly like a backend would.

use colored::*;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

use crate::backend::NodeSource;
use crate::monitor::MonitorHandle;
use crate::nodes::{DeviceNode, NodeCategory, NodeId, NodeState};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandParseError {
    #[error("unknown command '{0}' (try 'help')")]
    UnknownCommand(String),

    #[error("usage: {0}")]
    Usage(&'static str),

    #[error("invalid node id '{0}'")]
    InvalidId(String),

    #[error("unknown node type '{0}' (camera, mic, speaker, none)")]
    InvalidCategory(String),

    #[error("unknown state '{0}' (running, idle, suspended, creating, error)")]
    InvalidState(String),
}

/// One parsed REPL line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    /// Add (or replace) a running node
    Start {
        id: NodeId,
        category: NodeCategory,
        name: Option<String>,
    },
    /// Pause a node (state `idle`)
    Stop(NodeId),
    SetState(NodeId, NodeState),
    Remove(NodeId),
    Clear,
    List,
    Help,
    Quit,
}

impl ReplCommand {
    /// Parse a non-empty input line
    pub fn parse(line: &str) -> Result<Self, CommandParseError> {
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            return Err(CommandParseError::Usage("<command> [args...]"));
        };

        match command.to_ascii_lowercase().as_str() {
            "start" => {
                const USAGE: &str = "start <id> <type> [name]";
                let id = parse_id(words.next().ok_or(CommandParseError::Usage(USAGE))?)?;
                let category =
                    parse_category(words.next().ok_or(CommandParseError::Usage(USAGE))?)?;
                let name = words.collect::<Vec<_>>().join(" ");
                Ok(ReplCommand::Start {
                    id,
                    category,
                    name: (!name.is_empty()).then_some(name),
                })
            }
            "stop" => {
                let id = words.next().ok_or(CommandParseError::Usage("stop <id>"))?;
                Ok(ReplCommand::Stop(parse_id(id)?))
            }
            "state" => {
                const USAGE: &str = "state <id> <state>";
                let id = parse_id(words.next().ok_or(CommandParseError::Usage(USAGE))?)?;
                let state = words.next().ok_or(CommandParseError::Usage(USAGE))?;
                let state = NodeState::from_str(state)
                    .ok_or_else(|| CommandParseError::InvalidState(state.to_string()))?;
                Ok(ReplCommand::SetState(id, state))
            }
            "remove" | "rm" => {
                let id = words.next().ok_or(CommandParseError::Usage("remove <id>"))?;
                Ok(ReplCommand::Remove(parse_id(id)?))
            }
            "clear" => Ok(ReplCommand::Clear),
            "list" | "ls" => Ok(ReplCommand::List),
            "help" | "?" => Ok(ReplCommand::Help),
            "quit" | "exit" => Ok(ReplCommand::Quit),
            other => Err(CommandParseError::UnknownCommand(other.to_string())),
        }
    }
}

fn parse_id(s: &str) -> Result<NodeId, CommandParseError> {
    s.trim_start_matches('#')
        .parse()
        .map(NodeId)
        .map_err(|_| CommandParseError::InvalidId(s.to_string()))
}

fn parse_category(s: &str) -> Result<NodeCategory, CommandParseError> {
    match s.to_ascii_lowercase().as_str() {
        "camera" | "video" | "screen" => Ok(NodeCategory::VideoInput),
        "mic" | "microphone" => Ok(NodeCategory::AudioInput),
        "speaker" | "playback" => Ok(NodeCategory::AudioOutput),
        "none" => Ok(NodeCategory::None),
        other => match NodeCategory::from_name(other) {
            NodeCategory::None => Err(CommandParseError::InvalidCategory(s.to_string())),
            category => Ok(category),
        },
    }
}

/// The REPL's view of the world, published in full after each change
#[derive(Debug, Default)]
pub struct NodeTable {
    nodes: BTreeMap<NodeId, DeviceNode>,
}

impl NodeTable {
    /// Apply a mutating command; returns false for unknown node ids
    pub fn apply(&mut self, command: &ReplCommand) -> bool {
        match command {
            ReplCommand::Start { id, category, name } => {
                let mut node = DeviceNode::new(id.0, *category, NodeState::Running);
                node.application_name = name.clone();
                self.nodes.insert(*id, node);
                true
            }
            ReplCommand::Stop(id) => self.set_state(*id, NodeState::Idle),
            ReplCommand::SetState(id, state) => self.set_state(*id, *state),
            ReplCommand::Remove(id) => self.nodes.remove(id).is_some(),
            ReplCommand::Clear => {
                self.nodes.clear();
                true
            }
            ReplCommand::List | ReplCommand::Help | ReplCommand::Quit => false,
        }
    }

    fn set_state(&mut self, id: NodeId, state: NodeState) -> bool {
        match self.nodes.get_mut(&id) {
            Some(node) => {
                node.state = state;
                true
            }
            None => false,
        }
    }

    pub fn snapshot(&self) -> Vec<Arc<DeviceNode>> {
        self.nodes.values().cloned().map(Arc::new).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DeviceNode> {
        self.nodes.values()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Interactive node source backed by `rustyline`
#[derive(Default)]
pub struct ReplSource {
    table: NodeTable,
}

impl ReplSource {
    pub fn new() -> Self {
        Self::default()
    }

    fn print_help() {
        println!("{}", "Commands:".bold());
        println!("  {}  add a running node", "start <id> <type> [name]".cyan());
        println!("  {}                 pause a node", "stop <id>".cyan());
        println!("  {}        set a node's state", "state <id> <state>".cyan());
        println!("  {}               drop a node", "remove <id>".cyan());
        println!("  {}                     drop all nodes", "clear".cyan());
        println!("  {}                      show nodes and flags", "list".cyan());
        println!("  {}                      leave", "quit".cyan());
        println!("Types: camera, mic, speaker, none");
    }

    fn print_table(&self, monitor: &MonitorHandle) {
        if self.table.is_empty() {
            println!("{}", "(no nodes)".dimmed());
        }
        for node in self.table.iter() {
            let state = if node.state.is_active() {
                node.state.to_string().green()
            } else {
                node.state.to_string().yellow()
            };
            println!(
                "  {:>5}  {:<12} {:<10} {}",
                node.id.to_string(),
                node.category.to_string(),
                state,
                node.display_name()
            );
        }

        let flags = monitor.flags();
        println!(
            "  in use: camera={} mic={} speaker={}",
            flags.video_input, flags.audio_input, flags.audio_output
        );
    }
}

impl NodeSource for ReplSource {
    fn name(&self) -> &str {
        "repl"
    }

    fn run(mut self: Box<Self>, monitor: MonitorHandle) -> anyhow::Result<()> {
        let mut rl = DefaultEditor::new()?;
        println!("{}", "Privacy monitor REPL - type 'help' for commands".bold());

        loop {
            let line = match rl.readline("privacy> ") {
                Ok(line) => line,
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(e) => {
                    warn!("Readline error: {}", e);
                    break;
                }
            };

            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let _ = rl.add_history_entry(line);

            let command = match ReplCommand::parse(line) {
                Ok(command) => command,
                Err(e) => {
                    println!("{}", e.to_string().red());
                    continue;
                }
            };

            match command {
                ReplCommand::Quit => break,
                ReplCommand::Help => Self::print_help(),
                ReplCommand::List => self.print_table(&monitor),
                ref mutation => {
                    if !self.table.apply(mutation) {
                        println!("{}", "no such node".red());
                        continue;
                    }
                    if !monitor.is_alive() {
                        warn!("Monitor stopped, leaving REPL");
                        break;
                    }
                    debug!(?mutation, nodes = self.table.len(), "Publishing snapshot");
                    monitor.nodes_changed(&self.table.snapshot());
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_start_with_name() {
        assert_eq!(
            ReplCommand::parse("start 42 camera Video Call"),
            Ok(ReplCommand::Start {
                id: NodeId(42),
                category: NodeCategory::VideoInput,
                name: Some("Video Call".to_string()),
            })
        );
    }

    #[test]
    fn test_parse_start_accepts_config_names() {
        let cmd = ReplCommand::parse("START #7 audio-in").unwrap();
        assert_eq!(
            cmd,
            ReplCommand::Start {
                id: NodeId(7),
                category: NodeCategory::AudioInput,
                name: None,
            }
        );
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            ReplCommand::parse("start 1"),
            Err(CommandParseError::Usage("start <id> <type> [name]"))
        );
        assert_eq!(
            ReplCommand::parse("stop abc"),
            Err(CommandParseError::InvalidId("abc".to_string()))
        );
        assert_eq!(
            ReplCommand::parse("start 1 toaster"),
            Err(CommandParseError::InvalidCategory("toaster".to_string()))
        );
        assert_eq!(
            ReplCommand::parse("state 1 sleeping"),
            Err(CommandParseError::InvalidState("sleeping".to_string()))
        );
        assert!(matches!(
            ReplCommand::parse("dance"),
            Err(CommandParseError::UnknownCommand(_))
        ));
    }

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(ReplCommand::parse("ls"), Ok(ReplCommand::List));
        assert_eq!(ReplCommand::parse("clear"), Ok(ReplCommand::Clear));
        assert_eq!(ReplCommand::parse("exit"), Ok(ReplCommand::Quit));
        assert_eq!(ReplCommand::parse("rm 3"), Ok(ReplCommand::Remove(NodeId(3))));
        assert_eq!(
            ReplCommand::parse("state 3 Paused"),
            Ok(ReplCommand::SetState(NodeId(3), NodeState::Idle))
        );
    }

    #[test]
    fn test_table_mutations() {
        let mut table = NodeTable::default();
        assert!(table.apply(&ReplCommand::parse("start 2 mic Recorder").unwrap()));
        assert!(table.apply(&ReplCommand::parse("start 1 camera").unwrap()));

        // Snapshot is ordered by id
        let snapshot = table.snapshot();
        assert_eq!(snapshot[0].id, NodeId(1));
        assert_eq!(snapshot[1].display_name(), "Recorder");

        assert!(table.apply(&ReplCommand::Stop(NodeId(1))));
        assert_eq!(table.snapshot()[0].state, NodeState::Idle);

        assert!(!table.apply(&ReplCommand::Stop(NodeId(99))));
        assert!(!table.apply(&ReplCommand::Remove(NodeId(99))));

        assert!(table.apply(&ReplCommand::Remove(NodeId(2))));
        assert_eq!(table.len(), 1);

        assert!(table.apply(&ReplCommand::Clear));
        assert!(table.is_empty());
    }

    #[tokio::test]
    async fn test_table_snapshot_drives_monitor() {
        let monitor = MonitorHandle::spawn(
            &crate::config::PrivacyConfig::default(),
            crate::presentation::RecordingSink::new(),
        );

        let mut table = NodeTable::default();
        table.apply(&ReplCommand::parse("start 5 mic").unwrap());
        monitor.nodes_changed(&table.snapshot());
        assert!(monitor.flags().audio_input);

        table.apply(&ReplCommand::parse("state 5 suspended").unwrap());
        monitor.nodes_changed(&table.snapshot());
        assert!(!monitor.flags().any());
    }
}
