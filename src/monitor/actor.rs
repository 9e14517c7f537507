//! MonitorActor - owns the debouncer and the presentation sink
//!
//! All visibility decisions happen on this single task, so the debouncer
//! needs no locking. The backend thread only touches the shared
//! [`NodeClassifier`] and then posts [`MonitorCommand::FlagsChanged`].
//!
//! ```text
//!  backend thread                      monitor task
//!  ──────────────                      ────────────
//!  rebuild(snapshot) ──┐
//!  (write lock)        │ FlagsChanged  ┌──────────────────────────┐
//!                      └─────────────► │ snapshot_flags() (read)  │
//!                                      │ debouncer.on_flags_changed│──► sink
//!  hide timer task ───── TimerFired ─► │ debouncer.on_timer_fire  │──► sink
//!                                      └──────────────────────────┘
//! ```

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info, trace};

use super::actor_handle::MonitorHandle;
use super::commands::MonitorCommand;
use crate::config::PrivacyConfig;
use crate::nodes::NodeClassifier;
use crate::presentation::PresentationSink;
use crate::visibility::{HideTimer, VisibilityDebouncer};

pub struct MonitorActor {
    /// Buckets shared with the backend thread
    classifier: Arc<NodeClassifier>,
    /// Visibility state machine, owned exclusively by this task
    debouncer: VisibilityDebouncer,
    /// Presentation layer receiving transitions
    sink: Box<dyn PresentationSink>,
    /// Receiver for incoming commands
    command_rx: mpsc::UnboundedReceiver<MonitorCommand>,
    /// Used by timer tasks to post fires back; weak so handles alone keep
    /// the actor alive
    timer_tx: mpsc::WeakUnboundedSender<MonitorCommand>,
    /// Counter for tracking recomputes processed
    recompute_count: u64,
}

impl MonitorActor {
    /// Spawn a monitor starting in the `Hidden` state
    pub fn spawn<S>(config: &PrivacyConfig, sink: S) -> MonitorHandle
    where
        S: PresentationSink + 'static,
    {
        Self::spawn_with_debouncer(config, VisibilityDebouncer::from_config(config), sink)
    }

    /// Spawn a monitor around a pre-built debouncer (e.g. one starting visible)
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn_with_debouncer<S>(
        config: &PrivacyConfig,
        debouncer: VisibilityDebouncer,
        sink: S,
    ) -> MonitorHandle
    where
        S: PresentationSink + 'static,
    {
        let (cmd_tx, command_rx) = mpsc::unbounded_channel();
        let classifier = Arc::new(NodeClassifier::new());

        let mut sink: Box<dyn PresentationSink> = Box::new(sink);
        sink.configure(config);

        let actor = MonitorActor {
            classifier: Arc::clone(&classifier),
            debouncer,
            sink,
            command_rx,
            timer_tx: cmd_tx.downgrade(),
            recompute_count: 0,
        };

        info!(
            "Monitor spawned (tracking {:?}, transition {:?}, sink '{}')",
            actor.debouncer.tracked(),
            actor.debouncer.transition_duration(),
            actor.sink.name()
        );

        tokio::spawn(actor.run());

        MonitorHandle::new(cmd_tx, classifier)
    }

    /// Main run loop for the actor
    ///
    /// Processes commands until the channel closes or `Shutdown` arrives.
    async fn run(mut self) {
        debug!("Monitor run loop started");

        while let Some(cmd) = self.command_rx.recv().await {
            trace!(?cmd, "Processing command");

            match cmd {
                MonitorCommand::FlagsChanged => self.recompute(),
                MonitorCommand::TimerFired(token) => {
                    // Re-read at fire time; the buckets may have changed since arming.
                    let flags = self.classifier.snapshot_flags();
                    self.debouncer.on_timer_fire(token, flags, &mut *self.sink);
                }
                MonitorCommand::Reconfigure(config) => {
                    self.debouncer.reconfigure(&config);
                    self.sink.configure(&config);
                    self.recompute();
                }
                MonitorCommand::GetVisibility { response } => {
                    let _ = response.send(self.debouncer.state());
                }
                MonitorCommand::Shutdown => {
                    info!("Monitor shutting down");
                    break;
                }
            }
        }

        info!(
            "Monitor stopped (total recomputes: {})",
            self.recompute_count
        );
    }

    fn recompute(&mut self) {
        self.recompute_count += 1;

        // The read lock is released here, before any sink call.
        let flags = self.classifier.snapshot_flags();

        if let Some(timer) = self
            .debouncer
            .on_flags_changed(flags, Instant::now(), &mut *self.sink)
        {
            self.schedule(timer);
        }
    }

    fn schedule(&self, timer: HideTimer) {
        let Some(tx) = self.timer_tx.upgrade() else {
            debug!("Monitor closing, not scheduling hide timer");
            return;
        };

        tokio::spawn(async move {
            tokio::time::sleep_until(timer.deadline).await;
            // The actor may be gone by now; a lost fire is harmless then.
            let _ = tx.send(MonitorCommand::TimerFired(timer.token));
        });
    }
}
