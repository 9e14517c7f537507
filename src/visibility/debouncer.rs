//! Visibility debouncer - delays the container hide so indicator animations
//! can finish before the whole container disappears
//!
//! ```text
//!            flags active                      flags inactive
//!   Hidden ───────────────► Visible ─────────────────────────► PendingHide
//!     ▲                       ▲  ▲                                 │   │
//!     │                       │  └──── flags active (cancel) ──────┘   │
//!     └──── timer fires, flags still inactive ─────────────────────────┘
//! ```
//!
//! The debouncer is driven entirely by its caller: it never sleeps and never
//! spawns. Arming a hide returns a [`HideTimer`] the host schedules; when the
//! deadline passes the host hands the token back through
//! [`VisibilityDebouncer::on_timer_fire`] together with freshly read flags.

use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, trace};

use super::timer::{HideTimer, TimerSlot, TimerToken};
use crate::config::PrivacyConfig;
use crate::nodes::{AggregateFlags, NodeCategory};
use crate::presentation::PresentationSink;

/// Container visibility state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibilityState {
    /// Container hidden, nothing in use
    Hidden,
    /// Nothing in use any more, hide scheduled
    PendingHide,
    /// Container shown
    Visible,
}

/// Debounced container visibility arbiter
///
/// Owned by a single cooperative context; not shared across threads.
#[derive(Debug)]
pub struct VisibilityDebouncer {
    state: VisibilityState,
    /// Categories with an indicator; the only ones that count as "active"
    tracked: Vec<NodeCategory>,
    transition_duration: Duration,
    timer: TimerSlot,
}

impl VisibilityDebouncer {
    /// Create a debouncer in the `Hidden` state
    pub fn new(tracked: Vec<NodeCategory>, transition_duration: Duration) -> Self {
        Self {
            state: VisibilityState::Hidden,
            tracked,
            transition_duration,
            timer: TimerSlot::default(),
        }
    }

    /// Create a debouncer from the configuration
    pub fn from_config(config: &PrivacyConfig) -> Self {
        Self::new(
            config.tracked_categories(),
            Duration::from_millis(config.transition_duration),
        )
    }

    /// Start as `Visible`, for hosts that render the container before the
    /// first snapshot arrives
    pub fn starting_visible(mut self) -> Self {
        self.state = VisibilityState::Visible;
        self
    }

    pub fn state(&self) -> VisibilityState {
        self.state
    }

    pub fn tracked(&self) -> &[NodeCategory] {
        &self.tracked
    }

    pub fn transition_duration(&self) -> Duration {
        self.transition_duration
    }

    /// Whether a hide timer is armed and not yet fired or cancelled
    pub fn has_pending_hide(&self) -> bool {
        self.timer.is_pending()
    }

    /// Replace tracked categories and hide delay
    ///
    /// A pending hide keeps its original deadline; the new duration applies
    /// to the next arm. Callers should recompute afterwards.
    pub fn reconfigure(&mut self, config: &PrivacyConfig) {
        self.tracked = config.tracked_categories();
        self.transition_duration = Duration::from_millis(config.transition_duration);
        debug!(
            tracked = ?self.tracked,
            "Debouncer reconfigured (transition {:?})",
            self.transition_duration
        );
    }

    /// Recompute visibility after the aggregate flags may have changed
    ///
    /// Emits one indicator update per tracked category, then decides the
    /// container transition. Returns the hide timer to schedule, if one was
    /// armed by this call.
    pub fn on_flags_changed<S>(
        &mut self,
        flags: AggregateFlags,
        now: Instant,
        sink: &mut S,
    ) -> Option<HideTimer>
    where
        S: PresentationSink + ?Sized,
    {
        for category in &self.tracked {
            sink.set_category_active(*category, flags.get(*category));
        }

        let active = flags.any_of(&self.tracked);
        trace!(?flags, active, state = ?self.state, "Recomputing visibility");

        match (self.state, active) {
            (VisibilityState::Hidden | VisibilityState::PendingHide, true) => {
                if let Some(token) = self.timer.cancel() {
                    debug!("Reactivated, cancelling pending hide (gen {})", token.generation());
                }
                self.state = VisibilityState::Visible;
                debug!("Container → visible");
                sink.set_container_visible(true);
                None
            }
            (VisibilityState::Visible, false) => {
                let token = self.timer.arm();
                let deadline = now + self.transition_duration;
                self.state = VisibilityState::PendingHide;
                debug!(
                    "Nothing in use, hiding in {:?} (gen {})",
                    self.transition_duration,
                    token.generation()
                );
                Some(HideTimer { token, deadline })
            }
            // Single-shot window: repeated inactive updates do not re-arm.
            (VisibilityState::PendingHide, false)
            | (VisibilityState::Hidden, false)
            | (VisibilityState::Visible, true) => None,
        }
    }

    /// Handle an elapsed hide timer
    ///
    /// `flags` must be read at fire time, not captured when the timer was
    /// armed. Returns true if the container was hidden.
    pub fn on_timer_fire<S>(&mut self, token: TimerToken, flags: AggregateFlags, sink: &mut S) -> bool
    where
        S: PresentationSink + ?Sized,
    {
        if !self.timer.take_if_current(token) {
            trace!("Ignoring stale hide timer (gen {})", token.generation());
            return false;
        }

        if flags.any_of(&self.tracked) {
            // The container was never hidden, so it is simply visible again.
            debug!(
                "Hide timer fired but something is in use (gen {})",
                token.generation()
            );
            self.state = VisibilityState::Visible;
            return false;
        }

        self.state = VisibilityState::Hidden;
        debug!("Container → hidden (gen {})", token.generation());
        sink.set_container_visible(false);
        true
    }
}
