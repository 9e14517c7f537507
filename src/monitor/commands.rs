//! Command enum for the monitor actor
//!
//! Hot-path commands are fire-and-forget; queries carry a oneshot channel for
//! the response.

use tokio::sync::oneshot;

use crate::config::PrivacyConfig;
use crate::visibility::{TimerToken, VisibilityState};

/// Commands processed sequentially by the monitor actor
#[derive(Debug)]
pub enum MonitorCommand {
    // -------------------------------------------------------------------------
    // Hot path commands (no response - fire and forget)
    // -------------------------------------------------------------------------
    /// The buckets were rebuilt; recompute from their current contents
    ///
    /// Carries no flags on purpose: the actor reads them when it gets to the
    /// command, so a backlog of updates always settles on the latest state.
    FlagsChanged,

    /// A previously armed hide timer reached its deadline
    TimerFired(TimerToken),

    /// Replace tracked categories, hide delay and sink cosmetics
    Reconfigure(PrivacyConfig),

    // -------------------------------------------------------------------------
    // Request-response commands
    // -------------------------------------------------------------------------
    /// Current container visibility state
    ///
    /// Also serves as a barrier: the response is sent only after every
    /// command queued before it has been processed.
    GetVisibility {
        response: oneshot::Sender<VisibilityState>,
    },

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------
    /// Stop the actor
    Shutdown,
}
