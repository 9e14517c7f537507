//! Debounced container visibility
//!
//! Turns aggregate "in use" flags into indicator updates and a container
//! show/hide signal whose hide is delayed by the configured transition
//! duration.

mod debouncer;
mod timer;

pub use debouncer::{VisibilityDebouncer, VisibilityState};
pub use timer::{HideTimer, TimerToken};
