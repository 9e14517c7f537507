//! Generation-tracked hide timer
//!
//! The debouncer never cancels a scheduled callback. Instead every armed timer
//! carries a token stamped with a generation number, and a fire is honoured
//! only if its token is still the pending one. Arming bumps the generation, so
//! a late fire of an older timer can never match.

use tokio::time::Instant;

/// Identifies one armed hide timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerToken {
    generation: u64,
}

impl TimerToken {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// A hide timer the host must schedule
///
/// When `deadline` is reached the host hands `token` back to the debouncer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HideTimer {
    pub token: TimerToken,
    pub deadline: Instant,
}

/// Holds at most one pending timer token
#[derive(Debug, Default)]
pub(crate) struct TimerSlot {
    generation: u64,
    pending: Option<TimerToken>,
}

impl TimerSlot {
    /// Arm a new timer, invalidating any previous one
    pub(crate) fn arm(&mut self) -> TimerToken {
        self.generation += 1;
        let token = TimerToken {
            generation: self.generation,
        };
        self.pending = Some(token);
        token
    }

    /// Forget the pending timer; its eventual fire becomes stale
    pub(crate) fn cancel(&mut self) -> Option<TimerToken> {
        self.pending.take()
    }

    /// Consume the pending timer if `token` is the current one
    pub(crate) fn take_if_current(&mut self, token: TimerToken) -> bool {
        if self.pending == Some(token) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    pub(crate) fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arm_and_fire() {
        let mut slot = TimerSlot::default();
        let token = slot.arm();
        assert!(slot.is_pending());
        assert!(slot.take_if_current(token));
        assert!(!slot.is_pending());

        // Second fire of the same token is stale
        assert!(!slot.take_if_current(token));
    }

    #[test]
    fn test_rearm_invalidates_previous() {
        let mut slot = TimerSlot::default();
        let first = slot.arm();
        let second = slot.arm();
        assert_ne!(first, second);
        assert!(second.generation() > first.generation());

        assert!(!slot.take_if_current(first));
        assert!(slot.take_if_current(second));
    }

    #[test]
    fn test_cancel_makes_fire_stale() {
        let mut slot = TimerSlot::default();
        let token = slot.arm();
        assert_eq!(slot.cancel(), Some(token));
        assert!(!slot.take_if_current(token));
        assert_eq!(slot.cancel(), None);
    }
}
