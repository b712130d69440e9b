//! Single-shot deferred action with cancel/restart semantics.
//!
//! Backs the debounced content save and the auto-hiding "saved" notice.
//! Callers pass the current instant in; nothing here spawns threads or
//! sleeps, so the owner decides when time advances.
//!
//! # Invariants
//! - At most one firing is pending at a time.
//! - `start` replaces any pending deadline.
//! - A pending action fires at most once.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct DeferredAction {
    delay: Duration,
    deadline: Option<Instant>,
}

impl DeferredAction {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Arms the action to fire `delay` after `now`, dropping any earlier deadline.
    pub fn start(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Time left until the pending firing, if any.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.deadline.map(|deadline| deadline.saturating_duration_since(now))
    }

    /// Returns `true` once when the deadline has been reached, then disarms.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Disarms and reports whether a firing was pending, for flushing early.
    pub fn take_pending(&mut self) -> bool {
        self.deadline.take().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::DeferredAction;
    use std::time::{Duration, Instant};

    const DELAY: Duration = Duration::from_millis(500);

    #[test]
    fn does_not_fire_before_deadline() {
        let start = Instant::now();
        let mut action = DeferredAction::new(DELAY);
        action.start(start);

        assert!(!action.fire_if_due(start + Duration::from_millis(499)));
        assert!(action.is_pending());
        assert!(action.fire_if_due(start + DELAY));
    }

    #[test]
    fn fires_only_once() {
        let start = Instant::now();
        let mut action = DeferredAction::new(DELAY);
        action.start(start);

        assert!(action.fire_if_due(start + Duration::from_secs(2)));
        assert!(!action.fire_if_due(start + Duration::from_secs(3)));
        assert!(!action.is_pending());
    }

    #[test]
    fn restart_pushes_deadline_back() {
        let start = Instant::now();
        let mut action = DeferredAction::new(DELAY);
        action.start(start);
        action.start(start + Duration::from_millis(400));

        assert!(!action.fire_if_due(start + Duration::from_millis(600)));
        assert_eq!(
            action.remaining(start + Duration::from_millis(600)),
            Some(Duration::from_millis(300))
        );
        assert!(action.fire_if_due(start + Duration::from_millis(900)));
    }

    #[test]
    fn cancel_and_take_pending_disarm() {
        let start = Instant::now();
        let mut action = DeferredAction::new(DELAY);

        action.start(start);
        action.cancel();
        assert!(!action.fire_if_due(start + DELAY));

        assert!(!action.take_pending());
        action.start(start);
        assert!(action.take_pending());
        assert_eq!(action.remaining(start), None);
    }
}
