#![forbid(unsafe_code)]

//! Single-page-app route change detection.
//!
//! SPA hosts switch conversations without reloading, so no page-lifecycle
//! event fires. The host binding wraps `history.pushState` /
//! `history.replaceState` and listens for `popstate`; each call lands here and
//! schedules one reconciliation after a delay long enough for the host to
//! commit the new route.

use core::fmt;
use core::time::Duration;
use std::collections::VecDeque;

/// A history API entry point observed on the host page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HistorySignal {
    PushState,
    ReplaceState,
    /// Back/forward navigation.
    PopState,
}

impl HistorySignal {
    /// `History` methods that must be wrapped to observe route changes.
    pub const WRAPPED: [HistorySignal; 2] = [Self::PushState, Self::ReplaceState];

    /// Name of the wrapped `History` method, if this signal comes from one.
    #[must_use]
    pub const fn method_name(self) -> Option<&'static str> {
        match self {
            Self::PushState => Some("pushState"),
            Self::ReplaceState => Some("replaceState"),
            Self::PopState => None,
        }
    }
}

impl fmt::Display for HistorySignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::PushState => "pushState",
            Self::ReplaceState => "replaceState",
            Self::PopState => "popstate",
        })
    }
}

/// Turns every history signal into its own delayed reconciliation.
///
/// Deadlines are queued in arrival order. A burst of route changes still
/// gets a pass `delay` after the last one, so the final route is always
/// reconciled after the host has committed it.
#[derive(Debug, Clone)]
pub struct NavigationInterceptor {
    delay: Duration,
    pending: VecDeque<Duration>,
    last: Option<HistorySignal>,
    observed: u64,
    fired: u64,
}

impl NavigationInterceptor {
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: VecDeque::new(),
            last: None,
            observed: 0,
            fired: 0,
        }
    }

    /// Record a signal and schedule one reconciliation for it.
    pub fn record(&mut self, signal: HistorySignal, now: Duration) {
        self.observed += 1;
        self.last = Some(signal);
        let deadline = now.saturating_add(self.delay);
        // Host time is monotonic; keep the queue ordered regardless.
        let at = self.pending.partition_point(|&queued| queued <= deadline);
        self.pending.insert(at, deadline);
    }

    /// Drain every deadline that has passed. Returns whether any did; the
    /// caller runs one reconciliation for the batch.
    pub fn fire_if_due(&mut self, now: Duration) -> bool {
        let mut due = false;
        while self.pending.front().is_some_and(|&deadline| deadline <= now) {
            self.pending.pop_front();
            self.fired += 1;
            due = true;
        }
        due
    }

    /// Earliest pending deadline.
    #[must_use]
    pub fn deadline(&self) -> Option<Duration> {
        self.pending.front().copied()
    }

    /// Signals still waiting for their pass.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub const fn last_signal(&self) -> Option<HistorySignal> {
        self.last
    }

    #[must_use]
    pub const fn observed(&self) -> u64 {
        self.observed
    }

    /// Deadlines that have fired.
    #[must_use]
    pub const fn fired(&self) -> u64 {
        self.fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_signal_gets_its_own_delayed_pass() {
        let mut nav = NavigationInterceptor::new(Duration::from_millis(500));
        nav.record(HistorySignal::PushState, Duration::from_millis(100));
        nav.record(HistorySignal::ReplaceState, Duration::from_millis(150));

        assert_eq!(nav.deadline(), Some(Duration::from_millis(600)));
        assert_eq!(nav.pending(), 2);
        assert!(!nav.fire_if_due(Duration::from_millis(599)));
        assert!(nav.fire_if_due(Duration::from_millis(600)));
        assert_eq!(nav.deadline(), Some(Duration::from_millis(650)));
        assert!(!nav.fire_if_due(Duration::from_millis(649)));
        assert!(nav.fire_if_due(Duration::from_millis(650)));
        assert_eq!(nav.deadline(), None);
        assert!(!nav.fire_if_due(Duration::from_millis(700)));
        assert_eq!(nav.observed(), 2);
        assert_eq!(nav.fired(), 2);
        assert_eq!(nav.last_signal(), Some(HistorySignal::ReplaceState));
    }

    #[test]
    fn late_wakeup_drains_every_due_deadline_at_once() {
        let mut nav = NavigationInterceptor::new(Duration::from_millis(500));
        nav.record(HistorySignal::PushState, Duration::ZERO);
        nav.record(HistorySignal::PopState, Duration::from_millis(10));
        nav.record(HistorySignal::PushState, Duration::from_millis(900));

        assert!(nav.fire_if_due(Duration::from_millis(1_000)));
        assert_eq!(nav.pending(), 1);
        assert_eq!(nav.deadline(), Some(Duration::from_millis(1_400)));
    }

    #[test]
    fn only_history_methods_are_wrapped() {
        assert_eq!(HistorySignal::PushState.method_name(), Some("pushState"));
        assert_eq!(HistorySignal::PopState.method_name(), None);
        assert!(
            HistorySignal::WRAPPED
                .iter()
                .all(|signal| signal.method_name().is_some())
        );
    }
}
