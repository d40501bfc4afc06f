#![forbid(unsafe_code)]

//! Host-clocked one-shot and periodic timers.
//!
//! The navigator never sleeps or spawns. The host supplies a monotonic `now`
//! (time since boot) and calls back in whenever a deadline may have passed;
//! these types decide whether anything is due.
//!
//! # Invariants
//!
//! - A [`DelayedTrigger`] is either idle or holds exactly one deadline.
//! - Arming while pending never pushes the deadline later (bounded latency).
//! - Firing returns the trigger to idle; each arm fires at most once.

use core::time::Duration;

/// Lifecycle of a [`DelayedTrigger`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TriggerState {
    #[default]
    Idle,
    Pending {
        deadline: Duration,
    },
}

/// One-shot delayed trigger with coalescing: `idle → pending → fire → idle`.
#[derive(Debug, Clone)]
pub struct DelayedTrigger {
    delay: Duration,
    state: TriggerState,
    fired: u64,
    coalesced: u64,
}

impl DelayedTrigger {
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self {
            delay,
            state: TriggerState::Idle,
            fired: 0,
            coalesced: 0,
        }
    }

    /// Arm with the default delay. Returns `true` if the trigger was idle.
    pub fn arm(&mut self, now: Duration) -> bool {
        self.arm_in(now, self.delay)
    }

    /// Arm with an explicit delay. An already pending trigger keeps the
    /// earlier of the two deadlines.
    pub fn arm_in(&mut self, now: Duration, delay: Duration) -> bool {
        let wanted = now.saturating_add(delay);
        match self.state {
            TriggerState::Idle => {
                self.state = TriggerState::Pending { deadline: wanted };
                true
            }
            TriggerState::Pending { deadline } => {
                self.coalesced += 1;
                if wanted < deadline {
                    self.state = TriggerState::Pending { deadline: wanted };
                }
                false
            }
        }
    }

    /// Fire if the deadline has passed, returning to idle.
    pub fn fire_if_due(&mut self, now: Duration) -> bool {
        match self.state {
            TriggerState::Pending { deadline } if now >= deadline => {
                self.state = TriggerState::Idle;
                self.fired += 1;
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) {
        self.state = TriggerState::Idle;
    }

    #[must_use]
    pub const fn state(&self) -> TriggerState {
        self.state
    }

    #[must_use]
    pub const fn deadline(&self) -> Option<Duration> {
        match self.state {
            TriggerState::Idle => None,
            TriggerState::Pending { deadline } => Some(deadline),
        }
    }

    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self.state, TriggerState::Pending { .. })
    }

    /// Number of times this trigger has fired.
    #[must_use]
    pub const fn fired(&self) -> u64 {
        self.fired
    }

    /// Number of arms absorbed by an already pending deadline.
    #[must_use]
    pub const fn coalesced(&self) -> u64 {
        self.coalesced
    }
}

/// Fixed-interval ticker. Never cancelled once started.
#[derive(Debug, Clone)]
pub struct Ticker {
    interval: Duration,
    next: Duration,
}

impl Ticker {
    /// Start ticking; the first tick is one interval after `now`.
    #[must_use]
    pub fn start(interval: Duration, now: Duration) -> Self {
        Self {
            interval,
            next: now.saturating_add(interval),
        }
    }

    /// Whether a tick is due. Late ticks collapse into one; the schedule
    /// restarts from `now`.
    pub fn due(&mut self, now: Duration) -> bool {
        if now >= self.next {
            self.next = now.saturating_add(self.interval);
            true
        } else {
            false
        }
    }

    /// Record a tick delivered by the host's own interval timer.
    pub fn rearm(&mut self, now: Duration) {
        self.next = now.saturating_add(self.interval);
    }

    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    #[must_use]
    pub const fn next(&self) -> Duration {
        self.next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn idle_pending_fire_idle() {
        let mut trigger = DelayedTrigger::new(ms(50));
        assert_eq!(trigger.state(), TriggerState::Idle);
        assert!(!trigger.fire_if_due(ms(1000)));

        assert!(trigger.arm(ms(10)));
        assert_eq!(trigger.deadline(), Some(ms(60)));
        assert!(!trigger.fire_if_due(ms(59)));
        assert!(trigger.fire_if_due(ms(60)));
        assert_eq!(trigger.state(), TriggerState::Idle);
        assert!(!trigger.fire_if_due(ms(61)));
        assert_eq!(trigger.fired(), 1);
    }

    #[test]
    fn burst_coalesces_into_first_deadline() {
        let mut trigger = DelayedTrigger::new(ms(50));
        assert!(trigger.arm(ms(0)));
        assert!(!trigger.arm(ms(20)));
        assert!(!trigger.arm(ms(40)));
        assert_eq!(trigger.deadline(), Some(ms(50)));
        assert_eq!(trigger.coalesced(), 2);
        assert!(trigger.fire_if_due(ms(50)));
        assert_eq!(trigger.fired(), 1);
    }

    #[test]
    fn earlier_explicit_deadline_wins() {
        let mut trigger = DelayedTrigger::new(ms(2000));
        trigger.arm(ms(0));
        trigger.arm_in(ms(100), ms(300));
        assert_eq!(trigger.deadline(), Some(ms(400)));
        trigger.arm_in(ms(200), ms(5000));
        assert_eq!(trigger.deadline(), Some(ms(400)));
    }

    #[test]
    fn cancel_returns_to_idle() {
        let mut trigger = DelayedTrigger::new(ms(5));
        trigger.arm(ms(0));
        trigger.cancel();
        assert!(!trigger.is_pending());
        assert!(!trigger.fire_if_due(ms(100)));
    }

    #[test]
    fn ticker_collapses_late_ticks() {
        let mut ticker = Ticker::start(ms(1500), ms(0));
        assert!(!ticker.due(ms(1499)));
        assert!(ticker.due(ms(1500)));
        assert!(!ticker.due(ms(2000)));
        // Host was suspended for several intervals: one tick, not five.
        assert!(ticker.due(ms(9000)));
        assert!(!ticker.due(ms(9001)));
        assert_eq!(ticker.next(), ms(10_500));
    }
}
