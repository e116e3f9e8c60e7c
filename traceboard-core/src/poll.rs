//! Adaptive cadence for the dashboard's trace list polling.
//!
//! The list refreshes fast while traces are appearing or changing and
//! backs off once consecutive refreshes keep observing the same
//! signal. [`PollCadence`] only does the bookkeeping; the caller owns
//! the timer and the fetch, so the policy is testable without any
//! clock.

use std::time::Duration;

/// Interval while the observed signal keeps changing.
pub const FAST_POLL_INTERVAL: Duration = Duration::from_millis(10_000);
/// Ceiling the interval grows toward while nothing changes.
pub const MAX_POLL_INTERVAL: Duration = Duration::from_millis(30_000);
/// Consecutive unchanged observations tolerated before backing off.
pub const STABLE_CYCLE_THRESHOLD: u32 = 3;

/// Tracks change across poll cycles and picks the delay before the
/// next one.
///
/// `S` is whatever cheap fingerprint of the data the caller can
/// produce. The dashboard uses the sorted list of trace ids, so a
/// trace appearing or disappearing registers as change while mere
/// step churn inside a trace does not.
#[derive(Debug, Clone)]
pub struct PollCadence<S> {
    last_signal: Option<S>,
    stable_cycles: u32,
    interval: Duration,
}

impl<S: PartialEq> PollCadence<S> {
    pub fn new() -> Self {
        Self {
            last_signal: None,
            stable_cycles: 0,
            interval: FAST_POLL_INTERVAL,
        }
    }

    /// Record the signal observed by the cycle that just finished and
    /// return the delay before the next one.
    ///
    /// The very first observation counts as a change. Once more than
    /// [`STABLE_CYCLE_THRESHOLD`] consecutive cycles see the same
    /// signal, the interval stretches by a third of the fast interval
    /// per stable cycle, capped at [`MAX_POLL_INTERVAL`]. Any change
    /// snaps straight back to [`FAST_POLL_INTERVAL`].
    pub fn observe(&mut self, signal: S) -> Duration {
        let unchanged = self.last_signal.as_ref() == Some(&signal);
        self.last_signal = Some(signal);

        if unchanged {
            self.stable_cycles += 1;
            if self.stable_cycles > STABLE_CYCLE_THRESHOLD {
                let base = FAST_POLL_INTERVAL.as_millis() as u64;
                let grown = base * (STABLE_CYCLE_THRESHOLD as u64 + u64::from(self.stable_cycles))
                    / STABLE_CYCLE_THRESHOLD as u64;
                self.interval = MAX_POLL_INTERVAL.min(Duration::from_millis(grown));
            }
        } else {
            self.stable_cycles = 0;
            self.interval = FAST_POLL_INTERVAL;
        }

        self.interval
    }

    /// Delay chosen by the most recent [`observe`](Self::observe).
    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn stable_cycles(&self) -> u32 {
        self.stable_cycles
    }

    /// Forget all history, as if no cycle had run yet.
    pub fn reset(&mut self) {
        self.last_signal = None;
        self.stable_cycles = 0;
        self.interval = FAST_POLL_INTERVAL;
    }
}

impl<S: PartialEq> Default for PollCadence<S> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_observation_starts_fast() {
        let mut cadence = PollCadence::new();
        assert_eq!(cadence.observe(vec!["t-1"]), FAST_POLL_INTERVAL);
        assert_eq!(cadence.stable_cycles(), 0);
    }

    #[test]
    fn test_stays_fast_within_threshold() {
        let mut cadence = PollCadence::new();
        cadence.observe("same");
        for _ in 0..STABLE_CYCLE_THRESHOLD {
            assert_eq!(cadence.observe("same"), FAST_POLL_INTERVAL);
        }
        assert_eq!(cadence.stable_cycles(), STABLE_CYCLE_THRESHOLD);
    }

    #[test]
    fn test_backoff_grows_monotonically_to_cap() {
        let mut cadence = PollCadence::new();
        cadence.observe("same");

        let mut previous = FAST_POLL_INTERVAL;
        for _ in 0..10 {
            let next = cadence.observe("same");
            assert!(next >= previous, "interval shrank from {previous:?} to {next:?}");
            assert!(next <= MAX_POLL_INTERVAL);
            previous = next;
        }
        assert_eq!(previous, MAX_POLL_INTERVAL);
    }

    #[test]
    fn test_backoff_steps_match_policy() {
        let mut cadence = PollCadence::new();
        // First observation plus three stable cycles stay fast.
        cadence.observe("same");
        cadence.observe("same");
        cadence.observe("same");
        assert_eq!(cadence.observe("same"), FAST_POLL_INTERVAL);
        // Growth begins on the cycle after the threshold.
        assert_eq!(cadence.observe("same"), Duration::from_millis(23_333));
        assert_eq!(cadence.observe("same"), Duration::from_millis(26_666));
        assert_eq!(cadence.observe("same"), MAX_POLL_INTERVAL);
        assert_eq!(cadence.observe("same"), MAX_POLL_INTERVAL);
    }

    #[test]
    fn test_change_snaps_back_to_fast() {
        let mut cadence = PollCadence::new();
        for _ in 0..8 {
            cadence.observe("same");
        }
        assert_eq!(cadence.interval(), MAX_POLL_INTERVAL);

        assert_eq!(cadence.observe("different"), FAST_POLL_INTERVAL);
        assert_eq!(cadence.stable_cycles(), 0);
    }

    #[test]
    fn test_alternating_signals_never_back_off() {
        let mut cadence = PollCadence::new();
        for i in 0..12 {
            let signal = if i % 2 == 0 { "a" } else { "b" };
            assert_eq!(cadence.observe(signal), FAST_POLL_INTERVAL);
        }
    }

    #[test]
    fn test_reset_clears_history() {
        let mut cadence = PollCadence::new();
        for _ in 0..8 {
            cadence.observe("same");
        }
        cadence.reset();
        assert_eq!(cadence.interval(), FAST_POLL_INTERVAL);
        // After a reset the old signal counts as a fresh first sighting.
        assert_eq!(cadence.observe("same"), FAST_POLL_INTERVAL);
        assert_eq!(cadence.stable_cycles(), 0);
    }
}
