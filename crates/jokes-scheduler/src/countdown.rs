use std::time::Duration;

use crate::error::{Result, SchedulerError};

/// Result of a single tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Still counting down; carries the new remaining value.
    Counting(Duration),
    /// Reached zero on this tick. The countdown has already been reset.
    Expired,
}

/// Countdown state machine: {COUNTING, EXPIRING} folded into one `tick`.
///
/// Decrement and reset happen in the same call, so a caller that serialises
/// ticks (the engine holds a lock) can never observe zero twice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Countdown {
    remaining: Duration,
    interval: Duration,
    tick: Duration,
}

impl Countdown {
    /// `initial` above `interval` is clamped down to `interval`.
    pub fn new(initial: Duration, interval: Duration, tick: Duration) -> Result<Self> {
        if tick.is_zero() {
            return Err(SchedulerError::InvalidTick(tick));
        }
        if interval.is_zero() {
            return Err(SchedulerError::InvalidInterval(interval));
        }
        Ok(Self {
            remaining: initial.min(interval),
            interval,
            tick,
        })
    }

    pub fn tick(&mut self) -> TickOutcome {
        self.remaining = self.remaining.saturating_sub(self.tick);
        if self.remaining.is_zero() {
            self.remaining = self.interval;
            TickOutcome::Expired
        } else {
            TickOutcome::Counting(self.remaining)
        }
    }

    pub fn remaining(&self) -> Duration {
        self.remaining
    }

    /// Remaining value in whole milliseconds, the unit used for persistence.
    pub fn remaining_ms(&self) -> u64 {
        duration_ms(self.remaining)
    }
}

/// Whole milliseconds, saturating at `u64::MAX`.
pub fn duration_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn ticks_until_expiry(cd: &mut Countdown) -> usize {
        let mut n = 0;
        loop {
            n += 1;
            if cd.tick() == TickOutcome::Expired {
                return n;
            }
        }
    }

    #[test]
    fn full_interval_expires_on_fifth_tick() {
        let mut cd = Countdown::new(ms(5000), ms(5000), ms(1000)).unwrap();
        assert_eq!(ticks_until_expiry(&mut cd), 5);
        assert_eq!(cd.remaining(), ms(5000));
    }

    #[test]
    fn partial_tick_clamps_to_zero() {
        // 1200 -> 200 -> clamps to 0 and expires
        let mut cd = Countdown::new(ms(1200), ms(5000), ms(1000)).unwrap();
        assert_eq!(cd.tick(), TickOutcome::Counting(ms(200)));
        assert_eq!(cd.tick(), TickOutcome::Expired);
        assert_eq!(cd.remaining(), ms(5000));
    }

    #[test]
    fn zero_remaining_expires_on_first_tick() {
        let mut cd = Countdown::new(Duration::ZERO, ms(5000), ms(1000)).unwrap();
        assert_eq!(cd.tick(), TickOutcome::Expired);
    }

    #[test]
    fn one_expiry_per_crossing() {
        let mut cd = Countdown::new(ms(3000), ms(3000), ms(1000)).unwrap();
        let expiries = (0..9).filter(|_| cd.tick() == TickOutcome::Expired).count();
        assert_eq!(expiries, 3);
    }

    #[test]
    fn every_multiple_of_tick_expires_once() {
        for d in (1000..=5000).step_by(1000) {
            let mut cd = Countdown::new(ms(d), ms(5000), ms(1000)).unwrap();
            let expiries = (0..d / 1000)
                .filter(|_| cd.tick() == TickOutcome::Expired)
                .count();
            assert_eq!(expiries, 1, "d = {d}");
        }
    }

    #[test]
    fn initial_above_interval_is_clamped() {
        let cd = Countdown::new(ms(90_000), ms(5000), ms(1000)).unwrap();
        assert_eq!(cd.remaining(), ms(5000));
    }

    #[test]
    fn duration_ms_saturates() {
        assert_eq!(duration_ms(ms(1200)), 1200);
        assert_eq!(duration_ms(Duration::MAX), u64::MAX);
    }

    #[test]
    fn zero_tick_rejected() {
        assert!(matches!(
            Countdown::new(ms(10), ms(10), Duration::ZERO),
            Err(SchedulerError::InvalidTick(_))
        ));
        assert!(matches!(
            Countdown::new(ms(10), Duration::ZERO, ms(1)),
            Err(SchedulerError::InvalidInterval(_))
        ));
    }
}
