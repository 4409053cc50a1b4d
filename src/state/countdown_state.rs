//! Countdown deadline and remaining-time decomposition

use chrono::{DateTime, Days, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::config::RolloverPolicy;

pub const MS_PER_DAY: i64 = 86_400_000;
pub const MS_PER_HOUR: i64 = 3_600_000;
pub const MS_PER_MINUTE: i64 = 60_000;
pub const MS_PER_SECOND: i64 = 1_000;

/// Time left until the deadline, split into display units
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemainingDuration {
    pub days: u64,
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
}

impl RemainingDuration {
    /// Decompose a millisecond distance; `None` when the distance is negative
    pub fn from_millis(distance: i64) -> Option<Self> {
        if distance < 0 {
            return None;
        }

        Some(Self {
            days: (distance / MS_PER_DAY) as u64,
            hours: ((distance % MS_PER_DAY) / MS_PER_HOUR) as u32,
            minutes: ((distance % MS_PER_HOUR) / MS_PER_MINUTE) as u32,
            seconds: ((distance % MS_PER_MINUTE) / MS_PER_SECOND) as u32,
        })
    }

    /// Whole seconds represented by this value
    pub fn total_seconds(&self) -> u64 {
        self.days * 86_400
            + u64::from(self.hours) * 3_600
            + u64::from(self.minutes) * 60
            + u64::from(self.seconds)
    }
}

/// Last millisecond of the day `days` after `now`, in `now`'s offset
pub fn end_of_day_after(now: DateTime<FixedOffset>, days: u64) -> DateTime<FixedOffset> {
    let shifted = now.checked_add_days(Days::new(days)).unwrap_or(now);
    shifted
        .date_naive()
        .and_hms_milli_opt(23, 59, 59, 999)
        .and_then(|naive| naive.and_local_timezone(*now.offset()).single())
        .unwrap_or(shifted)
}

/// Result of a single countdown tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// The readout was recomputed
    Updated(RemainingDuration),
    /// The deadline had passed and was pushed forward; the readout is untouched
    RolledOver { deadline: DateTime<FixedOffset> },
}

/// Countdown towards a day-end deadline
#[derive(Debug, Clone, PartialEq)]
pub struct CountdownState {
    deadline: DateTime<FixedOffset>,
    remaining: RemainingDuration,
    policy: RolloverPolicy,
    window_days: u64,
    rollover_days: u64,
    rollovers: u32,
}

impl CountdownState {
    /// Create a countdown whose deadline is the end of the day `window_days` from `now`
    pub fn new(
        now: DateTime<FixedOffset>,
        window_days: u64,
        rollover_days: u64,
        policy: RolloverPolicy,
    ) -> Self {
        Self {
            deadline: end_of_day_after(now, window_days),
            remaining: RemainingDuration::default(),
            policy,
            window_days,
            rollover_days,
            rollovers: 0,
        }
    }

    pub fn deadline(&self) -> DateTime<FixedOffset> {
        self.deadline
    }

    pub fn remaining(&self) -> RemainingDuration {
        self.remaining
    }

    /// Number of times the deadline has been pushed or restarted
    pub fn rollovers(&self) -> u32 {
        self.rollovers
    }

    /// Recompute the readout against `now`
    pub fn tick(&mut self, now: DateTime<FixedOffset>) -> TickOutcome {
        let mut distance = (self.deadline - now).num_milliseconds();

        if distance < 0 {
            self.rollovers += 1;
            match self.policy {
                RolloverPolicy::Extend => {
                    self.deadline = self
                        .deadline
                        .checked_add_days(Days::new(self.rollover_days))
                        .unwrap_or(self.deadline);
                    return TickOutcome::RolledOver { deadline: self.deadline };
                }
                RolloverPolicy::Restart => {
                    self.deadline = end_of_day_after(now, self.window_days);
                    distance = (self.deadline - now).num_milliseconds();
                }
            }
        }

        // Restart always lands in the future; guard anyway so the readout never goes negative
        let Some(remaining) = RemainingDuration::from_millis(distance) else {
            return TickOutcome::RolledOver { deadline: self.deadline };
        };
        self.remaining = remaining;
        TickOutcome::Updated(remaining)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, Timelike};

    fn at(s: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    #[test]
    fn test_deadline_is_end_of_day() {
        let deadline = end_of_day_after(at("2026-03-01T08:15:00+09:00"), 15);
        assert_eq!(deadline, at("2026-03-16T23:59:59.999+09:00"));
        assert_eq!(deadline.nanosecond(), 999_000_000);
    }

    #[test]
    fn test_decomposition_borrows_across_units() {
        // now sits at day end, so the distance is exactly 15 days
        let now = at("2026-03-01T23:59:59.999+09:00");
        let mut countdown = CountdownState::new(now, 15, 30, RolloverPolicy::Extend);
        assert_eq!((countdown.deadline() - now).num_milliseconds(), 1_296_000_000);

        assert_eq!(
            countdown.tick(now),
            TickOutcome::Updated(RemainingDuration { days: 15, hours: 0, minutes: 0, seconds: 0 })
        );
        assert_eq!(
            countdown.tick(now + TimeDelta::milliseconds(1000)),
            TickOutcome::Updated(RemainingDuration {
                days: 14,
                hours: 23,
                minutes: 59,
                seconds: 59,
            })
        );
    }

    #[test]
    fn test_remaining_strictly_decreases() {
        let start = at("2026-05-10T13:47:21.250+02:00");
        let mut countdown = CountdownState::new(start, 15, 30, RolloverPolicy::Extend);
        let mut previous = None;

        for step in 0..5_000 {
            let now = start + TimeDelta::seconds(step * 37);
            let TickOutcome::Updated(remaining) = countdown.tick(now) else {
                panic!("unexpected rollover");
            };
            let distance = (countdown.deadline() - now).num_milliseconds();
            let expected = RemainingDuration::from_millis(distance);
            assert_eq!(Some(remaining), expected);
            assert!(remaining.hours <= 23 && remaining.minutes <= 59 && remaining.seconds <= 59);
            if let Some(prev) = previous {
                assert!(remaining.total_seconds() < prev);
            }
            previous = Some(remaining.total_seconds());
        }
    }

    #[test]
    fn test_expired_deadline_extends_without_update() {
        let start = at("2026-03-01T12:00:00+00:00");
        let mut countdown = CountdownState::new(start, 15, 30, RolloverPolicy::Extend);
        countdown.tick(start);
        let before = countdown.remaining();
        let old_deadline = countdown.deadline();

        let late = old_deadline + TimeDelta::milliseconds(1);
        assert_eq!(
            countdown.tick(late),
            TickOutcome::RolledOver { deadline: old_deadline + TimeDelta::days(30) }
        );
        assert_eq!(countdown.remaining(), before);
        assert_eq!(countdown.rollovers(), 1);

        let next = late + TimeDelta::seconds(1);
        let TickOutcome::Updated(remaining) = countdown.tick(next) else {
            panic!("expected an update after rollover");
        };
        assert_eq!(remaining, RemainingDuration { days: 29, hours: 23, minutes: 59, seconds: 58 });
    }

    #[test]
    fn test_restart_policy_opens_fresh_window() {
        let start = at("2026-03-01T12:00:00+00:00");
        let mut countdown = CountdownState::new(start, 15, 30, RolloverPolicy::Restart);
        let late = countdown.deadline() + TimeDelta::hours(5);

        let TickOutcome::Updated(remaining) = countdown.tick(late) else {
            panic!("restart should update immediately");
        };
        assert_eq!(countdown.deadline(), end_of_day_after(late, 15));
        assert_eq!(remaining.days, 15);
    }

    #[test]
    fn test_negative_distance_has_no_readout() {
        assert_eq!(RemainingDuration::from_millis(-1), None);
        assert_eq!(RemainingDuration::from_millis(0), Some(RemainingDuration::default()));
    }
}
