//! Magnetic grid snapping for one dragged axis.
//!
//! A raw value close to a grid line locks onto it. The lock is sticky: it
//! holds while the pointer stays within the release distance of the anchor,
//! and gives way when pulled farther or when the hold time runs out. A
//! released anchor is remembered in a single slot and cannot re-engage until
//! the hold time has passed again or a different anchor is released, so the
//! value does not jitter back onto the line it just left.
//!
//! Time is passed in with every sample. There is no timer to cancel: an
//! expired lock is noticed on the next sample, and a finished gesture simply
//! stops sampling.

use std::time::{Duration, Instant};

/// Grid and stickiness parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapTuning {
    /// Grid spacing in centimetres.
    pub increment: f64,
    /// How close a raw value must be to a grid line to lock on.
    pub capture: f64,
    /// How far the raw value may wander from a locked anchor.
    pub release: f64,
    /// How long a lock lasts before it releases by itself.
    pub hold: Duration,
}

impl Default for SnapTuning {
    fn default() -> Self {
        SnapTuning {
            increment: 0.5,
            capture: 0.4,
            release: 1.0,
            hold: Duration::from_millis(600),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Lock {
    anchor: f64,
    engaged_at: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Released {
    anchor: f64,
    at: Instant,
}

/// Snap state for one axis.
#[derive(Debug, Clone, Default)]
pub struct SnapAxis {
    tuning: SnapTuning,
    lock: Option<Lock>,
    ignore: Option<Released>,
}

const ANCHOR_EPSILON: f64 = 1e-9;

impl SnapAxis {
    pub fn new(tuning: SnapTuning) -> Self {
        SnapAxis {
            tuning,
            lock: None,
            ignore: None,
        }
    }

    /// The anchor currently locked, if any.
    pub fn locked(&self) -> Option<f64> {
        self.lock.map(|l| l.anchor)
    }

    /// The most recently released anchor, while it is still remembered.
    pub fn ignored(&self) -> Option<f64> {
        self.ignore.map(|r| r.anchor)
    }

    /// Map a raw value to the reported value at time `now`.
    pub fn evaluate(&mut self, raw: f64, now: Instant) -> f64 {
        if let Some(lock) = self.lock {
            if now.saturating_duration_since(lock.engaged_at) >= self.tuning.hold {
                self.release(now);
            } else if (raw - lock.anchor).abs() <= self.tuning.release {
                return lock.anchor;
            } else {
                self.release(now);
            }
        }

        if self
            .ignore
            .is_some_and(|r| now.saturating_duration_since(r.at) >= self.tuning.hold)
        {
            self.ignore = None;
        }

        let nearest = nearest_multiple(raw, self.tuning.increment);
        let ignored = self
            .ignore
            .is_some_and(|r| (r.anchor - nearest).abs() < ANCHOR_EPSILON);

        if (raw - nearest).abs() <= self.tuning.capture && !ignored {
            self.lock = Some(Lock {
                anchor: nearest,
                engaged_at: now,
            });
            return nearest;
        }

        raw
    }

    /// Clear lock and ignore memory.
    pub fn reset(&mut self) {
        self.lock = None;
        self.ignore = None;
    }

    fn release(&mut self, now: Instant) {
        if let Some(lock) = self.lock.take() {
            self.ignore = Some(Released {
                anchor: lock.anchor,
                at: now,
            });
        }
    }
}

/// Nearest multiple of `increment` to `value`.
pub fn nearest_multiple(value: f64, increment: f64) -> f64 {
    if increment <= 0.0 {
        return value;
    }
    (value / increment).round() * increment
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tight() -> SnapTuning {
        SnapTuning {
            increment: 1.0,
            capture: 0.1,
            release: 0.3,
            hold: Duration::from_millis(600),
        }
    }

    #[test]
    fn nearest_multiple_rounds() {
        assert_eq!(nearest_multiple(7.26, 0.5), 7.5);
        assert_eq!(nearest_multiple(7.24, 0.5), 7.0);
        assert_eq!(nearest_multiple(3.3, 0.0), 3.3);
    }

    #[test]
    fn far_from_grid_passes_through() {
        let mut axis = SnapAxis::new(tight());
        let now = Instant::now();
        assert_eq!(axis.evaluate(5.5, now), 5.5);
        assert_eq!(axis.locked(), None);
    }

    #[test]
    fn near_grid_locks() {
        let mut axis = SnapAxis::new(tight());
        let now = Instant::now();
        assert_eq!(axis.evaluate(5.95, now), 6.0);
        assert_eq!(axis.locked(), Some(6.0));
    }

    #[test]
    fn lock_is_sticky_until_pulled_past_release() {
        let mut axis = SnapAxis::new(tight());
        let t0 = Instant::now();
        assert_eq!(axis.evaluate(6.05, t0), 6.0);
        assert_eq!(axis.evaluate(6.25, t0 + Duration::from_millis(50)), 6.0);
        assert_eq!(axis.evaluate(5.72, t0 + Duration::from_millis(100)), 6.0);
        let out = axis.evaluate(6.4, t0 + Duration::from_millis(150));
        assert_eq!(out, 6.4);
        assert_eq!(axis.ignored(), Some(6.0));
    }

    #[test]
    fn released_anchor_does_not_re_engage() {
        let mut axis = SnapAxis::new(tight());
        let t0 = Instant::now();
        axis.evaluate(6.0, t0);
        axis.evaluate(6.5, t0 + Duration::from_millis(10));
        // Back within capture of 6.0, but it was just released.
        assert_eq!(axis.evaluate(6.05, t0 + Duration::from_millis(20)), 6.05);
        assert_eq!(axis.locked(), None);
    }

    #[test]
    fn single_slot_ignore_is_replaced() {
        let mut axis = SnapAxis::new(tight());
        let t0 = Instant::now();
        axis.evaluate(6.0, t0);
        axis.evaluate(6.5, t0);
        assert_eq!(axis.evaluate(7.02, t0), 7.0);
        axis.evaluate(7.5, t0);
        assert_eq!(axis.ignored(), Some(7.0));
        // 6.0 is no longer remembered.
        assert_eq!(axis.evaluate(6.02, t0), 6.0);
    }

    #[test]
    fn hold_timeout_releases_lock() {
        let mut axis = SnapAxis::new(tight());
        let t0 = Instant::now();
        assert_eq!(axis.evaluate(6.0, t0), 6.0);
        let later = t0 + Duration::from_millis(700);
        assert_eq!(axis.evaluate(6.2, later), 6.2);
        assert_eq!(axis.ignored(), Some(6.0));
    }

    #[test]
    fn released_anchor_recaptures_after_hold() {
        let mut axis = SnapAxis::new(tight());
        let t0 = Instant::now();
        assert_eq!(axis.evaluate(6.0, t0), 6.0);
        // Hold expires while resting on the line.
        let released = t0 + Duration::from_millis(700);
        assert_eq!(axis.evaluate(6.02, released), 6.02);
        assert_eq!(axis.evaluate(6.02, released + Duration::from_millis(100)), 6.02);
        // Once the ignore memory has aged out, the line captures again.
        let later = released + Duration::from_millis(600);
        assert_eq!(axis.evaluate(6.02, later), 6.0);
        assert_eq!(axis.ignored(), None);
        assert_eq!(axis.locked(), Some(6.0));
    }

    #[test]
    fn reset_forgets_everything() {
        let mut axis = SnapAxis::new(tight());
        let t0 = Instant::now();
        axis.evaluate(6.0, t0);
        axis.evaluate(6.5, t0);
        axis.reset();
        assert_eq!(axis.locked(), None);
        assert_eq!(axis.ignored(), None);
        assert_eq!(axis.evaluate(6.05, t0), 6.0);
    }

    #[test]
    fn default_tuning_sticks_then_steps() {
        let mut axis = SnapAxis::new(SnapTuning::default());
        let t0 = Instant::now();
        assert_eq!(axis.evaluate(9.8, t0), 10.0);
        assert_eq!(axis.evaluate(10.6, t0), 10.0);
        assert_eq!(axis.evaluate(10.95, t0), 10.0);
        let next = axis.evaluate(11.1, t0);
        assert_eq!(next, 11.0);
    }
}
