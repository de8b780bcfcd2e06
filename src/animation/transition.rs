use std::rc::Rc;
use std::time::{Duration, Instant};

use super::clock::Clock;
use super::timing::TimingFunction;

/// One scheduled animation span.
///
/// The start instant is captured when the transition is built, not when it is
/// first read. A transition is never mutated afterwards: retargeting an
/// animation means building a new one.
pub struct Transition {
    started_at: Instant,
    duration: Duration,
    timing: TimingFunction,
    clock: Rc<dyn Clock>,
}

impl Transition {
    pub fn new(clock: Rc<dyn Clock>, duration: Duration, timing: TimingFunction) -> Self {
        Self {
            started_at: clock.now(),
            duration,
            timing,
            clock,
        }
    }

    /// Time since the transition started. Never negative.
    pub fn elapsed(&self) -> Duration {
        self.clock.now().saturating_duration_since(self.started_at)
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn timing(&self) -> &TimingFunction {
        &self.timing
    }

    /// True once the full duration has elapsed. A zero duration has always ended.
    pub fn has_ended(&self) -> bool {
        self.elapsed() >= self.duration
    }

    /// Eased progress, exactly `1.0` once ended.
    pub fn current_ratio(&self) -> f64 {
        let elapsed = self.elapsed();
        if elapsed >= self.duration {
            return 1.0;
        }
        self.timing
            .evaluate(elapsed.as_secs_f64() / self.duration.as_secs_f64())
    }
}

impl std::fmt::Debug for Transition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transition")
            .field("duration", &self.duration)
            .field("elapsed", &self.elapsed())
            .field("timing", &self.timing)
            .finish()
    }
}
