//! Value animation engine.
//!
//! A [`Variable`] is a number that animates toward a target through a
//! [`Transition`], ticking once per frame on a [`FrameScheduler`] and asking
//! its [`RepaintSink`] to redraw whenever the value visibly moves.

mod clock;
mod completion;
mod frame;
mod timing;
mod transition;
mod variable;

use std::rc::Rc;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use completion::{completion, Completion, Resolver};
pub use frame::{FrameCallback, FrameHandle, FrameQueue, FrameScheduler};
pub use timing::{ease_out_quart, linear, TimingFunction};
pub use transition::Transition;
pub use variable::{RepaintSink, Variable, REPAINT_EPSILON};

/// Shared frame scheduler and clock used to create variables.
#[derive(Clone)]
pub struct Animator {
    scheduler: Rc<dyn FrameScheduler>,
    clock: Rc<dyn Clock>,
}

impl Animator {
    pub fn new(scheduler: Rc<dyn FrameScheduler>, clock: Rc<dyn Clock>) -> Self {
        Self { scheduler, clock }
    }

    /// Create a variable resting at `initial`.
    pub fn variable(&self, initial: f64) -> Variable {
        Variable::new(initial, self.scheduler.clone(), self.clock.clone())
    }
}
