use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use log::{trace, warn};

use super::clock::Clock;
use super::completion::{completion, Completion, Resolver};
use super::frame::{FrameHandle, FrameScheduler};
use super::timing::TimingFunction;
use super::transition::Transition;

/// Smallest change in the observed value that triggers a repaint.
pub const REPAINT_EPSILON: f64 = 1e-6;

/// In-flight values are floored to this many steps per unit (three decimals).
const VALUE_PRECISION: f64 = 1e3;

/// Something that can be asked to redraw itself.
///
/// Variables only hold a [`Weak`] reference to their sink; a sink that has
/// been dropped is skipped silently.
pub trait RepaintSink {
    fn request_repaint(&self);
}

/// Whether a variable currently holds a frame registration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Schedule {
    Idle,
    Scheduled(FrameHandle),
}

struct VariableState {
    previous: f64,
    next: f64,
    transition: Option<Transition>,
    schedule: Schedule,
    resolver: Option<Resolver>,
    last_observed: Option<f64>,
    disposed: bool,
    sink: Option<Weak<dyn RepaintSink>>,
}

impl VariableState {
    fn value(&self) -> f64 {
        let ratio = self
            .transition
            .as_ref()
            .map_or(1.0, Transition::current_ratio);
        if ratio == 1.0 {
            return self.next;
        }
        let value = self.previous + ratio * (self.next - self.previous);
        (value * VALUE_PRECISION).floor() / VALUE_PRECISION
    }

    fn has_settled(&self) -> bool {
        self.transition.as_ref().map_or(true, Transition::has_ended)
    }

    /// Record `value` as observed and return the sink if it moved enough.
    fn observe(&mut self, value: f64) -> Option<Rc<dyn RepaintSink>> {
        let moved = self
            .last_observed
            .map_or(true, |last| (value - last).abs() > REPAINT_EPSILON);
        self.last_observed = Some(value);
        if moved {
            self.sink.as_ref().and_then(Weak::upgrade)
        } else {
            None
        }
    }
}

/// A number that can jump or animate smoothly toward a target.
///
/// While a transition runs the variable keeps exactly one frame registration
/// alive, reused across retargeting. Each frame it notifies its repaint sink
/// if the value visibly moved, and it stops once the transition has ended.
///
/// Owners should call [`Variable::dispose`] on teardown; dropping the variable
/// does the same.
pub struct Variable {
    state: Rc<RefCell<VariableState>>,
    scheduler: Rc<dyn FrameScheduler>,
    clock: Rc<dyn Clock>,
}

impl Variable {
    pub fn new(initial: f64, scheduler: Rc<dyn FrameScheduler>, clock: Rc<dyn Clock>) -> Self {
        Self {
            state: Rc::new(RefCell::new(VariableState {
                previous: initial,
                next: initial,
                transition: None,
                schedule: Schedule::Idle,
                resolver: None,
                last_observed: None,
                disposed: false,
                sink: None,
            })),
            scheduler,
            clock,
        }
    }

    /// Attach the element to repaint when the value changes.
    pub fn with_sink<S: RepaintSink + 'static>(self, sink: &Rc<S>) -> Self {
        let weak = Rc::downgrade(sink);
        let weak: Weak<dyn RepaintSink> = weak;
        self.state.borrow_mut().sink = Some(weak);
        self
    }

    /// The current interpolated value.
    pub fn value(&self) -> f64 {
        self.state.borrow().value()
    }

    /// The value the variable is heading to (or resting at).
    pub fn target(&self) -> f64 {
        self.state.borrow().next
    }

    /// True while a frame registration is active.
    pub fn is_animating(&self) -> bool {
        self.state.borrow().schedule != Schedule::Idle
    }

    pub fn is_disposed(&self) -> bool {
        self.state.borrow().disposed
    }

    /// Jump to `value` without animating.
    ///
    /// Cancels the frame registration and fulfils any pending completion, so
    /// callers awaiting a transition cut short this way do not hang.
    pub fn set_immediate(&self, value: f64) {
        let (handle, resolver, sink) = {
            let mut state = self.state.borrow_mut();
            let handle = match std::mem::replace(&mut state.schedule, Schedule::Idle) {
                Schedule::Scheduled(handle) => Some(handle),
                Schedule::Idle => None,
            };
            state.previous = value;
            state.next = value;
            state.transition = None;
            let sink = state.observe(value);
            (handle, state.resolver.take(), sink)
        };

        if let Some(handle) = handle {
            self.scheduler.cancel_frame(handle);
        }
        if let Some(sink) = sink {
            sink.request_repaint();
        }
        if let Some(resolver) = resolver {
            resolver.settle();
        }
    }

    /// Animate from the current value to `target` over `duration`.
    ///
    /// A transition still in flight is superseded: the new one starts from
    /// wherever the value sits right now, and the old completion is fulfilled
    /// early. The returned completion settles when this transition ends or
    /// when a later call supersedes it. `timing` defaults to linear.
    pub fn schedule_transition(
        &self,
        target: f64,
        duration: Duration,
        timing: impl Into<Option<TimingFunction>>,
    ) -> Completion {
        let timing = timing.into().unwrap_or_default();
        let (completion, resolver) = completion();

        let superseded = {
            let mut state = self.state.borrow_mut();
            if state.disposed {
                warn!("transition to {target} scheduled on a disposed variable, ignoring");
                return Completion::settled();
            }
            state.previous = state.value();
            state.next = target;
            trace!(
                "transition {} -> {} over {:?} ({:?})",
                state.previous,
                target,
                duration,
                timing
            );
            state.transition = Some(Transition::new(self.clock.clone(), duration, timing));
            state.resolver.replace(resolver)
        };

        if let Some(superseded) = superseded {
            superseded.settle();
        }
        self.ensure_scheduled();
        completion
    }

    /// Cancel the frame registration and fulfil any pending completion.
    ///
    /// Idempotent. A disposed variable never registers frames again.
    pub fn dispose(&self) {
        let (handle, resolver) = {
            let mut state = self.state.borrow_mut();
            state.disposed = true;
            let handle = match std::mem::replace(&mut state.schedule, Schedule::Idle) {
                Schedule::Scheduled(handle) => Some(handle),
                Schedule::Idle => None,
            };
            (handle, state.resolver.take())
        };

        if let Some(handle) = handle {
            self.scheduler.cancel_frame(handle);
        }
        if let Some(resolver) = resolver {
            resolver.settle();
        }
    }

    fn ensure_scheduled(&self) {
        if self.state.borrow().schedule != Schedule::Idle {
            return;
        }
        let handle = request_tick(&self.scheduler, Rc::downgrade(&self.state));
        self.state.borrow_mut().schedule = Schedule::Scheduled(handle);
    }
}

impl Drop for Variable {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl std::fmt::Debug for Variable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("Variable")
            .field("value", &state.value())
            .field("target", &state.next)
            .field("schedule", &state.schedule)
            .field("disposed", &state.disposed)
            .finish()
    }
}

fn request_tick(
    scheduler: &Rc<dyn FrameScheduler>,
    state: Weak<RefCell<VariableState>>,
) -> FrameHandle {
    let weak_scheduler = Rc::downgrade(scheduler);
    scheduler.request_frame(Box::new(move || tick(state, weak_scheduler)))
}

/// One frame of a running variable.
fn tick(state: Weak<RefCell<VariableState>>, scheduler: Weak<dyn FrameScheduler>) {
    let Some(cell) = state.upgrade() else {
        return;
    };

    let (sink, current) = {
        let mut state = cell.borrow_mut();
        if state.disposed {
            state.schedule = Schedule::Idle;
            return;
        }
        // Cancelled after the frame started; nothing owns this callback.
        if state.schedule == Schedule::Idle {
            return;
        }
        let value = state.value();
        (state.observe(value), state.schedule)
    };
    if let Some(sink) = sink {
        sink.request_repaint();
    }

    // The sink may have retargeted, reset or disposed us, so decide afterwards.
    // If the registration changed hands, the new owner drives the loop.
    let resolver = {
        let mut state = cell.borrow_mut();
        if state.disposed || state.schedule != current {
            return;
        }
        if !state.has_settled() {
            None
        } else {
            state.schedule = Schedule::Idle;
            Some(state.resolver.take())
        }
    };

    match resolver {
        Some(resolver) => {
            trace!("transition finished");
            if let Some(resolver) = resolver {
                resolver.settle();
            }
        }
        None => {
            let Some(scheduler) = scheduler.upgrade() else {
                cell.borrow_mut().schedule = Schedule::Idle;
                return;
            };
            let handle = request_tick(&scheduler, state);
            cell.borrow_mut().schedule = Schedule::Scheduled(handle);
        }
    }
}
