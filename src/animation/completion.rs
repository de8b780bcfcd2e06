//! Single-settlement completion signals.
//!
//! [`Completion`] is the awaitable half handed to callers; [`Resolver`] is the
//! half kept by whoever finishes the work. `Resolver::settle` consumes the
//! resolver, so a signal cannot be settled twice.

use std::cell::{Cell, RefCell};
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};

type SettleCallback = Box<dyn FnOnce()>;

#[derive(Default)]
struct SignalState {
    settled: bool,
    wakers: Vec<Waker>,
    callbacks: Vec<SettleCallback>,
}

/// Awaitable notification that carries no payload and settles at most once.
///
/// Clones observe the same signal, so any number of consumers can wait on it.
#[derive(Clone)]
pub struct Completion {
    state: Rc<RefCell<SignalState>>,
}

/// The settle side of a [`Completion`].
///
/// Dropping an unsettled resolver settles the signal, so awaiters never hang.
pub struct Resolver {
    state: Option<Rc<RefCell<SignalState>>>,
}

/// Create a linked completion/resolver pair.
pub fn completion() -> (Completion, Resolver) {
    let state = Rc::new(RefCell::new(SignalState::default()));
    (
        Completion {
            state: state.clone(),
        },
        Resolver { state: Some(state) },
    )
}

impl Completion {
    /// A signal that has already settled.
    pub fn settled() -> Self {
        let (completion, resolver) = completion();
        resolver.settle();
        completion
    }

    pub fn is_settled(&self) -> bool {
        self.state.borrow().settled
    }

    /// Run `callback` once the signal settles, or right away if it already has.
    pub fn on_settle<F: FnOnce() + 'static>(&self, callback: F) {
        let mut state = self.state.borrow_mut();
        if state.settled {
            drop(state);
            callback();
        } else {
            state.callbacks.push(Box::new(callback));
        }
    }

    /// A signal that settles once every signal in `signals` has settled.
    pub fn all<I>(signals: I) -> Completion
    where
        I: IntoIterator<Item = Completion>,
    {
        let signals: Vec<Completion> = signals.into_iter().collect();
        let (joined, resolver) = completion();
        let remaining = Rc::new(Cell::new(signals.len()));
        let resolver = Rc::new(RefCell::new(Some(resolver)));

        if signals.is_empty() {
            if let Some(resolver) = resolver.borrow_mut().take() {
                resolver.settle();
            }
            return joined;
        }

        for signal in signals {
            let remaining = remaining.clone();
            let resolver = resolver.clone();
            signal.on_settle(move || {
                remaining.set(remaining.get() - 1);
                if remaining.get() == 0 {
                    let resolver = resolver.borrow_mut().take();
                    if let Some(resolver) = resolver {
                        resolver.settle();
                    }
                }
            });
        }
        joined
    }
}

impl std::fmt::Debug for Completion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Completion")
            .field("settled", &self.is_settled())
            .finish()
    }
}

impl Future for Completion {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        let mut state = self.state.borrow_mut();
        if state.settled {
            return Poll::Ready(());
        }
        if !state.wakers.iter().any(|w| w.will_wake(cx.waker())) {
            state.wakers.push(cx.waker().clone());
        }
        Poll::Pending
    }
}

impl Resolver {
    /// Fulfil the signal, waking every awaiter.
    pub fn settle(mut self) {
        self.settle_inner();
    }

    fn settle_inner(&mut self) {
        let Some(state) = self.state.take() else {
            return;
        };
        // Release the borrow before running foreign code.
        let (wakers, callbacks) = {
            let mut state = state.borrow_mut();
            if state.settled {
                return;
            }
            state.settled = true;
            (
                std::mem::take(&mut state.wakers),
                std::mem::take(&mut state.callbacks),
            )
        };
        for waker in wakers {
            waker.wake();
        }
        for callback in callbacks {
            callback();
        }
    }
}

impl Drop for Resolver {
    fn drop(&mut self) {
        self.settle_inner();
    }
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("pending", &self.state.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn poll_once(completion: &mut Completion) -> Poll<()> {
        let mut cx = Context::from_waker(Waker::noop());
        Pin::new(completion).poll(&mut cx)
    }

    #[test]
    fn test_pending_until_settled() {
        let (mut completion, resolver) = completion();
        assert!(!completion.is_settled());
        assert_eq!(poll_once(&mut completion), Poll::Pending);

        resolver.settle();
        assert!(completion.is_settled());
        assert_eq!(poll_once(&mut completion), Poll::Ready(()));
    }

    #[test]
    fn test_clones_share_the_signal() {
        let (completion, resolver) = completion();
        let mut other = completion.clone();
        resolver.settle();
        assert_eq!(poll_once(&mut other), Poll::Ready(()));
    }

    #[test]
    fn test_dropping_resolver_settles() {
        let (completion, resolver) = completion();
        drop(resolver);
        assert!(completion.is_settled());
    }

    #[test]
    fn test_callbacks_run_exactly_once() {
        let (completion, resolver) = completion();
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        completion.on_settle(move || c.set(c.get() + 1));

        resolver.settle();
        assert_eq!(count.get(), 1);

        // Late subscribers run immediately.
        let c = count.clone();
        completion.on_settle(move || c.set(c.get() + 10));
        assert_eq!(count.get(), 11);
    }

    #[test]
    fn test_all_waits_for_every_signal() {
        let (a, resolve_a) = completion();
        let (b, resolve_b) = completion();
        let joined = Completion::all([a, b]);

        resolve_a.settle();
        assert!(!joined.is_settled());
        resolve_b.settle();
        assert!(joined.is_settled());
    }

    #[test]
    fn test_all_of_nothing_is_settled() {
        assert!(Completion::all(Vec::new()).is_settled());
        assert!(Completion::settled().is_settled());
    }
}
