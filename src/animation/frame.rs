//! Frame-synchronized callback scheduling.
//!
//! Animations never run on their own timer. They register a one-shot callback
//! for the next frame and re-register from inside it while they still have
//! work to do. The host drives [`FrameQueue::run_frame`] once per display
//! refresh.

use std::cell::{Cell, RefCell};

/// A callback that runs once, on the next frame.
pub type FrameCallback = Box<dyn FnOnce()>;

/// Identifies a frame registration so it can be cancelled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameHandle(u64);

/// Registration side of a frame pacing primitive.
pub trait FrameScheduler {
    /// Run `callback` at the next frame. It fires at most once.
    fn request_frame(&self, callback: FrameCallback) -> FrameHandle;

    /// Forget a registration. Cancelling a handle that already fired is a no-op.
    fn cancel_frame(&self, handle: FrameHandle);
}

/// In-process frame scheduler.
///
/// Callbacks run in registration order. Anything registered while a frame is
/// running waits for the following frame, so a callback that re-registers
/// itself runs exactly once per frame.
pub struct FrameQueue {
    pending: RefCell<Vec<(FrameHandle, FrameCallback)>>,
    /// Handles of the frame being run that have not fired or been cancelled
    running: RefCell<Vec<FrameHandle>>,
    next_id: Cell<u64>,
    frame_count: Cell<u64>,
    waker: RefCell<Option<Box<dyn Fn()>>>,
}

impl FrameQueue {
    pub fn new() -> Self {
        Self {
            pending: RefCell::new(Vec::new()),
            running: RefCell::new(Vec::new()),
            next_id: Cell::new(1),
            frame_count: Cell::new(0),
            waker: RefCell::new(None),
        }
    }

    /// Install a hook called when a frame is requested on an empty queue.
    ///
    /// The event loop uses this to wake up from idle.
    pub fn set_waker<F: Fn() + 'static>(&self, waker: F) {
        *self.waker.borrow_mut() = Some(Box::new(waker));
    }

    /// Number of registrations waiting for the next frame.
    pub fn pending(&self) -> usize {
        self.pending.borrow().len()
    }

    pub fn is_idle(&self) -> bool {
        self.pending.borrow().is_empty()
    }

    /// Frames run so far.
    pub fn frame_count(&self) -> u64 {
        self.frame_count.get()
    }

    /// Run every callback registered before this call. Returns how many ran.
    pub fn run_frame(&self) -> usize {
        // Take the batch first so callbacks can register for the next frame.
        let batch = std::mem::take(&mut *self.pending.borrow_mut());
        *self.running.borrow_mut() = batch.iter().map(|(handle, _)| *handle).collect();
        self.frame_count.set(self.frame_count.get() + 1);

        let mut ran = 0;
        for (handle, callback) in batch {
            // An earlier callback in this frame may have cancelled this one.
            let live = {
                let mut running = self.running.borrow_mut();
                match running.iter().position(|h| *h == handle) {
                    Some(index) => {
                        running.swap_remove(index);
                        true
                    }
                    None => false,
                }
            };
            if !live {
                log::trace!("frame {}: skipping cancelled {:?}", self.frame_count.get(), handle);
                continue;
            }
            log::trace!("frame {}: running {:?}", self.frame_count.get(), handle);
            callback();
            ran += 1;
        }
        ran
    }
}

impl Default for FrameQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameScheduler for FrameQueue {
    fn request_frame(&self, callback: FrameCallback) -> FrameHandle {
        let handle = FrameHandle(self.next_id.get());
        self.next_id.set(handle.0 + 1);

        let was_idle = {
            let mut pending = self.pending.borrow_mut();
            let was_idle = pending.is_empty();
            pending.push((handle, callback));
            was_idle
        };

        // Only wake on the first request, later ones share the same frame.
        if was_idle {
            if let Some(waker) = self.waker.borrow().as_ref() {
                waker();
            }
        }
        handle
    }

    fn cancel_frame(&self, handle: FrameHandle) {
        self.pending.borrow_mut().retain(|(h, _)| *h != handle);
        self.running.borrow_mut().retain(|h| *h != handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn test_callbacks_run_once_in_registration_order() {
        let queue = FrameQueue::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        for i in 0..3 {
            let log = log.clone();
            queue.request_frame(Box::new(move || log.borrow_mut().push(i)));
        }
        assert_eq!(queue.pending(), 3);

        assert_eq!(queue.run_frame(), 3);
        assert_eq!(*log.borrow(), vec![0, 1, 2]);

        assert_eq!(queue.run_frame(), 0);
        assert_eq!(*log.borrow(), vec![0, 1, 2]);
    }

    #[test]
    fn test_cancelled_callback_never_runs() {
        let queue = FrameQueue::new();
        let fired = Rc::new(Cell::new(false));
        let flag = fired.clone();
        let handle = queue.request_frame(Box::new(move || flag.set(true)));

        queue.cancel_frame(handle);
        queue.run_frame();
        assert!(!fired.get());
        assert!(queue.is_idle());
    }

    #[test]
    fn test_cancel_from_earlier_callback_in_same_frame() {
        let queue = Rc::new(FrameQueue::new());
        let fired = Rc::new(Cell::new(false));
        let later: Rc<Cell<Option<FrameHandle>>> = Rc::new(Cell::new(None));

        let (q, target) = (queue.clone(), later.clone());
        queue.request_frame(Box::new(move || {
            if let Some(handle) = target.get() {
                q.cancel_frame(handle);
            }
        }));
        let flag = fired.clone();
        later.set(Some(queue.request_frame(Box::new(move || flag.set(true)))));

        assert_eq!(queue.run_frame(), 1);
        assert!(!fired.get());
        assert_eq!(queue.frame_count(), 1);

        assert_eq!(queue.run_frame(), 0);
        assert!(!fired.get());
        assert_eq!(queue.frame_count(), 2);
    }

    #[test]
    fn test_reregistration_waits_for_next_frame() {
        let queue = Rc::new(FrameQueue::new());
        let count = Rc::new(Cell::new(0));

        fn tick(queue: Rc<FrameQueue>, count: Rc<Cell<u32>>) {
            count.set(count.get() + 1);
            let q = queue.clone();
            queue.request_frame(Box::new(move || tick(q, count)));
        }

        let (q, c) = (queue.clone(), count.clone());
        queue.request_frame(Box::new(move || tick(q, c)));

        queue.run_frame();
        assert_eq!(count.get(), 1);
        queue.run_frame();
        assert_eq!(count.get(), 2);
        assert_eq!(queue.pending(), 1);
    }

    #[test]
    fn test_waker_fires_only_when_leaving_idle() {
        let queue = FrameQueue::new();
        let wakes = Rc::new(Cell::new(0));
        let w = wakes.clone();
        queue.set_waker(move || w.set(w.get() + 1));

        queue.request_frame(Box::new(|| {}));
        queue.request_frame(Box::new(|| {}));
        assert_eq!(wakes.get(), 1);

        queue.run_frame();
        queue.request_frame(Box::new(|| {}));
        assert_eq!(wakes.get(), 2);
    }
}
