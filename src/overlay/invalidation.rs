use std::cell::{Cell, RefCell};

use bitflags::bitflags;

use crate::animation::RepaintSink;

bitflags! {
    /// Pending overlay work, drained by the loop once per frame.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct ChangeFlags: u8 {
        /// The frame box got a new target size
        const NEEDS_LAYOUT = 1;
        /// An opacity, offset or size moved on screen
        const NEEDS_PAINT = 1 << 1;
    }
}

/// Collects repaint requests from the overlay's variables.
///
/// The host drains the flags once per frame with [`Invalidation::take`].
pub struct Invalidation {
    flags: Cell<ChangeFlags>,
    wake: RefCell<Option<Box<dyn Fn()>>>,
}

impl Invalidation {
    /// Starts dirty so the first frame is always painted.
    pub fn new() -> Self {
        Self {
            flags: Cell::new(ChangeFlags::NEEDS_LAYOUT | ChangeFlags::NEEDS_PAINT),
            wake: RefCell::new(None),
        }
    }

    /// Called whenever the flags go from clean to dirty.
    pub fn set_wake<F: Fn() + 'static>(&self, wake: F) {
        *self.wake.borrow_mut() = Some(Box::new(wake));
    }

    pub fn request_layout(&self) {
        self.mark(ChangeFlags::NEEDS_LAYOUT | ChangeFlags::NEEDS_PAINT);
    }

    pub fn request_paint(&self) {
        self.mark(ChangeFlags::NEEDS_PAINT);
    }

    pub fn needs_paint(&self) -> bool {
        self.flags.get().contains(ChangeFlags::NEEDS_PAINT)
    }

    /// Return the pending flags and clear them.
    pub fn take(&self) -> ChangeFlags {
        self.flags.replace(ChangeFlags::empty())
    }

    fn mark(&self, flags: ChangeFlags) {
        let previous = self.flags.get();
        self.flags.set(previous | flags);
        if previous.is_empty() {
            if let Some(wake) = self.wake.borrow().as_ref() {
                wake();
            }
        }
    }
}

impl Default for Invalidation {
    fn default() -> Self {
        Self::new()
    }
}

impl RepaintSink for Invalidation {
    fn request_repaint(&self) {
        self.request_paint();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn test_starts_dirty_and_take_clears() {
        let invalidation = Invalidation::new();
        assert!(invalidation.needs_paint());
        assert_eq!(
            invalidation.take(),
            ChangeFlags::NEEDS_LAYOUT | ChangeFlags::NEEDS_PAINT
        );
        assert_eq!(invalidation.take(), ChangeFlags::empty());
    }

    #[test]
    fn test_repaint_request_marks_paint_only() {
        let invalidation = Invalidation::new();
        invalidation.take();
        invalidation.request_repaint();
        assert_eq!(invalidation.take(), ChangeFlags::NEEDS_PAINT);
    }

    #[test]
    fn test_wake_fires_once_per_dirty_period() {
        let invalidation = Invalidation::new();
        invalidation.take();
        let wakes = Rc::new(Cell::new(0));
        let w = wakes.clone();
        invalidation.set_wake(move || w.set(w.get() + 1));

        invalidation.request_paint();
        invalidation.request_layout();
        assert_eq!(wakes.get(), 1);

        invalidation.take();
        invalidation.request_paint();
        assert_eq!(wakes.get(), 2);
    }
}
