//! Time and frame sources for the timer engine.
//!
//! The engine never reads the system clock or sleeps itself. It asks a
//! [`Clock`] for monotonic time and a [`FrameScheduler`] for the next frame,
//! and the host delivers frames by calling
//! [`TimerEngine::on_frame`](super::TimerEngine::on_frame).

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Monotonic time since an arbitrary, fixed origin.
pub trait Clock {
    fn now(&self) -> Duration;
}

/// Wall-independent clock backed by [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    /// Negative or non-finite amounts leave the clock where it is.
    pub fn advance_secs(&self, secs: f64) {
        if secs.is_finite() && secs > 0.0 {
            self.advance(Duration::from_secs_f64(secs));
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

/// Identifier of one frame request.
pub type FrameId = u64;

/// Render-loop scheduling primitive: one callback on the next frame.
pub trait FrameScheduler {
    fn request_frame(&mut self) -> FrameId;
    fn cancel_frame(&mut self, id: FrameId);
}

#[derive(Debug, Default)]
struct FrameSlot {
    next_id: FrameId,
    pending: Option<FrameId>,
}

/// Single-slot frame scheduler shared between the engine and the host loop.
///
/// A new request replaces the pending one. The host calls [`take_due`]
/// once per frame and passes the id to the engine.
///
/// [`take_due`]: FrameQueue::take_due
#[derive(Debug, Clone, Default)]
pub struct FrameQueue {
    slot: Rc<RefCell<FrameSlot>>,
}

impl FrameQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return the pending request, if any.
    pub fn take_due(&self) -> Option<FrameId> {
        self.slot.borrow_mut().pending.take()
    }

    pub fn has_pending(&self) -> bool {
        self.slot.borrow().pending.is_some()
    }
}

impl FrameScheduler for FrameQueue {
    fn request_frame(&mut self) -> FrameId {
        let mut slot = self.slot.borrow_mut();
        slot.next_id += 1;
        let id = slot.next_id;
        slot.pending = Some(id);
        id
    }

    fn cancel_frame(&mut self, id: FrameId) {
        let mut slot = self.slot.borrow_mut();
        if slot.pending == Some(id) {
            slot.pending = None;
        }
    }
}
