//! Timer engine implementation.
//!
//! A drift-compensated countdown for one interval. The engine does not use
//! internal threads: it requests frames from a [`FrameScheduler`] and the host
//! calls [`TimerEngine::on_frame`] when a requested frame fires.
//!
//! Remaining time is always recomputed from the absolute start timestamp, so
//! frame-rate jitter or a backgrounded host only changes how often samples
//! arrive, never their value.
//!
//! ## State Transitions
//!
//! ```text
//! Stopped -> Running -> (Paused <-> Running) -> Stopped
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let frames = FrameQueue::new();
//! let mut engine = TimerEngine::new(MonotonicClock::new(), frames.clone());
//! engine.start(300.0, |remaining| println!("{remaining:.1}"), || println!("done"));
//! // In the render loop:
//! if let Some(id) = frames.take_due() {
//!     engine.on_frame(id);
//! }
//! ```

use std::time::Duration;

use super::clock::{Clock, FrameId, FrameScheduler};

type TickFn = Box<dyn FnMut(f64)>;
type CompleteFn = Box<dyn FnOnce()>;

/// Countdown engine over an injected clock and frame scheduler.
pub struct TimerEngine<C, S> {
    clock: C,
    frames: S,
    /// Monotonic time the current countdown is measured from.
    started_at: Duration,
    paused_at: Option<Duration>,
    duration_secs: f64,
    /// Last computed remaining time.
    remaining_secs: f64,
    running: bool,
    paused: bool,
    pending_frame: Option<FrameId>,
    on_tick: Option<TickFn>,
    on_complete: Option<CompleteFn>,
}

impl<C: Clock, S: FrameScheduler> TimerEngine<C, S> {
    pub fn new(clock: C, frames: S) -> Self {
        Self {
            clock,
            frames,
            started_at: Duration::ZERO,
            paused_at: None,
            duration_secs: 0.0,
            remaining_secs: 0.0,
            running: false,
            paused: false,
            pending_frame: None,
            on_tick: None,
            on_complete: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn remaining_time(&self) -> f64 {
        self.remaining_secs
    }

    /// Running and not paused.
    pub fn is_active(&self) -> bool {
        self.running && !self.paused
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin counting down `duration_secs`. Interrupts any run in progress.
    pub fn start<T, F>(&mut self, duration_secs: f64, on_tick: T, on_complete: F)
    where
        T: FnMut(f64) + 'static,
        F: FnOnce() + 'static,
    {
        if self.running {
            self.stop();
        }
        let duration = sanitize(duration_secs);
        self.started_at = self.clock.now();
        self.paused_at = None;
        self.duration_secs = duration;
        self.remaining_secs = duration;
        self.running = true;
        self.paused = false;
        self.on_tick = Some(Box::new(on_tick));
        self.on_complete = Some(Box::new(on_complete));
        self.schedule();
    }

    /// Freeze the countdown and return the remaining time.
    ///
    /// Returns the last known value unchanged if not running or already paused.
    pub fn pause(&mut self) -> f64 {
        if !self.running || self.paused {
            return self.remaining_secs;
        }
        let now = self.clock.now();
        self.remaining_secs = self.remaining_at(now);
        self.cancel_pending();
        self.paused = true;
        self.paused_at = Some(now);
        self.remaining_secs
    }

    /// Continue a paused countdown.
    ///
    /// With `remaining_override`, the caller's value is authoritative and the
    /// countdown restarts from it. Without, the pause length is excluded from
    /// elapsed time.
    pub fn resume(&mut self, remaining_override: Option<f64>) {
        if !self.running || !self.paused {
            return;
        }
        let now = self.clock.now();
        match remaining_override {
            Some(remaining) => {
                let remaining = sanitize(remaining);
                self.duration_secs = remaining;
                self.remaining_secs = remaining;
                self.started_at = now;
            }
            None => {
                let paused_for = self
                    .paused_at
                    .map(|at| now.saturating_sub(at))
                    .unwrap_or_default();
                self.started_at += paused_for;
            }
        }
        self.paused = false;
        self.paused_at = None;
        self.schedule();
    }

    /// Halt scheduling and drop callbacks. Safe to call repeatedly.
    pub fn stop(&mut self) {
        self.cancel_pending();
        self.on_tick = None;
        self.on_complete = None;
        self.running = false;
        self.paused = false;
        self.paused_at = None;
    }

    /// Frame callback. Ignores ids other than the one outstanding request.
    pub fn on_frame(&mut self, id: FrameId) {
        if self.pending_frame != Some(id) || !self.running || self.paused {
            return;
        }
        self.pending_frame = None;

        let remaining = self.remaining_at(self.clock.now());
        self.remaining_secs = remaining;
        if let Some(on_tick) = self.on_tick.as_mut() {
            on_tick(remaining);
        }

        if remaining <= 0.0 {
            self.running = false;
            self.on_tick = None;
            if let Some(on_complete) = self.on_complete.take() {
                on_complete();
            }
        } else {
            self.schedule();
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn remaining_at(&self, now: Duration) -> f64 {
        let elapsed = now.saturating_sub(self.started_at).as_secs_f64();
        (self.duration_secs - elapsed).max(0.0)
    }

    fn schedule(&mut self) {
        self.cancel_pending();
        self.pending_frame = Some(self.frames.request_frame());
    }

    fn cancel_pending(&mut self) {
        if let Some(id) = self.pending_frame.take() {
            self.frames.cancel_frame(id);
        }
    }
}

fn sanitize(secs: f64) -> f64 {
    if secs.is_nan() {
        0.0
    } else {
        secs.max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::{FrameQueue, ManualClock};
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Harness {
        clock: ManualClock,
        frames: FrameQueue,
        engine: TimerEngine<ManualClock, FrameQueue>,
        ticks: Rc<RefCell<Vec<f64>>>,
        completions: Rc<RefCell<u32>>,
    }

    impl Harness {
        fn new() -> Self {
            let clock = ManualClock::new();
            let frames = FrameQueue::new();
            let engine = TimerEngine::new(clock.clone(), frames.clone());
            Self {
                clock,
                frames,
                engine,
                ticks: Rc::new(RefCell::new(Vec::new())),
                completions: Rc::new(RefCell::new(0)),
            }
        }

        fn start(&mut self, secs: f64) {
            let ticks = Rc::clone(&self.ticks);
            let completions = Rc::clone(&self.completions);
            self.engine.start(
                secs,
                move |r| ticks.borrow_mut().push(r),
                move || *completions.borrow_mut() += 1,
            );
        }

        /// Advance the clock and deliver one frame if one is pending.
        fn frame(&mut self, advance_secs: f64) {
            self.clock.advance_secs(advance_secs);
            if let Some(id) = self.frames.take_due() {
                self.engine.on_frame(id);
            }
        }

        fn last_tick(&self) -> f64 {
            *self.ticks.borrow().last().unwrap()
        }
    }

    #[test]
    fn remaining_equals_duration_right_after_start() {
        let mut h = Harness::new();
        h.start(42.5);
        assert_eq!(h.engine.remaining_time(), 42.5);
        assert!(h.engine.is_active());
        assert!(h.frames.has_pending());
    }

    #[test]
    fn ticks_recompute_from_start_timestamp() {
        let mut h = Harness::new();
        h.start(10.0);
        h.frame(0.016);
        h.frame(3.0);
        h.frame(0.5);
        assert!((h.last_tick() - (10.0 - 3.516)).abs() < 1e-9);
    }

    #[test]
    fn completes_once_and_stops_scheduling() {
        let mut h = Harness::new();
        h.start(1.0);
        h.frame(0.6);
        h.frame(0.6);
        assert_eq!(h.last_tick(), 0.0);
        assert_eq!(*h.completions.borrow(), 1);
        assert!(!h.engine.is_running());
        assert!(!h.frames.has_pending());
        h.frame(1.0);
        assert_eq!(*h.completions.borrow(), 1);
    }

    #[test]
    fn zero_and_negative_durations_complete_on_first_frame() {
        for secs in [0.0, -5.0] {
            let mut h = Harness::new();
            h.start(secs);
            assert_eq!(h.engine.remaining_time(), 0.0);
            h.frame(0.016);
            assert_eq!(*h.ticks.borrow(), vec![0.0]);
            assert_eq!(*h.completions.borrow(), 1);
        }
    }

    #[test]
    fn pause_excludes_paused_time() {
        let mut h = Harness::new();
        h.start(60.0);
        h.frame(10.0);
        let at_pause = {
            h.clock.advance_secs(5.0);
            h.engine.pause()
        };
        assert!((at_pause - 45.0).abs() < 1e-9);
        assert!(!h.frames.has_pending());

        h.clock.advance_secs(1000.0);
        h.engine.resume(None);
        h.frame(2.0);
        assert!((h.last_tick() - 43.0).abs() < 1e-9);
    }

    #[test]
    fn repeated_pause_resume_cycles_stay_exact() {
        let mut h = Harness::new();
        h.start(100.0);
        for _ in 0..5 {
            h.frame(4.0);
            h.engine.pause();
            h.clock.advance_secs(30.0);
            h.engine.resume(None);
        }
        h.frame(1.0);
        assert!((h.last_tick() - 79.0).abs() < 1e-9);
    }

    #[test]
    fn resume_with_override_is_authoritative() {
        let mut h = Harness::new();
        h.start(100.0);
        h.frame(10.0);
        h.engine.pause();
        h.engine.resume(Some(250.0));
        assert_eq!(h.engine.remaining_time(), 250.0);
        h.frame(1.0);
        assert!((h.last_tick() - 249.0).abs() < 1e-9);
    }

    #[test]
    fn pause_and_resume_are_noops_when_not_applicable() {
        let mut h = Harness::new();
        assert_eq!(h.engine.pause(), 0.0);
        h.engine.resume(Some(5.0));
        assert!(!h.engine.is_running());

        h.start(20.0);
        h.engine.resume(None);
        assert!(h.engine.is_active());
        h.frame(5.0);
        let first = h.engine.pause();
        h.clock.advance_secs(3.0);
        assert_eq!(h.engine.pause(), first);
    }

    #[test]
    fn stale_frame_after_pause_is_ignored() {
        let mut h = Harness::new();
        h.start(20.0);
        let stale = h.frames.take_due().unwrap();
        h.engine.pause();
        h.engine.on_frame(stale);
        assert!(h.ticks.borrow().is_empty());
    }

    #[test]
    fn start_while_running_interrupts_previous_run() {
        let mut h = Harness::new();
        h.start(5.0);
        h.frame(1.0);
        h.start(30.0);
        assert_eq!(h.engine.remaining_time(), 30.0);
        h.frame(10.0);
        assert!((h.last_tick() - 20.0).abs() < 1e-9);
        assert_eq!(*h.completions.borrow(), 0);
    }

    #[test]
    fn stop_is_idempotent() {
        let mut h = Harness::new();
        h.start(5.0);
        h.engine.stop();
        h.engine.stop();
        assert!(!h.engine.is_running());
        assert!(!h.engine.is_paused());
        assert!(!h.frames.has_pending());
    }
}
