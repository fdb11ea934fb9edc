//! Orchestration between the timer engine, the cycle store and persistence.
//!
//! The controller owns one of each service. Engine callbacks only post
//! [`TimerSignal`]s into a channel; the controller drains it after every
//! frame, so nothing re-enters the engine from inside its own callback.
//!
//! After every action the controller compares the store's `(status, step)`
//! with what it last observed and reacts to the difference: snapshot or clear
//! the saved session, take or drop the wake lock, play the cycle-complete cue.

use std::sync::mpsc::{self, Receiver, Sender};

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::cycle::{
    current_step, progress_percentage, step_progress, CycleState, CycleStatus, CycleStore,
    PrayerStep, RestorePatch, SettingsPatch, StepProgress,
};
use crate::events::Event;
use crate::host::{AudioCue, NoWakeLock, Silent, WakeLock};
use crate::storage::{parse_step_duration, SessionPersistence, SessionSnapshot};
use crate::timer::{Clock, FrameId, FrameScheduler, TimerEngine};

#[derive(Debug, Clone, Copy, PartialEq)]
enum TimerSignal {
    Tick(f64),
    Complete,
}

pub struct CycleController<C, S> {
    store: CycleStore,
    engine: TimerEngine<C, S>,
    persistence: SessionPersistence,
    audio: Box<dyn AudioCue>,
    wake_lock: Box<dyn WakeLock>,
    wake_lock_held: bool,
    signals_tx: Sender<TimerSignal>,
    signals_rx: Receiver<TimerSignal>,
    observed: (CycleStatus, usize),
    events: Vec<Event>,
}

impl<C: Clock, S: FrameScheduler> CycleController<C, S> {
    pub fn new(store: CycleStore, engine: TimerEngine<C, S>, persistence: SessionPersistence) -> Self {
        let (signals_tx, signals_rx) = mpsc::channel();
        let observed = (store.status(), store.current_step_index());
        Self {
            store,
            engine,
            persistence,
            audio: Box::new(Silent),
            wake_lock: Box::new(NoWakeLock),
            wake_lock_held: false,
            signals_tx,
            signals_rx,
            observed,
            events: Vec::new(),
        }
    }

    pub fn with_audio(mut self, audio: Box<dyn AudioCue>) -> Self {
        self.audio = audio;
        self
    }

    pub fn with_wake_lock(mut self, wake_lock: Box<dyn WakeLock>) -> Self {
        self.wake_lock = wake_lock;
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> &CycleState {
        self.store.state()
    }

    pub fn status(&self) -> CycleStatus {
        self.store.status()
    }

    pub fn progress_percentage(&self) -> f64 {
        progress_percentage(self.store.state())
    }

    pub fn step_progress(&self) -> StepProgress {
        step_progress(self.store.state())
    }

    pub fn current_step(&self) -> &'static PrayerStep {
        current_step(self.store.state())
    }

    pub fn is_timer_active(&self) -> bool {
        self.engine.is_active()
    }

    pub fn wake_lock_held(&self) -> bool {
        self.wake_lock_held
    }

    pub fn persistence(&self) -> &SessionPersistence {
        &self.persistence
    }

    /// Events produced since the last call.
    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        let state = self.store.state();
        let step = current_step(state);
        Event::StateSnapshot {
            status: state.status,
            step_index: state.current_step_index,
            name_key: step.name_key,
            label: step.label,
            remaining_secs: state.time_remaining_secs,
            step_duration_secs: state.step_duration_secs,
            progress_pct: progress_percentage(state),
            at: Utc::now(),
        }
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Load settings, apply the step-duration override and try to recover
    /// a saved session. Returns the recovered snapshot, if any.
    pub fn init(&mut self, step_override: Option<&str>) -> Option<SessionSnapshot> {
        let settings = self.persistence.load_settings();
        self.store.update_settings(settings.into());

        if let Some(raw) = step_override {
            match parse_step_duration(raw) {
                Some(secs) => {
                    debug!(secs, "step duration override applied");
                    self.store.set_step_duration(secs);
                }
                None => warn!(value = raw, "ignoring invalid step duration override"),
            }
        }

        let recovered = self.persistence.load_session();
        if let Some(snapshot) = &recovered {
            let mut patch = RestorePatch::from(snapshot);
            // Nothing drives a Transitioning cycle forward; hand it back as
            // Paused so resume() and skip() apply.
            if patch.status == Some(CycleStatus::Transitioning) {
                patch.status = Some(CycleStatus::Paused);
            }
            self.store.restore_session(patch);
            info!(
                step = snapshot.current_step_index,
                remaining = snapshot.time_remaining_secs,
                status = %snapshot.status,
                "recovered saved session"
            );
            if self.store.status() == CycleStatus::Active {
                self.start_engine();
            }
            self.events.push(Event::SessionRecovered {
                step_index: self.store.current_step_index(),
                remaining_secs: self.store.time_remaining_secs(),
                status: self.store.status(),
                at: Utc::now(),
            });
        }
        self.observe();
        recovered
    }

    /// Best-effort final snapshot, then stop everything.
    pub fn shutdown(&mut self) {
        self.checkpoint();
        self.engine.stop();
        if self.wake_lock_held {
            self.wake_lock.release();
            self.wake_lock_held = false;
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self) {
        self.engine.stop();
        self.store.start_cycle();
        self.start_engine();
        self.events.push(Event::CycleStarted {
            step_duration_secs: self.store.step_duration_secs(),
            at: Utc::now(),
        });
        self.observe();
    }

    pub fn pause(&mut self) {
        if self.store.status() != CycleStatus::Active {
            return;
        }
        let remaining = self.engine.pause();
        self.store.update_timer(remaining);
        self.store.pause_timer();
        self.events.push(Event::TimerPaused {
            remaining_secs: self.store.time_remaining_secs(),
            at: Utc::now(),
        });
        self.observe();
    }

    /// Continue from the store's remaining time, which is authoritative.
    pub fn resume(&mut self) {
        if self.store.status() != CycleStatus::Paused {
            return;
        }
        self.store.resume_timer();
        if self.engine.is_paused() {
            self.engine.resume(Some(self.store.time_remaining_secs()));
        } else {
            // Nothing to resume, e.g. a Paused session recovered after restart.
            self.start_engine();
        }
        self.events.push(Event::TimerResumed {
            remaining_secs: self.store.time_remaining_secs(),
            at: Utc::now(),
        });
        self.observe();
    }

    /// Move to the next step without waiting for the countdown.
    pub fn skip(&mut self) {
        if !matches!(self.store.status(), CycleStatus::Active | CycleStatus::Paused) {
            return;
        }
        let from_step = self.store.current_step_index();
        self.engine.stop();
        self.store.next_step();
        if self.store.status() == CycleStatus::Active {
            self.start_engine();
        }
        self.events.push(Event::StepSkipped {
            from_step,
            to_step: self.store.current_step_index(),
            at: Utc::now(),
        });
        self.observe();
    }

    /// Back to step 0, Idle. The user has to start again.
    pub fn restart(&mut self) {
        self.engine.stop();
        self.store.restart_cycle();
        self.events.push(Event::CycleRestarted { at: Utc::now() });
        self.observe();
    }

    pub fn update_settings(&mut self, patch: SettingsPatch) {
        self.store.update_settings(patch);
        self.persistence.save_settings(&self.store.state().settings);
        self.sync_wake_lock();
    }

    // ── External events ──────────────────────────────────────────────

    /// Deliver a frame from the host's render loop.
    pub fn on_frame(&mut self, id: FrameId) {
        self.engine.on_frame(id);
        while let Ok(signal) = self.signals_rx.try_recv() {
            match signal {
                TimerSignal::Tick(remaining) => self.store.update_timer(remaining),
                TimerSignal::Complete => self.complete_step(),
            }
        }
        self.observe();
    }

    /// The timer keeps running while hidden; hiding only takes a snapshot.
    pub fn on_visibility_change(&mut self, hidden: bool) {
        debug!(hidden, "visibility changed");
        if hidden {
            self.checkpoint();
        }
    }

    /// Snapshot the current state if a cycle is in progress.
    pub fn checkpoint(&mut self) {
        self.persistence.save_session(self.store.state());
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn start_engine(&mut self) {
        let tick_tx = self.signals_tx.clone();
        let done_tx = self.signals_tx.clone();
        self.engine.start(
            self.store.time_remaining_secs(),
            move |remaining| {
                let _ = tick_tx.send(TimerSignal::Tick(remaining));
            },
            move || {
                let _ = done_tx.send(TimerSignal::Complete);
            },
        );
    }

    fn complete_step(&mut self) {
        let finished = current_step(self.store.state());
        if self.store.state().settings.audio_enabled {
            self.audio.step_complete(finished);
        }
        self.store.next_step();
        if self.store.status() == CycleStatus::Active {
            self.start_engine();
            let step = current_step(self.store.state());
            self.events.push(Event::StepAdvanced {
                step_index: self.store.current_step_index(),
                name_key: step.name_key,
                duration_secs: self.store.step_duration_secs(),
                at: Utc::now(),
            });
        }
    }

    fn observe(&mut self) {
        let current = (self.store.status(), self.store.current_step_index());
        if current == self.observed {
            return;
        }
        let (previous_status, _) = self.observed;
        self.observed = current;

        let status = current.0;
        if status.is_recoverable() {
            self.persistence.save_session(self.store.state());
        } else {
            self.persistence.clear_session();
        }
        self.sync_wake_lock();

        if status == CycleStatus::Completed && previous_status != CycleStatus::Completed {
            info!("prayer cycle completed");
            if self.store.state().settings.audio_enabled {
                self.audio.cycle_complete();
            }
            self.events.push(Event::CycleCompleted { at: Utc::now() });
        }
    }

    fn sync_wake_lock(&mut self) {
        let wanted = self.store.status() == CycleStatus::Active
            && self.store.state().settings.wake_lock_enabled;
        if wanted && !self.wake_lock_held {
            self.wake_lock_held = self.wake_lock.acquire();
        } else if !wanted && self.wake_lock_held {
            self.wake_lock.release();
            self.wake_lock_held = false;
        }
    }
}
