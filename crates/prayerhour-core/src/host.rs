//! Collaborators the orchestrator calls into but does not implement.
//!
//! Audio playback and screen wake-lock belong to the host platform. The core
//! only decides *when* to use them.

use crate::cycle::PrayerStep;

/// Audible cues at step and cycle boundaries.
pub trait AudioCue {
    fn step_complete(&mut self, step: &PrayerStep);
    fn cycle_complete(&mut self);
}

/// Keeps the display awake while a cycle is running.
pub trait WakeLock {
    /// Returns whether the lock is now held.
    fn acquire(&mut self) -> bool;
    fn release(&mut self);
}

/// Plays nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

impl AudioCue for Silent {
    fn step_complete(&mut self, _step: &PrayerStep) {}
    fn cycle_complete(&mut self) {}
}

/// Platform without wake-lock support.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoWakeLock;

impl WakeLock for NoWakeLock {
    fn acquire(&mut self) -> bool {
        false
    }
    fn release(&mut self) {}
}
