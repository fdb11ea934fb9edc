//! # Prayerhour Core Library
//!
//! This library provides the core logic for Prayerhour, a guided 12-step,
//! 60-minute prayer cycle. The CLI binary is a thin host over the same
//! library: it owns the render loop and the terminal, nothing else.
//!
//! ## Architecture
//!
//! - **Timer Engine**: A drift-compensated countdown driven by host frames;
//!   remaining time is recomputed from an absolute monotonic start timestamp
//! - **Cycle Store**: Step position, remaining time and the status state machine
//! - **Storage**: SQLite key-value records for session recovery and settings,
//!   TOML-based host configuration
//! - **Controller**: Wires engine callbacks, store actions and persistence
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: Countdown state machine
//! - [`CycleStore`]: Cycle state and actions
//! - [`SessionPersistence`]: Snapshot and settings storage
//! - [`CycleController`]: Orchestration entry point

pub mod controller;
pub mod cycle;
pub mod error;
pub mod events;
pub mod host;
pub mod storage;
pub mod timer;

pub use controller::CycleController;
pub use cycle::{CycleState, CycleStatus, CycleStore, PrayerStep, Settings, SettingsPatch, PRAYER_STEPS};
pub use error::{ConfigError, CoreError, StorageError};
pub use events::Event;
pub use host::{AudioCue, NoWakeLock, Silent, WakeLock};
pub use storage::{AppConfig, SessionPersistence, SessionSnapshot};
pub use timer::{FrameQueue, ManualClock, MonotonicClock, TimerEngine};
