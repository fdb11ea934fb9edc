mod clock;
mod engine;

pub use clock::{Clock, FrameId, FrameQueue, FrameScheduler, ManualClock, MonotonicClock};
pub use engine::TimerEngine;
