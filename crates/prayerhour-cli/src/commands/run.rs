use std::io::Write;
use std::time::{Duration, Instant};

use clap::Args;
use prayerhour_core::cycle::PrayerStep;
use prayerhour_core::{
    AppConfig, AudioCue, CycleController, CycleStatus, CycleStore, FrameQueue, MonotonicClock,
    SessionPersistence, TimerEngine,
};
use tracing::{debug, info};

const STEP_DURATION_ENV: &str = "PRAYERHOUR_STEP_DURATION";

#[derive(Args)]
pub struct RunArgs {
    /// Seconds per step for this session (positive integer)
    #[arg(long)]
    step_duration: Option<String>,
    /// Ignore any saved session and start from the first step
    #[arg(long)]
    fresh: bool,
}

/// Rings the terminal bell.
struct TerminalBell;

impl AudioCue for TerminalBell {
    fn step_complete(&mut self, step: &PrayerStep) {
        debug!(step = step.id, "step complete cue");
        eprint!("\x07");
    }

    fn cycle_complete(&mut self) {
        eprint!("\x07\x07");
    }
}

type Controller = CycleController<MonotonicClock, FrameQueue>;

fn print_events(ctl: &mut Controller) -> Result<(), Box<dyn std::error::Error>> {
    for event in ctl.take_events() {
        eprintln!();
        println!("{}", serde_json::to_string(&event)?);
    }
    Ok(())
}

fn print_progress(ctl: &Controller) {
    let state = ctl.state();
    let step = ctl.current_step();
    let progress = ctl.step_progress();
    let secs = state.time_remaining_secs.ceil() as u64;
    eprint!(
        "\r[{:>2}/{}] {:<18} {:02}:{:02}  {:5.1}%",
        progress.current,
        progress.total,
        step.label,
        secs / 60,
        secs % 60,
        ctl.progress_percentage()
    );
    let _ = std::io::stderr().flush();
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load_or_default();
    let frames = FrameQueue::new();
    let engine = TimerEngine::new(MonotonicClock::new(), frames.clone());
    let persistence = SessionPersistence::open_default();
    if !persistence.is_durable() {
        eprintln!("warning: storage unavailable, this session will not be saved");
    }

    let mut ctl = CycleController::new(
        CycleStore::with_step_duration(config.step_duration_secs),
        engine,
        persistence,
    )
    .with_audio(Box::new(TerminalBell));

    let step_override = args
        .step_duration
        .or_else(|| std::env::var(STEP_DURATION_ENV).ok());
    let recovered = ctl.init(step_override.as_deref());

    match (&recovered, args.fresh) {
        (Some(_), false) => {
            info!("continuing saved session");
            if ctl.status() == CycleStatus::Paused {
                ctl.resume();
            }
        }
        _ => ctl.start(),
    }
    print_events(&mut ctl)?;

    let frame_interval = Duration::from_millis(config.frame_interval_ms);
    let checkpoint_every = Duration::from_secs(config.checkpoint_interval_secs);
    let mut last_checkpoint = Instant::now();
    let mut shown_secs = None;

    while ctl.status() != CycleStatus::Completed {
        std::thread::sleep(frame_interval);
        let Some(id) = frames.take_due() else {
            break;
        };
        ctl.on_frame(id);
        print_events(&mut ctl)?;

        let secs = ctl.state().time_remaining_secs.ceil() as u64;
        if shown_secs != Some(secs) {
            shown_secs = Some(secs);
            print_progress(&ctl);
        }

        if !checkpoint_every.is_zero() && last_checkpoint.elapsed() >= checkpoint_every {
            ctl.checkpoint();
            last_checkpoint = Instant::now();
        }
    }

    ctl.shutdown();
    print_events(&mut ctl)?;
    println!("{}", serde_json::to_string_pretty(&ctl.snapshot())?);
    Ok(())
}
