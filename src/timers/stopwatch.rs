use std::time::Duration;

use anyhow::{anyhow, Result};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::{app::settings::MAX_STOPWATCH_DURATION, utils::clock::Clock};

use super::notifier::{Cue, Notifier};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Not running, nothing changed.
    Idle,
    /// One second passed, holds the seconds left.
    Running(u32),
    /// The countdown just reached zero and stopped.
    Finished,
}

/// Focus countdown. Purely a state machine, [run_countdown] drives it in real time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stopwatch {
    duration_minutes: u32,
    time_left: u32,
    running: bool,
}

impl Stopwatch {
    pub fn new(duration_minutes: u32) -> Result<Self> {
        let mut stopwatch = Self {
            duration_minutes: 1,
            time_left: 0,
            running: false,
        };
        stopwatch.set_duration(duration_minutes)?;
        Ok(stopwatch)
    }

    pub fn time_left(&self) -> u32 {
        self.time_left
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Starts or resumes the countdown. Returns `false` if it is already running or at zero.
    pub fn start(&mut self) -> bool {
        if self.running || self.time_left == 0 {
            return false;
        }
        self.running = true;
        true
    }

    pub fn pause(&mut self) {
        self.running = false;
    }

    /// Stops and rewinds to the full duration.
    pub fn reset(&mut self) {
        self.running = false;
        self.time_left = self.duration_minutes * 60;
    }

    /// Changes the duration and resets. Accepts 1 to 120 minutes.
    pub fn set_duration(&mut self, minutes: u32) -> Result<()> {
        if !(1..=MAX_STOPWATCH_DURATION).contains(&minutes) {
            return Err(anyhow!(
                "Stopwatch duration must be between 1 and {MAX_STOPWATCH_DURATION} minutes"
            ));
        }
        self.duration_minutes = minutes;
        self.reset();
        Ok(())
    }

    pub fn tick(&mut self) -> Tick {
        if !self.running {
            return Tick::Idle;
        }
        self.time_left = self.time_left.saturating_sub(1);
        if self.time_left == 0 {
            self.running = false;
            Tick::Finished
        } else {
            Tick::Running(self.time_left)
        }
    }

    pub fn format_time(&self) -> String {
        format_seconds(self.time_left)
    }
}

/// `MM:SS`, minutes are not capped at 59.
pub fn format_seconds(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Runs the stopwatch until it finishes or `shutdown` is cancelled, calling `on_tick` every
/// second of `clock` with the remaining time. Returns whether the countdown finished.
pub async fn run_countdown(
    mut stopwatch: Stopwatch,
    notifier: &dyn Notifier,
    clock: &dyn Clock,
    shutdown: CancellationToken,
    mut on_tick: impl FnMut(&Stopwatch),
) -> Result<bool> {
    if !stopwatch.start() {
        return Ok(false);
    }
    info!("Stopwatch started with {}", stopwatch.format_time());

    let mut tick_point = clock.instant();
    loop {
        tick_point += Duration::from_secs(1);

        tokio::select! {
            _ = shutdown.cancelled() => {
                debug!("Stopwatch cancelled at {}", stopwatch.format_time());
                return Ok(false)
            }
            _ = clock.sleep_until(tick_point) => ()
        }

        match stopwatch.tick() {
            Tick::Finished => {
                on_tick(&stopwatch);
                notifier.notify(Cue::StopwatchFinished)?;
                return Ok(true);
            }
            Tick::Running(_) => on_tick(&stopwatch),
            Tick::Idle => return Ok(false),
        }
    }
}
