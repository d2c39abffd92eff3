use std::io::Write;

use anyhow::Result;
use tokio_util::sync::CancellationToken;

use crate::{
    timers::{
        notifier::TerminalNotifier,
        reminder::ReminderModule,
        shutdown::detect_shutdown,
        stopwatch::{run_countdown, Stopwatch},
    },
};

use super::FileTracker;

/// Runs reminders in the foreground until ctrl-c.
pub async fn remind(tracker: &FileTracker) -> Result<()> {
    let settings = tracker.settings();
    if !settings.reminders_enabled {
        println!("Reminders are turned off. Enable them with `settings reminders`");
        return Ok(());
    }

    let shutdown_token = CancellationToken::new();
    let module = ReminderModule::new(
        Box::new(TerminalNotifier::new(settings.language)),
        settings.reminder_period(),
        shutdown_token.clone(),
        Box::new(tracker.clock()),
    );

    println!(
        "Reminding every {} minutes, press ctrl-c to stop",
        settings.reminder_interval
    );
    let (_, result) = tokio::join!(detect_shutdown(shutdown_token), module.run());
    result
}

/// Counts down in the foreground, redrawing the remaining time in place.
pub async fn stopwatch(tracker: &mut FileTracker, minutes: Option<u32>) -> Result<()> {
    if let Some(minutes) = minutes {
        tracker.update_settings(|v| v.set_stopwatch_duration(minutes))?;
    }
    let settings = tracker.settings();
    let stopwatch = Stopwatch::new(settings.stopwatch_duration)?;
    let notifier = TerminalNotifier::new(settings.language);
    let clock = tracker.clock();

    let shutdown_token = CancellationToken::new();
    print!("{}", stopwatch.format_time());
    std::io::stdout().flush()?;

    let (_, result) = tokio::join!(detect_shutdown(shutdown_token.clone()), async {
        let result = run_countdown(stopwatch, &notifier, &clock, shutdown_token.clone(), |v| {
            print!("\r{}", v.format_time());
            let _ = std::io::stdout().flush();
        })
        .await;
        println!();
        shutdown_token.cancel();
        result
    });
    result.map(|_| ())
}
