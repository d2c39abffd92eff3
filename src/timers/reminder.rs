use std::time::Duration;

use anyhow::Result;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::utils::clock::Clock;

use super::notifier::{Cue, Notifier};

/// Fires a [Cue::Reminder] every `interval` until cancelled.
pub struct ReminderModule {
    notifier: Box<dyn Notifier>,
    interval: Duration,
    shutdown: CancellationToken,
    time_provider: Box<dyn Clock>,
}

impl ReminderModule {
    pub fn new(
        notifier: Box<dyn Notifier>,
        interval: Duration,
        shutdown: CancellationToken,
        time_provider: Box<dyn Clock>,
    ) -> Self {
        Self {
            notifier,
            interval,
            shutdown,
            time_provider,
        }
    }

    /// Executes the reminder loop. The first reminder comes one interval after start.
    pub async fn run(self) -> Result<()> {
        info!("Reminding every {:?}", self.interval);
        let mut reminder_point = self.time_provider.instant();
        loop {
            reminder_point += self.interval;

            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    return Ok(())
                }
                _ = self.time_provider.sleep_until(reminder_point) => ()
            }

            debug!("Reminder due");
            // A failed notification shouldn't stop further reminders.
            if let Err(e) = self.notifier.notify(Cue::Reminder) {
                error!("Failed to deliver reminder {e:?}");
            }
        }
    }
}
