use std::io::Write;

use anyhow::Result;
use tracing::info;

use crate::display::locale::Language;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    Reminder,
    StopwatchFinished,
}

/// Something able to get the user's attention. A browser would play a sound, the terminal rings
/// the bell.
#[cfg_attr(test, mockall::automock)]
pub trait Notifier {
    fn notify(&self, cue: Cue) -> Result<()>;
}

pub struct TerminalNotifier {
    language: Language,
}

impl TerminalNotifier {
    pub fn new(language: Language) -> Self {
        Self { language }
    }
}

impl Notifier for TerminalNotifier {
    fn notify(&self, cue: Cue) -> Result<()> {
        let text = match cue {
            Cue::Reminder => self.language.reminder_text(),
            Cue::StopwatchFinished => self.language.stopwatch_finished_text(),
        };
        info!("Notifying {cue:?}");
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "\x07{text}")?;
        stdout.flush()?;
        Ok(())
    }
}
