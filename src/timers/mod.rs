//! Periodic behavior: reminders and the focus stopwatch. Neither touches the record store, they
//! only talk to a [notifier::Notifier].

pub mod notifier;
pub mod reminder;
pub mod shutdown;
pub mod stopwatch;
