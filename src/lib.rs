//! Small local tracker for daily gratitude and good deeds. Entries are grouped by UTC day, fade
//! out over a week and are shown back in a shuffled order so older ones resurface.
//!

pub mod app;
pub mod cli;
pub mod display;
pub mod store;
pub mod timers;
pub mod utils;
