use std::fmt::Display;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// The two interface languages. Only a handful of strings are translated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Ar,
}

impl Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Language::En => write!(f, "en"),
            Language::Ar => write!(f, "ar"),
        }
    }
}

impl Language {
    pub fn empty_list_text(&self) -> &'static str {
        match self {
            Language::En => {
                "No gratitude added yet. Start by adding something you're grateful for!"
            }
            Language::Ar => "لا يوجد نعم مضافة بعد. أبدأ بإضافة شيء تحمد الله عليه.",
        }
    }

    pub fn reminder_text(&self) -> &'static str {
        match self {
            Language::En => "Time for a short remembrance",
            Language::Ar => "صلِّ على محمد",
        }
    }

    pub fn stopwatch_finished_text(&self) -> &'static str {
        match self {
            Language::En => "Time is up!",
            Language::Ar => "انتهى الوقت!",
        }
    }

    /// chrono format string used for day headings.
    pub fn heading_format(&self) -> &'static str {
        match self {
            Language::En => "%A, %B %-d, %Y",
            Language::Ar => "%Y/%m/%d",
        }
    }
}
