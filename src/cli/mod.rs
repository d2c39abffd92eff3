pub mod day;
pub mod show;
pub mod timers;

use std::{path::PathBuf, rc::Rc, sync::Arc};

use anyhow::Result;
use chrono::Local;
use clap::{Parser, Subcommand};
use day::{parse_day, DateStyle};
use tracing::level_filters::LevelFilter;

use crate::{
    app::{checklist::ItemKind, Tracker},
    display::locale::Language,
    store::storage::FileStorage,
    utils::{
        clock::DefaultClock,
        dir::{create_application_default_path, ensure_dir},
        logging::{enable_logging, LOG_PREFIX},
        time::date_to_record_name,
    },
};

#[derive(Parser, Debug)]
#[command(name = "Gratitude", version, long_about = None)]
#[command(about = "Keep a short daily list of things you are grateful for", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(long, help = "Print logs to the console")]
    log: bool,
    #[arg(
        long,
        global = true,
        help = "Application directory. By default uses $XDG_STATE_HOME/gratitude or $HOME/.local/state/gratitude"
    )]
    dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
#[command(version, about, long_about = None)]
enum Commands {
    #[command(about = "Add an entry to today's list")]
    Add {
        #[arg(required = true)]
        text: Vec<String>,
    },
    #[command(about = "Remove one entry from a day")]
    Remove {
        #[arg(required = true)]
        text: Vec<String>,
        #[arg(
            long,
            help = "Day of the entry. Examples are \"yesterday\", \"2025-03-15\", \"15/03/2025\". Defaults to today"
        )]
        day: Option<String>,
        #[arg(long, default_value_t = DateStyle::Uk, help = "Style of dates used during parsing. For Uk it's day/month/year. For Us it's month/day/year")]
        date_style: DateStyle,
    },
    #[command(about = "Show recent entries in a shuffled order")]
    Show {
        #[arg(long, help = "Disable colors and indentation")]
        plain: bool,
    },
    #[command(about = "Remove entries older than the retention window")]
    Prune {},
    #[command(about = "Daily checklist")]
    Checklist {
        #[command(subcommand)]
        command: Option<ChecklistCommand>,
    },
    #[command(about = "Show or change settings")]
    Settings {
        #[command(subcommand)]
        command: Option<SettingsCommand>,
    },
    #[command(about = "Ring a reminder at the configured interval until interrupted")]
    Remind {},
    #[command(about = "Run the focus stopwatch")]
    Stopwatch {
        #[arg(short, long, help = "Duration in minutes, saved as the new default")]
        minutes: Option<u32>,
    },
    #[command(about = "Sample data for trying things out")]
    Demo {
        #[command(subcommand)]
        command: DemoCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ChecklistCommand {
    #[command(about = "List today's items")]
    List {},
    #[command(about = "Mark an item as done and log it")]
    Check { item: String },
    #[command(about = "Clear an item's mark and take it out of today's list")]
    Uncheck { item: String },
    #[command(about = "Add a custom item")]
    Add { item: String },
    #[command(about = "Hide a built-in item or delete a custom one")]
    Remove { item: String },
    #[command(about = "Show a hidden built-in item again")]
    Restore { item: String },
    #[command(about = "List hidden built-in items")]
    Hidden {},
}

#[derive(Subcommand, Debug)]
enum SettingsCommand {
    #[command(about = "Print current settings")]
    Show {},
    #[command(about = "Switch between light and dark theme")]
    Theme {},
    #[command(about = "Set the interface language")]
    Language { language: Language },
    #[command(about = "Turn reminders on or off")]
    Reminders {},
    #[command(about = "Minutes between reminders")]
    Interval { minutes: u32 },
    #[command(about = "Default stopwatch duration in minutes (1-120)")]
    Stopwatch { minutes: u32 },
}

#[derive(Subcommand, Debug)]
enum DemoCommand {
    #[command(about = "Add sample entries for the last few days")]
    Populate {},
    #[command(about = "Delete every record")]
    Clear {},
    #[command(about = "Print record totals")]
    Info {},
}

pub type FileTracker = Tracker<Rc<FileStorage>>;

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };

    let dir = match args.dir {
        Some(dir) => ensure_dir(dir)?,
        None => create_application_default_path()?,
    };
    enable_logging(LOG_PREFIX, &dir, logging_level, args.log)?;

    let storage = Rc::new(FileStorage::new(dir.join("storage"))?);
    let mut tracker = Tracker::load(storage, Arc::new(DefaultClock));

    match args.commands {
        Commands::Add { text } => {
            if !tracker.add_entry(&text.join(" "))? {
                println!("Nothing to add");
            }
            Ok(())
        }
        Commands::Remove {
            text,
            day,
            date_style,
        } => {
            let day = parse_day(day.as_deref(), date_style, tracker.clock().time())?;
            let text = text.join(" ");
            if !tracker.remove_entry(day, &text)? {
                println!("No entry {text:?} on {}", date_to_record_name(day));
            }
            Ok(())
        }
        Commands::Show { plain } => {
            let projection = tracker.view::<Local>(&mut rand::thread_rng());
            show::print_projection(&projection, plain);
            Ok(())
        }
        Commands::Prune {} => {
            for day in tracker.prune() {
                println!("Removed {}", date_to_record_name(day));
            }
            Ok(())
        }
        Commands::Checklist { command } => {
            process_checklist_command(&mut tracker, command.unwrap_or(ChecklistCommand::List {}))
        }
        Commands::Settings { command } => {
            process_settings_command(&mut tracker, command.unwrap_or(SettingsCommand::Show {}))
        }
        Commands::Remind {} => timers::remind(&tracker).await,
        Commands::Stopwatch { minutes } => timers::stopwatch(&mut tracker, minutes).await,
        Commands::Demo { command } => process_demo_command(&mut tracker, command),
    }
}

fn process_checklist_command(tracker: &mut FileTracker, command: ChecklistCommand) -> Result<()> {
    let changed = match command {
        ChecklistCommand::List {} => {
            for item in tracker.checklist_items() {
                let mark = if item.checked { "[x]" } else { "[ ]" };
                let custom = if item.kind == ItemKind::Custom {
                    " (custom)"
                } else {
                    ""
                };
                println!("{mark} {}{custom}", item.text);
            }
            return Ok(());
        }
        ChecklistCommand::Hidden {} => {
            for item in tracker.hidden_items() {
                println!("{item}");
            }
            return Ok(());
        }
        ChecklistCommand::Check { item } => tracker.check(&item)?,
        ChecklistCommand::Uncheck { item } => tracker.uncheck(&item)?,
        ChecklistCommand::Add { item } => tracker.add_checklist_item(&item)?,
        ChecklistCommand::Remove { item } => tracker.remove_checklist_item(&item)?,
        ChecklistCommand::Restore { item } => tracker.restore_checklist_item(&item)?,
    };

    if !changed {
        println!("Nothing changed");
    }
    Ok(())
}

fn process_settings_command(tracker: &mut FileTracker, command: SettingsCommand) -> Result<()> {
    match command {
        SettingsCommand::Show {} => {}
        SettingsCommand::Theme {} => {
            tracker.update_settings(|v| Ok(v.toggle_theme()))?;
        }
        SettingsCommand::Language { language } => {
            tracker.update_settings(|v| {
                v.language = language;
                Ok(())
            })?;
        }
        SettingsCommand::Reminders {} => {
            tracker.update_settings(|v| Ok(v.toggle_reminders()))?;
        }
        SettingsCommand::Interval { minutes } => {
            tracker.update_settings(|v| v.set_reminder_interval(minutes))?;
        }
        SettingsCommand::Stopwatch { minutes } => {
            tracker.update_settings(|v| v.set_stopwatch_duration(minutes))?;
        }
    }

    let settings = tracker.settings();
    println!("theme\t{}", settings.theme);
    println!("language\t{}", settings.language);
    println!(
        "reminders\t{}",
        if settings.reminders_enabled {
            format!("every {} minutes", settings.reminder_interval)
        } else {
            "off".to_string()
        }
    );
    println!("stopwatch\t{} minutes", settings.stopwatch_duration);
    Ok(())
}

fn process_demo_command(tracker: &mut FileTracker, command: DemoCommand) -> Result<()> {
    match command {
        DemoCommand::Populate {} => {
            let added = tracker.populate_demo_data()?;
            println!("Added {added} entries");
        }
        DemoCommand::Clear {} => tracker.clear_demo_data()?,
        DemoCommand::Info {} => {
            let info = tracker.demo_info();
            println!("records\t{}", info.total_records);
            println!("entries\t{}", info.total_entries);
            if let (Some(oldest), Some(newest)) = (info.oldest, info.newest) {
                println!(
                    "range\t{} - {}",
                    oldest.with_timezone(&Local).format("%x"),
                    newest.with_timezone(&Local).format("%x")
                );
            }
        }
    }
    Ok(())
}
