use std::io::{self, Write};
use std::sync::mpsc;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use quackr::config::Config;
use quackr::engine::scoring;
use quackr::event::{
    Clock, EventHandler, HostEvent, LogNotifier, Notifier, SystemClock, TrainerEvent,
};
use quackr::generator::dictionary::EmbeddedDictionaries;
use quackr::keyboard::layout::EmbeddedLayouts;
use quackr::store::{JsonStore, MemoryStore, PersistenceStore};
use quackr::{Resources, Trainer};

#[derive(Parser)]
#[command(
    name = "quackr",
    version,
    about = "Adaptive typing lessons that unlock keys as your streak grows"
)]
struct Cli {
    #[arg(short, long, help = "Keyboard layout (qwerty, azerty, ergol)")]
    layout: Option<String>,

    #[arg(short, long, help = "Dictionary (en, fr); remembered for next time")]
    dict: Option<String>,

    #[arg(long, help = "Seed for reproducible lessons")]
    seed: Option<u64>,

    #[arg(short, long, action = clap::ArgAction::Count, help = "Increase log verbosity")]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Clone, Debug)]
enum Command {
    /// Type lessons line by line (default)
    Practice,
    /// Show level, streak and unlocked letters
    Status,
    /// Jump to a level, i.e. a number of unlocked keys
    SetLevel { level: usize },
    /// Start the current layout over at the starting level
    Reset,
    /// List the built-in layouts and dictionaries
    List,
    /// Write the effective settings to the config file
    Config,
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn open_store() -> Box<dyn PersistenceStore> {
    match JsonStore::new() {
        Ok(store) => Box::new(store),
        Err(e) => {
            tracing::warn!(error = %e, "progress will not be saved");
            Box::new(MemoryStore::default())
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = Config::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "ignoring unreadable config");
        Config::default()
    });
    if let Some(layout) = cli.layout {
        config.layout = layout;
    }

    let command = cli.command.unwrap_or(Command::Practice);
    if let Command::List = command {
        println!("layouts:      {}", EmbeddedLayouts::available().join(", "));
        println!("dictionaries: {}", EmbeddedDictionaries::available().join(", "));
        return Ok(());
    }
    if let Command::Config = command {
        config.save()?;
        println!("{}", Config::config_path().display());
        return Ok(());
    }

    let store = open_store();
    let resources = Resources {
        layouts: Box::new(EmbeddedLayouts),
        dictionaries: Box::new(EmbeddedDictionaries),
    };

    match command {
        Command::Practice => {
            let (tx, rx) = mpsc::channel();
            let notifier = Fanout(tx, LogNotifier);
            let mut trainer =
                Trainer::start(config, resources, store, Box::new(notifier), cli.seed)?;
            if let Some(dict) = &cli.dict {
                trainer.select_dictionary(dict)?;
            }
            practice(&mut trainer, &rx, &SystemClock)
        }
        other => {
            let mut trainer =
                Trainer::start(config, resources, store, Box::new(LogNotifier), cli.seed)?;
            if let Some(dict) = &cli.dict {
                trainer.select_dictionary(dict)?;
            }
            match other {
                Command::SetLevel { level } => trainer.set_level(level)?,
                Command::Reset => trainer.reset()?,
                _ => {}
            }
            print_status(&trainer);
            Ok(())
        }
    }
}

/// Send every event to the terminal loop and to the log.
struct Fanout(mpsc::Sender<TrainerEvent>, LogNotifier);

impl Notifier for Fanout {
    fn notify(&mut self, event: &TrainerEvent) {
        self.0.notify(event);
        self.1.notify(event);
    }
}

fn practice(
    trainer: &mut Trainer,
    events: &mpsc::Receiver<TrainerEvent>,
    clock: &impl Clock,
) -> Result<()> {
    println!("Type each lesson and press Enter.");
    println!("Commands: :level <n>, :dict <id>, :layout <id>, :geometry <id>, :q");
    let input = EventHandler::new(Duration::from_millis(100));
    let mut typing_since = clock.now();
    show_events(trainer, events, &mut typing_since, clock);

    loop {
        match input.next()? {
            HostEvent::Line(line, entered_at) => {
                if let Some(command) = line.trim().strip_prefix(':') {
                    if !run_command(trainer, command)? {
                        return Ok(());
                    }
                } else {
                    feed_line(trainer, &line, typing_since, entered_at);
                    typing_since = entered_at;
                }
            }
            HostEvent::Tick => trainer.tick(clock.now())?,
            HostEvent::Eof => return Ok(()),
        }
        show_events(trainer, events, &mut typing_since, clock);
    }
}

/// Returns false when the learner asked to quit.
fn run_command(trainer: &mut Trainer, command: &str) -> Result<bool> {
    let mut parts = command.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some("q"), _) | (Some("quit"), _) => return Ok(false),
        (Some("level"), Some(level)) => match level.parse::<usize>() {
            Ok(level) => trainer.set_level(level)?,
            Err(_) => println!("not a level: {level}"),
        },
        (Some("dict"), Some(id)) => {
            if let Err(e) = trainer.select_dictionary(id) {
                println!("{e}");
            }
        }
        (Some("layout"), Some(id)) => {
            if let Err(e) = trainer.select_layout(id) {
                println!("{e}");
            }
        }
        (Some("geometry"), Some(id)) => trainer.select_geometry(id),
        _ => println!("unknown command :{command}"),
    }
    Ok(true)
}

/// Keystrokes get timestamps spread evenly between the previous Enter (or
/// the moment the lesson appeared) and this one.
fn feed_line(trainer: &mut Trainer, line: &str, since: Instant, entered_at: Instant) {
    let chars: Vec<char> = line.chars().collect();
    let span = entered_at.saturating_duration_since(since);
    let n = chars.len();
    for (i, &ch) in chars.iter().enumerate() {
        let at = since + span.mul_f64((i + 1) as f64 / n as f64);
        trainer.handle_key(ch, at);
    }
}

fn show_events(
    trainer: &Trainer,
    events: &mpsc::Receiver<TrainerEvent>,
    typing_since: &mut Instant,
    clock: &impl Clock,
) {
    for event in events.try_iter() {
        match event {
            TrainerEvent::LevelChanged { level, streak } => {
                println!();
                println!("level {level}  {}", ducks(streak));
                println!("{}", key_list(trainer));
            }
            TrainerEvent::LessonReady { .. } => {
                if let Some(session) = trainer.session() {
                    println!();
                    println!("{}", session.lesson);
                }
                *typing_since = clock.now();
            }
            TrainerEvent::NoCandidates { level } => {
                println!(
                    "Nothing to practice at level {level} with dictionary '{}'. Try :level or :dict.",
                    trainer.dictionary_id()
                );
            }
            TrainerEvent::KeyRejected { .. } => {}
            TrainerEvent::LessonFinished {
                result,
                passed,
                streak,
                ..
            } => {
                let thresholds = trainer.config.thresholds();
                let (speed, precision) = scoring::progress_towards(&result, &thresholds);
                println!(
                    "{} wpm, {} cpm {}  {:.1} % {}  {}",
                    result.wpm,
                    result.cpm,
                    bar(speed),
                    result.accuracy,
                    bar(precision),
                    if passed { "quack!" } else { "" }
                );
                println!("{}", ducks(streak));
            }
        }
    }
    let _ = io::stdout().flush();
}

fn ducks(streak: u32) -> String {
    "🦆".repeat(streak as usize)
}

fn bar(ratio: f64) -> String {
    let filled = (ratio * 10.0).round() as usize;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(10 - filled.min(10)))
}

/// Practice keys in unlock order; locked ones in parentheses.
fn key_list(trainer: &Trainer) -> String {
    let level = trainer.key_set().level;
    trainer
        .catalogue()
        .keys()
        .iter()
        .map(|key| {
            if key.position < level {
                key.label().to_string()
            } else {
                format!("({})", key.label())
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn print_status(trainer: &Trainer) {
    let state = trainer.level_state();
    let keys = trainer.key_set();
    let unlocked: String = keys.unlocked().iter().collect();
    let new: String = keys.new_letters().iter().collect();
    println!("layout:     {}", trainer.layout_id());
    println!("dictionary: {}", trainer.dictionary_id());
    println!("geometry:   {}", trainer.geometry());
    println!(
        "level:      {} / {} ({:.0} %)",
        state.level,
        trainer.catalogue().len(),
        keys.progress(trainer.catalogue().len()) * 100.0
    );
    println!("streak:     {} {}", state.streak, ducks(state.streak));
    println!("unlocked:   {unlocked}");
    println!("new:        {new}");
    println!("candidates: {}", trainer.candidates().len());
    println!("keys:       {}", key_list(trainer));
}
