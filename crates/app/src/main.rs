use std::fmt;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use greeting_core::Clock;
use greeting_core::model::{AchievementRecord, SectionId, Transition};
use services::GreetingSession;
use storage::{InMemoryStore, JsonFileStore, KeyValueStore, ProgressStore, SqliteStore};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{HELP, HostCommand};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidStore { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidStore { raw } => write!(f, "invalid --store value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  greeting [--store <path>] [--memory] [--reset]");
    eprintln!();
    eprintln!("  --store <path>   directory for JSON snapshots, or a .sqlite/.sqlite3/.db file");
    eprintln!("  --memory         keep progress in memory only");
    eprintln!("  --reset          delete saved progress before starting");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  GREETING_STORE, RUST_LOG");
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum StoreTarget {
    Memory,
    JsonDir(PathBuf),
    Sqlite(PathBuf),
}

impl StoreTarget {
    fn from_path(raw: &str) -> Result<Self, ArgsError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ArgsError::InvalidStore {
                raw: raw.to_string(),
            });
        }
        let path = PathBuf::from(trimmed);
        let is_sqlite = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| matches!(ext, "sqlite" | "sqlite3" | "db"));
        Ok(if is_sqlite {
            StoreTarget::Sqlite(path)
        } else {
            StoreTarget::JsonDir(path)
        })
    }

    fn default_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("greeting-page")
    }

    fn open(&self) -> Result<Arc<dyn KeyValueStore>, Box<dyn std::error::Error>> {
        let store: Arc<dyn KeyValueStore> = match self {
            StoreTarget::Memory => Arc::new(InMemoryStore::new()),
            StoreTarget::JsonDir(dir) => Arc::new(JsonFileStore::open(dir)?),
            StoreTarget::Sqlite(path) => {
                ensure_parent(path)?;
                Arc::new(SqliteStore::open(path)?)
            }
        };
        Ok(store)
    }
}

fn ensure_parent(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent),
        _ => Ok(()),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Args {
    store: StoreTarget,
    reset: bool,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut store = match std::env::var("GREETING_STORE") {
            Ok(raw) if !raw.trim().is_empty() => StoreTarget::from_path(&raw)?,
            _ => StoreTarget::JsonDir(StoreTarget::default_dir()),
        };
        let mut reset = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--store" => {
                    let value = require_value(args, "--store")?;
                    store = StoreTarget::from_path(&value)?;
                }
                "--memory" => store = StoreTarget::Memory,
                "--reset" => reset = true,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self { store, reset })
    }
}

fn announce(out: &mut impl Write, records: &[AchievementRecord]) -> io::Result<()> {
    for record in records {
        writeln!(
            out,
            "  {} Achievement unlocked: {} ({})",
            record.icon, record.title, record.description
        )?;
    }
    Ok(())
}

fn show_transition(out: &mut impl Write, transition: &Transition) -> io::Result<()> {
    writeln!(
        out,
        "[{:?}] {} -> {}{}",
        transition.kind,
        transition.from,
        transition.to,
        if transition.first_visit { " (first visit)" } else { "" }
    )?;
    announce(out, &transition.unlocked)
}

fn show_status(out: &mut impl Write, session: &GreetingSession) -> io::Result<()> {
    let tracker = session.tracker();
    writeln!(out, "Current section: {}", session.current_section())?;
    writeln!(out, "Completion: {}%", tracker.completion_percentage())?;
    for section in SectionId::PRIMARY {
        writeln!(
            out,
            "  {:<8} visited={} completed={} interactions={} collectibles={}",
            section.as_str(),
            tracker.is_section_visited(section),
            tracker.is_section_completed(section),
            tracker.interactions(section).len(),
            tracker.collectibles(section).len(),
        )?;
    }
    writeln!(out, "Achievements: {}", tracker.achievements().len())?;
    writeln!(
        out,
        "Back available: {}",
        if session.can_go_back() { "yes" } else { "no" }
    )
}

/// Apply one command. Returns `false` when the visitor leaves.
fn dispatch(
    out: &mut impl Write,
    session: &mut GreetingSession,
    command: HostCommand,
) -> io::Result<bool> {
    match command {
        HostCommand::Go { section, kind } => match session.navigate_to_str(&section, kind) {
            Ok(transition) => show_transition(out, &transition)?,
            Err(err) => writeln!(out, "cannot navigate: {err}")?,
        },
        HostCommand::Back => match session.go_back() {
            Some(transition) => show_transition(out, &transition)?,
            None => writeln!(out, "nothing to go back to")?,
        },
        HostCommand::Interact { section, id } => {
            let added = session.mark_interaction_complete(section, &id);
            writeln!(out, "{}", if added { "recorded" } else { "already recorded" })?;
            if added && session.tracker().is_section_completed(section) {
                writeln!(out, "  {section} completed!")?;
            }
        }
        HostCommand::Collect { section, id } => {
            let added = session.add_collectible(section, &id);
            writeln!(out, "{}", if added { "collected" } else { "already collected" })?;
        }
        HostCommand::Secret(id) => {
            let added = session.unlock_secret(&id);
            writeln!(out, "{}", if added { "secret unlocked" } else { "already unlocked" })?;
        }
        HostCommand::Unlock(id) => match session.unlock_achievement(id) {
            Some(record) => announce(out, &[record])?,
            None => writeln!(out, "already unlocked")?,
        },
        HostCommand::Candles(count) => {
            let record = session.tracker_mut().record_candles_blown(count);
            match record {
                Some(record) => announce(out, &[record])?,
                None => writeln!(out, "{count} candle(s) out")?,
            }
        }
        HostCommand::Win(game) => {
            let records = session.tracker_mut().record_game_won(game);
            writeln!(out, "{game} won")?;
            announce(out, &records)?;
        }
        HostCommand::Status => show_status(out, session)?,
        HostCommand::Achievements => {
            let tracker = session.tracker();
            let records = tracker.achievements();
            if records.is_empty() {
                writeln!(out, "no achievements yet")?;
            }
            for record in records {
                writeln!(
                    out,
                    "  {} {} - {} ({})",
                    record.icon,
                    record.title,
                    record.description,
                    record.unlocked_at.to_rfc3339()
                )?;
            }
        }
        HostCommand::Help => writeln!(out, "{HELP}")?,
        HostCommand::Quit => return Ok(false),
    }
    Ok(true)
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);
    let parsed = Args::parse(&mut argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let backend = parsed.store.open()?;
    let store = ProgressStore::new(backend, Clock::system());
    if parsed.reset {
        store.clear()?;
        info!("saved progress cleared");
    }

    let mut session = GreetingSession::new(store);
    info!(
        store = ?parsed.store,
        completion = session.tracker().completion_percentage(),
        "session started"
    );

    let stdin = io::stdin();
    let mut out = io::stdout().lock();
    writeln!(out, "Welcome! Type `help` for commands.")?;
    if let Some(last) = session.tracker().state().last_visit() {
        writeln!(out, "Welcome back, last visit {}", last.to_rfc3339())?;
    }

    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let keep_going = match HostCommand::parse(&line) {
            Ok(command) => dispatch(&mut out, &mut session, command)?,
            Err(err) => {
                writeln!(out, "{err}")?;
                true
            }
        };
        out.flush()?;
        if !keep_going {
            break;
        }
    }

    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use greeting_core::time::fixed_clock;

    fn run_script(session: &mut GreetingSession, lines: &[&str]) -> String {
        let mut out = Vec::new();
        for line in lines {
            let command = HostCommand::parse(line).unwrap();
            if !dispatch(&mut out, session, command).unwrap() {
                break;
            }
        }
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn store_target_picks_backend_from_extension() {
        assert_eq!(
            StoreTarget::from_path("data/progress.sqlite3").unwrap(),
            StoreTarget::Sqlite(PathBuf::from("data/progress.sqlite3"))
        );
        assert_eq!(
            StoreTarget::from_path("data/progress").unwrap(),
            StoreTarget::JsonDir(PathBuf::from("data/progress"))
        );
        assert!(StoreTarget::from_path("  ").is_err());
    }

    #[test]
    fn args_accept_memory_and_reset() {
        let mut argv = vec!["--memory".to_string(), "--reset".to_string()].into_iter();
        let args = Args::parse(&mut argv).unwrap();
        assert_eq!(args.store, StoreTarget::Memory);
        assert!(args.reset);
    }

    #[test]
    fn args_reject_missing_store_value() {
        let mut argv = vec!["--store".to_string()].into_iter();
        assert!(matches!(
            Args::parse(&mut argv),
            Err(ArgsError::MissingValue { flag: "--store" })
        ));
    }

    #[test]
    fn script_reports_navigation_and_unlocks() {
        let mut session = GreetingSession::in_memory(fixed_clock());
        let output = run_script(
            &mut session,
            &["go gallery", "go nowhere", "back", "back", "candles 5", "quit", "status"],
        );
        assert!(output.contains("landing -> gallery (first visit)"));
        assert!(output.contains("Memory Lane"));
        assert!(output.contains("cannot navigate: unknown section: nowhere"));
        assert!(output.contains("nothing to go back to"));
        assert!(output.contains("Candle Blower"));
        assert!(!output.contains("Completion:"));
    }
}
