mod app;
mod colors;
mod event;
mod grid;
mod month;
mod options;
mod render;
mod store;
mod theme;
mod timerange;
use crate::app::{App, TerminalKeys};
use crate::options::Options;
use crate::store::EventStore;
use crate::timerange::LocalZone;
use anyhow::Context;
use lexopt::{Arg, Parser, ValueExt};
use ratatui::DefaultTerminal;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use time::{format_description::FormatItem, macros::format_description, Date, OffsetDateTime};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

static YMD_FMT: &[FormatItem<'_>] = format_description!("[year]-[month]-[day]");

/// Environment variable holding the log filter used with `--log-file`
static LOG_ENV: &str = "MINICAL_LOG";

#[derive(Clone, Debug, Eq, PartialEq)]
enum Command {
    Run {
        options: Options,
        date: Option<Date>,
        database: Option<PathBuf>,
        log_file: Option<PathBuf>,
    },
    Help,
    Version,
}

impl Command {
    fn from_parser(mut parser: Parser) -> Result<Command, lexopt::Error> {
        let mut options = Options::default();
        let mut date = None;
        let mut database = None;
        let mut log_file = None;
        while let Some(arg) = parser.next()? {
            match arg {
                Arg::Short('h') | Arg::Long("help") => return Ok(Command::Help),
                Arg::Short('V') | Arg::Long("version") => return Ok(Command::Version),
                Arg::Short('3') | Arg::Long("three") => options.three = true,
                Arg::Short('s') | Arg::Long("sunday") => options.sunday = true,
                Arg::Short('m') | Arg::Long("monday") => options.monday = true,
                Arg::Short('p') | Arg::Long("show-past") => options.show_past = true,
                Arg::Short('e') | Arg::Long("max-events") => {
                    options.max_events = parser.value()?.parse()?;
                }
                Arg::Short('d') | Arg::Long("database") => {
                    database = Some(PathBuf::from(parser.value()?));
                }
                Arg::Long("log-file") => log_file = Some(PathBuf::from(parser.value()?)),
                Arg::Value(value) if date.is_none() => {
                    let value = value.string()?;
                    match Date::parse(&value, &YMD_FMT) {
                        Ok(d) => date = Some(d),
                        Err(e) => {
                            return Err(lexopt::Error::ParsingFailed {
                                value,
                                error: Box::new(e),
                            })
                        }
                    }
                }
                _ => return Err(arg.unexpected()),
            }
        }
        Ok(Command::Run {
            options,
            date,
            database,
            log_file,
        })
    }

    fn run(self) -> anyhow::Result<()> {
        match self {
            Command::Run {
                options,
                date,
                database,
                log_file,
            } => {
                if let Some(path) = log_file {
                    init_logging(&path)?;
                }
                let now = OffsetDateTime::now_local().unwrap_or_else(|e| {
                    warn!(error = %e, "failed to determine local time zone; using UTC");
                    OffsetDateTime::now_utc()
                });
                debug!(
                    three = options.three,
                    sunday = options.sunday,
                    monday = options.monday,
                    show_past = options.show_past,
                    max_events = options.max_events,
                    "starting"
                );
                let store = EventStore::open(database.as_deref());
                let zone = Box::new(LocalZone::new(now.offset()));
                let today = now.date();
                let app = App::new(store, zone, options, today, date.unwrap_or(today))
                    .context("failed to load starting month")?;
                with_terminal(|mut terminal| {
                    terminal.hide_cursor().context("failed to hide cursor")?;
                    app.run(&mut terminal, &mut TerminalKeys)
                })
            }
            Command::Help => {
                println!("Usage: minical [OPTIONS] [YYYY-MM-DD]");
                println!();
                println!("Terminal month calendar showing Thunderbird calendar events");
                println!();
                println!("Keys: LEFT/RIGHT to change month, q to quit");
                println!();
                println!("Options:");
                println!("  -3, --three             Show the previous, current, and next months");
                println!("  -s, --sunday            Start weeks on Sunday");
                println!("  -m, --monday            Start weeks on Monday (default)");
                println!("  -p, --show-past         Include past events");
                println!("  -e, --max-events <N>    Maximum number of events to list [default: 5]");
                println!("  -d, --database <PATH>   Read events from this calendar cache file");
                println!("      --log-file <PATH>   Write logs to PATH (filter with ${LOG_ENV})");
                println!("  -h, --help              Display this help message and exit");
                println!("  -V, --version           Show the program version and exit");
                Ok(())
            }
            Command::Version => {
                println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
                Ok(())
            }
        }
    }
}

fn main() -> anyhow::Result<()> {
    Command::from_parser(Parser::from_env())?.run()
}

fn init_logging(path: &Path) -> anyhow::Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create log file {}", path.display()))?;
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn with_terminal<F, T>(func: F) -> anyhow::Result<T>
where
    F: FnOnce(DefaultTerminal) -> anyhow::Result<T>,
{
    let terminal = ratatui::init();
    let r = func(terminal);
    ratatui::restore();
    r
}
