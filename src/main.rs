use std::collections::HashSet;
use std::error::Error;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use chrono::{Datelike, NaiveDate, NaiveTime, Utc};
use clap::{Args, Parser, Subcommand};

use legasi_service::analysis::{filter_by_types, search, upcoming_events};
use legasi_service::clock::start_of_week;
use legasi_service::config::{self, Config, Secrets};
use legasi_service::dashboard::{build_dashboard, build_water_page};
use legasi_service::display;
use legasi_service::ingest::{CachedSource, HttpSource};
use legasi_service::logging::{self, DataSource, LogLevel};
use legasi_service::model::CalendarType;
use legasi_service::registry::DASHBOARD_CALENDARS;
use legasi_service::session::Session;
use legasi_service::store::{
    Added, ChecklistStore, EventStore, JournalStore, NewEvent, available_years, entries_for_month,
    load_vehicle_names,
};
use legasi_service::verify;

/// Legasi station dashboard
#[derive(Debug, Parser)]
#[command(name = "legasi", version)]
struct Cli {
    /// Config file (default: $LEGASI_CONFIG, then ./legasi.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// debug, info, warn or error
    #[arg(long, global = true, default_value = "warn")]
    log_level: LogLevel,

    /// Also append log lines to this file
    #[arg(long, global = true, value_name = "PATH")]
    log_file: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Vehicles, upcoming events, to-do list and weather
    Dashboard {
        /// Redraw every refresh interval until interrupted
        #[arg(long)]
        watch: bool,
    },
    /// Current river levels
    Water {
        #[arg(long)]
        watch: bool,
    },
    /// Calendar entries
    #[command(subcommand)]
    Events(EventsCommand),
    /// Logbook entries
    #[command(subcommand)]
    Journal(JournalCommand),
    /// To-do list
    #[command(subcommand)]
    Todo(TodoCommand),
    /// Check every configured source against the live APIs
    Verify {
        /// Write the report as JSON
        #[arg(long, value_name = "PATH")]
        output: Option<PathBuf>,
        /// Only check this vehicle's roster, e.g. MerschHLF21
        #[arg(long, value_name = "KEY", conflicts_with = "output")]
        vehicle: Option<String>,
    },
}

#[derive(Debug, Args)]
struct Login {
    /// User name
    #[arg(long)]
    user: String,
    /// Password; prompted on stdin when omitted
    #[arg(long)]
    password: Option<String>,
}

#[derive(Debug, Subcommand)]
enum EventsCommand {
    /// Numbered list of all events
    List {
        #[arg(long)]
        search: Option<String>,
    },
    /// Dashboard calendars from Monday of this week on
    Upcoming,
    /// Events of the selected calendar types (all when none given)
    Calendar {
        #[arg(long = "type", value_name = "CALENDAR")]
        types: Vec<String>,
    },
    Add {
        #[command(flatten)]
        login: Login,
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Calendar type, e.g. "Gemeinsam CIS Kalenner"
        #[arg(long = "type", value_name = "CALENDAR")]
        calendar_type: String,
        #[arg(long, value_parser = parse_date)]
        start_date: NaiveDate,
        /// Defaults to the start date
        #[arg(long, value_parser = parse_date)]
        end_date: Option<NaiveDate>,
        #[arg(long, value_parser = parse_time)]
        start_time: Option<NaiveTime>,
        #[arg(long, value_parser = parse_time)]
        end_time: Option<NaiveTime>,
        #[arg(long)]
        all_day: bool,
        /// Only for "Gefierer" events
        #[arg(long)]
        vehicle: Option<String>,
    },
    /// Delete by the index shown in `events list`
    Delete {
        #[command(flatten)]
        login: Login,
        index: usize,
    },
    /// Vehicle names available for "Gefierer" events
    Vehicles,
}

#[derive(Debug, Subcommand)]
enum JournalCommand {
    List {
        #[command(flatten)]
        login: Login,
        /// Defaults to the current year
        #[arg(long)]
        year: Option<i32>,
        /// 1-12, defaults to the current month
        #[arg(long)]
        month: Option<u32>,
        #[arg(long)]
        search: Option<String>,
    },
    Add {
        #[command(flatten)]
        login: Login,
        /// Put the text on the to-do list instead
        #[arg(long)]
        todo: bool,
        text: String,
    },
    Delete {
        #[command(flatten)]
        login: Login,
        id: String,
    },
    /// Convert legacy dates to ISO and assign missing ids
    Migrate,
}

#[derive(Debug, Subcommand)]
enum TodoCommand {
    List,
    Add {
        #[command(flatten)]
        login: Login,
        text: String,
    },
    Delete {
        #[command(flatten)]
        login: Login,
        id: String,
    },
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    ["%Y-%m-%d", "%d.%m.%Y"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw.trim(), fmt).ok())
        .ok_or_else(|| format!("expected YYYY-MM-DD or DD.MM.YYYY, got '{}'", raw))
}

fn parse_time(raw: &str) -> Result<NaiveTime, String> {
    ["%H:%M", "%H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(raw.trim(), fmt).ok())
        .ok_or_else(|| format!("expected HH:MM, got '{}'", raw))
}

fn main() -> Result<(), Box<dyn Error>> {
    config::load_env();
    let cli = Cli::parse();

    logging::init_logger(cli.log_level, cli.log_file.as_deref(), cli.log_file.is_some());

    let config = Config::load(cli.config.as_deref())?;
    let secrets = Secrets::from_env();
    logging::debug(DataSource::System, None, &format!("secrets: {:?}", secrets));

    match cli.command {
        Command::Dashboard { watch } => run_dashboard(&config, &secrets, watch),
        Command::Water { watch } => run_water(&config, watch),
        Command::Events(cmd) => run_events(&config, &secrets, cmd),
        Command::Journal(cmd) => run_journal(&config, &secrets, cmd),
        Command::Todo(cmd) => run_todo(&config, &secrets, cmd),
        Command::Verify { output, vehicle } => run_verify(&config, &secrets, output, vehicle),
    }
}

fn login(login: &Login, config: &Config, secrets: &Secrets) -> Result<Session, Box<dyn Error>> {
    let password = match &login.password {
        Some(p) => p.clone(),
        None => {
            eprint!("Passwuert: ");
            io::stderr().flush()?;
            let mut line = String::new();
            io::stdin().lock().read_line(&mut line)?;
            line
        }
    };
    let session = Session::login(&login.user, &password, &config.auth, secrets, Utc::now())?;
    println!("Verbonnen als {}", session.user());
    Ok(session)
}

fn source(config: &Config) -> Result<CachedSource<HttpSource>, Box<dyn Error>> {
    let http = HttpSource::new(config.fetch_timeout())?;
    Ok(CachedSource::new(http, config.cache_ttl()))
}

fn clear_screen() {
    print!("\x1B[2J\x1B[H");
}

// ---------------------------------------------------------------------------
// Pages
// ---------------------------------------------------------------------------

fn run_dashboard(config: &Config, secrets: &Secrets, watch: bool) -> Result<(), Box<dyn Error>> {
    let source = source(config)?;
    let refresh = Duration::from_secs(config.fetch.dashboard_refresh_secs.max(1));
    loop {
        let snapshot = build_dashboard(config, secrets, &source, Utc::now())?;
        if watch {
            clear_screen();
        }
        println!("{}", display::render_dashboard(&snapshot));
        if !watch {
            return Ok(());
        }
        thread::sleep(refresh);
    }
}

fn run_water(config: &Config, watch: bool) -> Result<(), Box<dyn Error>> {
    let source = source(config)?;
    let refresh = Duration::from_secs(config.fetch.water_refresh_secs.max(1));
    loop {
        let page = build_water_page(config, &source, Utc::now())?;
        if watch {
            clear_screen();
        }
        println!("{}", display::render_water_page(&page));
        if !watch {
            return Ok(());
        }
        thread::sleep(refresh);
    }
}

fn run_verify(
    config: &Config,
    secrets: &Secrets,
    output: Option<PathBuf>,
    vehicle: Option<String>,
) -> Result<(), Box<dyn Error>> {
    let source = HttpSource::new(config.fetch_timeout())?;
    if let Some(key) = vehicle {
        let result = verify::verify_vehicle_by_key(config, secrets, &source, &key)
            .ok_or_else(|| format!("no vehicle '{}' in the configuration", key))?;
        verify::print_vehicle_result(&result);
        return Ok(());
    }
    let report = verify::run_full_verification(config, secrets, &source, Utc::now());
    verify::print_report(&report);
    if let Some(path) = output {
        verify::save_report(&report, &path)?;
        println!("💾 Report saved to {}", path.display());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Calendar
// ---------------------------------------------------------------------------

fn run_events(config: &Config, secrets: &Secrets, cmd: EventsCommand) -> Result<(), Box<dyn Error>> {
    let tz = config.timezone()?;
    let store = EventStore::new(&config.data.events_file);

    match cmd {
        EventsCommand::List { search: text } => {
            let events = store.list_events()?;
            let matches = search(&events, text.as_deref().unwrap_or(""));
            if matches.is_empty() {
                println!("Keng Evenementer fonnt.");
            }
            for (index, event) in events.iter().enumerate() {
                if matches.iter().any(|m| std::ptr::eq(*m, event)) {
                    println!("{}", display::event_details(index, event, tz).join("\n"));
                }
            }
        }
        EventsCommand::Upcoming => {
            let events = store.list_events()?;
            let allowed: HashSet<_> = DASHBOARD_CALENDARS.into_iter().collect();
            let upcoming = upcoming_events(&events, &allowed, start_of_week(Utc::now(), tz), tz);
            if upcoming.is_empty() {
                println!("{}", display::NO_UPCOMING_EVENTS);
            }
            for event in upcoming {
                println!("{}", display::upcoming_line(event, tz));
            }
        }
        EventsCommand::Calendar { types } => {
            let selected: HashSet<CalendarType> = if types.is_empty() {
                CalendarType::ALL.into_iter().collect()
            } else {
                types
                    .iter()
                    .map(|t| t.parse::<CalendarType>())
                    .collect::<Result<_, _>>()?
            };
            let events = store.list_events()?;
            for event in filter_by_types(&events, &selected) {
                println!("{}", display::calendar_line(event, tz));
            }
        }
        EventsCommand::Add {
            login: credentials,
            title,
            description,
            calendar_type,
            start_date,
            end_date,
            start_time,
            end_time,
            all_day,
            vehicle,
        } => {
            let session = login(&credentials, config, secrets)?;
            let form = NewEvent {
                title,
                description,
                calendar_type: calendar_type.parse()?,
                start_date,
                end_date: end_date.unwrap_or(start_date),
                start_time,
                end_time,
                all_day,
                vehicle,
            };
            let event = store.add_event(&session, form)?;
            println!("✅ Evenement gouf ugeluecht: {}", display::upcoming_line(&event, tz));
        }
        EventsCommand::Delete { login: credentials, index } => {
            let session = login(&credentials, config, secrets)?;
            let removed = store.delete_event(&session, index)?;
            println!("🗑️ {}", removed.title);
        }
        EventsCommand::Vehicles => {
            for name in load_vehicle_names(&config.data.vehicles_file) {
                println!("{}", name);
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Journal and to-do
// ---------------------------------------------------------------------------

fn run_journal(config: &Config, secrets: &Secrets, cmd: JournalCommand) -> Result<(), Box<dyn Error>> {
    let tz = config.timezone()?;
    let journal = JournalStore::new(&config.data.journal_file, &config.data.checklist_file, tz);

    match cmd {
        JournalCommand::List {
            login: credentials,
            year,
            month,
            search: text,
        } => {
            login(&credentials, config, secrets)?;
            let now = Utc::now();
            let local_now = now.with_timezone(&tz);
            let entries = journal.list_entries()?;

            let years = available_years(&entries, now, tz);
            let year = year.unwrap_or(local_now.year());
            let month = month.unwrap_or(local_now.month());
            println!(
                "{} {} (Joren: {})",
                display::month_name(month),
                year,
                years.iter().map(|y| y.to_string()).collect::<Vec<_>>().join(", ")
            );

            let in_month = entries_for_month(&entries, year, month);
            let shown = search(in_month, text.as_deref().unwrap_or(""));
            if shown.is_empty() {
                println!("Keng Entrée fonnt fir dësen Mount / Joer.");
            }
            for entry in shown {
                println!("{}", display::journal_lines(entry, tz).join("\n"));
            }
        }
        JournalCommand::Add {
            login: credentials,
            todo,
            text,
        } => {
            let session = login(&credentials, config, secrets)?;
            match journal.add_entry(&session, &text, todo, Utc::now())? {
                Added::Entry(_) => println!("Entrée erfollegräich derbäigesat!"),
                Added::Todo(_) => println!("To-Do erfollegräich derbäigesat!"),
            }
        }
        JournalCommand::Delete { login: credentials, id } => {
            let session = login(&credentials, config, secrets)?;
            journal.delete_entry(&session, &id)?;
            println!("🗑️ {}", id);
        }
        JournalCommand::Migrate => {
            let report = journal.migrate()?;
            if report.changed() {
                println!(
                    "Migrated {} dates to ISO format, assigned {} ids.",
                    report.dates_rewritten, report.ids_assigned
                );
            } else {
                println!("No migration needed, all dates are already in ISO format.");
            }
            if report.unparseable > 0 {
                println!("⚠ {} entries have unreadable dates and were left as is.", report.unparseable);
            }
        }
    }
    Ok(())
}

fn run_todo(config: &Config, secrets: &Secrets, cmd: TodoCommand) -> Result<(), Box<dyn Error>> {
    let store = ChecklistStore::new(&config.data.checklist_file);
    match cmd {
        TodoCommand::List => {
            for item in store.list()? {
                println!("{}  {}", item.id, item.text);
            }
        }
        TodoCommand::Add { login: credentials, text } => {
            login(&credentials, config, secrets)?;
            let item = store.add_item(&text)?;
            println!("{}  {}", item.id, item.text);
        }
        TodoCommand::Delete { login: credentials, id } => {
            login(&credentials, config, secrets)?;
            let removed = store.delete_item(&id)?;
            println!("🗑️ {}", removed.text);
        }
    }
    Ok(())
}
