mod app;
mod config;
mod datetime;
mod dom;
mod models;
mod schedule;
mod tui;

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, Utc};
use clap::{Args, Parser, Subcommand};
use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use app::{run_headless, run_once, run_tui, AppState, PageController};
use config::{Keymap, Settings};
use datetime::{abbreviation_for, ShiftedClock, SystemClock, TimeParser, ViewerZone, WallClock};

#[derive(Parser)]
#[command(name = "agenda-live")]
#[command(version = "0.1.0")]
#[command(about = "Live session states, countdowns and next-session prompts for an event agenda page")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Settings file (defaults to the user config)
    #[arg(short, long, global = true, env = "AGENDA_CONFIG")]
    config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Write logs to a file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
}

#[derive(Args)]
struct PageArgs {
    /// Page description (.toml or .json)
    page: PathBuf,

    /// Pretend the current time is this (same formats as session times)
    #[arg(long)]
    now: Option<String>,

    /// View the page as if opened at this URL
    #[arg(long)]
    location: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify every session once and print the result
    Status {
        #[command(flatten)]
        page: PageArgs,
        #[arg(long)]
        json: bool,
    },
    /// Run the timers headless and print the final state
    Run {
        #[command(flatten)]
        page: PageArgs,
        /// Stop after this many seconds (runs until Ctrl-C otherwise)
        #[arg(long = "for")]
        for_secs: Option<u64>,
        #[arg(long)]
        json: bool,
    },
    /// Live terminal board
    Watch {
        #[command(flatten)]
        page: PageArgs,
    },
    /// Parse a session time string
    Parse {
        raw: String,
    },
    /// Show the viewer zone and its label
    Tz {
        /// IANA zone to label instead of the detected one
        #[arg(long)]
        zone: Option<String>,
    },
}

fn init_tracing(verbose: bool, log_file: Option<&PathBuf>, quiet_stderr: bool) -> Result<()> {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_env("AGENDA_LOG").unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let result = match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create log file {}", path.display()))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).try_init()
        }
        // the board owns the terminal; stray log lines would corrupt it
        None if quiet_stderr => builder.with_writer(std::io::sink).try_init(),
        None => builder.with_writer(std::io::stderr).try_init(),
    };
    result.map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))
}

fn build_state(settings: Settings, args: &PageArgs) -> Result<AppState> {
    let mut doc = dom::load_page(&args.page)
        .with_context(|| format!("failed to load page {}", args.page.display()))?;
    if let Some(location) = &args.location {
        doc.set_location(location.as_str());
    }

    let parser = TimeParser::new(settings.time.source_offset_minutes);
    let clock: Box<dyn WallClock> = match &args.now {
        Some(raw) => {
            let start = parser
                .parse(raw)
                .with_context(|| format!("could not parse --now {:?}", raw))?;
            Box::new(ShiftedClock::starting_at(start))
        }
        None => Box::new(SystemClock),
    };

    let zone = ViewerZone::detect(
        settings.time.viewer_zone.as_deref(),
        settings.time.viewer_offset_minutes,
    );
    let keymap = Keymap::from_table(&settings.keys);
    let controller = PageController::new(doc, settings, zone);
    Ok(AppState::new(controller, clock, keymap))
}

fn print_parsed(raw: &str, settings: &Settings) -> Result<()> {
    let parser = TimeParser::new(settings.time.source_offset_minutes);
    let instant: DateTime<Utc> = parser
        .parse(raw)
        .with_context(|| format!("unparseable time {:?}", raw))?;
    let zone = ViewerZone::detect(
        settings.time.viewer_zone.as_deref(),
        settings.time.viewer_offset_minutes,
    );
    println!("utc:    {}", instant.to_rfc3339());
    println!(
        "viewer: {} {}",
        instant.with_timezone(&zone.offset).format("%Y-%m-%d %H:%M"),
        zone.abbreviation()
    );
    Ok(())
}

fn print_zone(zone: Option<&str>, settings: &Settings) {
    let detected = ViewerZone::detect(
        settings.time.viewer_zone.as_deref(),
        settings.time.viewer_offset_minutes,
    );
    match zone {
        Some(iana) => {
            let offset: FixedOffset = detected.offset;
            println!("{} -> {}", iana, abbreviation_for(iana, offset));
        }
        None => println!(
            "{} (UTC{}) -> {}",
            detected.iana,
            detected.offset,
            detected.abbreviation()
        ),
    }
}

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("agenda-live error: {error:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let is_board = matches!(cli.command, Commands::Watch { .. });
    init_tracing(cli.verbose, cli.log_file.as_ref(), is_board)?;

    let settings = Settings::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Status { page, json } => {
            let mut state = build_state(settings, &page)?;
            let report = run_once(&mut state);
            if json {
                println!("{}", report.to_json()?);
            } else {
                print!("{}", report.render_text());
            }
        }
        Commands::Run { page, for_secs, json } => {
            let mut state = build_state(settings, &page)?;
            let report = run_headless(&mut state, for_secs.map(Duration::from_secs)).await?;
            if json {
                println!("{}", report.to_json()?);
            } else {
                print!("{}", report.render_text());
            }
        }
        Commands::Watch { page } => {
            let state = build_state(settings, &page)?;
            run_tui(state).await?;
        }
        Commands::Parse { raw } => print_parsed(&raw, &settings)?,
        Commands::Tz { zone } => print_zone(zone.as_deref(), &settings),
    }

    Ok(())
}
