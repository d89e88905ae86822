//! Print, display, and manage your UC timetable.

use anyhow::{bail, Context};
use chrono::{Duration, Local, NaiveDate};
use std::path::PathBuf;
use std::process::ExitCode;
use uc_timetable::cache::{EntryCache, FileStore};
use uc_timetable::config::Config;
use uc_timetable::fetch::CourseFetcher;
use uc_timetable::{render, schedule};

const USAGE: &str = "Print, display, and manage your UC timetable.

Usage:
    timetable [-v] show [--on=<date>] [--drop-cache] [--timeline]
    timetable [-v] week [--on=<date>] [--drop-cache]
    timetable [-v] next [--time] [--drop-cache]

Options:
    -h, --help         Show this screen.
    --on=<date>        Show the timetable for this date (YYYY-MM-DD).
    --drop-cache       Drop the cached timetable data and refetch.
    --time             Show only the time to the next class.
    -t, --timeline     Show the timetable as a vertical timeline.
    -v, --verbose      Be more verbose.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Show,
    Week,
    Next,
}

#[derive(Debug)]
struct Args {
    command: Command,
    on: Option<NaiveDate>,
    drop_cache: bool,
    timeline: bool,
    time_only: bool,
    verbose: bool,
}

fn parse_args(raw: impl Iterator<Item = String>) -> anyhow::Result<Args> {
    let mut command = None;
    let mut on = None;
    let mut drop_cache = false;
    let mut timeline = false;
    let mut time_only = false;
    let mut verbose = false;

    for arg in raw {
        match arg.as_str() {
            "show" => command = Some(Command::Show),
            "week" => command = Some(Command::Week),
            "next" => command = Some(Command::Next),
            "--drop-cache" => drop_cache = true,
            "-t" | "--timeline" => timeline = true,
            "--time" => time_only = true,
            "-v" | "--verbose" => verbose = true,
            "-h" | "--help" => {
                println!("{USAGE}");
                std::process::exit(0);
            }
            _ => {
                if let Some(date) = arg.strip_prefix("--on=") {
                    on = Some(
                        NaiveDate::parse_from_str(date, "%Y-%m-%d")
                            .with_context(|| format!("invalid date {date:?}"))?,
                    );
                } else {
                    bail!("unknown argument {arg:?}\n\n{USAGE}");
                }
            }
        }
    }

    let Some(command) = command else {
        bail!("no command given\n\n{USAGE}");
    };
    Ok(Args {
        command,
        on,
        drop_cache,
        timeline,
        time_only,
        verbose,
    })
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        "uc_timetable=debug"
    } else {
        "uc_timetable=warn"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn format_countdown(until: Duration) -> String {
    let minutes = until.num_minutes();
    format!("{}h{:02}m", minutes / 60, minutes % 60)
}

async fn run(args: Args) -> anyhow::Result<()> {
    let config_dir = std::env::var("TIMETABLE_CONFIG_PATH")
        .context("TIMETABLE_CONFIG_PATH is not set; point it at your config directory")?;
    let config_dir = PathBuf::from(config_dir);
    let config = Config::load(&config_dir.join("config.json"))?;

    let cache = EntryCache::new(FileStore::new(config_dir.join("data.json")));
    let fetcher = CourseFetcher::new();
    let outcome = cache
        .get(args.drop_cache, || fetcher.fetch_all(&config))
        .await?;

    let today = args.on.unwrap_or_else(|| Local::now().date_naive());
    match args.command {
        Command::Show => {
            let day_schedule = schedule::build_schedule(&outcome.entries, &config, today);
            println!(
                "Showing timetable for {}, {}",
                today.format("%A"),
                today.format("%Y-%m-%d")
            );
            if args.timeline {
                render::print_timeline(&day_schedule);
            } else {
                render::print_flat(&day_schedule);
            }
        }
        Command::Week => {
            println!(
                "Showing timetable for week {} of {}",
                today.format("%U"),
                today.format("%Y")
            );
            let monday = render::week_start(today);
            let days: Vec<_> = (0..5)
                .map(|offset| {
                    let date = monday + Duration::days(offset);
                    (
                        date,
                        schedule::build_schedule(&outcome.entries, &config, date),
                    )
                })
                .collect();
            render::print_week(&days);
        }
        Command::Next => {
            let now = Local::now().naive_local();
            match schedule::next_event(&outcome.entries, &config, now) {
                Some((_, until)) if args.time_only => println!("{}", format_countdown(until)),
                Some((event, until)) => {
                    println!(
                        "{}  (in {})",
                        render::format_event(&event),
                        format_countdown(until)
                    );
                }
                None => println!(
                    "No upcoming classes in the next {} days.",
                    schedule::SEARCH_WINDOW_DAYS
                ),
            }
        }
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };
    init_logging(args.verbose);

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> anyhow::Result<Args> {
        parse_args(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn parses_show_with_date_and_timeline() {
        let args = parse(&["-v", "show", "--on=2026-03-02", "--timeline"]).unwrap();
        assert_eq!(args.command, Command::Show);
        assert_eq!(args.on, NaiveDate::from_ymd_opt(2026, 3, 2));
        assert!(args.timeline);
        assert!(args.verbose);
        assert!(!args.drop_cache);
    }

    #[test]
    fn parses_next_with_time_flag() {
        let args = parse(&["next", "--time", "--drop-cache"]).unwrap();
        assert_eq!(args.command, Command::Next);
        assert!(args.time_only);
        assert!(args.drop_cache);
    }

    #[test]
    fn rejects_missing_command_and_unknown_flags() {
        assert!(parse(&[]).is_err());
        assert!(parse(&["show", "--frobnicate"]).is_err());
        assert!(parse(&["show", "--on=yesterday"]).is_err());
    }

    #[test]
    fn formats_countdown_as_hours_and_minutes() {
        assert_eq!(format_countdown(Duration::minutes(61)), "1h01m");
        assert_eq!(format_countdown(Duration::hours(46)), "46h00m");
        assert_eq!(format_countdown(Duration::minutes(5)), "0h05m");
    }
}
