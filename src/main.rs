// Copyright 2025 Martin Pool

//! Command-line front end: format, parse and round tracker worklog times.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use jiff::tz::TimeZone;
use jiff::{SignedDuration, Timestamp, Zoned};
use schemars::schema_for;
use tracing::level_filters::LevelFilter;
use tracing::{debug, error, info};
use tracing_subscriber::{Layer, filter::filter_fn, fmt, layer::SubscriberExt};

use tracker_time::config::Config;
use tracker_time::{
    Error, Result, TimeTracking, TrackerTimeParser, format_tracker_time, format_tracker_timestamp,
};

static LOG_TARGET_PREFIX: &str = "tracker_time";

#[derive(Parser)]
#[command(name = "tracker-time", version)]
#[command(about = "Parse, format and round issue-tracker worklog times")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to tracker-time configuration file.
    ///
    /// If not provided, the default is ~/.config/tracker-time.toml. If that does
    /// not exist, built-in defaults will be used.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Hours in one working day, overriding the configuration file.
    #[arg(long, global = true)]
    working_hours: Option<u32>,

    /// Also write debug logs to this file.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Format a duration as tracker text
    #[command(visible_alias = "f")]
    Format {
        /// Duration such as "90m", "1h 30m" or "PT1H30M"
        duration: String,
    },

    /// Parse tracker text such as "1d 2h 30m"
    #[command(visible_alias = "p")]
    Parse {
        /// Tracker text
        text: String,
    },

    /// Round tracker text up using the configured rounding rules
    #[command(visible_alias = "r")]
    Round {
        /// Tracker text
        text: String,
    },

    /// Print a timestamp in the form tracker worklogs take
    Timestamp {
        /// Instant to print, such as "2016-05-01T08:00:00Z"; defaults to now.
        #[arg(long)]
        at: Option<String>,
    },

    /// Print the JSON schema for the configuration file.
    ConfigSchema {},
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(err) = setup_tracing(cli.log_file.as_deref()) {
        eprintln!("Failed to initialize logging: {err}");
        return ExitCode::FAILURE;
    }
    match inner_main(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn inner_main(cli: &Cli) -> Result<()> {
    let mut config = Config::new(&cli.config)?;
    if let Some(hours) = cli.working_hours {
        config.working_hours_per_day = Some(hours);
    }
    debug!(?config);
    let time_tracking = config.time_tracking()?;

    match &cli.command {
        Commands::Format { duration } => {
            let duration: SignedDuration = duration.parse().map_err(|err| {
                error!("Failed to parse duration {duration:?}: {err}");
                Error::Argument(format!("{err}"))
            })?;
            println!("{}", format_tracker_time(duration, time_tracking.as_ref()));
        }

        Commands::Parse { text } => {
            let duration = parse(text, &time_tracking)?;
            println!(
                "{} ({} minutes)",
                format_tracker_time(duration, time_tracking.as_ref()),
                duration.as_mins()
            );
        }

        Commands::Round { text } => {
            let rules = config.rounding_rules()?;
            let duration = parse(text, &time_tracking)?;
            let rule = rules.select(duration);
            info!("Rounding up with rule {rule}");
            println!(
                "{}",
                format_tracker_time(rules.round_up(duration), time_tracking.as_ref())
            );
        }

        Commands::Timestamp { at } => {
            let zoned = match at {
                Some(at) => {
                    let timestamp: Timestamp = at.parse().map_err(|err| {
                        error!("Failed to parse timestamp {at:?}: {err}");
                        Error::Argument(format!("{err}"))
                    })?;
                    timestamp.to_zoned(TimeZone::system())
                }
                None => Zoned::now(),
            };
            println!("{}", format_tracker_timestamp(&zoned));
        }

        Commands::ConfigSchema {} => {
            let schema = serde_json::to_string_pretty(&schema_for!(Config))
                .map_err(|err| Error::Io(err.into()))?;
            println!("{schema}");
        }
    };
    Ok(())
}

fn parse(text: &str, time_tracking: &Option<TimeTracking>) -> Result<SignedDuration> {
    TrackerTimeParser::new(time_tracking.as_ref())
        .parse(text)
        .map_err(|source| Error::Unparseable {
            text: text.to_owned(),
            source,
        })
}

fn setup_tracing(log_path: Option<&Path>) -> Result<()> {
    let file_layer = match log_path {
        Some(log_path) => Some(
            fmt::Layer::new()
                .with_ansi(false)
                .with_target(true)
                .with_level(true)
                .with_writer(File::create(log_path)?)
                .with_filter(filter_fn(|metadata| {
                    metadata.target().starts_with(LOG_TARGET_PREFIX)
                }))
                .with_filter(LevelFilter::DEBUG),
        ),
        None => None,
    };
    let stderr_layer = fmt::Layer::new()
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .with_filter(filter_fn(|metadata| {
            metadata.target().starts_with(LOG_TARGET_PREFIX)
        }))
        .with_filter(LevelFilter::INFO);
    tracing::subscriber::set_global_default(
        tracing_subscriber::registry()
            .with(stderr_layer)
            .with(file_layer),
    )
    .map_err(std::io::Error::other)?;
    if let Some(log_path) = log_path {
        info!("Tracing initialized to file {}", log_path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_options_after_subcommand() {
        let cli = Cli::try_parse_from(["tracker-time", "parse", "1d 2h", "--working-hours", "7"])
            .unwrap();
        assert_eq!(cli.working_hours, Some(7));
        assert!(matches!(cli.command, Commands::Parse { ref text } if text == "1d 2h"));
    }

    #[test]
    fn parse_reports_unparseable_text() {
        let err = parse("garbage", &None).unwrap_err();
        assert!(err.to_string().contains("\"garbage\""), "{err}");
    }
}
