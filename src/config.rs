//! Configuration files for tracker-time.

use std::{
    env::home_dir,
    path::{Path, PathBuf},
    str::FromStr,
};

use schemars::JsonSchema;
use serde::Deserialize;
use tracing::debug;

use crate::rounding::{DEFAULT_ROUNDING, RoundingRules};
use crate::tracker_time::TimeTracking;
use crate::{Error, Result};

/// Default configuration file name, relative to home.
static DEFAULT_CONFIG_FILE: &str = ".config/tracker-time.toml";

/// Configuration for tracker-time.
///
/// This is by default read from `~/.config/tracker-time.toml`, or from the file specified by
/// `--config`.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct Config {
    /// Number of hours in one working day, from 1 to 24.
    ///
    /// Days in tracker text are this many hours long. If unset, days in parsed text are 8 hours,
    /// and formatted durations use 24-hour days.
    pub working_hours_per_day: Option<u32>,

    /// Rules for rounding logged time up, each `"<minutes limit>;<round to minutes>"`.
    ///
    /// A limit of `*` is the catch-all for durations longer than every other limit, and
    /// exactly one is required. Defaults to `["6;6", "12;12", "*;15"]`.
    pub rounding: Option<Vec<String>>,
}

impl Config {
    /// Load from a file, or load from the default location, or use builtin defaults.
    pub fn new(config_path: &Option<PathBuf>) -> Result<Self> {
        if let Some(config_path) = config_path {
            return Self::from_file(config_path);
        }
        match home_dir().map(|home| home.join(DEFAULT_CONFIG_FILE)) {
            Some(default_path) if default_path.exists() => Self::from_file(&default_path),
            _ => {
                debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub(crate) fn from_file(config_path: &Path) -> Result<Self> {
        debug!(?config_path, "Loading config from file");
        let config_str = std::fs::read_to_string(config_path).map_err(|err| {
            Error::Config(format!(
                "Failed to load config file {}: {err}",
                config_path.display()
            ))
        })?;
        let config: Config = config_str.parse().map_err(|err| {
            Error::Config(format!(
                "Failed to parse config file {}: {err}",
                config_path.display()
            ))
        })?;
        config.time_tracking().map_err(|err| {
            Error::Config(format!("In config file {}: {err}", config_path.display()))
        })?;
        Ok(config)
    }

    /// The configured working day, if any.
    pub fn time_tracking(&self) -> Result<Option<TimeTracking>> {
        match self.working_hours_per_day {
            None => Ok(None),
            Some(hours @ 1..=24) => Ok(Some(TimeTracking::new(hours))),
            Some(hours) => Err(Error::Config(format!(
                "working_hours_per_day must be between 1 and 24, not {hours}"
            ))),
        }
    }

    /// The configured rounding rules, or the builtin defaults.
    pub fn rounding_rules(&self) -> Result<RoundingRules> {
        match &self.rounding {
            Some(rounding) => RoundingRules::from_settings(rounding.as_slice()),
            None => RoundingRules::from_settings(DEFAULT_ROUNDING),
        }
    }
}

impl FromStr for Config {
    type Err = toml::de::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        toml::from_str(s)
    }
}
