// Copyright 2025 Martin Pool

//! Tracker-style duration text such as `1d 2h 30m`.
//!
//! Issue trackers take logged work as a short string of day, hour and minute
//! components. When a [`TimeTracking`] configuration is known, a "day" in that
//! text is one working day rather than 24 hours.

use std::fmt;

use jiff::SignedDuration;
use thiserror::Error;
use tracing::debug;

/// Length of a working day when none is configured.
pub const DEFAULT_WORKING_HOURS_PER_DAY: u32 = 8;

/// Time-tracking settings supplied by the host application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeTracking {
    /// Number of hours in one working day.
    pub working_hours_per_day: u32,
}

impl TimeTracking {
    pub fn new(working_hours_per_day: u32) -> Self {
        TimeTracking {
            working_hours_per_day,
        }
    }

    fn minutes_per_day(&self) -> u64 {
        u64::from(self.working_hours_per_day) * 60
    }
}

impl Default for TimeTracking {
    fn default() -> Self {
        TimeTracking::new(DEFAULT_WORKING_HOURS_PER_DAY)
    }
}

/// A duration split into the components written to the tracker.
///
/// Formatting drops leading zero components only: `"2d 0h 5m"` keeps its
/// zero hours, while 90 minutes is `"1h 30m"` rather than `"0d 1h 30m"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackerTime {
    pub negative: bool,
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
}

impl TrackerTime {
    /// Split a duration into days, hours and minutes.
    ///
    /// Durations of at least one configured working day count days as working
    /// days; anything shorter, or any duration without a configuration, uses
    /// 24-hour days. Seconds are truncated.
    pub fn from_duration(duration: SignedDuration, config: Option<&TimeTracking>) -> Self {
        let total_secs = duration.as_secs().unsigned_abs();
        let total_minutes = total_secs / 60;
        let minutes_per_day = match config {
            Some(config)
                if config.working_hours_per_day > 0
                    && total_secs >= u64::from(config.working_hours_per_day) * 3600 =>
            {
                config.minutes_per_day()
            }
            _ => 24 * 60,
        };
        TrackerTime {
            negative: duration.is_negative() && total_minutes > 0,
            days: total_minutes / minutes_per_day,
            hours: total_minutes % minutes_per_day / 60,
            minutes: total_minutes % 60,
        }
    }
}

impl fmt::Display for TrackerTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negative {
            f.write_str("-")?;
        }
        if self.days > 0 {
            write!(f, "{}d {}h {}m", self.days, self.hours, self.minutes)
        } else if self.hours > 0 {
            write!(f, "{}h {}m", self.hours, self.minutes)
        } else {
            write!(f, "{}m", self.minutes)
        }
    }
}

/// Format a duration for the tracker's "time spent" field.
///
/// Negative durations are written with a leading `-`, as in `"-1h 30m"`.
/// Trackers only log positive time and the parser ignores the sign, so that
/// text parses back as a positive duration.
pub fn format_tracker_time(duration: SignedDuration, config: Option<&TimeTracking>) -> String {
    TrackerTime::from_duration(duration, config).to_string()
}

/// Why tracker text could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("no components like \"2h\" or \"30m\" found")]
    NoTokens,

    #[error("invalid number {0:?}")]
    InvalidNumber(String),

    #[error("duration is too large")]
    Overflow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unit {
    Day,
    Hour,
    Minute,
}

impl Unit {
    fn from_char(c: char) -> Option<Unit> {
        match c.to_ascii_lowercase() {
            'd' => Some(Unit::Day),
            'h' => Some(Unit::Hour),
            'm' => Some(Unit::Minute),
            _ => None,
        }
    }
}

/// One `<number><unit>` component of tracker text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Token<'a> {
    number: &'a str,
    unit: Unit,
}

fn is_number_char(c: char) -> bool {
    c.is_ascii_digit() || c == '.' || c == ','
}

/// Find every run of digits and decimal separators that is immediately
/// followed by a unit letter. Everything else is skipped.
fn tokens(text: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut chars = text.char_indices().peekable();
    while let Some((start, c)) = chars.next() {
        if !is_number_char(c) {
            continue;
        }
        let mut end = start + c.len_utf8();
        while let Some(&(i, c)) = chars.peek() {
            if !is_number_char(c) {
                break;
            }
            end = i + c.len_utf8();
            chars.next();
        }
        if let Some(unit) = chars.peek().and_then(|&(_, c)| Unit::from_char(c)) {
            chars.next();
            tokens.push(Token {
                number: &text[start..end],
                unit,
            });
        }
    }
    tokens
}

/// Significant digits kept when parsing a number, which is also the finest
/// scale. Further fraction digits are dropped.
const MAX_DECIMAL_DIGITS: u32 = 28;

/// A non-negative decimal, `mantissa / 10^scale`, with `scale <= 28`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Decimal {
    mantissa: u128,
    scale: u32,
}

impl Decimal {
    /// Parse digits with at most one decimal separator, either `.` or `,`.
    ///
    /// The whole part is kept exactly; the fraction is kept to 28 significant
    /// digits or 28 places, whichever comes first.
    fn parse(s: &str) -> Result<Decimal, ParseError> {
        let invalid = || ParseError::InvalidNumber(s.to_owned());
        let (whole, fraction) = match s.split_once(['.', ',']) {
            Some((whole, fraction)) => (whole, fraction),
            None => (s, ""),
        };
        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid());
        }
        if !whole.bytes().chain(fraction.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let mut mantissa: u128 = 0;
        let mut significant: u32 = 0;
        for b in whole.bytes() {
            mantissa = mantissa
                .checked_mul(10)
                .and_then(|m| m.checked_add(u128::from(b - b'0')))
                .ok_or(ParseError::Overflow)?;
            if mantissa > 0 {
                significant += 1;
            }
        }
        let mut scale: u32 = 0;
        for b in fraction.trim_end_matches('0').bytes() {
            if significant >= MAX_DECIMAL_DIGITS || scale >= MAX_DECIMAL_DIGITS {
                break;
            }
            mantissa = mantissa
                .checked_mul(10)
                .and_then(|m| m.checked_add(u128::from(b - b'0')))
                .ok_or(ParseError::Overflow)?;
            if mantissa > 0 {
                significant += 1;
            }
            scale += 1;
        }
        Ok(Decimal { mantissa, scale })
    }

    /// Multiply by an integer factor and truncate toward zero.
    fn times_truncated(&self, factor: u64) -> Option<i64> {
        let factor = u128::from(factor);
        let divisor = 10u128.pow(self.scale);
        let whole = (self.mantissa / divisor).checked_mul(factor)?;
        let fraction = (self.mantissa % divisor).checked_mul(factor)? / divisor;
        i64::try_from(whole.checked_add(fraction)?).ok()
    }
}

/// Parses tracker text, counting each day as one working day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackerTimeParser {
    minutes_per_day: u64,
}

impl TrackerTimeParser {
    /// A parser for the given configuration, or for 8-hour days if there is none.
    pub fn new(config: Option<&TimeTracking>) -> Self {
        TrackerTimeParser {
            minutes_per_day: config.copied().unwrap_or_default().minutes_per_day(),
        }
    }

    /// Parse text like `"1d 2h 30m"`, `"1,5h"` or `"90m"`.
    ///
    /// Components may be repeated, in which case they add up. Each component
    /// is converted to whole minutes, truncating any fraction, before summing.
    pub fn parse(&self, text: &str) -> Result<SignedDuration, ParseError> {
        let text = text.trim();
        if text == "0" {
            return Ok(SignedDuration::ZERO);
        }
        let tokens = tokens(text);
        if tokens.is_empty() {
            return Err(ParseError::NoTokens);
        }
        let mut minutes: i64 = 0;
        for token in tokens {
            let number = Decimal::parse(token.number)?;
            let factor = match token.unit {
                Unit::Minute => 1,
                Unit::Hour => 60,
                Unit::Day => self.minutes_per_day,
            };
            minutes = number
                .times_truncated(factor)
                .and_then(|m| minutes.checked_add(m))
                .ok_or(ParseError::Overflow)?;
        }
        minutes
            .checked_mul(60)
            .map(SignedDuration::from_secs)
            .ok_or(ParseError::Overflow)
    }
}

impl Default for TrackerTimeParser {
    fn default() -> Self {
        TrackerTimeParser::new(None)
    }
}

/// Parse tracker text into a duration, or `None` if it can't be understood.
pub fn parse_tracker_time(text: &str, config: Option<&TimeTracking>) -> Option<SignedDuration> {
    TrackerTimeParser::new(config)
        .parse(text)
        .inspect_err(|err| debug!(?text, "Can't parse tracker time: {err}"))
        .ok()
}
