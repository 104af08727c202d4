// Copyright 2025 Martin Pool

//! Convert between issue-tracker worklog text and durations.
//!
//! # Concepts
//!
//! Trackers log work as text like `1d 2h 30m`, where a day is a *working* day
//! of [`TimeTracking::working_hours_per_day`] hours. [`parse_tracker_time`] and
//! [`format_tracker_time`] convert between that text and a
//! [`jiff::SignedDuration`], and [`RoundingRules`] round logged time up to
//! billing steps.
//!
//! Configuration is always passed in: nothing here holds state.

pub mod config;
mod error;
pub mod rounding;
pub mod timestamp;
pub mod tracker_time;

pub use crate::error::{Error, Result};
pub use crate::rounding::{Limit, RoundingRule, RoundingRules};
pub use crate::timestamp::format_tracker_timestamp;
pub use crate::tracker_time::{
    ParseError, TimeTracking, TrackerTime, TrackerTimeParser, format_tracker_time,
    parse_tracker_time,
};
