// Copyright 2025 Martin Pool

use thiserror::Error;

use crate::tracker_time::ParseError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid argument: {0}")]
    Argument(String),

    #[error("Invalid rounding rules: {0}")]
    RoundingRule(String),

    #[error("Can't parse tracker time {text:?}: {source}")]
    Unparseable {
        text: String,
        #[source]
        source: ParseError,
    },
}
