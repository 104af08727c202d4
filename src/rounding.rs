// Copyright 2025 Martin Pool

//! Rounding logged time up to whole steps, with steps chosen by duration.
//!
//! Rules come from settings as strings like `"6;6"` (durations up to 6 minutes
//! round up to a multiple of 6) and `"*;15"` (everything longer rounds up to a
//! multiple of 15).

use std::fmt;
use std::str::FromStr;

use jiff::SignedDuration;
use tracing::debug;

use crate::{Error, Result};

/// Rules used when the configuration doesn't give any.
pub static DEFAULT_ROUNDING: &[&str] = &["6;6", "12;12", "*;15"];

const NANOS_PER_MINUTE: i128 = 60_000_000_000;

/// The longest duration a rule applies to.
///
/// Ordering puts bounded limits first, ascending, and the catch-all last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Limit {
    Minutes(u32),
    Unbounded,
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Limit::Minutes(minutes) => write!(f, "{minutes}"),
            Limit::Unbounded => f.write_str("*"),
        }
    }
}

/// Round durations up to `step_minutes` if they are no longer than `limit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RoundingRule {
    pub limit: Limit,
    pub step_minutes: u32,
}

impl RoundingRule {
    fn applies_to(&self, nanos: i128) -> bool {
        match self.limit {
            Limit::Minutes(minutes) => nanos <= i128::from(minutes) * NANOS_PER_MINUTE,
            Limit::Unbounded => true,
        }
    }
}

impl FromStr for RoundingRule {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (limit, step) = s.split_once(';').ok_or_else(|| {
            Error::RoundingRule(format!("{s:?} is not of the form \"<limit>;<minutes>\""))
        })?;
        let limit = match limit.trim() {
            "*" => Limit::Unbounded,
            limit => Limit::Minutes(limit.parse().map_err(|err| {
                Error::RoundingRule(format!("bad limit {limit:?} in {s:?}: {err}"))
            })?),
        };
        let step = step.trim();
        let step_minutes = match step.parse() {
            Ok(0) => {
                return Err(Error::RoundingRule(format!(
                    "rounding step in {s:?} must be at least one minute"
                )));
            }
            Ok(step_minutes) => step_minutes,
            Err(err) => {
                return Err(Error::RoundingRule(format!(
                    "bad rounding step {step:?} in {s:?}: {err}"
                )));
            }
        };
        Ok(RoundingRule {
            limit,
            step_minutes,
        })
    }
}

impl fmt::Display for RoundingRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{};{}", self.limit, self.step_minutes)
    }
}

/// A validated rounding table: bounded rules by ascending limit, then exactly
/// one catch-all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundingRules {
    bounded: Vec<RoundingRule>,
    catch_all: RoundingRule,
}

impl RoundingRules {
    /// Build a table from rules in any order.
    ///
    /// Fails unless exactly one rule is the unbounded catch-all.
    pub fn new(rules: impl IntoIterator<Item = RoundingRule>) -> Result<Self> {
        let (mut bounded, catch_all): (Vec<_>, Vec<_>) = rules
            .into_iter()
            .partition(|rule| rule.limit != Limit::Unbounded);
        let [catch_all] = catch_all[..] else {
            return Err(Error::RoundingRule(format!(
                "expected exactly one \"*\" catch-all rule, found {}",
                catch_all.len()
            )));
        };
        bounded.sort_by_key(|rule| rule.limit);
        Ok(RoundingRules { bounded, catch_all })
    }

    /// Parse settings strings like `["6;6", "*;15"]`.
    pub fn from_settings<S: AsRef<str>>(settings: &[S]) -> Result<Self> {
        let rules = settings
            .iter()
            .map(|setting| setting.as_ref().parse())
            .collect::<Result<Vec<RoundingRule>>>()?;
        RoundingRules::new(rules)
    }

    /// All rules in the order they are tried.
    pub fn iter(&self) -> impl Iterator<Item = &RoundingRule> {
        self.bounded.iter().chain(std::iter::once(&self.catch_all))
    }

    /// The first rule whose limit is at least the duration.
    pub fn select(&self, duration: SignedDuration) -> &RoundingRule {
        let nanos = duration.as_nanos();
        self.bounded
            .iter()
            .find(|rule| rule.applies_to(nanos))
            .unwrap_or(&self.catch_all)
    }

    /// Round up to the next multiple of the selected rule's step.
    ///
    /// Sub-minute precision counts: 5 minutes and 1 second is more than 5
    /// minutes.
    pub fn round_up(&self, duration: SignedDuration) -> SignedDuration {
        let rule = self.select(duration);
        let nanos = duration.as_nanos();
        let step = i128::from(rule.step_minutes) * NANOS_PER_MINUTE;
        let mut steps = nanos.div_euclid(step);
        if nanos.rem_euclid(step) != 0 {
            steps += 1;
        }
        let minutes = steps * i128::from(rule.step_minutes);
        debug!(?duration, %rule, minutes = %minutes, "Rounded up");
        let secs = (minutes * 60).clamp(i128::from(i64::MIN), i128::from(i64::MAX));
        SignedDuration::from_secs(secs as i64)
    }
}

impl Default for RoundingRules {
    fn default() -> Self {
        RoundingRules {
            bounded: vec![
                RoundingRule {
                    limit: Limit::Minutes(6),
                    step_minutes: 6,
                },
                RoundingRule {
                    limit: Limit::Minutes(12),
                    step_minutes: 12,
                },
            ],
            catch_all: RoundingRule {
                limit: Limit::Unbounded,
                step_minutes: 15,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use proptest::prelude::*;

    use super::*;

    fn mins(minutes: i64) -> SignedDuration {
        SignedDuration::from_mins(minutes)
    }

    fn six_then_fifteen() -> RoundingRules {
        RoundingRules::from_settings(&["6;6", "*;15"]).unwrap()
    }

    #[test]
    fn rounds_short_and_long_durations() {
        let rules = six_then_fifteen();
        assert_eq!(rules.round_up(mins(5)), mins(6));
        assert_eq!(rules.round_up(mins(20)), mins(30));
    }

    #[test]
    fn limit_is_inclusive() {
        let rules = six_then_fifteen();
        assert_eq!(rules.round_up(mins(6)), mins(6));
        assert_eq!(rules.round_up(SignedDuration::from_secs(6 * 60 + 1)), mins(15));
    }

    #[test]
    fn fractional_minutes_round_up() {
        let rules = six_then_fifteen();
        assert_eq!(rules.round_up(SignedDuration::from_secs(90)), mins(6));
        assert_eq!(rules.round_up(SignedDuration::new(0, 1)), mins(6));
    }

    #[test]
    fn exact_multiples_are_unchanged() {
        let rules = six_then_fifteen();
        assert_eq!(rules.round_up(SignedDuration::ZERO), SignedDuration::ZERO);
        assert_eq!(rules.round_up(mins(45)), mins(45));
    }

    #[test]
    fn negative_durations_round_toward_zero() {
        let rules = six_then_fifteen();
        assert_eq!(rules.round_up(mins(-5)), SignedDuration::ZERO);
        assert_eq!(rules.round_up(mins(-7)), mins(-6));
    }

    #[test]
    fn rules_are_sorted_whatever_the_settings_order() {
        let rules = RoundingRules::from_settings(&["*;15", "12;12", "6;6"]).unwrap();
        assert_eq!(rules, RoundingRules::default());
        let order: Vec<String> = rules.iter().map(|rule| rule.to_string()).collect();
        assert_eq!(order, ["6;6", "12;12", "*;15"]);
        assert_eq!(rules.select(mins(10)).step_minutes, 12);
        assert_eq!(rules.round_up(mins(10)), mins(12));
        assert_eq!(rules.round_up(mins(13)), mins(15));
    }

    #[test]
    fn default_rules_match_default_settings() {
        assert_eq!(
            RoundingRules::from_settings(DEFAULT_ROUNDING).unwrap(),
            RoundingRules::default()
        );
    }

    #[test]
    fn missing_catch_all_is_an_error() {
        let err = RoundingRules::from_settings(&["6;6", "12;12"]).unwrap_err();
        assert_matches!(err, Error::RoundingRule(_));
        assert!(err.to_string().contains("found 0"), "{err}");
    }

    #[test]
    fn two_catch_alls_is_an_error() {
        let err = RoundingRules::from_settings(&["*;6", "*;15"]).unwrap_err();
        assert_matches!(err, Error::RoundingRule(_));
        assert!(err.to_string().contains("found 2"), "{err}");
    }

    #[test]
    fn parse_rule() {
        assert_eq!(
            "6;6".parse::<RoundingRule>().unwrap(),
            RoundingRule {
                limit: Limit::Minutes(6),
                step_minutes: 6
            }
        );
        assert_eq!(
            " * ; 15 ".parse::<RoundingRule>().unwrap(),
            RoundingRule {
                limit: Limit::Unbounded,
                step_minutes: 15
            }
        );
    }

    #[test]
    fn bad_rules() {
        for bad in ["", "6", "x;6", "6;x", "6;0", "-1;6", "6;6;6"] {
            let err = bad.parse::<RoundingRule>().unwrap_err();
            assert_matches!(err, Error::RoundingRule(_), "{bad:?}");
        }
    }

    proptest! {
        #[test]
        fn round_up_is_idempotent(secs in -1_000_000i64..1_000_000) {
            let rules = RoundingRules::default();
            let once = rules.round_up(SignedDuration::from_secs(secs));
            prop_assert_eq!(rules.round_up(once), once);
        }

        #[test]
        fn round_up_never_rounds_down(secs in 0i64..1_000_000) {
            let rules = RoundingRules::default();
            let duration = SignedDuration::from_secs(secs);
            let rounded = rules.round_up(duration);
            prop_assert!(rounded >= duration);
            prop_assert!(rounded - duration < mins(15));
        }
    }
}
