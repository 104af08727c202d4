// Copyright 2025 Martin Pool

//! Timestamps in the form tracker worklogs take for the start of the work,
//! such as `2016-05-01T10:00:00.000+02:00`.

use jiff::Zoned;

/// Format with millisecond precision and a `±HH:MM` offset.
pub fn format_tracker_timestamp(zoned: &Zoned) -> String {
    zoned.strftime("%Y-%m-%dT%H:%M:%S%.3f%:z").to_string()
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;
    use jiff::tz::{self, Offset, TimeZone};

    use super::*;

    #[test]
    fn positive_offset() {
        let zoned = date(2016, 5, 1)
            .at(10, 0, 0, 0)
            .to_zoned(TimeZone::fixed(tz::offset(2)))
            .unwrap();
        assert_eq!(
            format_tracker_timestamp(&zoned),
            "2016-05-01T10:00:00.000+02:00"
        );
    }

    #[test]
    fn utc() {
        let zoned = date(2025, 12, 31)
            .at(23, 59, 59, 0)
            .to_zoned(TimeZone::UTC)
            .unwrap();
        assert_eq!(
            format_tracker_timestamp(&zoned),
            "2025-12-31T23:59:59.000+00:00"
        );
    }

    #[test]
    fn negative_half_hour_offset() {
        let offset = Offset::from_seconds(-(3 * 3600 + 30 * 60)).unwrap();
        let zoned = date(2024, 2, 29)
            .at(8, 5, 3, 0)
            .to_zoned(TimeZone::fixed(offset))
            .unwrap();
        assert_eq!(
            format_tracker_timestamp(&zoned),
            "2024-02-29T08:05:03.000-03:30"
        );
    }

    #[test]
    fn milliseconds() {
        let zoned = date(2016, 5, 1)
            .at(10, 0, 0, 123_000_000)
            .to_zoned(TimeZone::UTC)
            .unwrap();
        assert_eq!(
            format_tracker_timestamp(&zoned),
            "2016-05-01T10:00:00.123+00:00"
        );
    }
}
