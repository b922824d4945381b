//! Resolving the configured canonical timezone to a UTC offset.

use time::{OffsetDateTime, UtcOffset};
use time_tz::{Offset, TimeZone};

/// Get the current UTC offset for a canonical timezone name, e.g.
/// "Asia/Kolkata". Returns `None` for unknown timezone names.
pub fn get_local_offset(canonical_timezone: &str) -> Option<UtcOffset> {
    time_tz::timezones::get_by_name(canonical_timezone)
        .map(|tz| tz.get_offset_utc(&OffsetDateTime::now_utc()).to_utc())
}

/// Today's date in the timezone named by `canonical_timezone`.
///
/// Returns `None` for unknown timezone names.
pub fn local_date_today(canonical_timezone: &str) -> Option<time::Date> {
    get_local_offset(canonical_timezone)
        .map(|offset| OffsetDateTime::now_utc().to_offset(offset).date())
}

#[cfg(test)]
mod timezone_tests {
    use super::{get_local_offset, local_date_today};

    #[test]
    fn resolves_known_timezone() {
        assert!(get_local_offset("Asia/Kolkata").is_some());
        assert!(local_date_today("Asia/Kolkata").is_some());
    }

    #[test]
    fn rejects_unknown_timezone() {
        assert!(get_local_offset("Mars/Olympus_Mons").is_none());
        assert!(local_date_today("Mars/Olympus_Mons").is_none());
    }
}
