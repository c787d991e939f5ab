//! Helpers for rendering timestamps in the server's configured timezone.

use time::{OffsetDateTime, UtcOffset, format_description::FormatItem, macros::format_description};

use time_tz::{Offset, TimeZone};

const DISPLAY_FORMAT: &[FormatItem<'_>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

/// The current UTC offset of `canonical_timezone`, e.g. "+07:00" for
/// "Asia/Jakarta". None if the name is not a known canonical timezone.
pub fn get_local_offset(canonical_timezone: &str) -> Option<UtcOffset> {
    time_tz::timezones::get_by_name(canonical_timezone)
        .map(|tz| tz.get_offset_utc(&OffsetDateTime::now_utc()).to_utc())
}

/// Format `datetime` as "YYYY-MM-DD HH:MM:SS" in `canonical_timezone`,
/// falling back to UTC when the timezone name is unknown.
pub fn format_local(datetime: OffsetDateTime, canonical_timezone: &str) -> String {
    let offset = get_local_offset(canonical_timezone).unwrap_or(UtcOffset::UTC);

    datetime
        .to_offset(offset)
        .format(DISPLAY_FORMAT)
        .unwrap_or_else(|_| datetime.to_string())
}

#[cfg(test)]
mod timezone_tests {
    use time::macros::datetime;

    use super::format_local;

    #[test]
    fn format_local_converts_to_jakarta_time() {
        let datetime = datetime!(2025-08-07 12:00:00 UTC);

        // Jakarta is UTC+7 year-round.
        assert_eq!(
            format_local(datetime, "Asia/Jakarta"),
            "2025-08-07 19:00:00"
        );
    }

    #[test]
    fn format_local_falls_back_to_utc_on_unknown_timezone() {
        let datetime = datetime!(2025-08-07 12:00:00 UTC);

        assert_eq!(
            format_local(datetime, "Not/AZone"),
            "2025-08-07 12:00:00"
        );
    }
}
