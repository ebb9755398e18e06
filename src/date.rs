//! Parses the date strings sent by clients into calendar dates.
//!
//! Clients are not consistent about how they format dates, so a few formats
//! are tried in a fixed order and the first one that matches wins:
//!
//! 1. `YYYY-MM-DD`, e.g. "2025-09-08".
//! 2. `D/M/YYYY` with one or two digit days and months, e.g. "8/9/2025".
//!    Ambiguous dates such as "01/02/2025" are always read day first.
//! 3. Any other ISO 8601 date (e.g. "20250908", "2025-W37-1") or an RFC 3339
//!    timestamp, whose time component is dropped.
//!
//! Calendar-invalid dates such as "2025-02-30" are rejected rather than
//! rolled over into the next month.

use time::{
    Date, OffsetDateTime,
    format_description::{
        BorrowedFormatItem,
        well_known::{Iso8601, Rfc3339},
    },
    macros::format_description,
};

use crate::Error;

const ISO_DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

const DAY_MONTH_YEAR_FORMAT: &[BorrowedFormatItem] =
    format_description!("[day padding:none]/[month padding:none]/[year]");

/// Parse `raw` into a calendar date.
///
/// Leading and trailing whitespace is ignored.
///
/// # Errors
///
/// Returns [Error::InvalidDateFormat] holding the original string if `raw` is
/// empty or does not match any of the supported formats.
pub fn parse_date(raw: &str) -> Result<Date, Error> {
    let text = raw.trim();

    if text.is_empty() {
        return Err(Error::InvalidDateFormat(raw.to_owned()));
    }

    // The strict formats only allow a bare four digit year, no sign.
    if text.starts_with(|c: char| c.is_ascii_digit()) {
        if let Ok(date) = Date::parse(text, ISO_DATE_FORMAT) {
            return Ok(date);
        }

        if let Ok(date) = Date::parse(text, DAY_MONTH_YEAR_FORMAT) {
            return Ok(date);
        }
    }

    Date::parse(text, &Iso8601::DEFAULT)
        .or_else(|_| OffsetDateTime::parse(text, &Rfc3339).map(|date_time| date_time.date()))
        .map_err(|error| {
            tracing::debug!("could not parse date {raw:?}: {error}");
            Error::InvalidDateFormat(raw.to_owned())
        })
}

/// Parse an optional date string, treating a missing value as absent rather
/// than as an error.
///
/// # Errors
///
/// Returns [Error::InvalidDateFormat] if `raw` is present but cannot be parsed.
pub fn parse_optional_date(raw: Option<&str>) -> Result<Option<Date>, Error> {
    raw.map(parse_date).transpose()
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use crate::Error;

    use super::{parse_date, parse_optional_date};

    #[test]
    fn parses_iso_date() {
        assert_eq!(parse_date("2025-09-08"), Ok(date!(2025 - 09 - 08)));
    }

    #[test]
    fn parses_day_first_with_single_digits() {
        assert_eq!(parse_date("8/9/2025"), Ok(date!(2025 - 09 - 08)));
    }

    #[test]
    fn parses_day_first_with_double_digits() {
        assert_eq!(parse_date("28/12/2024"), Ok(date!(2024 - 12 - 28)));
    }

    #[test]
    fn ambiguous_date_is_day_first() {
        assert_eq!(parse_date("01/02/2025"), Ok(date!(2025 - 02 - 01)));
    }

    #[test]
    fn trims_whitespace() {
        assert_eq!(parse_date("  2025-09-08\n"), Ok(date!(2025 - 09 - 08)));
        assert_eq!(parse_date("\t8/9/2025 "), Ok(date!(2025 - 09 - 08)));
    }

    #[test]
    fn rejects_non_existent_dates() {
        for raw in ["2025-02-30", "2025-13-01", "2025-01-32", "30/2/2025", "1/13/2025"] {
            assert_eq!(
                parse_date(raw),
                Err(Error::InvalidDateFormat(raw.to_owned())),
                "want {raw:?} to be rejected"
            );
        }
    }

    #[test]
    fn accepts_leap_day_only_in_leap_years() {
        assert_eq!(parse_date("2024-02-29"), Ok(date!(2024 - 02 - 29)));
        assert_eq!(parse_date("29/2/2024"), Ok(date!(2024 - 02 - 29)));
        assert!(parse_date("2025-02-29").is_err());
    }

    #[test]
    fn rejects_empty_string() {
        assert_eq!(parse_date(""), Err(Error::InvalidDateFormat("".to_owned())));
        assert_eq!(
            parse_date("   "),
            Err(Error::InvalidDateFormat("   ".to_owned()))
        );
    }

    #[test]
    fn rejects_garbage() {
        for raw in ["yesterday", "2025/09/08", "9-8-2025", "8/9/25", "2025-9-8x"] {
            assert!(parse_date(raw).is_err(), "want {raw:?} to be rejected");
        }
    }

    #[test]
    fn falls_back_to_other_iso_8601_dates() {
        assert_eq!(parse_date("20250908"), Ok(date!(2025 - 09 - 08)));
        assert_eq!(parse_date("2025-W37-1"), Ok(date!(2025 - 09 - 08)));
        assert_eq!(parse_date("2025-251"), Ok(date!(2025 - 09 - 08)));
    }

    #[test]
    fn falls_back_to_timestamp_date() {
        assert_eq!(
            parse_date("2025-09-08T21:30:00Z"),
            Ok(date!(2025 - 09 - 08))
        );
    }

    #[test]
    fn optional_date_passes_through_none() {
        assert_eq!(parse_optional_date(None), Ok(None));
        assert_eq!(
            parse_optional_date(Some("8/9/2025")),
            Ok(Some(date!(2025 - 09 - 08)))
        );
        assert!(parse_optional_date(Some("nope")).is_err());
    }
}
