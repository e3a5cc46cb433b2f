//! Wall-clock time normalisation for schedule entries.
//!
//! Stored times are `"HH:MM"` or `"HH:MM:SS"` strings. They are normalised to
//! minutes since midnight for ordering, then rendered back as 12-hour strings
//! for display. The display form is not a storage format.

use thiserror::Error;

const MINUTES_PER_HOUR: u16 = 60;
const HOURS_PER_DAY: u16 = 24;
const NOON_HOUR: u16 = 12;

/// Errors raised while parsing a stored time string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeFormatError {
    /// Fewer than two colon-delimited fields were present.
    #[error("time `{input}` must contain hour and minute separated by `:`")]
    MissingField {
        /// Offending input.
        input: String,
    },
    /// The hour or minute field is not a non-negative integer.
    #[error("time `{input}` has a non-numeric {field} field")]
    NotNumeric {
        /// Offending input.
        input: String,
        /// Which field failed: `hour` or `minute`.
        field: &'static str,
    },
    /// The value does not fall inside a single day.
    #[error("time `{input}` is outside 00:00-23:59")]
    OutOfRange {
        /// Offending input.
        input: String,
    },
}

fn parse_field(input: &str, raw: &str, field: &'static str) -> Result<u16, TimeFormatError> {
    raw.trim()
        .parse::<u16>()
        .map_err(|_| TimeFormatError::NotNumeric {
            input: input.to_owned(),
            field,
        })
}

/// Convert `"HH:MM"` (seconds ignored) into minutes since midnight.
///
/// # Examples
/// ```
/// use cw_backend::domain::time::parse_time_to_minutes;
///
/// assert_eq!(parse_time_to_minutes("14:30"), Ok(870));
/// assert_eq!(parse_time_to_minutes("09:05:59"), Ok(545));
/// assert!(parse_time_to_minutes("9").is_err());
/// ```
pub fn parse_time_to_minutes(input: &str) -> Result<u16, TimeFormatError> {
    let mut fields = input.split(':');
    let (Some(hour), Some(minute)) = (fields.next(), fields.next()) else {
        return Err(TimeFormatError::MissingField {
            input: input.to_owned(),
        });
    };

    let hour = parse_field(input, hour, "hour")?;
    let minute = parse_field(input, minute, "minute")?;
    if hour >= HOURS_PER_DAY || minute >= MINUTES_PER_HOUR {
        return Err(TimeFormatError::OutOfRange {
            input: input.to_owned(),
        });
    }
    Ok(hour * MINUTES_PER_HOUR + minute)
}

/// Render minutes since midnight as a 12-hour clock string.
///
/// Hours past noon drop by twelve and read `PM`; noon itself reads `12:xx PM`.
/// Hour zero is left as `0`, so midnight renders as `"0:00 AM"`.
///
/// # Examples
/// ```
/// use cw_backend::domain::time::format_minutes_to_clock;
///
/// assert_eq!(format_minutes_to_clock(545), "9:05 AM");
/// assert_eq!(format_minutes_to_clock(720), "12:00 PM");
/// assert_eq!(format_minutes_to_clock(870), "2:30 PM");
/// assert_eq!(format_minutes_to_clock(0), "0:00 AM");
/// ```
#[must_use]
pub fn format_minutes_to_clock(minutes: u16) -> String {
    let mut hour = minutes.div_euclid(MINUTES_PER_HOUR);
    let minute = minutes.rem_euclid(MINUTES_PER_HOUR);
    let mut marker = "AM";
    if hour > NOON_HOUR {
        hour -= NOON_HOUR;
        marker = "PM";
    }
    if hour == NOON_HOUR {
        marker = "PM";
    }
    format!("{hour}:{minute:02} {marker}")
}

/// Parse a stored time and render it in 12-hour form.
///
/// # Examples
/// ```
/// use cw_backend::domain::time::convert_conventional;
///
/// assert_eq!(convert_conventional("13:15").as_deref(), Ok("1:15 PM"));
/// ```
pub fn convert_conventional(input: &str) -> Result<String, TimeFormatError> {
    parse_time_to_minutes(input).map(format_minutes_to_clock)
}

#[cfg(test)]
mod tests {
    //! Parsing and formatting edge cases.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("00:00", 0)]
    #[case("09:00", 540)]
    #[case("9:5", 545)]
    #[case("12:00", 720)]
    #[case("23:59", 1439)]
    #[case("14:00:30", 840)]
    #[case(" 08:15 ", 495)]
    fn parses_valid_times(#[case] input: &str, #[case] expected: u16) {
        assert_eq!(parse_time_to_minutes(input), Ok(expected));
    }

    #[rstest]
    #[case("")]
    #[case("0900")]
    fn rejects_missing_minute_field(#[case] input: &str) {
        assert!(matches!(
            parse_time_to_minutes(input),
            Err(TimeFormatError::MissingField { .. })
        ));
    }

    #[rstest]
    #[case("ab:00", "hour")]
    #[case("09:xx", "minute")]
    #[case("-1:00", "hour")]
    #[case("09:", "minute")]
    fn rejects_non_numeric_fields(#[case] input: &str, #[case] expected_field: &str) {
        match parse_time_to_minutes(input) {
            Err(TimeFormatError::NotNumeric { field, .. }) => assert_eq!(field, expected_field),
            other => panic!("expected non-numeric error, got {other:?}"),
        }
    }

    #[rstest]
    #[case("24:00")]
    #[case("10:60")]
    fn rejects_values_outside_a_day(#[case] input: &str) {
        assert!(matches!(
            parse_time_to_minutes(input),
            Err(TimeFormatError::OutOfRange { .. })
        ));
    }

    #[rstest]
    #[case(0, "0:00 AM")]
    #[case(59, "0:59 AM")]
    #[case(60, "1:00 AM")]
    #[case(545, "9:05 AM")]
    #[case(719, "11:59 AM")]
    #[case(720, "12:00 PM")]
    #[case(779, "12:59 PM")]
    #[case(780, "1:00 PM")]
    #[case(1439, "11:59 PM")]
    fn formats_twelve_hour_clock(#[case] minutes: u16, #[case] expected: &str) {
        assert_eq!(format_minutes_to_clock(minutes), expected);
    }

    fn sort_key(display: &str) -> (bool, u16, u16) {
        let (clock, marker) = display.split_once(' ').expect("marker");
        let (hour, minute) = clock.split_once(':').expect("colon");
        let hour: u16 = hour.parse().expect("hour");
        let minute: u16 = minute.parse().expect("minute");
        let pm = marker == "PM";
        // 12 PM precedes 1 PM on the wall clock.
        let hour = if pm && hour == 12 { 0 } else { hour };
        (pm, hour, minute)
    }

    #[test]
    fn formatted_pairs_preserve_relative_order() {
        let samples = ["00:30", "08:00", "11:59", "12:00", "12:30", "13:00", "18:45", "23:59"];
        let minutes: Vec<u16> = samples
            .iter()
            .map(|raw| parse_time_to_minutes(raw).expect("valid sample"))
            .collect();
        for window in minutes.windows(2) {
            let [earlier, later] = window else {
                continue;
            };
            let earlier_key = sort_key(&format_minutes_to_clock(*earlier));
            let later_key = sort_key(&format_minutes_to_clock(*later));
            assert!(
                earlier_key < later_key,
                "{earlier} should display before {later}"
            );
        }
    }

    #[test]
    fn convert_conventional_propagates_format_errors() {
        assert!(convert_conventional("noon").is_err());
    }
}
