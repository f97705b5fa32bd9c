#![forbid(unsafe_code)]

//! `H:MM:SS` formatting and parsing.
//!
//! Hours are unpadded and unbounded; minutes and seconds are always two
//! digits. Formatting floors to whole seconds.

use crate::error::TimecodeError;

const MS_PER_SECOND: u64 = 1_000;
const SECONDS_PER_MINUTE: u64 = 60;
const SECONDS_PER_HOUR: u64 = 3_600;

/// Render a millisecond offset as `H:MM:SS`.
///
/// ```
/// use chatreplay_core::timecode::format_time;
///
/// assert_eq!(format_time(0), "0:00:00");
/// assert_eq!(format_time(61_000), "0:01:01");
/// assert_eq!(format_time(3_661_999), "1:01:01");
/// ```
#[must_use]
pub fn format_time(ms: u64) -> String {
    let total_seconds = ms / MS_PER_SECOND;
    let hours = total_seconds / SECONDS_PER_HOUR;
    let minutes = (total_seconds % SECONDS_PER_HOUR) / SECONDS_PER_MINUTE;
    let seconds = total_seconds % SECONDS_PER_MINUTE;
    format!("{hours}:{minutes:02}:{seconds:02}")
}

/// Parse `H:MM:SS` into milliseconds.
///
/// Exactly three colon-separated unsigned integers are accepted. Whitespace
/// around the whole input and around each field is ignored. Minutes and
/// seconds must be below 60.
pub fn parse_time(input: &str) -> Result<u64, TimecodeError> {
    let trimmed = input.trim();
    let format_error = || TimecodeError::Format {
        input: input.to_string(),
    };

    let mut fields = trimmed.split(':');
    let (Some(h), Some(m), Some(s), None) =
        (fields.next(), fields.next(), fields.next(), fields.next())
    else {
        return Err(format_error());
    };

    let hours = parse_field(h).ok_or_else(format_error)?;
    let minutes = parse_field(m).ok_or_else(format_error)?;
    let seconds = parse_field(s).ok_or_else(format_error)?;

    if minutes >= SECONDS_PER_MINUTE {
        return Err(TimecodeError::FieldRange {
            field: "minutes",
            value: minutes,
        });
    }
    if seconds >= SECONDS_PER_MINUTE {
        return Err(TimecodeError::FieldRange {
            field: "seconds",
            value: seconds,
        });
    }

    hours
        .checked_mul(SECONDS_PER_HOUR)
        .and_then(|h| h.checked_add(minutes * SECONDS_PER_MINUTE + seconds))
        .and_then(|total| total.checked_mul(MS_PER_SECOND))
        .ok_or_else(|| TimecodeError::Overflow {
            input: input.to_string(),
        })
}

fn parse_field(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn formats_reference_values() {
        assert_eq!(format_time(0), "0:00:00");
        assert_eq!(format_time(61_000), "0:01:01");
        assert_eq!(format_time(3_661_000), "1:01:01");
    }

    #[test]
    fn format_floors_partial_seconds() {
        assert_eq!(format_time(999), "0:00:00");
        assert_eq!(format_time(59_999), "0:00:59");
    }

    #[test]
    fn hours_are_not_padded_or_wrapped() {
        assert_eq!(format_time(100 * 3_600_000), "100:00:00");
    }

    #[test]
    fn parses_reference_values() {
        assert_eq!(parse_time("0:00:00"), Ok(0));
        assert_eq!(parse_time("0:01:01"), Ok(61_000));
        assert_eq!(parse_time(" 1:01:01 \n"), Ok(3_661_000));
        assert_eq!(parse_time("1:2:3"), Ok(3_723_000));
    }

    #[test]
    fn rejects_wrong_field_count() {
        for input in ["", "1:00", "1:00:00:00", "::", "1::00"] {
            assert!(
                matches!(parse_time(input), Err(TimecodeError::Format { .. })),
                "{input:?} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_signs_and_letters() {
        for input in ["-1:00:00", "+1:00:00", "a:00:00", "1:0x:00", "1:00:1.5"] {
            assert!(parse_time(input).is_err(), "{input:?} should be rejected");
        }
    }

    #[test]
    fn rejects_out_of_range_minutes_and_seconds() {
        assert_eq!(
            parse_time("0:60:00"),
            Err(TimecodeError::FieldRange {
                field: "minutes",
                value: 60
            })
        );
        assert_eq!(
            parse_time("0:00:75"),
            Err(TimecodeError::FieldRange {
                field: "seconds",
                value: 75
            })
        );
    }

    #[test]
    fn rejects_overflowing_hours() {
        let input = format!("{}:00:00", u64::MAX);
        assert!(matches!(
            parse_time(&input),
            Err(TimecodeError::Overflow { .. })
        ));
    }

    proptest! {
        #[test]
        fn formatted_time_floors_to_the_second(ms in 0u64..10_000_000_000) {
            let back = parse_time(&format_time(ms)).unwrap();
            prop_assert!(back <= ms);
            prop_assert!(ms - back < 1_000);
        }
    }
}
