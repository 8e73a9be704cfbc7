//! Timestamp: the unified `[YYYY/MM/DD HH:MM:SS.mmm ±ZZ:ZZ]` header
//! timestamp and level keywords.

use chrono::{DateTime, FixedOffset};

use super::model::{Level, ParseError};

/// chrono format of the header timestamp, e.g. `2019/08/26 06:19:13.011 -04:00`.
pub const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S%.3f %:z";

/// Byte length of a well-formed header timestamp.
pub const TIMESTAMP_LEN: usize = "2006/01/02 15:04:05.000 -07:00".len();

/// Shape of the header timestamp: `d` is a digit, `s` the offset sign,
/// anything else must appear literally.
const TIMESTAMP_SHAPE: &[u8; TIMESTAMP_LEN] = b"dddd/dd/dd dd:dd:dd.ddd sdd:dd";

fn matches_shape(s: &str) -> bool {
    s.len() == TIMESTAMP_LEN
        && s.bytes().zip(TIMESTAMP_SHAPE.iter()).all(|(b, &want)| match want {
            b'd' => b.is_ascii_digit(),
            b's' => b == b'+' || b == b'-',
            _ => b == want,
        })
}

/// Parse a header timestamp into Unix milliseconds.
pub fn parse_timestamp(s: &str) -> Result<i64, ParseError> {
    // chrono skips blanks before numeric fields, the layout does not
    if !matches_shape(s) {
        return Err(ParseError::InvalidTimestamp(s.to_string()));
    }
    DateTime::<FixedOffset>::parse_from_str(s, TIMESTAMP_FORMAT)
        .map(|dt| dt.timestamp_millis())
        .map_err(|_| ParseError::InvalidTimestamp(s.to_string()))
}

/// Render Unix milliseconds back into the header layout, in the given offset.
pub fn format_timestamp(millis: i64, offset: FixedOffset) -> Option<String> {
    DateTime::from_timestamp_millis(millis)
        .map(|dt| dt.with_timezone(&offset).format(TIMESTAMP_FORMAT).to_string())
}

/// Map a level keyword to a [`Level`], case-insensitively.
/// Anything unrecognised is [`Level::Unknown`].
pub fn parse_level(s: &str) -> Level {
    Level::ALL
        .iter()
        .skip(1)
        .copied()
        .find(|level| s.eq_ignore_ascii_case(level.as_str()))
        .unwrap_or(Level::Unknown)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timestamp_with_negative_offset() {
        let millis = parse_timestamp("2019/08/26 06:19:13.011 -04:00").unwrap();
        // 2019-08-26T10:19:13.011Z
        assert_eq!(millis, 1_566_814_753_011);
    }

    #[test]
    fn test_parse_timestamp_offsets_agree() {
        let a = parse_timestamp("2019/03/04 17:04:24.614 +08:00").unwrap();
        let b = parse_timestamp("2019/03/04 09:04:24.614 +00:00").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_parse_timestamp_rejects_deviations() {
        for raw in [
            "",
            "20/08/26 06:19:13.011 -04:00",
            "2019/08/26 06:19:13 -04:00",
            "2019/08/26 06:19:13.01 -04:00",
            "2019/08/26 06:19:13.0111 -04:00",
            "2019-08-26 06:19:13.011 -04:00",
            "2019/08/26 06:19:13.011 -0400",
            " 2019/08/26 06:19:13.011 -04:00",
            "2019/13/26 06:19:13.011 -04:00",
            "2019/08/26  6:19:13.011 -04:00",
            "2019/08/26 06: 9:13.011 -04:00",
            "2019/ 8/26 06:19:13.011 -04:00",
            "2019/08/26 06:19:13.011 *04:00",
            "2019/08/26T06:19:13.011 -04:00",
            "2019/08/26 06:19:13,011 -04:00",
        ] {
            assert!(
                matches!(parse_timestamp(raw), Err(ParseError::InvalidTimestamp(_))),
                "should reject {:?}",
                raw
            );
        }
    }

    #[test]
    fn test_format_timestamp_round_trip() {
        let raw = "2019/08/26 06:19:13.011 -04:00";
        let millis = parse_timestamp(raw).unwrap();
        let offset = FixedOffset::west_opt(4 * 3600).unwrap();
        assert_eq!(format_timestamp(millis, offset).unwrap(), raw);
    }

    #[test]
    fn test_parse_level_keywords() {
        let cases = [
            ("debug", Level::Debug),
            ("DEBUG", Level::Debug),
            ("info", Level::Info),
            ("INFO", Level::Info),
            ("warn", Level::Warn),
            ("WARN", Level::Warn),
            ("trace", Level::Trace),
            ("TRACE", Level::Trace),
            ("critical", Level::Critical),
            ("CRITICAL", Level::Critical),
            ("error", Level::Error),
            ("ERROR", Level::Error),
            ("Error", Level::Error),
            ("invalid", Level::Unknown),
            ("", Level::Unknown),
            ("WARNING", Level::Unknown),
        ];
        for (raw, expected) in cases {
            assert_eq!(parse_level(raw), expected, "parse {:?}", raw);
        }
    }
}
