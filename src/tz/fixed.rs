/*!
Fixed-offset time zones.

A fixed-offset zone has no transitions at all: a single offset applies to
every instant. UTC is the offset-zero case. Other offsets get synthetic
registry names of the form `Fixed/UTC+05:30:00` so that they can round
trip through the zone registry, and compacted abbreviations of the form
`UTC+5:30` for `%Z` output.

Offsets beyond 24 hours from UTC are not supported and collapse to UTC.
*/

const FIXED_PREFIX: &str = "Fixed/";

/// The maximum magnitude of a fixed offset, 24 hours in seconds.
pub(crate) const MAX_OFFSET: i32 = 24 * 60 * 60;

/// Recognizes the names produced by [`name_for_offset`], returning the
/// offset they encode. `"UTC"` maps to offset zero without any prefix.
pub(crate) fn offset_from_name(name: &str) -> Option<i32> {
    if name == "UTC" {
        return Some(0);
    }
    // "Fixed/UTC+99:99:99" exactly.
    let rest = name.strip_prefix(FIXED_PREFIX)?;
    let rest = rest.strip_prefix("UTC")?;
    let bytes = rest.as_bytes();
    if bytes.len() != 9 || bytes[3] != b':' || bytes[6] != b':' {
        return None;
    }
    let sign = match bytes[0] {
        b'+' => 1,
        b'-' => -1,
        _ => return None,
    };
    let hours = parse02d(&bytes[1..3])?;
    let minutes = parse02d(&bytes[4..6])?;
    let seconds = parse02d(&bytes[7..9])?;
    let offset = (hours * 60 + minutes) * 60 + seconds;
    if offset > MAX_OFFSET {
        return None;
    }
    Some(sign * offset)
}

fn parse02d(bytes: &[u8]) -> Option<i32> {
    if bytes.len() != 2
        || !bytes[0].is_ascii_digit()
        || !bytes[1].is_ascii_digit()
    {
        return None;
    }
    Some(i32::from(bytes[0] - b'0') * 10 + i32::from(bytes[1] - b'0'))
}

/// The registry name of the fixed zone with the given east-positive
/// offset. Offset zero, and any offset beyond 24 hours from UTC, is
/// rendered as plain `"UTC"`.
pub(crate) fn name_for_offset(seconds: i32) -> String {
    if seconds == 0 || seconds.abs() > MAX_OFFSET {
        return String::from("UTC");
    }
    let sign = if seconds < 0 { '-' } else { '+' };
    let off = seconds.abs();
    let hours = off / 3_600;
    let minutes = (off % 3_600) / 60;
    let secs = off % 60;
    format!("{FIXED_PREFIX}UTC{sign}{hours:02}:{minutes:02}:{secs:02}")
}

/// The abbreviation of the fixed zone with the given offset: the name
/// with its prefix and colons stripped and trailing zero fields dropped,
/// e.g. `UTC+5:30` becomes `UTC+530` and `UTC-08:00:00` becomes `UTC-8`.
pub(crate) fn abbr_for_offset(seconds: i32) -> String {
    if seconds == 0 || seconds.abs() > MAX_OFFSET {
        return String::from("UTC");
    }
    let sign = if seconds < 0 { '-' } else { '+' };
    let off = seconds.abs();
    let hours = off / 3_600;
    let minutes = (off % 3_600) / 60;
    let secs = off % 60;
    if secs != 0 {
        format!("UTC{sign}{hours:02}{minutes:02}{secs:02}")
    } else if minutes != 0 {
        format!("UTC{sign}{hours:02}{minutes:02}")
    } else {
        format!("UTC{sign}{hours}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_round_trip() {
        for seconds in [-86_400, -19_800, -2_670, 0, 3_600, 20_700, 86_400] {
            let name = name_for_offset(seconds);
            assert_eq!(offset_from_name(&name), Some(seconds), "{name}");
        }
    }

    #[test]
    fn names() {
        assert_eq!(name_for_offset(0), "UTC");
        assert_eq!(name_for_offset(19_800), "Fixed/UTC+05:30:00");
        assert_eq!(name_for_offset(-2_670), "Fixed/UTC-00:44:30");
        assert_eq!(name_for_offset(86_401), "UTC");
        assert_eq!(name_for_offset(-86_401), "UTC");
    }

    #[test]
    fn abbreviations() {
        assert_eq!(abbr_for_offset(0), "UTC");
        assert_eq!(abbr_for_offset(-8 * 3_600), "UTC-8");
        assert_eq!(abbr_for_offset(11 * 3_600), "UTC+11");
        assert_eq!(abbr_for_offset(19_800), "UTC+0530");
        assert_eq!(abbr_for_offset(-2_670), "UTC-004430");
        assert_eq!(abbr_for_offset(20_700), "UTC+0545");
    }

    #[test]
    fn rejects_foreign_names() {
        assert_eq!(offset_from_name("America/New_York"), None);
        assert_eq!(offset_from_name("Fixed/UTC+05:30"), None);
        assert_eq!(offset_from_name("Fixed/UTC 05:30:00"), None);
        assert_eq!(offset_from_name("Fixed/UTC+25:00:00"), None);
    }
}
