use crate::civil::CivilSecond;

/// An instant in time with nanosecond precision.
///
/// The time zone and formatting machinery in this crate operates on whole
/// seconds; a `Timestamp` wraps that second-aligned core with a
/// sub-second remainder. The remainder is normalized by flooring toward
/// negative infinity, so `nanosecond` is always in `0..=999_999_999` and
/// half a second *before* the epoch is second `-1` with remainder
/// `500_000_000`:
///
/// ```
/// use civtz::Timestamp;
///
/// let t = Timestamp::new(0, -500_000_000);
/// assert_eq!(t.second(), -1);
/// assert_eq!(t.nanosecond(), 500_000_000);
/// ```
///
/// This is what makes `-0.5s` render as `1969-12-31 23:59:59.5` rather
/// than as a nonsensical negative fraction.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Timestamp {
    second: i64,
    nanosecond: i32,
}

impl Timestamp {
    /// 1970-01-01T00:00:00Z exactly.
    pub const UNIX_EPOCH: Timestamp = Timestamp { second: 0, nanosecond: 0 };

    /// Creates a new timestamp from a count of seconds since the Unix
    /// epoch and a signed nanosecond adjustment. The adjustment may be
    /// any magnitude; whole seconds are folded into `second` with the
    /// remainder floored into `0..=999_999_999`. Folding wraps if it
    /// moves `second` past the extremes of `i64`.
    #[inline]
    pub fn new(second: i64, nanosecond: i64) -> Timestamp {
        let carry = nanosecond.div_euclid(1_000_000_000);
        let nanosecond = nanosecond.rem_euclid(1_000_000_000) as i32;
        Timestamp { second: second.wrapping_add(carry), nanosecond }
    }

    /// Creates a new timestamp from whole seconds since the Unix epoch.
    #[inline]
    pub fn from_second(second: i64) -> Timestamp {
        Timestamp { second, nanosecond: 0 }
    }

    /// Creates a new timestamp from milliseconds since the Unix epoch.
    #[inline]
    pub fn from_millisecond(millisecond: i64) -> Timestamp {
        Timestamp::new(
            millisecond.div_euclid(1_000),
            millisecond.rem_euclid(1_000) * 1_000_000,
        )
    }

    /// Creates a new timestamp from microseconds since the Unix epoch.
    #[inline]
    pub fn from_microsecond(microsecond: i64) -> Timestamp {
        Timestamp::new(
            microsecond.div_euclid(1_000_000),
            microsecond.rem_euclid(1_000_000) * 1_000,
        )
    }

    /// Creates a new timestamp from nanoseconds since the Unix epoch.
    #[inline]
    pub fn from_nanosecond(nanosecond: i64) -> Timestamp {
        Timestamp::new(
            nanosecond.div_euclid(1_000_000_000),
            nanosecond.rem_euclid(1_000_000_000),
        )
    }

    /// The count of whole seconds since the Unix epoch, floored.
    #[inline]
    pub fn second(self) -> i64 {
        self.second
    }

    /// The sub-second remainder, in `0..=999_999_999`.
    #[inline]
    pub fn nanosecond(self) -> i32 {
        self.nanosecond
    }
}

impl core::fmt::Display for Timestamp {
    /// Formats in UTC as an RFC 3339 instant with trimmed sub-seconds.
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let s = crate::fmt::format(
            "%Y-%m-%dT%H:%M:%E*S%Ez",
            *self,
            &crate::tz::TimeZone::UTC,
        );
        f.write_str(&s)
    }
}

impl From<CivilSecond> for Timestamp {
    /// Interprets the civil time as UTC.
    fn from(cs: CivilSecond) -> Timestamp {
        Timestamp::from_second(crate::civil::fields::civil_seconds(
            cs.fields(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floors_negative_subseconds() {
        let t = Timestamp::new(0, -1);
        assert_eq!(t.second(), -1);
        assert_eq!(t.nanosecond(), 999_999_999);

        let t = Timestamp::from_microsecond(-1);
        assert_eq!(t.second(), -1);
        assert_eq!(t.nanosecond(), 999_999_000);
    }

    #[test]
    fn folds_whole_seconds() {
        let t = Timestamp::new(10, 2_500_000_000);
        assert_eq!(t.second(), 12);
        assert_eq!(t.nanosecond(), 500_000_000);
    }

    #[test]
    fn resolution_constructors() {
        assert_eq!(
            Timestamp::from_millisecond(1_123),
            Timestamp::new(1, 123_000_000),
        );
        assert_eq!(
            Timestamp::from_nanosecond(-1_500_000_000),
            Timestamp::new(-2, 500_000_000),
        );
    }

    #[test]
    fn display_is_rfc3339_utc() {
        assert_eq!(
            Timestamp::new(1395024427, 333_304_000).to_string(),
            "2014-03-17T02:47:07.333304+00:00",
        );
        assert_eq!(Timestamp::UNIX_EPOCH.to_string(), "1970-01-01T00:00:00+00:00");
    }
}
