/*!
`strftime`-style formatting and parsing of absolute times.

The formatter renders an instant as civil time in a zone, directed by a
format string of ordinary characters and `%`-specifiers. The parser is
its inverse: it reassembles a civil time, an optional UTC offset and an
optional sub-second fraction from text, then resolves them back to an
instant.

The supported specifiers are the POSIX `strftime` set with English
month and weekday names, plus a few extensions:

| Specifier | Meaning |
|-----------|---------|
| `%Ez`     | UTC offset as `±HH:MM` (RFC 3339). The parser also accepts `Z`. |
| `%E#S`    | Seconds with exactly `#` digits of fraction, `#` in 0..=15. |
| `%E*S`    | Seconds with trimmed fractional digits (no trailing zeros). |
| `%E4Y`    | Year zero-padded to at least four characters including sign. |
| `%s`      | Seconds since the Unix epoch, ignoring the zone. |

When formatting, unknown `%` sequences are emitted verbatim; formatting
never fails. When parsing, unknown specifiers are errors, whitespace in
the format matches any run of whitespace in the input (including none),
and numeric fields are strictly range-checked: `February 31` does not
normalize, it fails. Fields absent from the format default to
`1970-01-01 00:00:00 +00:00`.

The RFC 3339 format `"%Y-%m-%dT%H:%M:%E*S%Ez"` round-trips any instant
with up to nanosecond precision.
*/

use crate::{error::Error, timestamp::Timestamp, tz::TimeZone};

mod format;
mod parse;

pub(crate) const MONTH_FULL: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

pub(crate) const MONTH_ABBREV: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct",
    "Nov", "Dec",
];

/// Monday-first, matching the `civil::Weekday` discriminant order.
pub(crate) const WEEKDAY_FULL: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

pub(crate) const WEEKDAY_ABBREV: [&str; 7] =
    ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Formats the instant `t` as civil time in `tz`, directed by `fmt`.
///
/// Formatting is total: every specifier can be produced from the
/// forward lookup, and unrecognized `%` sequences are copied through
/// verbatim.
///
/// # Example
///
/// ```
/// use civtz::{format, Timestamp, TimeZone};
///
/// let t = Timestamp::new(1395024427, 333_304_000);
/// assert_eq!(
///     format("%Y-%m-%d %H:%M:%E*S %Ez", t, &TimeZone::UTC),
///     "2014-03-17 02:47:07.333304 +00:00",
/// );
/// ```
pub fn format(fmt: &str, t: Timestamp, tz: &TimeZone) -> String {
    format::format(fmt, t, tz)
}

/// Parses `input` against `fmt`, resolving the civil time it describes
/// to an instant in `tz`.
///
/// If the input carries an explicit UTC offset (`%z`/`%Ez`), the offset
/// wins and `tz` is ignored. Otherwise the civil time is resolved by
/// the zone's rules; a civil time that is skipped or repeated in `tz`
/// resolves per the conventional tie-break (see
/// [`TimeZone::convert`]).
///
/// # Errors
///
/// Fails on unmatched literals, out-of-range fields, unknown
/// specifiers, or trailing unconsumed input that is not whitespace.
///
/// # Example
///
/// ```
/// use civtz::{parse, Timestamp, TimeZone};
///
/// let t = parse("%Y-%m-%dT%H:%M:%S%Ez", "2014-02-12T20:21:00+00:00", &TimeZone::UTC)?;
/// assert_eq!(t, Timestamp::from_second(1392236460));
/// # Ok::<(), civtz::Error>(())
/// ```
pub fn parse(fmt: &str, input: &str, tz: &TimeZone) -> Result<Timestamp, Error> {
    parse::parse(fmt, input, tz)
}
