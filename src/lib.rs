/*!
Conversions between absolute time and civil time under the rules of an
[IANA Time Zone Database] time zone, plus `strftime`-style formatting and
parsing of instants.

An *absolute* time is a point on a linear timescale, represented here as a
signed count of seconds from the Unix epoch (with a separate nanosecond
remainder carried by [`Timestamp`]). A *civil* time is the familiar
six-field calendar tuple (year, month, day, hour, minute, second) with no
offset attached. A [`TimeZone`] mediates between the two.

# Example

```no_run
use civtz::{civil::CivilSecond, TimeZone};

let tz = TimeZone::get("America/New_York")?;

// Absolute -> civil.
let al = tz.lookup(947562123);
assert_eq!(al.cs, CivilSecond::new(2000, 1, 11, 1, 2, 3));
assert_eq!(al.abbr, "EST");

// Civil -> absolute.
let t = tz.convert(CivilSecond::new(2000, 1, 11, 1, 2, 3));
assert_eq!(t, 947562123);
# Ok::<(), civtz::Error>(())
```

# Formatting and parsing

```no_run
use civtz::{format, parse, Timestamp, TimeZone};

let tz = TimeZone::get("America/Los_Angeles")?;
let t = parse("%Y-%m-%d %H:%M:%S", "2013-06-28 19:08:09", &tz)?;
assert_eq!(format("%Y-%m-%dT%H:%M:%E*S%Ez", t, &tz), "2013-06-28T19:08:09-07:00");
# Ok::<(), civtz::Error>(())
```

The format string `"%Y-%m-%dT%H:%M:%E*S%Ez"` produces RFC 3339 output and
is guaranteed to round-trip through [`parse`] for any instant with up to
nanosecond precision.

# Time zones

Zone data is read from the host's compiled zoneinfo files (see `tzfile(5)`).
The lookup path honours the `TZDIR` environment variable (default
`/usr/share/zoneinfo`), absolute paths, and the special name `localtime`
(which honours `LOCALTIME`, default `/etc/localtime`). Parsed zones are
interned in a process-wide registry for the lifetime of the process, so
[`TimeZone`] values are cheap to copy and share across threads.

Leap seconds are deliberately ignored: this library assumes 60-second
minutes and rejects leap-second-encoded ("right/") zoneinfo.

[IANA Time Zone Database]: https://www.iana.org/time-zones
*/

#![deny(rustdoc::broken_intra_doc_links)]
#![warn(missing_debug_implementations)]

pub use crate::{
    error::Error,
    fmt::{format, parse},
    timestamp::Timestamp,
    tz::{AbsoluteLookup, CivilFieldsLookup, CivilLookup, TimeZone},
};

#[macro_use]
mod logging;

pub mod civil;
mod error;
mod fmt;
mod timestamp;
pub mod tz;
mod util;
