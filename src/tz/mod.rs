/*!
Time zones and the conversions they mediate.

A [`TimeZone`] is a cheap, immutable handle to a parsed zone. Zones are
interned in a process-wide registry on first use and live for the
lifetime of the process, so cloning and sharing handles across threads
costs a reference count at most.

Two lookups are offered. The *forward* lookup ([`TimeZone::lookup`])
takes an absolute time to the civil time, UTC offset, DST flag and
abbreviation in effect. The *reverse* lookup ([`TimeZone::lookup_civil`])
classifies a civil time as unique, skipped (it fell into a
spring-forward gap and names no real instant) or repeated (it fell into
a fall-back overlap and names two), reporting candidate instants for
each case. [`TimeZone::convert`] applies the conventional tie-break for
callers that always want a single instant.
*/

use std::sync::Arc;

use crate::civil::CivilSecond;
use crate::error::Error;

pub(crate) mod fixed;
pub(crate) mod posix;
pub(crate) mod registry;
pub(crate) mod tzif;

use self::tzif::Zone;

/// An immutable handle to a time zone.
///
/// Handles are cheap to clone and freely shareable across threads. Two
/// handles compare equal when they refer to the same interned zone.
#[derive(Clone)]
pub struct TimeZone {
    /// `None` is the built-in UTC zone, which needs no allocation and no
    /// registry access.
    kind: Option<Arc<Zone>>,
}

impl TimeZone {
    /// The UTC time zone. Its offset is zero and it has no transitions.
    pub const UTC: TimeZone = TimeZone { kind: None };

    /// Returns the UTC time zone.
    #[inline]
    pub fn utc() -> TimeZone {
        TimeZone::UTC
    }

    /// Returns the time zone with the given name from the IANA Time Zone
    /// Database, loading and caching it on first use.
    ///
    /// `"UTC"` always succeeds without touching the file system. A name
    /// beginning with `/` is read as an absolute path to a zoneinfo
    /// file. The name `"localtime"` reads the file named by the
    /// `LOCALTIME` environment variable, defaulting to `/etc/localtime`.
    /// Any other name is joined to the zoneinfo root named by `TZDIR`,
    /// defaulting to `/usr/share/zoneinfo`.
    ///
    /// # Errors
    ///
    /// Fails when the name cannot be resolved to well-formed zoneinfo
    /// data. The failure is memoized: the name is mapped to UTC in the
    /// registry so that later calls fail quickly without re-reading the
    /// file system, and callers wanting the conventional fallback can
    /// use `TimeZone::get(name).unwrap_or(TimeZone::UTC)`.
    pub fn get(name: &str) -> Result<TimeZone, Error> {
        registry::get(name)
    }

    /// Returns the local time zone, as named by the `TZ` environment
    /// variable. A leading `:` in `TZ` is ignored; an unset or empty
    /// `TZ` selects `localtime`. Falls back to UTC (with a diagnostic)
    /// when the named zone cannot be loaded.
    pub fn system() -> TimeZone {
        registry::system()
    }

    /// Returns a fixed-offset time zone with the given UTC offset in
    /// seconds, east positive.
    ///
    /// Fixed zones are named `Fixed/UTC+hh:mm:ss` and abbreviate as
    /// `UTC+hhmmss` with trailing zero fields dropped. Offset zero, and
    /// any offset of more than 24 hours from UTC, collapses to UTC.
    pub fn fixed(offset_seconds: i32) -> TimeZone {
        registry::fixed(offset_seconds)
    }

    /// The name this zone was loaded under: an IANA name, `"UTC"`, or a
    /// synthetic `Fixed/UTC+hh:mm:ss` name.
    pub fn name(&self) -> &str {
        match self.kind {
            None => "UTC",
            Some(ref zone) => zone.name(),
        }
    }

    /// Forward lookup: the civil time and zone facts in effect at the
    /// absolute time `second` (seconds since the Unix epoch).
    pub fn lookup(&self, second: i64) -> AbsoluteLookup<'_> {
        match self.kind {
            // In UTC, absolute seconds and civil seconds coincide.
            None => AbsoluteLookup {
                cs: CivilSecond::from_fields(
                    crate::civil::fields::from_civil_seconds(second),
                ),
                offset: 0,
                is_dst: false,
                abbr: "UTC",
            },
            Some(ref zone) => zone.break_time(second),
        }
    }

    /// Reverse lookup: classifies the civil time `cs` in this zone.
    ///
    /// `cs` is already normalized by construction. To resolve raw
    /// fields and learn whether normalization moved any of them, use
    /// [`TimeZone::lookup_civil_fields`].
    pub fn lookup_civil(&self, cs: CivilSecond) -> CivilLookup {
        match self.kind {
            None => CivilLookup::Unique {
                timestamp: crate::civil::fields::civil_seconds(cs.fields()),
            },
            Some(ref zone) => zone.make_time_info(cs),
        }
    }

    /// Reverse lookup from the six raw civil fields: normalizes them,
    /// classifies the result, and reports whether normalization moved
    /// any field.
    ///
    /// A [`CivilSecond`] is normalized the instant it is constructed,
    /// so [`TimeZone::lookup_civil`] cannot tell whether its caller
    /// originally wrote, say, February 31st. This entry point keeps
    /// that bit alongside the classification:
    ///
    /// ```
    /// use civtz::TimeZone;
    ///
    /// let info = TimeZone::UTC.lookup_civil_fields(2023, 2, 31, 0, 0, 0);
    /// assert!(info.normalized);
    /// assert_eq!(
    ///     TimeZone::UTC.lookup(info.lookup.pre()).cs.to_string(),
    ///     "2023-03-03T00:00:00",
    /// );
    /// ```
    pub fn lookup_civil_fields(
        &self,
        y: i64,
        m: i64,
        d: i64,
        hh: i64,
        mm: i64,
        ss: i64,
    ) -> CivilFieldsLookup {
        let (cs, normalized) = CivilSecond::new_normalized(y, m, d, hh, mm, ss);
        CivilFieldsLookup { lookup: self.lookup_civil(cs), normalized }
    }

    /// Converts a civil time to a single absolute time, applying the
    /// conventional tie-break: the earlier candidate for a repeated
    /// time, and for a skipped time the instant that renders back to a
    /// civil time at or after `cs`.
    pub fn convert(&self, cs: CivilSecond) -> i64 {
        self.lookup_civil(cs).pre()
    }

    pub(crate) fn from_zone(zone: Arc<Zone>) -> TimeZone {
        TimeZone { kind: Some(zone) }
    }
}

impl PartialEq for TimeZone {
    fn eq(&self, rhs: &TimeZone) -> bool {
        match (&self.kind, &rhs.kind) {
            (None, None) => true,
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Eq for TimeZone {}

impl core::fmt::Debug for TimeZone {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "TimeZone({})", self.name())
    }
}

/// The result of a forward lookup: what a wall clock in the zone shows
/// at the queried instant, plus the offset and type facts behind it.
#[derive(Clone, Copy, Debug)]
pub struct AbsoluteLookup<'t> {
    /// The civil time in the zone.
    pub cs: CivilSecond,
    /// The UTC offset in effect, in seconds east of Greenwich.
    pub offset: i32,
    /// Whether daylight saving time is in effect.
    pub is_dst: bool,
    /// The abbreviation of the zone's current type, e.g. `"EST"`. The
    /// string borrows from the zone's interned data.
    pub abbr: &'t str,
}

/// The result of a reverse lookup.
///
/// All instants are seconds since the Unix epoch. For the ambiguous
/// variants, `trans` is the transition boundary itself; `pre` is the
/// candidate computed with the offset in effect *before* the transition
/// and `post` the one computed with the offset in effect after it.
///
/// For a skipped civil time neither candidate renders back to the
/// queried civil time (none exists); `pre` is the instant you get by
/// pretending the jump forward never happened, which renders to a civil
/// time after the gap, while `post` renders to one before it.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CivilLookup {
    /// Exactly one instant shows the queried civil time.
    Unique { timestamp: i64 },
    /// The civil time fell in a spring-forward gap; no instant shows it.
    Skipped { pre: i64, trans: i64, post: i64 },
    /// The civil time fell in a fall-back overlap; two instants show it,
    /// `pre` the earlier and `post` the later.
    Repeated { pre: i64, trans: i64, post: i64 },
}

impl CivilLookup {
    /// The single-instant answer under the conventional tie-break:
    /// unique times map to themselves, skipped times to the instant that
    /// renders at or after the queried civil time, repeated times to the
    /// earlier candidate.
    pub fn pre(self) -> i64 {
        match self {
            CivilLookup::Unique { timestamp } => timestamp,
            CivilLookup::Skipped { pre, .. } => pre,
            CivilLookup::Repeated { pre, .. } => pre,
        }
    }

    /// Shifts every instant in the lookup forward by `delta` seconds.
    pub(crate) fn advance(self, delta: i64) -> CivilLookup {
        match self {
            CivilLookup::Unique { timestamp } => {
                CivilLookup::Unique { timestamp: timestamp + delta }
            }
            CivilLookup::Skipped { pre, trans, post } => CivilLookup::Skipped {
                pre: pre + delta,
                trans: trans + delta,
                post: post + delta,
            },
            CivilLookup::Repeated { pre, trans, post } => {
                CivilLookup::Repeated {
                    pre: pre + delta,
                    trans: trans + delta,
                    post: post + delta,
                }
            }
        }
    }
}

/// The result of [`TimeZone::lookup_civil_fields`]: a classified
/// reverse lookup plus whether the given raw fields had to be
/// normalized to produce the civil time that was looked up.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CivilFieldsLookup {
    /// The classification of the normalized civil time.
    pub lookup: CivilLookup,
    /// Whether normalization moved any of the given fields.
    pub normalized: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_civil_fields_reports_normalization() {
        // 2013-06-29T03:08:09Z.
        let want = 1372475289;
        let info = TimeZone::UTC.lookup_civil_fields(2013, 6, 29, 3, 8, 9);
        assert!(!info.normalized);
        assert_eq!(info.lookup, CivilLookup::Unique { timestamp: want });

        // Hour 27 normalizes onto the same instant.
        let info = TimeZone::UTC.lookup_civil_fields(2013, 6, 28, 27, 8, 9);
        assert!(info.normalized);
        assert_eq!(info.lookup, CivilLookup::Unique { timestamp: want });
    }

    #[test]
    fn lookup_civil_fields_in_fixed_zone() {
        let tz = TimeZone::fixed(5 * 3600 + 45 * 60);
        let info = tz.lookup_civil_fields(1970, 1, 1, 5, 45, 0);
        assert!(!info.normalized);
        assert_eq!(info.lookup, CivilLookup::Unique { timestamp: 0 });

        let info = tz.lookup_civil_fields(1970, 1, 1, 5, 44, 60);
        assert!(info.normalized);
        assert_eq!(info.lookup, CivilLookup::Unique { timestamp: 0 });
    }
}
