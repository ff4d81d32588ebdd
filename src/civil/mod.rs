/*!
Civil-time types over the proleptic Gregorian calendar.

A civil time is the six-field tuple Y-M-D HH:MM:SS with no time zone or
offset attached. This module provides a family of six *aligned* civil
types, one per field: [`CivilSecond`], [`CivilMinute`], [`CivilHour`],
[`CivilDay`], [`CivilMonth`] and [`CivilYear`]. An aligned value pins
every field finer than its alignment to that field's minimum (1 for month
and day, 0 for the clock fields), so a `CivilMonth` is always the first
second of the first day of some month.

# Normalization

Constructors accept out-of-range fields and normalize them, with higher
units absorbing carries. October 32 becomes November 1, hour 25 carries a
day, second -1 borrows a minute, and so on:

```
use civtz::civil::CivilSecond;

let cs = CivilSecond::new(2016, -42, 122, 99, -147, 4949);
assert_eq!(cs.to_string(), "2012-10-04T01:55:29");
```

Construction never fails. Arithmetic on years wraps (rather than
saturating) at the extremes of `i64`; intermediate computations are exact
within the day-aligned range `[-5877641-06-23, 5881580-07-11]`.

# Arithmetic and comparison

Adding an integer to an aligned value steps it by that many units of its
alignment, and subtracting two values of the same alignment yields the
signed number of units between them:

```
use civtz::civil::{CivilDay, CivilMonth};

let d = CivilDay::new(2015, 2, 28);
assert_eq!((d + 1).to_string(), "2015-03-01");
assert_eq!(CivilDay::new(2016, 2, 28) - d, 365);

let m = CivilMonth::new(2015, 12);
assert_eq!((m + 1).to_string(), "2016-01");
```

Comparison always considers all six fields, regardless of alignment, so
values of different alignments are mutually comparable:

```
use civtz::civil::{CivilDay, CivilMonth};

assert!(CivilMonth::new(2015, 8) < CivilDay::new(2015, 8, 13));
assert!(CivilMonth::new(2015, 8) == CivilDay::new(2015, 8, 1));
```

# Conversion

Every alignment converts to every other via `From`. Converting toward a
finer alignment is lossless (the finer fields are already at their
minima); converting toward a coarser alignment truncates.
*/

use core::ops::{Add, AddAssign, Sub, SubAssign};

pub(crate) mod fields;

use self::fields::{
    align_day, align_hour, align_minute, align_month, align_second,
    align_year, day_ordinal, n_sec, step_day, step_hour, step_minute,
    step_month, step_second, step_year, Fields,
};

/// A day of the week.
///
/// The Unix epoch day, 1970-01-01, was a Thursday.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl core::fmt::Display for Weekday {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.write_str(match *self {
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
            Weekday::Saturday => "Saturday",
            Weekday::Sunday => "Sunday",
        })
    }
}

macro_rules! aligned_civil {
    (
        $(#[$meta:meta])*
        $name:ident, $align:ident, $step:ident, $diff_unit:expr
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
        pub struct $name {
            f: Fields,
        }

        impl $name {
            #[inline]
            pub(crate) fn from_fields(f: Fields) -> $name {
                $name { f: $align(f) }
            }

            #[inline]
            pub(crate) fn fields(self) -> Fields {
                self.f
            }

            /// The year field. Year 0 precedes year 1 (1 BCE is year 0).
            #[inline]
            pub fn year(self) -> i64 {
                self.f.y
            }

            /// The month field, in `1..=12`.
            #[inline]
            pub fn month(self) -> i32 {
                i32::from(self.f.m)
            }

            /// The day field, in `1..=31`.
            #[inline]
            pub fn day(self) -> i32 {
                i32::from(self.f.d)
            }

            /// The hour field, in `0..=23`.
            #[inline]
            pub fn hour(self) -> i32 {
                i32::from(self.f.hh)
            }

            /// The minute field, in `0..=59`.
            #[inline]
            pub fn minute(self) -> i32 {
                i32::from(self.f.mm)
            }

            /// The second field, in `0..=59`.
            #[inline]
            pub fn second(self) -> i32 {
                i32::from(self.f.ss)
            }
        }

        impl Add<i64> for $name {
            type Output = $name;

            #[inline]
            fn add(self, n: i64) -> $name {
                $name::from_fields($step(self.f, n))
            }
        }

        impl Add<$name> for i64 {
            type Output = $name;

            #[inline]
            fn add(self, rhs: $name) -> $name {
                rhs + self
            }
        }

        impl Sub<i64> for $name {
            type Output = $name;

            #[inline]
            fn sub(self, n: i64) -> $name {
                if n != i64::MIN {
                    $name::from_fields($step(self.f, -n))
                } else {
                    $name::from_fields($step($step(self.f, -(n + 1)), 1))
                }
            }
        }

        impl Sub<$name> for $name {
            type Output = i64;

            /// The signed number of alignment units between two values.
            #[inline]
            fn sub(self, rhs: $name) -> i64 {
                $diff_unit(self.f, rhs.f)
            }
        }

        impl AddAssign<i64> for $name {
            #[inline]
            fn add_assign(&mut self, n: i64) {
                *self = *self + n;
            }
        }

        impl SubAssign<i64> for $name {
            #[inline]
            fn sub_assign(&mut self, n: i64) {
                *self = *self - n;
            }
        }

        impl Default for $name {
            /// 1970-01-01 00:00:00, truncated to the alignment.
            fn default() -> $name {
                $name::from_fields(Fields {
                    y: 1970,
                    m: 1,
                    d: 1,
                    hh: 0,
                    mm: 0,
                    ss: 0,
                })
            }
        }

        impl core::fmt::Debug for $name {
            fn fmt(
                &self,
                f: &mut core::fmt::Formatter,
            ) -> core::fmt::Result {
                core::fmt::Display::fmt(self, f)
            }
        }
    };
}

fn diff_year(f1: Fields, f2: Fields) -> i64 {
    f1.y.wrapping_sub(f2.y)
}

fn diff_month(f1: Fields, f2: Fields) -> i64 {
    diff_year(f1, f2) * 12 + i64::from(f1.m - f2.m)
}

fn diff_day(f1: Fields, f2: Fields) -> i64 {
    day_ordinal(f1.y, f1.m, f1.d) - day_ordinal(f2.y, f2.m, f2.d)
}

fn diff_hour(f1: Fields, f2: Fields) -> i64 {
    diff_day(f1, f2) * 24 + i64::from(f1.hh - f2.hh)
}

fn diff_minute(f1: Fields, f2: Fields) -> i64 {
    diff_hour(f1, f2) * 60 + i64::from(f1.mm - f2.mm)
}

fn diff_second(f1: Fields, f2: Fields) -> i64 {
    diff_minute(f1, f2) * 60 + i64::from(f1.ss - f2.ss)
}

aligned_civil!(
    /// A civil time aligned to the second. This is the most precise civil
    /// type and the one the time zone engine converts to and from.
    CivilSecond,
    align_second,
    step_second,
    diff_second
);
aligned_civil!(
    /// A civil time aligned to the minute. The second field is always 0.
    CivilMinute,
    align_minute,
    step_minute,
    diff_minute
);
aligned_civil!(
    /// A civil time aligned to the hour. The minute and second fields are
    /// always 0.
    CivilHour,
    align_hour,
    step_hour,
    diff_hour
);
aligned_civil!(
    /// A civil date. The clock fields are always 0.
    CivilDay,
    align_day,
    step_day,
    diff_day
);
aligned_civil!(
    /// A civil month. The day field is always 1 and the clock fields are
    /// always 0.
    CivilMonth,
    align_month,
    step_month,
    diff_month
);
aligned_civil!(
    /// A civil year: January 1st at midnight of some year.
    CivilYear,
    align_year,
    step_year,
    diff_year
);

impl CivilSecond {
    /// Creates a new second-aligned civil time, normalizing any
    /// out-of-range fields.
    #[inline]
    pub fn new(y: i64, m: i64, d: i64, hh: i64, mm: i64, ss: i64) -> CivilSecond {
        CivilSecond::from_fields(n_sec(y, m, d, hh, mm, ss))
    }

    /// Like [`CivilSecond::new`], but also reports whether producing
    /// the result moved any of the given fields.
    ///
    /// Once a `CivilSecond` exists its fields are normalized and the
    /// originals are gone, so this is the place to ask.
    ///
    /// # Example
    ///
    /// ```
    /// use civtz::civil::CivilSecond;
    ///
    /// let (cs, normalized) = CivilSecond::new_normalized(2023, 2, 31, 0, 0, 0);
    /// assert!(normalized);
    /// assert_eq!(cs.to_string(), "2023-03-03T00:00:00");
    ///
    /// let (_, normalized) = CivilSecond::new_normalized(2023, 2, 28, 0, 0, 0);
    /// assert!(!normalized);
    /// ```
    pub fn new_normalized(
        y: i64,
        m: i64,
        d: i64,
        hh: i64,
        mm: i64,
        ss: i64,
    ) -> (CivilSecond, bool) {
        let cs = CivilSecond::new(y, m, d, hh, mm, ss);
        let moved = cs.year() != y
            || i64::from(cs.month()) != m
            || i64::from(cs.day()) != d
            || i64::from(cs.hour()) != hh
            || i64::from(cs.minute()) != mm
            || i64::from(cs.second()) != ss;
        (cs, moved)
    }
}

impl CivilMinute {
    /// Creates a new minute-aligned civil time, normalizing any
    /// out-of-range fields.
    #[inline]
    pub fn new(y: i64, m: i64, d: i64, hh: i64, mm: i64) -> CivilMinute {
        CivilMinute::from_fields(n_sec(y, m, d, hh, mm, 0))
    }
}

impl CivilHour {
    /// Creates a new hour-aligned civil time, normalizing any
    /// out-of-range fields.
    #[inline]
    pub fn new(y: i64, m: i64, d: i64, hh: i64) -> CivilHour {
        CivilHour::from_fields(n_sec(y, m, d, hh, 0, 0))
    }
}

impl CivilDay {
    /// Creates a new civil date, normalizing any out-of-range fields.
    #[inline]
    pub fn new(y: i64, m: i64, d: i64) -> CivilDay {
        CivilDay::from_fields(n_sec(y, m, d, 0, 0, 0))
    }

    /// The day of the week this date falls on.
    pub fn weekday(self) -> Weekday {
        const BY_THU_OFF: [Weekday; 7] = [
            Weekday::Thursday,
            Weekday::Friday,
            Weekday::Saturday,
            Weekday::Sunday,
            Weekday::Monday,
            Weekday::Tuesday,
            Weekday::Wednesday,
        ];
        let ord = day_ordinal(self.f.y, self.f.m, self.f.d);
        BY_THU_OFF[ord.rem_euclid(7) as usize]
    }

    /// The 1-based day of the year, in `1..=366`.
    pub fn yearday(self) -> i32 {
        let ord = day_ordinal(self.f.y, self.f.m, self.f.d);
        (ord - day_ordinal(self.f.y, 1, 1) + 1) as i32
    }
}

impl CivilMonth {
    /// Creates a new civil month, normalizing an out-of-range month.
    #[inline]
    pub fn new(y: i64, m: i64) -> CivilMonth {
        CivilMonth::from_fields(n_sec(y, m, 1, 0, 0, 0))
    }
}

impl CivilYear {
    /// Creates a new civil year.
    #[inline]
    pub fn new(y: i64) -> CivilYear {
        CivilYear::from_fields(n_sec(y, 1, 1, 0, 0, 0))
    }
}

/// Returns the first civil day strictly after `cd` that falls on the
/// weekday `wd`. The result always advances by at least one day, even
/// when `cd` itself falls on `wd`.
pub fn next_weekday(mut cd: CivilDay, wd: Weekday) -> CivilDay {
    loop {
        cd += 1;
        if cd.weekday() == wd {
            return cd;
        }
    }
}

/// Returns the last civil day strictly before `cd` that falls on the
/// weekday `wd`. The result always recedes by at least one day, even when
/// `cd` itself falls on `wd`.
pub fn prev_weekday(mut cd: CivilDay, wd: Weekday) -> CivilDay {
    loop {
        cd -= 1;
        if cd.weekday() == wd {
            return cd;
        }
    }
}

// Conversion between civil times of different alignments. Conversion to a
// more precise alignment is lossless (the finer fields are already at
// their minima); conversion to a coarser alignment truncates.
macro_rules! civil_convert {
    ($a:ident, $b:ident) => {
        impl From<$a> for $b {
            #[inline]
            fn from(x: $a) -> $b {
                $b::from_fields(x.fields())
            }
        }

        impl From<$b> for $a {
            #[inline]
            fn from(x: $b) -> $a {
                $a::from_fields(x.fields())
            }
        }

        impl PartialEq<$b> for $a {
            #[inline]
            fn eq(&self, rhs: &$b) -> bool {
                self.f == rhs.f
            }
        }

        impl PartialEq<$a> for $b {
            #[inline]
            fn eq(&self, rhs: &$a) -> bool {
                self.f == rhs.f
            }
        }

        impl PartialOrd<$b> for $a {
            #[inline]
            fn partial_cmp(&self, rhs: &$b) -> Option<core::cmp::Ordering> {
                self.f.partial_cmp(&rhs.f)
            }
        }

        impl PartialOrd<$a> for $b {
            #[inline]
            fn partial_cmp(&self, rhs: &$a) -> Option<core::cmp::Ordering> {
                self.f.partial_cmp(&rhs.f)
            }
        }
    };
}

civil_convert!(CivilSecond, CivilMinute);
civil_convert!(CivilSecond, CivilHour);
civil_convert!(CivilSecond, CivilDay);
civil_convert!(CivilSecond, CivilMonth);
civil_convert!(CivilSecond, CivilYear);
civil_convert!(CivilMinute, CivilHour);
civil_convert!(CivilMinute, CivilDay);
civil_convert!(CivilMinute, CivilMonth);
civil_convert!(CivilMinute, CivilYear);
civil_convert!(CivilHour, CivilDay);
civil_convert!(CivilHour, CivilMonth);
civil_convert!(CivilHour, CivilYear);
civil_convert!(CivilDay, CivilMonth);
civil_convert!(CivilDay, CivilYear);
civil_convert!(CivilMonth, CivilYear);

// Display formats YYYY-MM-DDThh:mm:ss truncated at the alignment, e.g. a
// CivilDay is formatted as YYYY-MM-DD.

impl core::fmt::Display for CivilYear {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "{}", self.f.y)
    }
}

impl core::fmt::Display for CivilMonth {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "{}-{:02}", self.f.y, self.f.m)
    }
}

impl core::fmt::Display for CivilDay {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "{}-{:02}-{:02}", self.f.y, self.f.m, self.f.d)
    }
}

impl core::fmt::Display for CivilHour {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "{}-{:02}-{:02}T{:02}", self.f.y, self.f.m, self.f.d, self.f.hh)
    }
}

impl core::fmt::Display for CivilMinute {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "{}-{:02}-{:02}T{:02}:{:02}",
            self.f.y, self.f.m, self.f.d, self.f.hh, self.f.mm,
        )
    }
}

impl core::fmt::Display for CivilSecond {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "{}-{:02}-{:02}T{:02}:{:02}:{:02}",
            self.f.y, self.f.m, self.f.d, self.f.hh, self.f.mm, self.f.ss,
        )
    }
}
