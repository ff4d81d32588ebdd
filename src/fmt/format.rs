use crate::{
    civil::{CivilDay, CivilSecond},
    fmt::{MONTH_ABBREV, MONTH_FULL, WEEKDAY_ABBREV, WEEKDAY_FULL},
    timestamp::Timestamp,
    tz::TimeZone,
};

pub(super) fn format(fmt: &str, t: Timestamp, tz: &TimeZone) -> String {
    let al = tz.lookup(t.second());
    let cd = CivilDay::from(al.cs);
    let mut f = Formatter {
        fmt,
        cs: al.cs,
        weekday_mon0: cd.weekday() as usize,
        yearday: i64::from(cd.yearday()),
        offset: al.offset,
        abbr: al.abbr,
        unix: t.second(),
        nanos: t.nanosecond(),
        out: String::with_capacity(fmt.len() + 32),
    };
    f.run();
    f.out
}

struct Formatter<'f, 't> {
    fmt: &'f str,
    cs: CivilSecond,
    /// The weekday with Monday as 0 (the `civil::Weekday` order).
    weekday_mon0: usize,
    /// 1-based day of the year.
    yearday: i64,
    offset: i32,
    abbr: &'t str,
    unix: i64,
    nanos: i32,
    out: String,
}

impl<'f, 't> Formatter<'f, 't> {
    fn run(&mut self) {
        while let Some(percent) = self.fmt.find('%') {
            self.out.push_str(&self.fmt[..percent]);
            self.fmt = &self.fmt[percent + 1..];
            self.directive();
        }
        self.out.push_str(self.fmt);
        self.fmt = "";
    }

    /// Handles one specifier, with the format positioned just after its
    /// `%`. Unknown sequences are emitted verbatim, `%` included.
    fn directive(&mut self) {
        let rest = self.fmt;
        let Some(c) = rest.chars().next() else {
            // A trailing '%' is itself an unknown sequence.
            self.out.push('%');
            return;
        };
        if !c.is_ascii() {
            self.out.push('%');
            return;
        }
        self.fmt = &rest[1..];
        match c as u8 {
            b'%' => self.out.push('%'),
            b'a' => self.out.push_str(WEEKDAY_ABBREV[self.weekday_mon0]),
            b'A' => self.out.push_str(WEEKDAY_FULL[self.weekday_mon0]),
            b'b' | b'h' => self.fmt_month_abbrev(),
            b'B' => self.fmt_month_full(),
            b'c' => self.recurse("%a %b %e %H:%M:%S %Y"),
            b'C' => self.fmt_century(),
            b'd' => self.pad2(i64::from(self.cs.day())),
            b'D' | b'x' => self.recurse("%m/%d/%y"),
            b'e' => self.pad2_space(i64::from(self.cs.day())),
            b'F' => self.recurse("%Y-%m-%d"),
            b'g' => {
                let (y, _) = self.iso_year_week();
                self.pad2(y.rem_euclid(100));
            }
            b'G' => {
                let (y, _) = self.iso_year_week();
                self.int(y);
            }
            b'H' => self.pad2(i64::from(self.cs.hour())),
            b'I' => self.pad2(self.hour12()),
            b'j' => self.pad3(self.yearday),
            b'k' => self.pad2_space(i64::from(self.cs.hour())),
            b'l' => self.pad2_space(self.hour12()),
            b'm' => self.pad2(i64::from(self.cs.month())),
            b'M' => self.pad2(i64::from(self.cs.minute())),
            b'n' => self.out.push('\n'),
            b'p' => self.out.push_str(self.ampm(true)),
            b'P' => self.out.push_str(self.ampm(false)),
            b'r' => self.recurse("%I:%M:%S %p"),
            b'R' => self.recurse("%H:%M"),
            b's' => self.int(self.unix),
            b'S' => self.pad2(i64::from(self.cs.second())),
            b't' => self.out.push('\t'),
            b'T' | b'X' => self.recurse("%H:%M:%S"),
            b'u' => self.int(self.weekday_mon0 as i64 + 1),
            b'U' => self.pad2(self.week_number(0)),
            b'V' => {
                let (_, week) = self.iso_year_week();
                self.pad2(week);
            }
            b'w' => self.int((self.weekday_mon0 as i64 + 1) % 7),
            b'W' => self.pad2(self.week_number(1)),
            b'y' => self.pad2(self.cs.year().rem_euclid(100)),
            b'Y' => self.int(self.cs.year()),
            b'z' => self.fmt_offset(false),
            b'Z' => self.out.push_str(self.abbr),
            b'E' => self.ext_e(),
            b'O' => self.ext_o(),
            _ => {
                // Unknown: emit the '%' and the directive byte verbatim.
                self.out.push('%');
                self.out.push(c);
            }
        }
    }

    /// `%E` extensions: `%Ez`, `%E*z`, `%E#S`, `%E*S`, `%E4Y`, and the
    /// modified-but-equivalent `%Ec %EC %Ex %EX %Ey %EY`.
    fn ext_e(&mut self) {
        let bytes = self.fmt.as_bytes();
        match bytes.first().copied() {
            Some(b'z') => {
                self.fmt = &self.fmt[1..];
                self.fmt_offset(true);
            }
            Some(b'*') => match bytes.get(1).copied() {
                Some(b'z') => {
                    self.fmt = &self.fmt[2..];
                    self.fmt_offset(true);
                }
                Some(b'S') => {
                    self.fmt = &self.fmt[2..];
                    self.fmt_seconds_trimmed();
                }
                _ => self.out.push_str("%E"),
            },
            Some(d) if d.is_ascii_digit() => {
                let mut precision = 0usize;
                let mut len = 0;
                while len < 2
                    && len < bytes.len()
                    && bytes[len].is_ascii_digit()
                {
                    precision = precision * 10 + usize::from(bytes[len] - b'0');
                    len += 1;
                }
                match bytes.get(len).copied() {
                    Some(b'S') if precision <= 15 => {
                        self.fmt = &self.fmt[len + 1..];
                        self.fmt_seconds_fixed(precision);
                    }
                    Some(b'Y') if precision == 4 => {
                        self.fmt = &self.fmt[len + 1..];
                        self.fmt_year_e4();
                    }
                    _ => self.out.push_str("%E"),
                }
            }
            Some(b'c') => {
                self.fmt = &self.fmt[1..];
                self.recurse("%a %b %e %H:%M:%S %Y");
            }
            Some(b'C') => {
                self.fmt = &self.fmt[1..];
                self.fmt_century();
            }
            Some(b'x') => {
                self.fmt = &self.fmt[1..];
                self.recurse("%m/%d/%y");
            }
            Some(b'X') => {
                self.fmt = &self.fmt[1..];
                self.recurse("%H:%M:%S");
            }
            Some(b'y') => {
                self.fmt = &self.fmt[1..];
                self.pad2(self.cs.year().rem_euclid(100));
            }
            Some(b'Y') => {
                self.fmt = &self.fmt[1..];
                self.int(self.cs.year());
            }
            _ => self.out.push_str("%E"),
        }
    }

    /// `%O` modified specifiers, all equivalent to their unmodified
    /// forms in the English locale.
    fn ext_o(&mut self) {
        let Some(&b) = self.fmt.as_bytes().first() else {
            self.out.push_str("%O");
            return;
        };
        if matches!(
            b,
            b'd' | b'e'
                | b'H'
                | b'I'
                | b'm'
                | b'M'
                | b'S'
                | b'u'
                | b'U'
                | b'V'
                | b'w'
                | b'W'
                | b'y'
        ) {
            self.fmt = &self.fmt[1..];
            // Re-dispatch as the unmodified specifier.
            let mapped: &'static str = match b {
                b'd' => "%d",
                b'e' => "%e",
                b'H' => "%H",
                b'I' => "%I",
                b'm' => "%m",
                b'M' => "%M",
                b'S' => "%S",
                b'u' => "%u",
                b'U' => "%U",
                b'V' => "%V",
                b'w' => "%w",
                b'W' => "%W",
                _ => "%y",
            };
            self.recurse(mapped);
        } else {
            self.out.push_str("%O");
        }
    }

    fn recurse(&mut self, fmt: &'static str) {
        let saved = self.fmt;
        self.fmt = fmt;
        self.run();
        self.fmt = saved;
    }

    fn fmt_month_abbrev(&mut self) {
        self.out.push_str(MONTH_ABBREV[(self.cs.month() - 1) as usize]);
    }

    fn fmt_month_full(&mut self) {
        self.out.push_str(MONTH_FULL[(self.cs.month() - 1) as usize]);
    }

    fn fmt_century(&mut self) {
        self.int(self.cs.year().div_euclid(100));
    }

    /// `%E4Y`: the year zero-padded to at least four characters,
    /// including any sign. Years outside [-999, 9999] take more.
    fn fmt_year_e4(&mut self) {
        let y = self.cs.year();
        if y < 0 {
            self.out.push_str(&format!("-{:03}", y.unsigned_abs()));
        } else {
            self.out.push_str(&format!("{y:04}"));
        }
    }

    /// `%z` or `%Ez`: the UTC offset as `±HHMM` or `±HH:MM`, truncated
    /// to minutes.
    fn fmt_offset(&mut self, colon: bool) {
        let (sign, off) = if self.offset < 0 {
            ('-', -i64::from(self.offset))
        } else {
            ('+', i64::from(self.offset))
        };
        self.out.push(sign);
        self.pad2(off / 3_600);
        if colon {
            self.out.push(':');
        }
        self.pad2((off % 3_600) / 60);
    }

    /// `%E#S`: seconds with exactly `precision` fractional digits.
    fn fmt_seconds_fixed(&mut self, precision: usize) {
        self.pad2(i64::from(self.cs.second()));
        if precision == 0 {
            return;
        }
        self.out.push('.');
        let digits = format!("{:09}", self.nanos);
        for i in 0..precision {
            self.out.push(*digits.as_bytes().get(i).unwrap_or(&b'0') as char);
        }
    }

    /// `%E*S`: seconds with no trailing fractional zeros.
    fn fmt_seconds_trimmed(&mut self) {
        self.pad2(i64::from(self.cs.second()));
        if self.nanos != 0 {
            let digits = format!("{:09}", self.nanos);
            self.out.push('.');
            self.out.push_str(digits.trim_end_matches('0'));
        }
    }

    fn hour12(&self) -> i64 {
        let hour = i64::from(self.cs.hour()) % 12;
        if hour == 0 {
            12
        } else {
            hour
        }
    }

    fn ampm(&self, upper: bool) -> &'static str {
        match (self.cs.hour() < 12, upper) {
            (true, true) => "AM",
            (true, false) => "am",
            (false, true) => "PM",
            (false, false) => "pm",
        }
    }

    /// The ISO 8601 week-based year and week number, via the Thursday
    /// of the queried date's week.
    fn iso_year_week(&self) -> (i64, i64) {
        let cd = CivilDay::from(self.cs);
        let thursday = cd + (3 - self.weekday_mon0 as i64);
        let year = thursday.year();
        let week = (thursday - CivilDay::new(year, 1, 1)) / 7 + 1;
        (year, week)
    }

    /// `%U` (`first_weekday` 0, Sunday-based) and `%W` (`first_weekday`
    /// 1, Monday-based) week-of-year numbers.
    fn week_number(&self, first_weekday: usize) -> i64 {
        let wday = (self.weekday_mon0 + 1 + 7 - first_weekday) % 7;
        (self.yearday - 1 + 7 - wday as i64) / 7
    }

    fn int(&mut self, v: i64) {
        self.out.push_str(&v.to_string());
    }

    fn pad2(&mut self, v: i64) {
        self.out.push((b'0' + (v / 10 % 10) as u8) as char);
        self.out.push((b'0' + (v % 10) as u8) as char);
    }

    fn pad2_space(&mut self, v: i64) {
        if v < 10 {
            self.out.push(' ');
            self.out.push((b'0' + (v % 10) as u8) as char);
        } else {
            self.pad2(v);
        }
    }

    fn pad3(&mut self, v: i64) {
        self.out.push((b'0' + (v / 100 % 10) as u8) as char);
        self.pad2(v % 100);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tz::TimeZone;

    fn utc() -> TimeZone {
        TimeZone::UTC
    }

    #[test]
    fn literals_pass_through() {
        let t = Timestamp::UNIX_EPOCH;
        assert_eq!(format("", t, &utc()), "");
        assert_eq!(format(" ", t, &utc()), " ");
        assert_eq!(format("xxx", t, &utc()), "xxx");
        let big = "x".repeat(100_000);
        assert_eq!(format(&big, t, &utc()), big);
    }

    #[test]
    fn posix_conversions_at_epoch() {
        let t = Timestamp::UNIX_EPOCH;
        let tz = utc();
        let cases: &[(&str, &str)] = &[
            ("%d", "01"),
            ("%e", " 1"),
            ("%H", "00"),
            ("%I", "12"),
            ("%j", "001"),
            ("%m", "01"),
            ("%M", "00"),
            ("%S", "00"),
            ("%U", "00"),
            ("%w", "4"),
            ("%W", "00"),
            ("%y", "70"),
            ("%Y", "1970"),
            ("%z", "+0000"),
            ("%Z", "UTC"),
            ("%%", "%"),
            ("%C", "19"),
            ("%D", "01/01/70"),
            ("%F", "1970-01-01"),
            ("%g", "70"),
            ("%G", "1970"),
            ("%k", " 0"),
            ("%l", "12"),
            ("%n", "\n"),
            ("%R", "00:00"),
            ("%t", "\t"),
            ("%T", "00:00:00"),
            ("%u", "4"),
            ("%V", "01"),
            ("%s", "0"),
            ("%a", "Thu"),
            ("%A", "Thursday"),
            ("%b", "Jan"),
            ("%h", "Jan"),
            ("%B", "January"),
            ("%p", "AM"),
            ("%P", "am"),
            ("%x", "01/01/70"),
            ("%X", "00:00:00"),
            ("%r", "12:00:00 AM"),
            ("%Ec", "Thu Jan  1 00:00:00 1970"),
            ("%EC", "19"),
            ("%Ex", "01/01/70"),
            ("%EX", "00:00:00"),
            ("%Ey", "70"),
            ("%EY", "1970"),
            ("%Od", "01"),
            ("%Oe", " 1"),
            ("%OH", "00"),
            ("%OI", "12"),
            ("%Om", "01"),
            ("%OM", "00"),
            ("%OS", "00"),
            ("%Ou", "4"),
            ("%OU", "00"),
            ("%OV", "01"),
            ("%Ow", "4"),
            ("%OW", "00"),
            ("%Oy", "70"),
        ];
        for &(fmt, want) in cases {
            // Alone, and with leading/trailing literals.
            assert_eq!(format(fmt, t, &tz), want, "{fmt}");
            assert_eq!(
                format(&format!("xxx {fmt}"), t, &tz),
                format!("xxx {want}"),
            );
            assert_eq!(
                format(&format!("{fmt} yyy"), t, &tz),
                format!("{want} yyy"),
            );
        }
    }

    #[test]
    fn escaping() {
        let t = Timestamp::UNIX_EPOCH;
        let tz = utc();
        assert_eq!(format("%%", t, &tz), "%");
        assert_eq!(format("%%a", t, &tz), "%a");
        assert_eq!(format("%%Ea", t, &tz), "%Ea");
        assert_eq!(format("%%E3S", t, &tz), "%E3S");
        assert_eq!(format("%%%Y", t, &tz), "%1970");
        assert_eq!(format("%%%E3S", t, &tz), "%00.000");
        assert_eq!(format("%%%%E3S", t, &tz), "%%E3S");
        // Unknown specifiers come through verbatim.
        assert_eq!(format("%Q", t, &tz), "%Q");
        assert_eq!(format("%E?", t, &tz), "%E?");
        assert_eq!(format("%", t, &tz), "%");
    }

    #[test]
    fn extended_seconds() {
        let tz = utc();
        let t = Timestamp::new(
            3 * 3600 + 4 * 60 + 5,
            6_000_000 + 7_000 + 8,
        );
        assert_eq!(format("%s", t, &tz), "11045");
        let cases: &[(&str, &str)] = &[
            ("%H:%M:%E0S", "03:04:05"),
            ("%H:%M:%E1S", "03:04:05.0"),
            ("%H:%M:%E2S", "03:04:05.00"),
            ("%H:%M:%E3S", "03:04:05.006"),
            ("%H:%M:%E4S", "03:04:05.0060"),
            ("%H:%M:%E5S", "03:04:05.00600"),
            ("%H:%M:%E6S", "03:04:05.006007"),
            ("%H:%M:%E7S", "03:04:05.0060070"),
            ("%H:%M:%E8S", "03:04:05.00600700"),
            ("%H:%M:%E9S", "03:04:05.006007008"),
            ("%H:%M:%E10S", "03:04:05.0060070080"),
            ("%H:%M:%E11S", "03:04:05.00600700800"),
            ("%H:%M:%E12S", "03:04:05.006007008000"),
            ("%H:%M:%E13S", "03:04:05.0060070080000"),
            ("%H:%M:%E14S", "03:04:05.00600700800000"),
            ("%H:%M:%E15S", "03:04:05.006007008000000"),
            ("%H:%M:%E*S", "03:04:05.006007008"),
        ];
        for &(fmt, want) in cases {
            assert_eq!(format(fmt, t, &tz), want, "{fmt}");
        }

        // Times before the Unix epoch.
        let t = Timestamp::from_microsecond(-1);
        assert_eq!(
            format("%Y-%m-%d %H:%M:%E*S", t, &tz),
            "1969-12-31 23:59:59.999999",
        );

        // A precision-loss regression case from the original library.
        let t = Timestamp::from_microsecond(1_395_024_427_333_304);
        assert_eq!(
            format("%Y-%m-%d %H:%M:%E*S", t, &tz),
            "2014-03-17 02:47:07.333304",
        );
        let t = Timestamp::from_microsecond(1_395_024_427_333_305);
        assert_eq!(
            format("%Y-%m-%d %H:%M:%E*S", t, &tz),
            "2014-03-17 02:47:07.333305",
        );
    }

    #[test]
    fn extended_offset() {
        let t = Timestamp::UNIX_EPOCH;
        assert_eq!(format("%Ez", t, &utc()), "+00:00");
        assert_eq!(format("%E*z", t, &utc()), "+00:00");

        let tz = TimeZone::fixed(-5 * 3600);
        assert_eq!(format("%Ez", t, &tz), "-05:00");
        let tz = TimeZone::fixed(10 * 3600);
        assert_eq!(format("%Ez", t, &tz), "+10:00");
        // Sub-minute offsets truncate toward zero minutes.
        let tz = TimeZone::fixed(-2670);
        assert_eq!(format("%z", t, &tz), "-0044");
        assert_eq!(format("%Ez", t, &tz), "-00:44");
        // Quarter-hour offsets.
        let tz = TimeZone::fixed(5 * 3600 + 45 * 60);
        assert_eq!(format("%Ez", t, &tz), "+05:45");
        assert_eq!(format("%Z", t, &tz), "UTC+0545");
    }

    #[test]
    fn extended_years() {
        let tz = utc();
        let e4y = "%E4Y%m%d";
        let cases: &[(i64, &str)] = &[
            (-999, "-9991127"),
            (-99, "-0991127"),
            (-9, "-0091127"),
            (-1, "-0011127"),
            (0, "00001127"),
            (1, "00011127"),
            (9, "00091127"),
            (99, "00991127"),
            (999, "09991127"),
            (9999, "99991127"),
            // Outside [-999, 9999] the result widens.
            (-1000, "-10001127"),
            (10000, "100001127"),
        ];
        for &(year, want) in cases {
            let cs = CivilSecond::new(year, 11, 27, 0, 0, 0);
            let t = Timestamp::from(cs);
            assert_eq!(format(e4y, t, &tz), want, "year {year}");
        }
    }

    #[test]
    fn rfc3339_increasing_precision() {
        let tz = utc();
        let full = "%Y-%m-%dT%H:%M:%E*S%Ez";
        let base = TimeZone::UTC.convert(CivilSecond::new(1977, 6, 28, 9, 8, 7));
        let cases: &[(i64, &str)] = &[
            (0, "1977-06-28T09:08:07+00:00"),
            (100_000_000, "1977-06-28T09:08:07.1+00:00"),
            (120_000_000, "1977-06-28T09:08:07.12+00:00"),
            (123_000_000, "1977-06-28T09:08:07.123+00:00"),
            (123_400_000, "1977-06-28T09:08:07.1234+00:00"),
            (123_456_789, "1977-06-28T09:08:07.123456789+00:00"),
        ];
        for &(nanos, want) in cases {
            let t = Timestamp::new(base, nanos);
            assert_eq!(format(full, t, &tz), want);
        }
    }

    #[test]
    fn week_numbers() {
        let tz = utc();
        // 2015-08-13 was a Thursday in ISO week 33.
        let t = Timestamp::from(CivilSecond::new(2015, 8, 13, 0, 0, 0));
        assert_eq!(format("%U", t, &tz), "32");
        assert_eq!(format("%W", t, &tz), "32");
        assert_eq!(format("%V", t, &tz), "33");
        // 2016-01-01 was a Friday belonging to ISO week 53 of 2015.
        let t = Timestamp::from(CivilSecond::new(2016, 1, 1, 0, 0, 0));
        assert_eq!(format("%V", t, &tz), "53");
        assert_eq!(format("%G", t, &tz), "2015");
        assert_eq!(format("%g", t, &tz), "15");
    }
}
