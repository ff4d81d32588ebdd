use crate::{
    civil::CivilSecond,
    error::{err, Error, ErrorContext},
    fmt::{MONTH_ABBREV, MONTH_FULL, WEEKDAY_ABBREV, WEEKDAY_FULL},
    timestamp::Timestamp,
    tz::TimeZone,
    util::{escape, parse as num},
};

pub(super) fn parse(
    fmt: &str,
    input: &str,
    tz: &TimeZone,
) -> Result<Timestamp, Error> {
    let mut tm = Tm::default();
    {
        let mut p =
            Parser { fmt: fmt.as_bytes(), inp: input.as_bytes(), tm: &mut tm };
        p.run()?;
        // Trailing whitespace is allowed; anything else is an error.
        if !p.inp.iter().all(|b| b.is_ascii_whitespace()) {
            return Err(err!(
                "unparsed trailing input {:?}",
                escape::Bytes(p.inp),
            ));
        }
    }
    tm.to_timestamp(tz)
}

/// The accumulated fields of a partially parsed time. Every field is
/// optional; absent fields default to the Unix epoch's values when the
/// time is resolved.
#[derive(Debug, Default)]
struct Tm {
    year: Option<i64>,
    /// Two-digit year from `%y`, pivoting at 69.
    year2: Option<i64>,
    /// Century from `%C`; composed with `%y` when both are present.
    century: Option<i64>,
    month: Option<i64>,
    day: Option<i64>,
    hour: Option<i64>,
    hour12: Option<i64>,
    pm: Option<bool>,
    minute: Option<i64>,
    second: Option<i64>,
    subsec_nanos: Option<i64>,
    offset: Option<i64>,
    /// A `%s` value, which bypasses civil resolution entirely.
    unix: Option<i64>,
}

impl Tm {
    fn to_timestamp(&self, tz: &TimeZone) -> Result<Timestamp, Error> {
        if let Some(unix) = self.unix {
            return Ok(Timestamp::from_second(unix));
        }

        let year = match (self.year, self.century, self.year2) {
            (Some(y), _, _) => y,
            (None, Some(c), yy) => c * 100 + yy.unwrap_or(0),
            (None, None, Some(yy)) => {
                if yy >= 69 {
                    1900 + yy
                } else {
                    2000 + yy
                }
            }
            (None, None, None) => 1970,
        };
        let month = self.month.unwrap_or(1);
        let day = self.day.unwrap_or(1);
        let hour = match (self.hour, self.hour12) {
            (Some(hh), _) => hh,
            (None, Some(hh)) => {
                hh % 12 + if self.pm == Some(true) { 12 } else { 0 }
            }
            (None, None) => 0,
        };
        let minute = self.minute.unwrap_or(0);
        // A leap second `:60` becomes `:00` of the following minute with
        // any fraction discarded. Resolve at `:59` and push the result
        // forward one second so that gap and overlap handling still see
        // a real civil time.
        let (second, leap) = match self.second.unwrap_or(0) {
            60 => (59, true),
            ss => (ss, false),
        };

        // Unlike civil-time construction, parsing treats a field that
        // would require normalization (e.g. February 31st) as an error.
        let (cs, normalized) =
            CivilSecond::new_normalized(year, month, day, hour, minute, second);
        if normalized {
            return Err(err!(
                "out-of-range field in parsed time \
                 {year:04}-{month:02}-{day:02} \
                 {hour:02}:{minute:02}:{second:02}",
            ));
        }

        // An explicit offset wins over the zone's rules; otherwise the
        // zone resolves the civil time with the conventional tie-break
        // for skipped and repeated times.
        let second = match self.offset {
            Some(offset) => {
                crate::civil::fields::civil_seconds(cs.fields()) - offset
            }
            None => tz.convert(cs),
        };
        let second = if leap { second + 1 } else { second };
        let nanos = if leap { 0 } else { self.subsec_nanos.unwrap_or(0) };
        Ok(Timestamp::new(second, nanos))
    }
}

struct Parser<'f, 'i, 't> {
    fmt: &'f [u8],
    inp: &'i [u8],
    tm: &'t mut Tm,
}

impl<'f, 'i, 't> Parser<'f, 'i, 't> {
    fn run(&mut self) -> Result<(), Error> {
        while !self.fmt.is_empty() {
            if self.fmt[0] != b'%' {
                self.literal()?;
                continue;
            }
            self.fmt = &self.fmt[1..];
            if self.fmt.is_empty() {
                return Err(err!(
                    "invalid format string, expected directive after '%', \
                     but found end of format string",
                ));
            }
            let directive = self.fmt[0];
            self.fmt = &self.fmt[1..];
            match directive {
                b'%' => self.expect_literal(b'%')?,
                b'a' | b'A' => self.weekday_name().context("%a failed")?,
                b'b' | b'B' | b'h' => {
                    self.month_name().context("%b failed")?
                }
                b'c' => self.recurse(b"%a %b %e %H:%M:%S %Y")?,
                b'C' => self.century().context("%C failed")?,
                b'd' | b'e' => self.day().context("%d failed")?,
                b'D' | b'x' => self.recurse(b"%m/%d/%y")?,
                b'F' => self.recurse(b"%Y-%m-%d")?,
                b'H' => self.hour().context("%H failed")?,
                b'I' | b'l' => self.hour12().context("%I failed")?,
                b'j' => {
                    // Parsed but ignored.
                    self.number("day of year", 3, 1, 366)?;
                }
                b'm' => self.month().context("%m failed")?,
                b'M' => self.minute().context("%M failed")?,
                b'n' | b't' => self.skip_whitespace(),
                b'p' | b'P' => self.ampm().context("%p failed")?,
                b'r' => self.recurse(b"%I:%M:%S %p")?,
                b'R' => self.recurse(b"%H:%M")?,
                b's' => self.unix_seconds().context("%s failed")?,
                b'S' => self.second().context("%S failed")?,
                b'T' | b'X' => self.recurse(b"%H:%M:%S")?,
                b'u' => {
                    self.number("weekday", 1, 1, 7)?;
                }
                b'U' | b'W' => {
                    self.number("week of year", 2, 0, 53)?;
                }
                b'w' => {
                    self.number("weekday", 1, 0, 6)?;
                }
                b'y' => self.year2().context("%y failed")?,
                b'Y' => self.year().context("%Y failed")?,
                b'z' => self.offset_basic().context("%z failed")?,
                b'Z' => {
                    return Err(err!(
                        "cannot parse time zone abbreviations",
                    ));
                }
                b'E' => self.ext_e()?,
                b'O' => self.ext_o()?,
                unk => {
                    return Err(err!(
                        "unrecognized directive %{unk}",
                        unk = escape::Byte(unk),
                    ));
                }
            }
        }
        Ok(())
    }

    /// `%E` extensions.
    fn ext_e(&mut self) -> Result<(), Error> {
        let Some(&b) = self.fmt.first() else {
            return Err(err!("expected directive after %E"));
        };
        match b {
            b'z' => {
                self.fmt = &self.fmt[1..];
                self.offset_extended().context("%Ez failed")
            }
            b'*' => {
                if self.fmt.get(1) != Some(&b'S') {
                    return Err(err!("expected %E*S"));
                }
                self.fmt = &self.fmt[2..];
                self.seconds_with_fraction().context("%E*S failed")
            }
            b'0'..=b'9' => {
                let mut precision = 0u32;
                let mut len = 0;
                while len < 2
                    && len < self.fmt.len()
                    && self.fmt[len].is_ascii_digit()
                {
                    precision = precision * 10 + u32::from(self.fmt[len] - b'0');
                    len += 1;
                }
                match self.fmt.get(len).copied() {
                    Some(b'S') if precision <= 15 => {
                        self.fmt = &self.fmt[len + 1..];
                        self.seconds_with_fraction().context("%E#S failed")
                    }
                    Some(b'Y') if precision == 4 => {
                        self.fmt = &self.fmt[len + 1..];
                        self.year_e4().context("%E4Y failed")
                    }
                    _ => Err(err!("unrecognized directive after %E")),
                }
            }
            b'c' => {
                self.fmt = &self.fmt[1..];
                self.recurse(b"%a %b %e %H:%M:%S %Y")
            }
            b'C' => {
                self.fmt = &self.fmt[1..];
                self.century().context("%EC failed")
            }
            b'x' => {
                self.fmt = &self.fmt[1..];
                self.recurse(b"%m/%d/%y")
            }
            b'X' => {
                self.fmt = &self.fmt[1..];
                self.recurse(b"%H:%M:%S")
            }
            b'y' => {
                self.fmt = &self.fmt[1..];
                self.year2().context("%Ey failed")
            }
            b'Y' => {
                self.fmt = &self.fmt[1..];
                self.year().context("%EY failed")
            }
            unk => Err(err!(
                "unrecognized directive %E{unk}",
                unk = escape::Byte(unk),
            )),
        }
    }

    /// `%O` modified specifiers, equivalent to their unmodified forms.
    fn ext_o(&mut self) -> Result<(), Error> {
        let Some(&b) = self.fmt.first() else {
            return Err(err!("expected directive after %O"));
        };
        self.fmt = &self.fmt[1..];
        match b {
            b'd' | b'e' => self.day().context("%Od failed"),
            b'H' => self.hour().context("%OH failed"),
            b'I' => self.hour12().context("%OI failed"),
            b'm' => self.month().context("%Om failed"),
            b'M' => self.minute().context("%OM failed"),
            b'S' => self.second().context("%OS failed"),
            b'u' => self.number("weekday", 1, 1, 7).map(|_| ()),
            b'U' | b'V' | b'W' => {
                self.number("week of year", 2, 0, 53).map(|_| ())
            }
            b'w' => self.number("weekday", 1, 0, 6).map(|_| ()),
            b'y' => self.year2().context("%Oy failed"),
            unk => Err(err!(
                "unrecognized directive %O{unk}",
                unk = escape::Byte(unk),
            )),
        }
    }

    /// Matches one literal byte from the format. Whitespace in the
    /// format matches any run of whitespace in the input, including an
    /// empty one.
    fn literal(&mut self) -> Result<(), Error> {
        let want = self.fmt[0];
        self.fmt = &self.fmt[1..];
        if want.is_ascii_whitespace() {
            self.skip_whitespace();
            return Ok(());
        }
        match self.inp.first() {
            Some(&got) if got == want => {
                self.inp = &self.inp[1..];
                Ok(())
            }
            Some(&got) => Err(err!(
                "expected literal {want:?} from format string, but found \
                 {got:?} in input",
                want = escape::Byte(want),
                got = escape::Byte(got),
            )),
            None => Err(err!(
                "expected literal {want:?} from format string, but found \
                 end of input",
                want = escape::Byte(want),
            )),
        }
    }

    fn expect_literal(&mut self, want: u8) -> Result<(), Error> {
        match self.inp.first() {
            Some(&got) if got == want => {
                self.inp = &self.inp[1..];
                Ok(())
            }
            _ => Err(err!(
                "expected literal {want:?} in input",
                want = escape::Byte(want),
            )),
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(b) = self.inp.first() {
            if !b.is_ascii_whitespace() {
                break;
            }
            self.inp = &self.inp[1..];
        }
    }

    fn recurse(&mut self, fmt: &'static [u8]) -> Result<(), Error> {
        let mut p = Parser { fmt, inp: self.inp, tm: &mut *self.tm };
        p.run()?;
        self.inp = p.inp;
        Ok(())
    }

    /// Parses an unsigned number of at most `width` digits and
    /// range-checks it. Capping the width is what lets adjacent numeric
    /// fields like `%H%M` split an undelimited input. Note that a sign
    /// is never accepted here, so `-0` is impossible by construction.
    fn number(
        &mut self,
        what: &'static str,
        width: usize,
        min: i64,
        max: i64,
    ) -> Result<i64, Error> {
        let (value, rest) = num::uint_up_to(self.inp, width)
            .with_context(|| err!("failed to parse {what}"))?;
        if value < min || max < value {
            return Err(Error::range(what, value, min, max));
        }
        self.inp = rest;
        Ok(value)
    }

    fn year(&mut self) -> Result<(), Error> {
        let (value, rest) =
            num::int(self.inp).context("failed to parse year")?;
        self.inp = rest;
        self.tm.year = Some(value);
        Ok(())
    }

    /// `%E4Y` consumes exactly four characters, sign included.
    fn year_e4(&mut self) -> Result<(), Error> {
        let (bytes, rest) = num::split(self.inp, 4)
            .ok_or_else(|| err!("expected exactly 4 characters for year"))?;
        let (sign, digits): (i64, &[u8]) = match bytes[0] {
            b'-' => (-1, &bytes[1..]),
            b'+' => (1, &bytes[1..]),
            _ => (1, bytes),
        };
        if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
            return Err(err!(
                "invalid fixed-width year {:?}",
                escape::Bytes(bytes),
            ));
        }
        let mut value: i64 = 0;
        for &d in digits {
            value = value * 10 + i64::from(d - b'0');
        }
        if sign < 0 && value == 0 {
            return Err(err!("negative zero year is not valid"));
        }
        self.inp = rest;
        self.tm.year = Some(sign * value);
        Ok(())
    }

    fn year2(&mut self) -> Result<(), Error> {
        let value = self.number("two-digit year", 2, 0, 99)?;
        self.tm.year2 = Some(value);
        Ok(())
    }

    fn century(&mut self) -> Result<(), Error> {
        let (value, rest) =
            num::int(self.inp).context("failed to parse century")?;
        self.inp = rest;
        self.tm.century = Some(value);
        Ok(())
    }

    fn month(&mut self) -> Result<(), Error> {
        let value = self.number("month", 2, 1, 12)?;
        self.tm.month = Some(value);
        Ok(())
    }

    fn month_name(&mut self) -> Result<(), Error> {
        for (i, name) in MONTH_FULL.iter().enumerate() {
            if starts_with_ignore_case(self.inp, name) {
                self.inp = &self.inp[name.len()..];
                self.tm.month = Some(i as i64 + 1);
                return Ok(());
            }
        }
        for (i, name) in MONTH_ABBREV.iter().enumerate() {
            if starts_with_ignore_case(self.inp, name) {
                self.inp = &self.inp[name.len()..];
                self.tm.month = Some(i as i64 + 1);
                return Ok(());
            }
        }
        Err(err!(
            "failed to parse month name from {:?}",
            escape::Bytes(&self.inp[..self.inp.len().min(10)]),
        ))
    }

    /// Weekday names are validated but do not affect the result.
    fn weekday_name(&mut self) -> Result<(), Error> {
        for name in WEEKDAY_FULL.iter().chain(WEEKDAY_ABBREV.iter()) {
            if starts_with_ignore_case(self.inp, name) {
                self.inp = &self.inp[name.len()..];
                return Ok(());
            }
        }
        Err(err!(
            "failed to parse weekday name from {:?}",
            escape::Bytes(&self.inp[..self.inp.len().min(10)]),
        ))
    }

    fn day(&mut self) -> Result<(), Error> {
        let value = self.number("day", 2, 1, 31)?;
        self.tm.day = Some(value);
        Ok(())
    }

    fn hour(&mut self) -> Result<(), Error> {
        let value = self.number("hour", 2, 0, 23)?;
        self.tm.hour = Some(value);
        Ok(())
    }

    fn hour12(&mut self) -> Result<(), Error> {
        let value = self.number("hour", 2, 1, 12)?;
        self.tm.hour12 = Some(value);
        Ok(())
    }

    fn ampm(&mut self) -> Result<(), Error> {
        for (text, pm) in [("AM", false), ("PM", true)] {
            if starts_with_ignore_case(self.inp, text) {
                self.inp = &self.inp[text.len()..];
                self.tm.pm = Some(pm);
                return Ok(());
            }
        }
        Err(err!(
            "failed to parse AM/PM from {:?}",
            escape::Bytes(&self.inp[..self.inp.len().min(4)]),
        ))
    }

    fn minute(&mut self) -> Result<(), Error> {
        let value = self.number("minute", 2, 0, 59)?;
        self.tm.minute = Some(value);
        Ok(())
    }

    /// `%S` admits the leap-second value 60, normalized at resolution.
    fn second(&mut self) -> Result<(), Error> {
        let value = self.number("seconds", 2, 0, 60)?;
        self.tm.second = Some(value);
        Ok(())
    }

    /// `%E*S` and `%E#S`: seconds with an optional fraction of any
    /// length, of which the first nine digits are kept as nanoseconds.
    fn seconds_with_fraction(&mut self) -> Result<(), Error> {
        self.second()?;
        if self.inp.first() == Some(&b'.')
            && self.inp.get(1).is_some_and(u8::is_ascii_digit)
        {
            self.inp = &self.inp[1..];
            let mut nanos: i64 = 0;
            let mut digits = 0;
            while let Some(&b) = self.inp.first() {
                if !b.is_ascii_digit() {
                    break;
                }
                if digits < 9 {
                    nanos = nanos * 10 + i64::from(b - b'0');
                }
                digits += 1;
                self.inp = &self.inp[1..];
            }
            for _ in digits..9 {
                nanos *= 10;
            }
            self.tm.subsec_nanos = Some(nanos);
        }
        Ok(())
    }

    fn unix_seconds(&mut self) -> Result<(), Error> {
        let (value, rest) =
            num::int(self.inp).context("failed to parse seconds")?;
        self.inp = rest;
        self.tm.unix = Some(value);
        Ok(())
    }

    /// `%z`: `±HHMM` or `±HH`, sign required.
    fn offset_basic(&mut self) -> Result<(), Error> {
        let sign = self.offset_sign()?;
        let digits = self
            .inp
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count();
        let (hh, mm) = if digits >= 4 {
            let (hh, _) = num::uint(&self.inp[..2])?;
            let (mm, _) = num::uint(&self.inp[2..4])?;
            self.inp = &self.inp[4..];
            (hh, mm)
        } else if digits >= 2 {
            let (hh, _) = num::uint(&self.inp[..2])?;
            self.inp = &self.inp[2..];
            (hh, 0)
        } else {
            return Err(err!("expected HHMM or HH after offset sign"));
        };
        self.set_offset(sign, hh, mm)
    }

    /// `%Ez`: `±HH:MM`, `±HHMM`, `±HH`, or the literal `Z` meaning UTC.
    fn offset_extended(&mut self) -> Result<(), Error> {
        if matches!(self.inp.first(), Some(&(b'Z' | b'z'))) {
            self.inp = &self.inp[1..];
            self.tm.offset = Some(0);
            return Ok(());
        }
        let sign = self.offset_sign()?;
        let digits = self
            .inp
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count();
        if digits == 2 && self.inp.get(2) == Some(&b':') {
            let (hh, _) = num::uint(&self.inp[..2])?;
            let mm_bytes = self.inp.get(3..5).unwrap_or(b"");
            if mm_bytes.len() != 2 || !mm_bytes.iter().all(u8::is_ascii_digit)
            {
                return Err(err!("expected MM after ':' in offset"));
            }
            let (mm, _) = num::uint(mm_bytes)?;
            self.inp = &self.inp[5..];
            return self.set_offset(sign, hh, mm);
        }
        if digits >= 4 {
            let (hh, _) = num::uint(&self.inp[..2])?;
            let (mm, _) = num::uint(&self.inp[2..4])?;
            self.inp = &self.inp[4..];
            return self.set_offset(sign, hh, mm);
        }
        if digits >= 2 {
            let (hh, _) = num::uint(&self.inp[..2])?;
            self.inp = &self.inp[2..];
            return self.set_offset(sign, hh, 0);
        }
        Err(err!("expected HH:MM, HHMM, or HH after offset sign"))
    }

    fn offset_sign(&mut self) -> Result<i64, Error> {
        let sign = match self.inp.first() {
            Some(&b'+') => 1,
            Some(&b'-') => -1,
            _ => {
                return Err(err!("sign is required for time zone offset"));
            }
        };
        self.inp = &self.inp[1..];
        Ok(sign)
    }

    fn set_offset(&mut self, sign: i64, hh: i64, mm: i64) -> Result<(), Error> {
        if hh > 24 {
            return Err(Error::range("offset hours", hh, 0, 24));
        }
        if mm > 59 {
            return Err(Error::range("offset minutes", mm, 0, 59));
        }
        self.tm.offset = Some(sign * (hh * 3_600 + mm * 60));
        Ok(())
    }
}

fn starts_with_ignore_case(input: &[u8], prefix: &str) -> bool {
    let prefix = prefix.as_bytes();
    input.len() >= prefix.len()
        && input
            .iter()
            .zip(prefix)
            .all(|(a, b)| a.eq_ignore_ascii_case(b))
}
