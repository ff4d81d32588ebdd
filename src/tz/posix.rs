/*!
Parsing of POSIX-TZ time zone rule strings.

A zoneinfo file may end with a rule of the form
`STD offset [DST [offset] , start [/time] , end [/time]]` describing how
daylight saving recurs after the last stored transition, e.g.
`PST8PDT,M3.2.0,M11.1.0`. The zone engine materializes such a rule into
concrete transitions; this module only parses it.

Per POSIX convention the leading offsets are *west*-positive; they are
flipped to east-positive on the way in so that the rest of the crate only
ever sees one sign convention.
*/

use crate::{
    error::{err, Error},
    util::escape,
};

/// A parsed POSIX-TZ rule string.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct PosixTimeZone {
    pub(crate) std_abbr: String,
    /// East-positive UTC offset of standard time, in seconds.
    pub(crate) std_offset: i32,
    pub(crate) dst: Option<PosixDst>,
}

/// The daylight saving half of a POSIX-TZ rule, when present.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct PosixDst {
    pub(crate) abbr: String,
    /// East-positive UTC offset of daylight saving time, in seconds.
    /// Defaults to one hour ahead of standard time.
    pub(crate) offset: i32,
    pub(crate) start: PosixTransition,
    pub(crate) end: PosixTransition,
}

/// One endpoint of the recurring DST interval.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct PosixTransition {
    pub(crate) date: TransitionDate,
    /// The local time of day the transition occurs at, in seconds.
    /// Defaults to 02:00:00. May be negative or beyond 24h (the IANA
    /// extension range of -167..=167 hours is accepted).
    pub(crate) time: i32,
}

/// The date half of a transition rule.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum TransitionDate {
    /// `Jn`: the n'th day of the year in `1..=365`, never counting
    /// February 29.
    Julian(i16),
    /// `n`: the n'th day of the year in `0..=365`, counting February 29.
    Day(i16),
    /// `Mm.w.d`: the d'th weekday (0 = Sunday) of the w'th week of month
    /// m, where week 5 means "last".
    MonthWeekWeekday { month: i8, week: i8, weekday: i8 },
}

impl PosixTimeZone {
    /// Parses a POSIX-TZ rule from the given bytes. The entire input must
    /// be consumed.
    pub(crate) fn parse(bytes: &[u8]) -> Result<PosixTimeZone, Error> {
        let mut p = Parser { rest: bytes };
        // A leading ':' selects an implementation-defined format, which
        // is never valid inside a zoneinfo footer.
        if p.peek() == Some(b':') {
            return Err(err!("POSIX TZ string with leading ':' is not supported"));
        }
        let std_abbr = p.parse_abbr()?;
        let std_offset = p.parse_offset(0, 24, -1)?;
        if p.rest.is_empty() {
            return Ok(PosixTimeZone { std_abbr, std_offset, dst: None });
        }

        let abbr = p.parse_abbr()?;
        let offset = if p.peek() == Some(b',') {
            std_offset + 3_600
        } else {
            p.parse_offset(0, 24, -1)?
        };
        let start = p.parse_transition()?;
        let end = p.parse_transition()?;
        if !p.rest.is_empty() {
            return Err(err!(
                "unparsed data at end of POSIX TZ string: {:?}",
                escape::Bytes(p.rest),
            ));
        }
        let dst = Some(PosixDst { abbr, offset, start, end });
        Ok(PosixTimeZone { std_abbr, std_offset, dst })
    }
}

struct Parser<'a> {
    rest: &'a [u8],
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<u8> {
        self.rest.first().copied()
    }

    fn consume(&mut self, byte: u8) -> bool {
        if self.peek() == Some(byte) {
            self.rest = &self.rest[1..];
            true
        } else {
            false
        }
    }

    /// Parses an unsigned integer in `min..=max`, consuming as many
    /// digits as are present.
    fn parse_int(&mut self, min: i32, max: i32) -> Result<i32, Error> {
        let mut value: i32 = 0;
        let mut digits = 0;
        while let Some(b) = self.peek() {
            if !b.is_ascii_digit() {
                break;
            }
            value = value
                .checked_mul(10)
                .and_then(|v| v.checked_add(i32::from(b - b'0')))
                .ok_or_else(|| err!("number in POSIX TZ string overflows"))?;
            self.rest = &self.rest[1..];
            digits += 1;
        }
        if digits == 0 {
            return Err(err!(
                "expected number in POSIX TZ string, got {:?}",
                escape::Bytes(&self.rest[..self.rest.len().min(8)]),
            ));
        }
        if value < min || max < value {
            return Err(Error::range(
                "POSIX TZ number",
                i64::from(value),
                i64::from(min),
                i64::from(max),
            ));
        }
        Ok(value)
    }

    /// abbr = '<' [^>]* '>' | [^-+,0-9]{3,}
    fn parse_abbr(&mut self) -> Result<String, Error> {
        if self.consume(b'<') {
            let end = self
                .rest
                .iter()
                .position(|&b| b == b'>')
                .ok_or_else(|| err!("unterminated '<' in POSIX TZ string"))?;
            let abbr = core::str::from_utf8(&self.rest[..end])
                .map_err(|_| err!("invalid UTF-8 in POSIX TZ abbreviation"))?
                .to_string();
            self.rest = &self.rest[end + 1..];
            return Ok(abbr);
        }
        let len = self
            .rest
            .iter()
            .position(|&b| matches!(b, b'-' | b'+' | b',' | b'0'..=b'9'))
            .unwrap_or(self.rest.len());
        if len < 3 {
            return Err(err!(
                "POSIX TZ abbreviation must be at least 3 characters: {:?}",
                escape::Bytes(&self.rest[..self.rest.len().min(8)]),
            ));
        }
        let abbr = core::str::from_utf8(&self.rest[..len])
            .map_err(|_| err!("invalid UTF-8 in POSIX TZ abbreviation"))?
            .to_string();
        self.rest = &self.rest[len..];
        Ok(abbr)
    }

    /// offset = [+|-] hh [':' mm [':' ss]], aggregated to seconds and
    /// multiplied by `sign` (-1 for the west-positive top-level offsets).
    fn parse_offset(
        &mut self,
        min_hour: i32,
        max_hour: i32,
        mut sign: i32,
    ) -> Result<i32, Error> {
        if self.consume(b'-') {
            sign = -sign;
        } else {
            self.consume(b'+');
        }
        let hours = self.parse_int(min_hour, max_hour)?;
        let mut minutes = 0;
        let mut seconds = 0;
        if self.consume(b':') {
            minutes = self.parse_int(0, 59)?;
            if self.consume(b':') {
                seconds = self.parse_int(0, 59)?;
            }
        }
        Ok(sign * (((hours * 60) + minutes) * 60 + seconds))
    }

    /// transition = ',' ( Jn | n | Mm.w.d ) [ '/' offset ]
    fn parse_transition(&mut self) -> Result<PosixTransition, Error> {
        if !self.consume(b',') {
            return Err(err!("expected ',' before transition rule"));
        }
        let date = if self.consume(b'M') {
            let month = self.parse_int(1, 12)? as i8;
            if !self.consume(b'.') {
                return Err(err!("expected '.' after month in M rule"));
            }
            let week = self.parse_int(1, 5)? as i8;
            if !self.consume(b'.') {
                return Err(err!("expected '.' after week in M rule"));
            }
            let weekday = self.parse_int(0, 6)? as i8;
            TransitionDate::MonthWeekWeekday { month, week, weekday }
        } else if self.consume(b'J') {
            TransitionDate::Julian(self.parse_int(1, 365)? as i16)
        } else {
            TransitionDate::Day(self.parse_int(0, 365)? as i16)
        };
        // The rule time defaults to 02:00:00 local. The hour range admits
        // the IANA extension (e.g. `M10.5.0/-1` or `J365/25`).
        let time = if self.consume(b'/') {
            self.parse_offset(0, 167, 1)?
        } else {
            2 * 60 * 60
        };
        Ok(PosixTransition { date, time })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_only() {
        let tz = PosixTimeZone::parse(b"EST5").unwrap();
        assert_eq!(tz.std_abbr, "EST");
        assert_eq!(tz.std_offset, -5 * 3600);
        assert!(tz.dst.is_none());

        // East of Greenwich: a negative POSIX offset.
        let tz = PosixTimeZone::parse(b"IST-5:30").unwrap();
        assert_eq!(tz.std_abbr, "IST");
        assert_eq!(tz.std_offset, 5 * 3600 + 30 * 60);
    }

    #[test]
    fn quoted_abbreviations() {
        let tz = PosixTimeZone::parse(b"<-03>3").unwrap();
        assert_eq!(tz.std_abbr, "-03");
        assert_eq!(tz.std_offset, -3 * 3600);
    }

    #[test]
    fn full_rule() {
        let tz = PosixTimeZone::parse(b"PST8PDT,M3.2.0,M11.1.0").unwrap();
        assert_eq!(tz.std_abbr, "PST");
        assert_eq!(tz.std_offset, -8 * 3600);
        let dst = tz.dst.unwrap();
        assert_eq!(dst.abbr, "PDT");
        // Defaults to one hour ahead of standard.
        assert_eq!(dst.offset, -7 * 3600);
        assert_eq!(
            dst.start,
            PosixTransition {
                date: TransitionDate::MonthWeekWeekday {
                    month: 3,
                    week: 2,
                    weekday: 0,
                },
                time: 7200,
            },
        );
        assert_eq!(
            dst.end,
            PosixTransition {
                date: TransitionDate::MonthWeekWeekday {
                    month: 11,
                    week: 1,
                    weekday: 0,
                },
                time: 7200,
            },
        );
    }

    #[test]
    fn explicit_dst_offset_and_times() {
        let tz = PosixTimeZone::parse(
            b"NZST-12:00:00NZDT-13:00:00,M10.1.0/02:00:00,M3.3.0/02:00:00",
        )
        .unwrap();
        assert_eq!(tz.std_offset, 12 * 3600);
        let dst = tz.dst.unwrap();
        assert_eq!(dst.offset, 13 * 3600);
        assert_eq!(dst.start.time, 7200);
    }

    #[test]
    fn julian_and_zero_based_days() {
        let tz = PosixTimeZone::parse(b"EST5EDT,J60,300").unwrap();
        let dst = tz.dst.unwrap();
        assert_eq!(dst.start.date, TransitionDate::Julian(60));
        assert_eq!(dst.end.date, TransitionDate::Day(300));
    }

    #[test]
    fn extension_rule_times() {
        // Negative and >24h rule times from the IANA v3 extension.
        let tz = PosixTimeZone::parse(b"<-03>3<-02>,M3.5.0/-2,M10.5.0/-1")
            .unwrap();
        let dst = tz.dst.unwrap();
        assert_eq!(dst.start.time, -2 * 3600);
        assert_eq!(dst.end.time, -3600);

        let tz = PosixTimeZone::parse(b"EST5EDT,0/0,J365/25").unwrap();
        let dst = tz.dst.unwrap();
        assert_eq!(dst.start.time, 0);
        assert_eq!(dst.end.time, 25 * 3600);
    }

    #[test]
    fn negative_dst_savings() {
        // Ireland models winter as the DST period.
        let tz = PosixTimeZone::parse(b"IST-1GMT0,M10.5.0,M3.5.0/1").unwrap();
        assert_eq!(tz.std_offset, 3600);
        let dst = tz.dst.unwrap();
        assert_eq!(dst.abbr, "GMT");
        assert_eq!(dst.offset, 0);
    }

    #[test]
    fn rejects_malformed() {
        assert!(PosixTimeZone::parse(b"").is_err());
        assert!(PosixTimeZone::parse(b":EST5").is_err());
        assert!(PosixTimeZone::parse(b"ES5").is_err());
        assert!(PosixTimeZone::parse(b"EST").is_err());
        assert!(PosixTimeZone::parse(b"EST5EDT").is_err());
        assert!(PosixTimeZone::parse(b"EST5EDT,M3.2.0").is_err());
        assert!(PosixTimeZone::parse(b"EST5EDT,M13.2.0,M11.1.0").is_err());
        assert!(PosixTimeZone::parse(b"EST5EDT,M3.2.0,M11.1.0extra").is_err());
        assert!(PosixTimeZone::parse(b"EST25").is_err());
        assert!(PosixTimeZone::parse(b"<-03").is_err());
    }
}
