/*!
The zoneinfo zone model: decoding of the binary `tzfile(5)` format and
the forward (absolute to civil) and reverse (civil to absolute) lookups
over the resulting transition table.

A zone is an ordered vector of transitions, a parallel vector of
transition types (offset, DST flag, abbreviation), and an optional
POSIX-TZ rule describing recurrences past the last stored transition.
When the rule specifies both standard and daylight time, the table is
extended with 400 further years of synthesized transitions; the Gregorian
calendar repeats exactly every 400 years, so any instant beyond the
extension can be shifted into the stored range and compensated.

Reverse lookup is the subtle direction. Each transition precomputes the
local civil time at which it takes effect (`civil_start`, under the new
offset) and the local civil time one second before it (`civil_prev`,
under the outgoing offset). A civil time falling strictly between
`civil_prev` and `civil_start` was skipped by a forward jump; one falling
in `[civil_start, civil_prev]` (when the jump was backward) occurs twice.
Both columns are plain counts of civil seconds, so classification is
integer comparison.

Leap-second encoded ("right/") zoneinfo is rejected outright: this crate
assumes 60-second minutes.
*/

use core::sync::atomic::{AtomicUsize, Ordering};

use crate::{
    civil::fields::{self, Fields},
    civil::CivilSecond,
    error::{err, Error},
    tz::posix::{PosixTimeZone, PosixTransition, TransitionDate},
    tz::{AbsoluteLookup, CivilLookup},
    util::{escape, parse},
};

const SECS_PER_DAY: i64 = 86_400;

/// 400 Gregorian years of 146097 days.
const SECS_PER_400_YEARS: i64 = 146_097 * SECS_PER_DAY;

/// The synthetic transition time used for single-type zones, far enough
/// in the past to precede any representable query of interest (zic calls
/// this the "big bang").
const BIG_BANG: i64 = -(1 << 59);

/// A (utc offset, is-DST, abbreviation) triple applied between two
/// adjacent transitions.
#[derive(Debug)]
pub(crate) struct TransitionType {
    utc_offset: i32,
    is_dst: bool,
    abbr_index: u8,
}

/// A moment at which a zone changes type.
#[derive(Debug)]
pub(crate) struct Transition {
    unix_time: i64,
    type_index: u8,
    /// Civil seconds at `unix_time` under the new type's offset.
    civil_start: i64,
    /// Civil seconds one second before `unix_time` under the outgoing
    /// type's offset.
    civil_prev: i64,
}

/// A fully decoded time zone.
#[derive(Debug)]
pub(crate) struct Zone {
    name: String,
    transitions: Vec<Transition>,
    types: Vec<TransitionType>,
    /// The NUL-terminated abbreviation pool. Indices may land mid-string.
    abbreviations: String,
    /// The type applied to instants before the first transition.
    default_type: usize,
    /// Whether `transitions` was extended from a POSIX-TZ rule.
    extended: bool,
    /// The last civil year covered by the extension.
    last_year: i64,
    /// Single-slot probe hints for the two lookup directions. These are
    /// an optimization only; any value is safe.
    fwd_hint: AtomicUsize,
    rev_hint: AtomicUsize,
}

impl Zone {
    /// Creates a zero-transition zone with a single fixed offset.
    pub(crate) fn fixed(name: String, offset: i32, abbr: String) -> Zone {
        let mut abbreviations = abbr;
        abbreviations.push('\0');
        let offset64 = i64::from(offset);
        Zone {
            name,
            transitions: vec![Transition {
                unix_time: BIG_BANG,
                type_index: 0,
                civil_start: BIG_BANG + offset64,
                civil_prev: BIG_BANG + offset64 - 1,
            }],
            types: vec![TransitionType {
                utc_offset: offset,
                is_dst: false,
                abbr_index: 0,
            }],
            abbreviations,
            default_type: 0,
            extended: false,
            last_year: 0,
            fwd_hint: AtomicUsize::new(0),
            rev_hint: AtomicUsize::new(0),
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    /// Parses the given bytes as a `tzfile(5)` stream. The name is
    /// attached to the zone and used in diagnostics; it carries no other
    /// meaning.
    pub(crate) fn parse(name: &str, bytes: &[u8]) -> Result<Zone, Error> {
        let (header32, rest) = Header::parse(bytes)?;
        let (header, rest) = if header32.version == 0 {
            (header32, rest)
        } else {
            // The 8-byte section is authoritative for versioned data.
            // Skip the 4-byte section without decoding it.
            let skip = header32.data_len(4)?;
            let (_, rest) = parse::split(rest, skip).ok_or_else(|| {
                err!("{name}: zoneinfo 32-bit data block truncated")
            })?;
            let (header64, rest) = Header::parse(rest)?;
            if header64.version == 0 {
                return Err(err!(
                    "{name}: second zoneinfo header is unversioned",
                ));
            }
            (header64, rest)
        };
        let time_len: usize = if header.version == 0 { 4 } else { 8 };

        if header.typecnt == 0 {
            return Err(err!("{name}: zoneinfo data has no transition types"));
        }
        if header.leapcnt != 0 {
            // This code assumes 60-second minutes, so leap-second encoded
            // zoneinfo is never acceptable.
            return Err(err!(
                "{name}: leap-second encoded zoneinfo is not supported",
            ));
        }
        if header.ttisstdcnt != 0 && header.ttisstdcnt != header.typecnt {
            return Err(err!("{name}: inconsistent standard/wall count"));
        }
        if header.ttisgmtcnt != 0 && header.ttisgmtcnt != header.typecnt {
            return Err(err!("{name}: inconsistent UT/local count"));
        }

        // Transition times, ordered by zic.
        let len = header
            .timecnt
            .checked_mul(time_len)
            .ok_or_else(|| err!("{name}: transition count too large"))?;
        let (bytes, rest) = parse::split(rest, len)
            .ok_or_else(|| err!("{name}: transition times truncated"))?;
        let mut transitions: Vec<Transition> =
            Vec::with_capacity(header.timecnt);
        for chunk in bytes.chunks_exact(time_len) {
            let unix_time = if time_len == 4 {
                i64::from(be_i32(chunk))
            } else {
                be_i64(chunk)
            };
            if let Some(last) = transitions.last() {
                if last.unix_time >= unix_time {
                    return Err(err!(
                        "{name}: transition times out of order",
                    ));
                }
            }
            transitions.push(Transition {
                unix_time,
                type_index: 0,
                civil_start: 0,
                civil_prev: 0,
            });
        }

        // Per-transition type indices.
        let (bytes, rest) = parse::split(rest, header.timecnt)
            .ok_or_else(|| err!("{name}: transition types truncated"))?;
        let mut seen_type_0 = false;
        for (tr, &type_index) in transitions.iter_mut().zip(bytes) {
            if usize::from(type_index) >= header.typecnt {
                return Err(err!(
                    "{name}: transition type index {type_index} out of range",
                ));
            }
            if type_index == 0 {
                seen_type_0 = true;
            }
            tr.type_index = type_index;
        }

        // The transition types themselves.
        let len = header
            .typecnt
            .checked_mul(6)
            .ok_or_else(|| err!("{name}: type count too large"))?;
        let (bytes, rest) = parse::split(rest, len)
            .ok_or_else(|| err!("{name}: local time types truncated"))?;
        let mut types: Vec<TransitionType> =
            Vec::with_capacity(header.typecnt);
        for chunk in bytes.chunks_exact(6) {
            let utc_offset = be_i32(&chunk[..4]);
            if utc_offset <= -(SECS_PER_DAY as i32)
                || utc_offset >= SECS_PER_DAY as i32
            {
                return Err(err!(
                    "{name}: UTC offset {utc_offset} out of range",
                ));
            }
            let is_dst = chunk[4] != 0;
            let abbr_index = chunk[5];
            if usize::from(abbr_index) >= header.charcnt {
                return Err(err!(
                    "{name}: abbreviation index {abbr_index} past pool",
                ));
            }
            types.push(TransitionType { utc_offset, is_dst, abbr_index });
        }

        // The abbreviation pool. Strings are NUL terminated and may
        // overlap; every index used by a type must reach a NUL.
        let (bytes, rest) = parse::split(rest, header.charcnt)
            .ok_or_else(|| err!("{name}: abbreviation pool truncated"))?;
        let abbreviations = String::from_utf8(bytes.to_vec())
            .map_err(|_| err!("{name}: abbreviation pool is not UTF-8"))?;
        for tt in types.iter() {
            let start = usize::from(tt.abbr_index);
            if !abbreviations[start..].contains('\0') {
                return Err(err!(
                    "{name}: unterminated abbreviation at index {start}",
                ));
            }
        }

        // Skip the unused sections: the leap table is empty by the check
        // above, and the indicators only matter when interpreting a
        // POSIX spec without start/end rules (see "zic -p").
        let skip = header.ttisstdcnt + header.ttisgmtcnt;
        let (_, rest) = parse::split(rest, skip)
            .ok_or_else(|| err!("{name}: indicator section truncated"))?;

        // The NL-enclosed POSIX-TZ footer, present for versioned data.
        // Trailing bytes past the footer are ignored for forwards
        // compatibility.
        let mut future_spec: Option<Vec<u8>> = None;
        if header.version != 0 {
            if rest.first() != Some(&b'\n') {
                return Err(err!("{name}: missing newline before TZ footer"));
            }
            let rest = &rest[1..];
            let end = rest
                .iter()
                .position(|&b| b == b'\n')
                .ok_or_else(|| err!("{name}: unterminated TZ footer"))?;
            if end > 0 {
                future_spec = Some(rest[..end].to_vec());
            }
        }

        // Determine the before-first-transition type: the first non-DST
        // type when one exists, else type 0.
        let mut default_type = 0;
        if seen_type_0 && header.timecnt != 0 {
            let mut index = 0;
            if types[0].is_dst {
                index = usize::from(transitions[0].type_index);
                while index != 0 && types[index].is_dst {
                    index -= 1;
                }
            }
            while index != header.typecnt && types[index].is_dst {
                index += 1;
            }
            if index != header.typecnt {
                default_type = index;
            }
        }

        let mut zone = Zone {
            name: name.to_string(),
            transitions,
            types,
            abbreviations,
            default_type,
            extended: false,
            last_year: 0,
            fwd_hint: AtomicUsize::new(0),
            rev_hint: AtomicUsize::new(0),
        };

        // Use the POSIX-TZ string to handle times in years after the
        // last stored transition. A malformed or inconsistent string is
        // not fatal; the zone simply is not extended.
        if let Some(spec) = future_spec {
            match PosixTimeZone::parse(&spec) {
                Ok(posix) => zone.apply_future_spec(&header, &posix),
                Err(_err) => {
                    warn!(
                        "{name}: failed to parse POSIX TZ string {spec:?}: \
                         {_err}",
                        spec = escape::Bytes(&spec),
                    );
                }
            }
        }

        // Compute the local civil time for each transition and for the
        // preceding second. Reverse lookups compare against these, and
        // depend on them being ordered: an offset change may not cross
        // another one, which zic never produces.
        let mut prev_type = zone.default_type;
        let mut prev_civil_start = None;
        for tr in zone.transitions.iter_mut() {
            tr.civil_prev = tr.unix_time
                + i64::from(zone.types[prev_type].utc_offset)
                - 1;
            prev_type = usize::from(tr.type_index);
            tr.civil_start =
                tr.unix_time + i64::from(zone.types[prev_type].utc_offset);
            if let Some(prev) = prev_civil_start {
                if prev >= tr.civil_start {
                    return Err(err!(
                        "{name}: transitions out of order in civil time",
                    ));
                }
            }
            prev_civil_start = Some(tr.civil_start);
        }

        Ok(zone)
    }

    /// Extends the transition table from a parsed POSIX-TZ rule, when
    /// the rule and the stored data allow it.
    fn apply_future_spec(&mut self, header: &Header, posix: &PosixTimeZone) {
        let Some(ref dst) = posix.dst else {
            // A std-only specification should match the last (or
            // default) transition type, and then handling the future
            // falls out naturally from using that type.
            let index = if header.timecnt != 0 {
                usize::from(self.transitions[header.timecnt - 1].type_index)
            } else {
                self.default_type
            };
            self.check_transition(index, posix.std_offset, false, &posix.std_abbr);
            return;
        };
        if header.timecnt < 2 {
            warn!("{name}: too few transitions for POSIX TZ spec", name = self.name);
            return;
        }
        if self.transitions[header.timecnt - 1].unix_time < 0 {
            warn!("{name}: old transitions for POSIX TZ spec", name = self.name);
            return;
        }

        // The specification should match the last two transitions, which
        // should carry different DST flags and land in the same year.
        let t0 = usize::from(self.transitions[header.timecnt - 1].type_index);
        let t1 = usize::from(self.transitions[header.timecnt - 2].type_index);
        let tt0_is_dst = self.types[t0].is_dst;
        let (spring, autumn) = if tt0_is_dst { (t0, t1) } else { (t1, t0) };
        self.check_transition(spring, dst.offset, true, &dst.abbr);
        self.check_transition(autumn, posix.std_offset, false, &posix.std_abbr);

        let tr0_unix = self.transitions[header.timecnt - 1].unix_time;
        let tr1_unix = self.transitions[header.timecnt - 2].unix_time;
        let tt0_offset = i64::from(self.types[t0].utc_offset);
        let tt1_offset = i64::from(self.types[t1].utc_offset);
        let mut last_year =
            fields::from_unix_seconds(tr0_unix, self.types[t0].utc_offset).y;
        if fields::from_unix_seconds(tr1_unix, self.types[t1].utc_offset).y
            != last_year
        {
            warn!(
                "{name}: final transitions not in same year",
                name = self.name,
            );
        }

        // Synthesize the transitions to the second-to-last type and back
        // to the last type for each of the next 400 years. The rule
        // expresses local time in the *outgoing* offset, hence the
        // subtraction of the other type's offset from each.
        let (pt1, pt0) = if tt0_is_dst {
            (&dst.end, &dst.start)
        } else {
            (&dst.start, &dst.end)
        };
        self.transitions.reserve(400 * 2);
        let jan1_ord = fields::day_ordinal(last_year, 1, 1);
        let mut jan1_time = jan1_ord * SECS_PER_DAY;
        // 1970-01-01 was a Thursday, day 4 with Sunday as day 0.
        let mut jan1_weekday = (4 + jan1_ord).rem_euclid(7);
        let mut leap_year = fields::is_leap_year(last_year);
        for _ in 0..400 {
            last_year += 1;
            let days = if leap_year { 366 } else { 365 };
            jan1_time += days * SECS_PER_DAY;
            jan1_weekday = (jan1_weekday + days) % 7;
            leap_year = fields::is_leap_year(last_year);
            let tr1_offset = trans_offset(leap_year, jan1_weekday, pt1);
            self.transitions.push(Transition {
                unix_time: jan1_time + tr1_offset - tt0_offset,
                type_index: t1 as u8,
                civil_start: 0,
                civil_prev: 0,
            });
            let tr0_offset = trans_offset(leap_year, jan1_weekday, pt0);
            self.transitions.push(Transition {
                unix_time: jan1_time + tr0_offset - tt1_offset,
                type_index: t0 as u8,
                civil_start: 0,
                civil_prev: 0,
            });
        }
        self.extended = true;
        self.last_year = last_year;
    }

    /// Diagnoses a mismatch between a stored transition type and what
    /// the POSIX-TZ specification says it should be.
    fn check_transition(
        &self,
        type_index: usize,
        offset: i32,
        is_dst: bool,
        abbr: &str,
    ) {
        let tt = &self.types[type_index];
        if tt.utc_offset != offset
            || tt.is_dst != is_dst
            || self.abbr(tt.abbr_index) != abbr
        {
            warn!(
                "{name}: transition offset={off}/{dst}/abbr={abbr} does \
                 not match POSIX TZ spec",
                name = self.name,
                off = tt.utc_offset,
                dst = if tt.is_dst { "DST" } else { "STD" },
                abbr = self.abbr(tt.abbr_index),
            );
        }
    }

    fn abbr(&self, index: u8) -> &str {
        let rest = &self.abbreviations[usize::from(index)..];
        match rest.find('\0') {
            Some(nul) => &rest[..nul],
            None => rest,
        }
    }

    /// Forward lookup: the civil time, offset, DST flag and abbreviation
    /// in effect at the given absolute time.
    pub(crate) fn break_time(&self, unix: i64) -> AbsoluteLookup<'_> {
        let timecnt = self.transitions.len();
        if timecnt == 0 || unix < self.transitions[0].unix_time {
            return self.local_time(unix, self.default_type);
        }
        if unix >= self.transitions[timecnt - 1].unix_time {
            // After the last transition. If we extended the transitions
            // from the POSIX-TZ spec, shift back into the supported
            // range using the 400-year cycle of calendric equivalence
            // and compensate afterwards.
            if self.extended {
                let diff = unix - self.transitions[timecnt - 1].unix_time;
                let shift = diff / SECS_PER_400_YEARS + 1;
                let mut al = self.break_time(unix - shift * SECS_PER_400_YEARS);
                let f = al.cs.fields();
                al.cs = CivilSecond::from_fields(Fields {
                    y: f.y + shift * 400,
                    ..f
                });
                return al;
            }
            let index = self.transitions[timecnt - 1].type_index;
            return self.local_time(unix, usize::from(index));
        }

        let hint = self.fwd_hint.load(Ordering::Relaxed);
        if 0 < hint && hint < timecnt {
            if unix < self.transitions[hint].unix_time
                && unix >= self.transitions[hint - 1].unix_time
            {
                let index = self.transitions[hint - 1].type_index;
                return self.local_time(unix, usize::from(index));
            }
        }

        let index = self
            .transitions
            .partition_point(|tr| tr.unix_time <= unix);
        self.fwd_hint.store(index, Ordering::Relaxed);
        let index = self.transitions[index - 1].type_index;
        self.local_time(unix, usize::from(index))
    }

    fn local_time(&self, unix: i64, type_index: usize) -> AbsoluteLookup<'_> {
        let tt = &self.types[type_index];
        AbsoluteLookup {
            cs: CivilSecond::from_fields(fields::from_unix_seconds(
                unix,
                tt.utc_offset,
            )),
            offset: tt.utc_offset,
            is_dst: tt.is_dst,
            abbr: self.abbr(tt.abbr_index),
        }
    }

    /// Reverse lookup: classifies the given civil time as unique,
    /// skipped or repeated, with the corresponding candidate instants.
    pub(crate) fn make_time_info(&self, cs: CivilSecond) -> CivilLookup {
        let cs_sec = fields::civil_seconds(cs.fields());
        let timecnt = self.transitions.len();
        if timecnt == 0 {
            let offset = i64::from(self.types[self.default_type].utc_offset);
            return CivilLookup::Unique { timestamp: cs_sec - offset };
        }

        // Find the first transition whose civil start is after cs.
        let index = if cs_sec < self.transitions[0].civil_start {
            0
        } else if cs_sec >= self.transitions[timecnt - 1].civil_start {
            timecnt
        } else {
            let hint = self.rev_hint.load(Ordering::Relaxed);
            if 0 < hint
                && hint < timecnt
                && cs_sec < self.transitions[hint].civil_start
                && cs_sec >= self.transitions[hint - 1].civil_start
            {
                hint
            } else {
                let found = self
                    .transitions
                    .partition_point(|tr| tr.civil_start <= cs_sec);
                self.rev_hint.store(found, Ordering::Relaxed);
                found
            }
        };

        if index == 0 {
            let tr = &self.transitions[0];
            if cs_sec <= tr.civil_prev {
                // Before the first transition: the default type applies.
                let offset =
                    i64::from(self.types[self.default_type].utc_offset);
                return CivilLookup::Unique { timestamp: cs_sec - offset };
            }
            // tr.civil_prev < cs < tr.civil_start
            return make_skipped(tr, cs_sec);
        }

        if index == timecnt {
            let tr = &self.transitions[timecnt - 1];
            if tr.civil_prev < cs_sec {
                // After the last transition; shift and compensate as in
                // the forward direction when extended.
                if self.extended && cs.year() > self.last_year {
                    let shift = (cs.year() - self.last_year) / 400 + 1;
                    let f = cs.fields();
                    let shifted = CivilSecond::from_fields(Fields {
                        y: f.y - shift * 400,
                        ..f
                    });
                    return self
                        .make_time_info(shifted)
                        .advance(shift * SECS_PER_400_YEARS);
                }
                let timestamp = tr.unix_time + (cs_sec - tr.civil_start);
                return CivilLookup::Unique { timestamp };
            }
            // tr.civil_start <= cs <= tr.civil_prev
            return make_repeated(tr, cs_sec);
        }

        let tr = &self.transitions[index];
        if tr.civil_prev < cs_sec {
            // tr.civil_prev < cs < tr.civil_start
            return make_skipped(tr, cs_sec);
        }
        let tr = &self.transitions[index - 1];
        if cs_sec <= tr.civil_prev {
            // tr.civil_start <= cs <= tr.civil_prev
            return make_repeated(tr, cs_sec);
        }
        // In between transitions.
        let timestamp = tr.unix_time + (cs_sec - tr.civil_start);
        CivilLookup::Unique { timestamp }
    }
}

/// A skipped civil time: `pre` is the instant you would get pretending
/// the jump never happened (rendered under the new offset), `post` the
/// opposite, `trans` the boundary itself.
fn make_skipped(tr: &Transition, cs_sec: i64) -> CivilLookup {
    CivilLookup::Skipped {
        pre: tr.unix_time - 1 + (cs_sec - tr.civil_prev),
        trans: tr.unix_time,
        post: tr.unix_time - (tr.civil_start - cs_sec),
    }
}

/// A repeated civil time: `pre` is the earlier instant (old offset),
/// `post` the later one (new offset).
fn make_repeated(tr: &Transition, cs_sec: i64) -> CivilLookup {
    CivilLookup::Repeated {
        pre: tr.unix_time - 1 - (tr.civil_prev - cs_sec),
        trans: tr.unix_time,
        post: tr.unix_time + (cs_sec - tr.civil_start),
    }
}

/// The second of the year at which a POSIX transition rule fires,
/// relative to January 1st 00:00 local time of a year whose January 1st
/// falls on `jan1_weekday` (0 = Sunday).
fn trans_offset(
    leap_year: bool,
    jan1_weekday: i64,
    pt: &PosixTransition,
) -> i64 {
    // Days before the start of each 1-based month, with a sentinel so
    // that `month + 1` indexes the following month's offset.
    const MONTH_OFFSETS: [[i64; 14]; 2] = [
        [-1, 0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334, 365],
        [-1, 0, 31, 60, 91, 121, 152, 182, 213, 244, 274, 305, 335, 366],
    ];
    let days = match pt.date {
        TransitionDate::Julian(day) => {
            let day = i64::from(day);
            // Jn never counts February 29th.
            if leap_year && day >= 60 {
                day
            } else {
                day - 1
            }
        }
        TransitionDate::Day(day) => i64::from(day),
        TransitionDate::MonthWeekWeekday { month, week, weekday } => {
            let last_week = week == 5;
            let mut days = MONTH_OFFSETS[usize::from(leap_year)]
                [usize::from(month as u8) + usize::from(last_week)];
            let wd = (jan1_weekday + days) % 7;
            if last_week {
                days -= (wd + 7 - 1 - i64::from(weekday)) % 7 + 1;
            } else {
                days += (i64::from(weekday) + 7 - wd) % 7;
                days += i64::from(week - 1) * 7;
            }
            days
        }
    };
    days * SECS_PER_DAY + i64::from(pt.time)
}

/// The fixed-size counts block at the head of each data section.
#[derive(Debug)]
struct Header {
    version: u8,
    ttisgmtcnt: usize,
    ttisstdcnt: usize,
    leapcnt: usize,
    timecnt: usize,
    typecnt: usize,
    charcnt: usize,
}

impl Header {
    fn parse(bytes: &[u8]) -> Result<(Header, &[u8]), Error> {
        let (bytes, rest) = parse::split(bytes, 44)
            .ok_or_else(|| err!("zoneinfo header truncated"))?;
        if &bytes[..4] != b"TZif" {
            return Err(err!(
                "invalid zoneinfo magic {:?}",
                escape::Bytes(&bytes[..4]),
            ));
        }
        let version = match bytes[4] {
            0 => 0,
            v @ (b'2' | b'3') => v,
            v => {
                return Err(err!(
                    "unsupported zoneinfo version {:?}",
                    escape::Byte(v),
                ));
            }
        };
        let count = |at: usize| -> Result<usize, Error> {
            let v = be_i32(&bytes[at..at + 4]);
            usize::try_from(v)
                .map_err(|_| err!("negative count in zoneinfo header"))
        };
        Ok((
            Header {
                version,
                ttisgmtcnt: count(20)?,
                ttisstdcnt: count(24)?,
                leapcnt: count(28)?,
                timecnt: count(32)?,
                typecnt: count(36)?,
                charcnt: count(40)?,
            },
            rest,
        ))
    }

    /// The number of data bytes following a header with these counts,
    /// for the given transition time width.
    fn data_len(&self, time_len: usize) -> Result<usize, Error> {
        let mut len: usize = 0;
        let mut add = |v: Option<usize>| -> Result<(), Error> {
            let v = v.ok_or_else(|| err!("zoneinfo data length overflows"))?;
            len = len
                .checked_add(v)
                .ok_or_else(|| err!("zoneinfo data length overflows"))?;
            Ok(())
        };
        add(self.timecnt.checked_mul(time_len + 1))?;
        add(self.typecnt.checked_mul(6))?;
        add(Some(self.charcnt))?;
        add(self.leapcnt.checked_mul(time_len + 4))?;
        add(Some(self.ttisstdcnt))?;
        add(Some(self.ttisgmtcnt))?;
        Ok(len)
    }
}

fn be_i32(bytes: &[u8]) -> i32 {
    i32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

fn be_i64(bytes: &[u8]) -> i64 {
    i64::from_be_bytes([
        bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6],
        bytes[7],
    ])
}
