use civtz::civil::{CivilDay, CivilSecond, Weekday};
use civtz::{format, parse, CivilLookup, TimeZone, Timestamp};

/// Assembles a version-2 zoneinfo stream, as a loader would read from
/// disk.
fn tzif_bytes(
    types: &[(i32, bool, u8)],
    abbrevs: &str,
    transitions: &[(i64, u8)],
    footer: &str,
) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(b"TZif2");
    out.extend_from_slice(&[0u8; 15]);
    out.extend_from_slice(&[0u8; 24]);
    out.extend_from_slice(b"TZif2");
    out.extend_from_slice(&[0u8; 15]);
    let counts = [
        0u32,
        0,
        0,
        transitions.len() as u32,
        types.len() as u32,
        abbrevs.len() as u32,
    ];
    for count in counts {
        out.extend_from_slice(&count.to_be_bytes());
    }
    for &(unix_time, _) in transitions {
        out.extend_from_slice(&unix_time.to_be_bytes());
    }
    for &(_, type_index) in transitions {
        out.push(type_index);
    }
    for &(offset, is_dst, abbr_index) in types {
        out.extend_from_slice(&offset.to_be_bytes());
        out.push(u8::from(is_dst));
        out.push(abbr_index);
    }
    out.extend_from_slice(abbrevs.as_bytes());
    out.push(b'\n');
    out.extend_from_slice(footer.as_bytes());
    out.push(b'\n');
    out
}

/// Writes a Pacific-time zoneinfo file and loads it through the
/// registry by absolute path.
fn pacific() -> anyhow::Result<TimeZone> {
    let _ = env_logger::try_init();
    let data = tzif_bytes(
        &[(-28800, false, 0), (-25200, true, 4)],
        "PST\0PDT\0",
        &[(1300010400, 1), (1320570000, 0)],
        "PST8PDT,M3.2.0,M11.1.0",
    );
    let path = std::env::temp_dir().join("civtz-test-us-pacific");
    std::fs::write(&path, data)?;
    Ok(TimeZone::get(path.to_str().expect("utf-8 temp path"))?)
}

#[test]
fn load_and_convert() -> anyhow::Result<()> {
    let tz = pacific()?;
    let al = tz.lookup(1380855729);
    assert_eq!(al.cs, CivilSecond::new(2013, 10, 3, 20, 2, 9));
    assert_eq!(al.offset, -25200);
    assert!(al.is_dst);
    assert_eq!(al.abbr, "PDT");
    assert_eq!(tz.convert(al.cs), 1380855729);
    Ok(())
}

#[test]
fn loads_are_interned() -> anyhow::Result<()> {
    let a = pacific()?;
    let b = pacific()?;
    assert_eq!(a, b);
    Ok(())
}

#[test]
fn concurrent_loads_share_one_zone() -> anyhow::Result<()> {
    // Prime the path so every thread resolves the same name.
    let first = pacific()?;
    let handles: Vec<_> =
        (0..8).map(|_| std::thread::spawn(pacific)).collect();
    for handle in handles {
        assert_eq!(handle.join().expect("thread")?, first);
    }
    Ok(())
}

#[test]
fn skipped_and_repeated_times() -> anyhow::Result<()> {
    let tz = pacific()?;

    let lookup = tz.lookup_civil(CivilSecond::new(2011, 3, 13, 2, 15, 0));
    let CivilLookup::Skipped { pre, trans, post } = lookup else {
        panic!("expected skipped, got {lookup:?}");
    };
    assert_eq!(tz.lookup(pre).cs, CivilSecond::new(2011, 3, 13, 3, 15, 0));
    assert_eq!(tz.lookup(post).cs, CivilSecond::new(2011, 3, 13, 1, 15, 0));
    assert_eq!(tz.lookup(trans).cs, CivilSecond::new(2011, 3, 13, 3, 0, 0));

    let lookup = tz.lookup_civil(CivilSecond::new(2011, 11, 6, 1, 15, 0));
    let CivilLookup::Repeated { pre, post, .. } = lookup else {
        panic!("expected repeated, got {lookup:?}");
    };
    assert!(pre < post);
    assert_eq!(tz.lookup(pre).offset, -25200);
    assert_eq!(tz.lookup(post).offset, -28800);
    Ok(())
}

#[test]
fn raw_fields_lookup_reports_normalization() -> anyhow::Result<()> {
    let tz = pacific()?;

    // In range: same classification as lookup_civil, nothing moved.
    let info = tz.lookup_civil_fields(2011, 3, 13, 2, 15, 0);
    assert!(!info.normalized);
    assert_eq!(info.lookup, tz.lookup_civil(CivilSecond::new(2011, 3, 13, 2, 15, 0)));
    assert!(matches!(info.lookup, CivilLookup::Skipped { .. }));

    // Hour 26 of the previous day normalizes into the same gap.
    let info = tz.lookup_civil_fields(2011, 3, 12, 26, 15, 0);
    assert!(info.normalized);
    assert!(matches!(info.lookup, CivilLookup::Skipped { .. }));
    Ok(())
}

#[test]
fn parse_in_zone_and_format_back() -> anyhow::Result<()> {
    let tz = pacific()?;
    let t = parse("%Y-%m-%d %H:%M:%S", "2013-06-28 19:08:09", &tz)?;
    let al = tz.lookup(t.second());
    assert_eq!(al.cs, CivilSecond::new(2013, 6, 28, 19, 8, 9));
    assert_eq!(al.abbr, "PDT");

    // An explicit offset wins over the zone argument.
    let t = parse("%Y-%m-%d %H:%M:%S %z", "2013-06-28 19:08:09 +0800", &tz)?;
    assert_eq!(
        TimeZone::UTC.lookup(t.second()).cs,
        CivilSecond::new(2013, 6, 28, 11, 8, 9),
    );

    // A parsed skipped time resolves like `convert`.
    let t = parse("%Y-%m-%d %H:%M:%S", "2011-03-13 02:15:00", &tz)?;
    let al = tz.lookup(t.second());
    assert_eq!(al.cs, CivilSecond::new(2011, 3, 13, 3, 15, 0));
    assert_eq!(al.abbr, "PDT");
    Ok(())
}

#[test]
fn rfc3339_round_trip_with_subseconds() -> anyhow::Result<()> {
    let tz = pacific()?;
    let full = "%Y-%m-%dT%H:%M:%E*S%Ez";
    let t = Timestamp::new(tz.convert(CivilSecond::new(1977, 6, 28, 9, 8, 7)), 654_321);
    // 1977 precedes the stored transitions, so the default (standard
    // time) type applies.
    let s = format(full, t, &tz);
    assert_eq!(s, "1977-06-28T09:08:07.000654321-08:00");
    assert_eq!(parse(full, &s, &tz)?, t);
    Ok(())
}

#[test]
fn unknown_zone_falls_back_to_utc_by_hand() {
    let err = TimeZone::get("Nowhere/Nonexistent").unwrap_err();
    assert!(!err.to_string().is_empty());
    let tz = TimeZone::get("Nowhere/Nonexistent").unwrap_or(TimeZone::UTC);
    assert_eq!(tz.name(), "UTC");
}

#[test]
fn civil_helpers() {
    let d = CivilDay::new(2011, 12, 31);
    assert_eq!(d.weekday(), Weekday::Saturday);
    assert_eq!(d.yearday(), 365);
    assert!(CivilDay::new(2015, 8, 1) == civtz::civil::CivilMonth::new(2015, 8));
}
