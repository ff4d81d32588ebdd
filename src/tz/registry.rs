/*!
The process-wide time zone registry.

Zone names map to parsed, immutable `Zone` values that are interned on
first use and never evicted. A failed load is memoized too:
the name is mapped to the UTC zone so that subsequent lookups of a bad
name do not re-pay the file system cost, while each caller still gets an
error telling it the load did not succeed.

The registry is guarded by a single mutex. Lookups take it twice in the
worst case (once for the fast-path consult, once to insert), and the
one-time file read for a fresh name happens under the exclusive guard so
that at most one thread performs the I/O per name per process lifetime.
*/

use std::{
    collections::HashMap,
    path::PathBuf,
    sync::{Arc, Mutex, OnceLock},
};

use crate::{
    error::Error,
    tz::{fixed, tzif::Zone, TimeZone},
};

enum Entry {
    Loaded(TimeZone),
    /// The name failed to load; lookups resolve to UTC but still report
    /// failure.
    Failed,
}

fn registry() -> &'static Mutex<HashMap<String, Entry>> {
    static REGISTRY: OnceLock<Mutex<HashMap<String, Entry>>> = OnceLock::new();
    REGISTRY.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Gets or loads the zone with the given name.
pub(crate) fn get(name: &str) -> Result<TimeZone, Error> {
    // The built-in UTC zone never requires I/O or registry access.
    if name == "UTC" {
        return Ok(TimeZone::UTC);
    }

    // Fast path: the name has been seen before.
    {
        let map = registry().lock().unwrap();
        match map.get(name) {
            Some(Entry::Loaded(tz)) => return Ok(tz.clone()),
            Some(Entry::Failed) => {
                return Err(Error::time_zone_lookup(name));
            }
            None => {}
        }
    }

    // Slow path: check again under the same guard we will insert under,
    // so the first thread in does the load and everyone else waits on
    // its result.
    let mut map = registry().lock().unwrap();
    match map.get(name) {
        Some(Entry::Loaded(tz)) => return Ok(tz.clone()),
        Some(Entry::Failed) => return Err(Error::time_zone_lookup(name)),
        None => {}
    }
    match load(name) {
        Ok(zone) => {
            let tz = TimeZone::from_zone(Arc::new(zone));
            map.insert(name.to_string(), Entry::Loaded(tz.clone()));
            Ok(tz)
        }
        Err(err) => {
            warn!("failed to load time zone {name}: {err}");
            map.insert(name.to_string(), Entry::Failed);
            Err(err)
        }
    }
}

/// Returns the fixed-offset zone for the given offset, interning it
/// under its synthetic name.
pub(crate) fn fixed(offset_seconds: i32) -> TimeZone {
    let name = fixed::name_for_offset(offset_seconds);
    if name == "UTC" {
        return TimeZone::UTC;
    }
    let mut map = registry().lock().unwrap();
    if let Some(Entry::Loaded(tz)) = map.get(&name) {
        return tz.clone();
    }
    let abbr = fixed::abbr_for_offset(offset_seconds);
    let zone = Zone::fixed(name.clone(), offset_seconds, abbr);
    let tz = TimeZone::from_zone(Arc::new(zone));
    map.insert(name, Entry::Loaded(tz.clone()));
    tz
}

/// Returns the zone named by the `TZ` environment variable, falling
/// back to UTC when it cannot be loaded.
pub(crate) fn system() -> TimeZone {
    let name = match std::env::var("TZ") {
        Ok(tz) if !tz.is_empty() => {
            // A leading ':' selects an implementation-defined format; the
            // implementation-defined format here is a zone name.
            tz.strip_prefix(':').unwrap_or(&tz).to_string()
        }
        _ => String::from("localtime"),
    };
    match get(&name) {
        Ok(tz) => tz,
        Err(_err) => {
            warn!("failed to load local time zone {name}, using UTC: {_err}");
            TimeZone::UTC
        }
    }
}

/// Resolves a zone name to zoneinfo bytes and parses them. This is the
/// single seam between the registry and the host's tzdata layout.
fn load(name: &str) -> Result<Zone, Error> {
    // Synthetic fixed-offset names round trip without touching disk.
    if let Some(offset) = fixed::offset_from_name(name) {
        let abbr = fixed::abbr_for_offset(offset);
        return Ok(Zone::fixed(name.to_string(), offset, abbr));
    }
    let path = resolve_path(name);
    debug!("loading time zone {name} from {}", path.display());
    let bytes =
        std::fs::read(&path).map_err(|err| Error::fs(&path, err))?;
    Zone::parse(name, &bytes)
}

fn resolve_path(name: &str) -> PathBuf {
    if name == "localtime" {
        return match std::env::var_os("LOCALTIME") {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from("/etc/localtime"),
        };
    }
    if name.starts_with('/') {
        return PathBuf::from(name);
    }
    let tzdir = match std::env::var_os("TZDIR") {
        Some(dir) => PathBuf::from(dir),
        None => PathBuf::from("/usr/share/zoneinfo"),
    };
    tzdir.join(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utc_is_builtin() {
        let tz = get("UTC").unwrap();
        assert_eq!(tz, TimeZone::UTC);
        assert_eq!(tz.name(), "UTC");
    }

    #[test]
    fn failure_is_memoized() {
        let name = "Not/A_Zone-civtz-registry-test";
        let err1 = get(name).unwrap_err();
        // The first failure reports the underlying cause; repeats report
        // the memoized lookup failure without touching the file system.
        let err2 = get(name).unwrap_err();
        assert!(!err1.to_string().is_empty());
        assert_eq!(err2.to_string(), format!("failed to find time zone '{name}'"));
    }

    #[test]
    fn fixed_zones_are_interned() {
        let a = fixed(19_800);
        let b = fixed(19_800);
        assert_eq!(a, b);
        assert_eq!(a.name(), "Fixed/UTC+05:30:00");
        assert_eq!(fixed(0), TimeZone::UTC);
        assert_eq!(fixed(90_000), TimeZone::UTC);
    }

    #[test]
    fn concurrent_gets_observe_one_zone() {
        let handles: Vec<_> = (0..8)
            .map(|_| std::thread::spawn(|| fixed(-2_670)))
            .collect();
        let zones: Vec<TimeZone> =
            handles.into_iter().map(|h| h.join().unwrap()).collect();
        for tz in zones.iter() {
            assert_eq!(tz, &zones[0]);
        }
    }
}
