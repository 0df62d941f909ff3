// src/ingest/timestamp.rs
//! Feed timestamps come in many dialects. We try a fixed list of layouts and
//! take the first one that parses.

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc, Weekday};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

use crate::error::{MonitorError, Result};

type LayoutParser = fn(&str) -> std::result::Result<DateTime<Utc>, String>;

/// Tried in this order; first match wins.
const LAYOUTS: [(&str, LayoutParser); 5] = [
    ("ansic", parse_ansic),
    ("rfc1123", parse_rfc1123),
    ("rfc1123z", parse_rfc1123z),
    ("rfc3339", parse_rfc3339),
    ("unixdate", parse_unix_date),
];

/// Parse a feed timestamp into UTC.
///
/// Accepted layouts, by example:
/// - `Mon Jan  2 15:04:05 2006` (no zone, read as UTC)
/// - `Mon, 02 Jan 2006 15:04:05 MST`
/// - `Mon, 02 Jan 2006 15:04:05 -0700`
/// - `2006-01-02T15:04:05Z07:00`
/// - `Mon Jan  2 15:04:05 MST 2006`
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    if raw.is_empty() {
        return Err(MonitorError::Parse {
            raw: String::new(),
            reason: "cannot parse an empty string as time".into(),
        });
    }

    let mut last_err = String::new();
    for (name, parse) in LAYOUTS {
        match parse(raw) {
            Ok(t) => return Ok(t),
            Err(e) => last_err = format!("{name}: {e}"),
        }
    }

    Err(MonitorError::Parse {
        raw: raw.to_string(),
        reason: last_err,
    })
}

// "Mon Jan _2 15:04:05 2006"
fn parse_ansic(s: &str) -> std::result::Result<DateTime<Utc>, String> {
    let t: Vec<&str> = s.split_whitespace().collect();
    let [wd, mon, day, clock, year] = t.as_slice() else {
        return Err(format!("expected 5 fields, found {}", t.len()));
    };
    weekday(wd)?;
    let naive = naive(mon, day, clock, year)?;
    Ok(Utc.from_utc_datetime(&naive))
}

// "Mon, 02 Jan 2006 15:04:05 MST"
fn parse_rfc1123(s: &str) -> std::result::Result<DateTime<Utc>, String> {
    let t: Vec<&str> = s.split_whitespace().collect();
    let [wd, day, mon, year, clock, zone] = t.as_slice() else {
        return Err(format!("expected 6 fields, found {}", t.len()));
    };
    let wd = wd.strip_suffix(',').ok_or("missing comma after weekday")?;
    weekday(wd)?;
    let offset = named_zone_offset(zone)?;
    with_offset(naive(mon, day, clock, year)?, offset)
}

// "Mon, 02 Jan 2006 15:04:05 -0700"
fn parse_rfc1123z(s: &str) -> std::result::Result<DateTime<Utc>, String> {
    let t: Vec<&str> = s.split_whitespace().collect();
    let [wd, day, mon, year, clock, zone] = t.as_slice() else {
        return Err(format!("expected 6 fields, found {}", t.len()));
    };
    let wd = wd.strip_suffix(',').ok_or("missing comma after weekday")?;
    weekday(wd)?;
    let dt = DateTime::parse_from_str(
        &format!("{day} {mon} {year} {clock} {zone}"),
        "%d %b %Y %H:%M:%S %z",
    )
    .map_err(|e| e.to_string())?;
    Ok(dt.with_timezone(&Utc))
}

fn parse_rfc3339(s: &str) -> std::result::Result<DateTime<Utc>, String> {
    let odt = OffsetDateTime::parse(s, &Rfc3339).map_err(|e| e.to_string())?;
    DateTime::from_timestamp(odt.unix_timestamp(), odt.nanosecond())
        .ok_or_else(|| "timestamp out of range".to_string())
}

// "Mon Jan _2 15:04:05 MST 2006"
fn parse_unix_date(s: &str) -> std::result::Result<DateTime<Utc>, String> {
    let t: Vec<&str> = s.split_whitespace().collect();
    let [wd, mon, day, clock, zone, year] = t.as_slice() else {
        return Err(format!("expected 6 fields, found {}", t.len()));
    };
    weekday(wd)?;
    let offset = named_zone_offset(zone)?;
    with_offset(naive(mon, day, clock, year)?, offset)
}

fn weekday(s: &str) -> std::result::Result<Weekday, String> {
    s.parse::<Weekday>()
        .map_err(|_| format!("{s:?} is not a weekday"))
}

fn naive(mon: &str, day: &str, clock: &str, year: &str) -> std::result::Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(
        &format!("{mon} {day} {year} {clock}"),
        "%b %d %Y %H:%M:%S",
    )
    .map_err(|e| e.to_string())
}

fn with_offset(naive: NaiveDateTime, secs: i32) -> std::result::Result<DateTime<Utc>, String> {
    let tz = FixedOffset::east_opt(secs).ok_or("zone offset out of range")?;
    tz.from_local_datetime(&naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| "ambiguous local time".to_string())
}

/// Offset in seconds east of UTC. Unknown alphabetic abbreviations are read as UTC.
fn named_zone_offset(zone: &str) -> std::result::Result<i32, String> {
    const HOUR: i32 = 3600;
    let offset = match zone {
        "UT" | "UTC" | "GMT" | "Z" => 0,
        "EST" => -5 * HOUR,
        "EDT" => -4 * HOUR,
        "CST" => -6 * HOUR,
        "CDT" => -5 * HOUR,
        "MST" => -7 * HOUR,
        "MDT" => -6 * HOUR,
        "PST" => -8 * HOUR,
        "PDT" => -7 * HOUR,
        z if !z.is_empty() && z.chars().all(|c| c.is_ascii_alphabetic()) => 0,
        z => return Err(format!("{z:?} is not a zone abbreviation")),
    };
    Ok(offset)
}
