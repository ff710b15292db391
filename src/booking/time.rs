//! Conversion between `HH:MM` wire times and 12-hour display labels
//!
//! The remote authority speaks 24-hour `HH:MM`; guests see `h:mm a.m.` /
//! `h:mm p.m.`. Inputs are assumed well formed, so none of these functions
//! fail: an unparsable component reads as zero.

use regex::Regex;
use std::sync::OnceLock;

const MINUTES_PER_DAY: i64 = 24 * 60;

fn split_hhmm(hhmm: &str) -> (i64, i64) {
    let mut parts = hhmm.splitn(2, ':');
    let hour = parts
        .next()
        .and_then(|h| h.trim().parse::<i64>().ok())
        .unwrap_or(0);
    let minute = parts
        .next()
        .and_then(|m| m.trim().parse::<i64>().ok())
        .unwrap_or(0);
    (hour, minute)
}

/// Display label for a wire time, e.g. `"13:05"` becomes `"1:05 p.m."`
pub fn to_label(hhmm: &str) -> String {
    let (hour, minute) = split_hhmm(hhmm);
    let suffix = if hour >= 12 { "p.m." } else { "a.m." };
    let hour12 = (hour + 11).rem_euclid(12) + 1;
    format!("{hour12}:{minute:02} {suffix}")
}

/// Wire time for a display label produced by [`to_label`]
///
/// Returns `None` for anything that is not a `h:mm a.m.` / `h:mm p.m.` label.
pub fn from_label(label: &str) -> Option<String> {
    static LABEL_RE: OnceLock<Regex> = OnceLock::new();

    let re = LABEL_RE.get_or_init(|| {
        Regex::new(r"^\s*(\d{1,2}):(\d{2})\s*([ap])\.m\.\s*$").expect("Invalid regex pattern")
    });

    let caps = re.captures(label)?;
    let hour12: u32 = caps[1].parse().ok()?;
    let minute: u32 = caps[2].parse().ok()?;
    if !(1..=12).contains(&hour12) || minute > 59 {
        return None;
    }

    let hour = match (&caps[3], hour12) {
        ("a", 12) => 0,
        ("a", h) => h,
        (_, 12) => 12,
        (_, h) => h + 12,
    };
    Some(format!("{hour:02}:{minute:02}"))
}

/// Add (or subtract) minutes to a wire time, wrapping around midnight
pub fn add_minutes(hhmm: &str, minutes: i64) -> String {
    let (hour, minute) = split_hhmm(hhmm);
    let total = (hour * 60 + minute + minutes).rem_euclid(MINUTES_PER_DAY);
    format!("{:02}:{:02}", total / 60, total % 60)
}
