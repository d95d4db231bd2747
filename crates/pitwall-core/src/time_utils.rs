use std::sync::OnceLock;

use chrono::Duration;
use regex::Regex;

// ── Timedelta parsing ─────────────────────────────────────────────────────────

fn timedelta_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?:(-?\d+)\s+days?\s+)?(\d+):(\d{1,2}):(\d{1,2})(?:\.(\d+))?$")
            .expect("regex is valid")
    })
}

/// Parse a pandas-style timedelta string into a [`Duration`].
///
/// Accepts `"0 days 00:58:03.123000"`, `"1 day 02:00:00"` and the bare
/// clock form `"00:58:03.123"`. Fractions are truncated to nanoseconds.
/// Returns `None` for anything else, including the empty string and values
/// too large to represent.
pub fn parse_timedelta(s: &str) -> Option<Duration> {
    let caps = timedelta_regex().captures(s.trim())?;

    let days: i64 = caps
        .get(1)
        .map(|m| m.as_str().parse())
        .transpose()
        .ok()?
        .unwrap_or(0);
    let hours: i64 = caps[2].parse().ok()?;
    let minutes: i64 = caps[3].parse().ok()?;
    let seconds: i64 = caps[4].parse().ok()?;
    if minutes >= 60 || seconds >= 60 {
        return None;
    }

    let nanos: i64 = match caps.get(5) {
        Some(frac) => {
            let digits: String = frac.as_str().chars().take(9).collect();
            format!("{:0<9}", digits).parse().ok()?
        }
        None => 0,
    };

    // Out-of-range components yield `None` rather than a panic.
    Duration::try_days(days)?
        .checked_add(&Duration::try_hours(hours)?)?
        .checked_add(&Duration::try_minutes(minutes)?)?
        .checked_add(&Duration::try_seconds(seconds)?)?
        .checked_add(&Duration::nanoseconds(nanos))
}

/// Format a session-time duration as `H:MM:SS.mmm`.
pub fn format_session_time(d: Duration) -> String {
    let negative = d < Duration::zero();
    let total_ms = d.num_milliseconds().abs();
    let hours = total_ms / 3_600_000;
    let minutes = (total_ms / 60_000) % 60;
    let seconds = (total_ms / 1_000) % 60;
    let millis = total_ms % 1_000;
    format!(
        "{}{}:{:02}:{:02}.{:03}",
        if negative { "-" } else { "" },
        hours,
        minutes,
        seconds,
        millis
    )
}

// ── Tests ──────────────────────────────────────────────────────────────────────
