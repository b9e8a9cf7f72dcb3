//! Cue timestamp parsing and formatting.
//!
//! Values are seconds as `f64`; formatting rounds to whole milliseconds so a
//! formatted timestamp always parses back to the same millisecond.

/// Parse `HH:MM:SS,mmm` (a `.` separator is accepted too).
pub fn parse_srt_timestamp(value: &str) -> Option<f64> {
    let cleaned = value.trim().replace(',', ".");
    let (clock, fraction) = match cleaned.split_once('.') {
        Some((clock, fraction)) => (clock, fraction),
        None => (cleaned.as_str(), "0"),
    };

    let mut parts = clock.split(':');
    let hours = parts.next()?.parse::<u64>().ok()?;
    let minutes = parts.next()?.parse::<u64>().ok()?;
    let seconds = parts.next()?.parse::<u64>().ok()?;
    if parts.next().is_some() {
        return None;
    }

    Some(compose(hours, minutes, seconds, parse_millis(fraction)?))
}

/// Parse `MM:SS.mmm` or `HH:MM:SS.mmm`.
pub fn parse_vtt_timestamp(value: &str) -> Option<f64> {
    let value = value.trim();
    if value.matches(':').count() != 1 {
        return parse_srt_timestamp(value);
    }

    let (clock, fraction) = value.split_once('.').unwrap_or((value, "0"));
    let (minutes, seconds) = clock.split_once(':')?;
    Some(compose(
        0,
        minutes.parse().ok()?,
        seconds.parse().ok()?,
        parse_millis(fraction)?,
    ))
}

/// `HH:MM:SS,mmm`
pub fn format_srt_timestamp(seconds: f64) -> String {
    let (h, m, s, ms) = split(seconds);
    format!("{h:02}:{m:02}:{s:02},{ms:03}")
}

/// `HH:MM:SS.mmm`
pub fn format_vtt_timestamp(seconds: f64) -> String {
    let (h, m, s, ms) = split(seconds);
    format!("{h:02}:{m:02}:{s:02}.{ms:03}")
}

/// Short `H:MM:SS.cc` form used by ASS dialogue lines.
pub fn format_ass_timestamp(seconds: f64) -> String {
    let centis = (seconds.max(0.0) * 100.0).round() as u64;
    let (h, rest) = (centis / 360_000, centis % 360_000);
    let (m, rest) = (rest / 6_000, rest % 6_000);
    format!("{h}:{m:02}:{:02}.{:02}", rest / 100, rest % 100)
}

fn compose(hours: u64, minutes: u64, seconds: u64, millis: u64) -> f64 {
    (hours * 3600 + minutes * 60 + seconds) as f64 + millis as f64 / 1000.0
}

fn parse_millis(fraction: &str) -> Option<u64> {
    if fraction.is_empty() || !fraction.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let mut digits: String = fraction.chars().take(3).collect();
    while digits.len() < 3 {
        digits.push('0');
    }
    digits.parse().ok()
}

fn split(seconds: f64) -> (u64, u64, u64, u64) {
    let total_ms = (seconds.max(0.0) * 1000.0).round() as u64;
    let ms = total_ms % 1000;
    let total_secs = total_ms / 1000;
    (total_secs / 3600, (total_secs % 3600) / 60, total_secs % 60, ms)
}
