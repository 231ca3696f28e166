use chrono::NaiveDateTime;

/// Timestamp layout used by the inverter export, e.g. `Mon, 02 Sep 2024 14:05:30`.
pub const EXPORT_TIMESTAMP_FORMAT: &str = "%a, %d %b %Y %H:%M:%S";

// ── Parsing ───────────────────────────────────────────────────────────────────

/// Parse an export timestamp with `format`.
///
/// The whole (trimmed) string must match. A weekday name that disagrees with
/// the date is ignored: the date decides.
pub fn parse_export_timestamp(s: &str, format: &str) -> Option<NaiveDateTime> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(trimmed, format) {
        return Some(ts);
    }
    if !format.contains("%a") {
        return None;
    }

    let at = weekday_position(trimmed)?;
    WEEKDAYS.iter().find_map(|day| {
        let mut corrected = trimmed.to_string();
        corrected.replace_range(at..at + day.len(), day);
        NaiveDateTime::parse_from_str(&corrected, format).ok()
    })
}

const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Byte offset of the first abbreviated weekday name, any case.
fn weekday_position(s: &str) -> Option<usize> {
    let lower = s.to_ascii_lowercase();
    WEEKDAYS
        .iter()
        .filter_map(|day| lower.find(&day.to_ascii_lowercase()))
        .min()
}
