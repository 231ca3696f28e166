use chrono::NaiveDateTime;

/// Layout of time-axis tick labels, e.g. `02-09-24 14:05`.
pub const TICK_LABEL_FORMAT: &str = "%d-%m-%y %H:%M";

/// Format a time-axis tick label.
///
/// ```
/// use chrono::NaiveDate;
/// use report_core::formatting::format_tick_label;
///
/// let ts = NaiveDate::from_ymd_opt(2024, 9, 2).unwrap().and_hms_opt(14, 5, 0).unwrap();
/// assert_eq!(format_tick_label(ts), "02-09-24 14:05");
/// ```
pub fn format_tick_label(ts: NaiveDateTime) -> String {
    ts.format(TICK_LABEL_FORMAT).to_string()
}

/// Format a number with thousands separators and a fixed number of decimals.
///
/// ```
/// use report_core::formatting::format_number;
///
/// assert_eq!(format_number(1234.5, 1), "1,234.5");
/// assert_eq!(format_number(1234567.0, 0), "1,234,567");
/// assert_eq!(format_number(-9876.5, 1), "-9,876.5");
/// ```
pub fn format_number(value: f64, decimals: usize) -> String {
    let fixed = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    // Avoid rendering "-0" for tiny negatives that round to zero.
    let is_zero = fixed.chars().all(|c| c == '0' || c == '.');
    let mut out = String::with_capacity(fixed.len() + fixed.len() / 3 + 1);
    if value < 0.0 && !is_zero {
        out.push('-');
    }
    out.push_str(&group_thousands(int_part));
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// Format a y-axis value, choosing the precision from the visible span.
///
/// Energy counters span thousands of Wh and get no decimals; narrow ranges
/// (a flat series padded by ±1) keep enough digits to stay distinct.
pub fn format_axis_value(value: f64, span: f64) -> String {
    let decimals = match span.abs() {
        s if s >= 10.0 => 0,
        s if s >= 1.0 => 1,
        _ => 2,
    };
    format_number(value, decimals)
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_format_number_zero() {
        assert_eq!(format_number(0.0, 0), "0");
        assert_eq!(format_number(0.0, 2), "0.00");
    }

    #[test]
    fn test_format_number_small_values_untouched() {
        assert_eq!(format_number(123.456, 2), "123.46");
        assert_eq!(format_number(999.0, 0), "999");
    }

    #[test]
    fn test_format_number_groups_thousands() {
        assert_eq!(format_number(1_000.0, 0), "1,000");
        assert_eq!(format_number(12_345_678.0, 0), "12,345,678");
    }

    #[test]
    fn test_format_number_negative_rounding_to_zero() {
        assert_eq!(format_number(-0.004, 2), "0.00");
        assert_eq!(format_number(-1_500.0, 0), "-1,500");
    }

    #[test]
    fn test_format_axis_value_precision_follows_span() {
        assert_eq!(format_axis_value(2_000.0, 1_000.0), "2,000");
        assert_eq!(format_axis_value(90.5, 2.0), "90.5");
        assert_eq!(format_axis_value(0.126, 0.5), "0.13");
    }

    #[test]
    fn test_format_tick_label_midnight() {
        let ts = NaiveDate::from_ymd_opt(2024, 10, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(format_tick_label(ts), "01-10-24 00:00");
    }
}
