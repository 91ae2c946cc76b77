//! Human readable byte counts and durations.

use std::time::Duration;

/// Formats a byte count (or a byte rate, append `/s`) in binary units.
///
/// ```
/// assert_eq!(progline::human_bytes(1536.0), "1.5 Kb");
/// ```
pub fn human_bytes(n: f64) -> String {
    if n < 1024.0 {
        return format!("{n:.0} b");
    }
    let n = n / 1024.0;
    if n < 1024.0 {
        // Copies tend to move whole Kb, don't add a useless `.0`.
        if n.floor() == n {
            return format!("{n:.0} Kb");
        }
        return format!("{n:.1} Kb");
    }
    let n = n / 1024.0;
    if n < 1024.0 {
        return format!("{n:.3} Mb");
    }
    format!("{:.3} Gb", n / 1024.0)
}

/// Rounds `d` to a precision that depends on its magnitude: milliseconds up
/// to a second, tenths of a second below an hour, minutes after.
pub fn human_duration(d: Duration) -> String {
    let unit = if d <= Duration::from_secs(1) {
        Duration::from_millis(1)
    } else if d < Duration::from_secs(3600) {
        Duration::from_millis(100)
    } else {
        Duration::from_secs(60)
    };
    format_duration(round(d, unit))
}

/// Rounds half away from zero to a multiple of `unit`.
pub(crate) fn round(d: Duration, unit: Duration) -> Duration {
    let unit_ns = unit.as_nanos();
    let ns = d.as_nanos();
    let rounded = (ns + unit_ns / 2) / unit_ns * unit_ns;
    let secs = rounded / 1_000_000_000;
    let nanos = rounded % 1_000_000_000;
    Duration::new(
        u64::try_from(secs).unwrap_or(u64::MAX),
        u32::try_from(nanos).unwrap_or(0),
    )
}

/// `1h2m3.5s`, `2m0s`, `1.25s`, `150ms`, `0s`.
pub(crate) fn format_duration(d: Duration) -> String {
    if d.is_zero() {
        return "0s".to_string();
    }
    let total_secs = d.as_secs();
    let nanos = d.subsec_nanos();
    if total_secs == 0 {
        return sub_second(nanos);
    }
    let hours = total_secs / 3600;
    let minutes = total_secs % 3600 / 60;
    let secs = total_secs % 60;
    let mut out = String::new();
    if hours > 0 {
        out.push_str(&format!("{hours}h{minutes}m"));
    } else if minutes > 0 {
        out.push_str(&format!("{minutes}m"));
    }
    out.push_str(&secs.to_string());
    out.push_str(&fraction(nanos, 9));
    out.push('s');
    out
}

fn sub_second(nanos: u32) -> String {
    if nanos >= 1_000_000 {
        format!("{}{}ms", nanos / 1_000_000, fraction(nanos % 1_000_000, 6))
    } else if nanos >= 1_000 {
        format!("{}{}µs", nanos / 1_000, fraction(nanos % 1_000, 3))
    } else {
        format!("{nanos}ns")
    }
}

/// `.25` for 250_000_000 with 9 digits; empty when zero.
fn fraction(value: u32, digits: usize) -> String {
    if value == 0 {
        return String::new();
    }
    let digits = format!("{value:0digits$}");
    format!(".{}", digits.trim_end_matches('0'))
}
