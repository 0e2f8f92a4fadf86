use std::time::Duration;

/// Format a countdown as `"2m 05s"`, or `"45s"` under a minute.
///
/// Sub-second remainders round up so a countdown only shows `"0s"` once it
/// has actually elapsed.
///
/// # Examples
///
/// ```
/// use guard_core::formatting::format_remaining;
/// use std::time::Duration;
///
/// assert_eq!(format_remaining(Duration::from_secs(180)), "3m 00s");
/// assert_eq!(format_remaining(Duration::from_millis(44_200)), "45s");
/// assert_eq!(format_remaining(Duration::ZERO), "0s");
/// ```
pub fn format_remaining(remaining: Duration) -> String {
    let mut secs = remaining.as_secs();
    if remaining.subsec_nanos() > 0 {
        secs += 1;
    }

    let minutes = secs / 60;
    let seconds = secs % 60;
    if minutes == 0 {
        format!("{seconds}s")
    } else {
        format!("{minutes}m {seconds:02}s")
    }
}

/// Fraction of `total` still remaining, clamped to `[0.0, 1.0]`.
pub fn remaining_ratio(remaining: Duration, total: Duration) -> f64 {
    if total.is_zero() {
        return 0.0;
    }
    (remaining.as_secs_f64() / total.as_secs_f64()).clamp(0.0, 1.0)
}
