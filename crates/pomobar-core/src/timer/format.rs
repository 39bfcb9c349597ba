//! `MM:SS` rendering for hosts.

/// Format a second count as zero-padded `MM:SS`.
///
/// Minutes are not wrapped at 60, so `3600.0` renders as `60:00`.
/// Negative and NaN inputs render as `00:00`; fractions are truncated.
pub fn format_clock(seconds: f64) -> String {
    let whole = if seconds.is_nan() || seconds <= 0.0 {
        0
    } else {
        seconds as u64
    };
    format_secs(whole)
}

/// Format a whole second count as zero-padded `MM:SS`.
pub fn format_secs(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
