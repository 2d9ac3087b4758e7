//! Duration parsing for human-readable strings like "5s" or "500ms".

use crate::error::{Error, Result};
use std::time::Duration;

/// Parse a duration string.
///
/// Supported formats:
/// - `"Nms"` - N milliseconds (e.g., "500ms")
/// - `"Ns"` - N seconds (e.g., "30s")
/// - `"Nm"` - N minutes (e.g., "1m")
/// - `"N"` - N seconds (no suffix)
///
/// # Examples
///
/// ```
/// use caller_shell::config::parse_duration;
/// use std::time::Duration;
///
/// assert_eq!(parse_duration("5s").unwrap(), Duration::from_secs(5));
/// assert_eq!(parse_duration("250ms").unwrap(), Duration::from_millis(250));
/// assert!(parse_duration("soon").is_err());
/// ```
pub fn parse_duration(s: &str) -> Result<Duration> {
    let trimmed = s.trim();

    // (digits, milliseconds per unit)
    let (digits, scale) = if let Some(n) = trimmed.strip_suffix("ms") {
        (n, 1)
    } else if let Some(n) = trimmed.strip_suffix('s') {
        (n, 1_000)
    } else if let Some(n) = trimmed.strip_suffix('m') {
        (n, 60_000)
    } else {
        (trimmed, 1_000)
    };

    digits
        .parse::<u64>()
        .ok()
        .and_then(|n| n.checked_mul(scale))
        .map(Duration::from_millis)
        .ok_or_else(|| {
            Error::Validation(format!(
                "invalid duration '{}'. Use formats like '5s', '1m', '500ms'",
                s
            ))
        })
}
