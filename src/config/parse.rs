// ABOUTME: Parsers for plugin setting values.
// ABOUTME: Booleans, durations and batch sizes as Drone passes them in the environment.

use std::time::Duration;

/// Parse a boolean the way pipeline settings spell them: `1`, `t`, `true`,
/// `0`, `f` or `false`, in any case.
pub fn parse_bool(value: &str) -> Result<bool, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "t" | "true" => Ok(true),
        "0" | "f" | "false" => Ok(false),
        other => Err(format!("expected a boolean, got {other:?}")),
    }
}

/// Parse a duration such as `30s`, `5m` or `1m30s`.
pub fn parse_duration(value: &str) -> Result<Duration, String> {
    let value = value.trim();
    if value == "0" {
        return Ok(Duration::ZERO);
    }
    humantime_serde::re::humantime::parse_duration(value).map_err(|e| e.to_string())
}

/// Parse a batch size: a positive integer.
pub fn parse_batch_size(value: &str) -> Result<i64, String> {
    let size: i64 = value.trim().parse().map_err(|e| format!("{e}"))?;
    if size < 1 {
        return Err(format!("must be at least 1, got {size}"));
    }
    Ok(size)
}
