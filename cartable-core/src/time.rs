//! Time utilities: timezone-aware target and due dates.

use anyhow::Result;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Parse a date like "2026-06-20" (local midnight) or "2026-06-20 18:00" in an
/// IANA tz like "Europe/Paris", returning UTC. RFC3339 input is taken as-is.
pub fn parse_target_date(input: &str, tz: &str) -> Result<DateTime<Utc>> {
    let input = input.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }

    let tz: Tz = tz
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid timezone: {tz}"))?;

    let ndt = match NaiveDateTime::parse_from_str(input, "%Y-%m-%d %H:%M") {
        Ok(ndt) => ndt,
        Err(_) => NaiveDate::parse_from_str(input, "%Y-%m-%d")
            .map(|d| d.and_time(NaiveTime::MIN))
            .map_err(|e| {
                anyhow::anyhow!("invalid date '{input}' (expected YYYY-MM-DD [HH:MM]): {e}")
            })?,
    };

    let local_dt = tz
        .from_local_datetime(&ndt)
        .earliest()
        .ok_or_else(|| anyhow::anyhow!("nonexistent local time (DST gap?): {input} {tz}"))?;

    Ok(local_dt.with_timezone(&Utc))
}

/// Short local rendering for terminal output.
pub fn format_local_date(dt: DateTime<Utc>, tz: &str) -> String {
    match tz.parse::<Tz>() {
        Ok(tz) => dt.with_timezone(&tz).format("%Y-%m-%d").to_string(),
        Err(_) => dt.format("%Y-%m-%d").to_string(),
    }
}
