use chrono::{NaiveDate, NaiveDateTime};

const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y%m%d%H%M%S"];

/// Parses a migrate/rollback target date.
///
/// Accepts `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SS`, the compact
/// `YYYYMMDDHHMMSS` version form, and a bare `YYYY-MM-DD` or `YYYYMMDD`
/// (midnight).
pub fn parse_target_datetime(input: &str) -> Result<NaiveDateTime, String> {
    let input = input.trim();

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(input, format) {
            return Ok(dt);
        }
    }

    for format in ["%Y-%m-%d", "%Y%m%d"] {
        if let Some(dt) = NaiveDate::parse_from_str(input, format)
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
        {
            return Ok(dt);
        }
    }

    Err(format!(
        "Invalid date format: '{}'. Expected 'YYYY-MM-DD[ HH:MM:SS]' or 'YYYYMMDDHHMMSS'",
        input
    ))
}
