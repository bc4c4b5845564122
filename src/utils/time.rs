use std::time::Duration;

use chrono::{Local, NaiveDateTime, Timelike};

/// Formats an elapsed step duration with four decimals.
///
/// Example output: `"0.1482s"`
pub fn format_elapsed(elapsed: Duration) -> String {
    format!("{:.4}s", elapsed.as_secs_f64())
}

/// Wall-clock time as stored in the ledger, truncated to seconds.
pub fn ledger_now() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}
