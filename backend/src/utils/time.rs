use chrono::{DateTime, Utc};
use chrono_tz::Tz;

/// Returns the current time in the configured timezone.
pub fn now_in_timezone(tz: &Tz) -> DateTime<Tz> {
    Utc::now().with_timezone(tz)
}

/// Timestamp suffix for generated file names, in the configured timezone.
pub fn file_stamp(tz: &Tz) -> String {
    now_in_timezone(tz).format("%Y%m%d_%H%M%S").to_string()
}
