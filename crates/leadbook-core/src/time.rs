use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Timelike, Utc};
use thiserror::Error;

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
];

#[derive(Debug, Error)]
pub enum TimeParseError {
    #[error("timestamp cannot be empty")]
    Empty,
    #[error("invalid date")]
    InvalidDate,
    #[error("invalid datetime format: expected YYYY-MM-DD or YYYY-MM-DD HH:MM")]
    InvalidDateTime,
    #[error("ambiguous local time: {0}")]
    AmbiguousLocalTime(String),
}

pub fn now_utc() -> i64 {
    Utc::now().timestamp()
}

/// Parses `YYYY-MM-DD` or `YYYY-MM-DD HH:MM[:SS]` in local time.
pub fn parse_local_timestamp(input: &str) -> Result<i64, TimeParseError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(TimeParseError::Empty);
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        let naive = date
            .and_hms_opt(0, 0, 0)
            .ok_or(TimeParseError::InvalidDate)?;
        return local_to_utc_timestamp(naive);
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return local_to_utc_timestamp(dt);
        }
    }

    Err(TimeParseError::InvalidDateTime)
}

pub fn format_timestamp_datetime(ts: i64) -> String {
    to_local(ts).format("%Y-%m-%d %H:%M").to_string()
}

/// Drops the time part for local midnights, which is how date-only input is
/// stored.
pub fn format_timestamp_date_or_datetime(ts: i64) -> String {
    let dt = to_local(ts);
    if dt.hour() == 0 && dt.minute() == 0 && dt.second() == 0 {
        dt.format("%Y-%m-%d").to_string()
    } else {
        dt.format("%Y-%m-%d %H:%M").to_string()
    }
}

pub fn format_duration_secs(secs: i64) -> String {
    let secs = secs.max(0);
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;
    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else if minutes > 0 {
        format!("{minutes}m {seconds}s")
    } else {
        format!("{seconds}s")
    }
}

fn to_local(ts: i64) -> DateTime<Local> {
    DateTime::<Utc>::from_timestamp(ts, 0)
        .unwrap_or_default()
        .with_timezone(&Local)
}

fn local_to_utc_timestamp(naive: NaiveDateTime) -> Result<i64, TimeParseError> {
    let local = Local
        .from_local_datetime(&naive)
        .single()
        .ok_or_else(|| TimeParseError::AmbiguousLocalTime(naive.to_string()))?;
    Ok(local.with_timezone(&Utc).timestamp())
}

#[cfg(test)]
mod tests {
    use super::{
        format_duration_secs, format_timestamp_date_or_datetime, format_timestamp_datetime,
        parse_local_timestamp, TimeParseError,
    };
    use chrono::{Local, TimeZone, Utc};

    #[test]
    fn parse_local_timestamp_accepts_date_and_datetime() {
        let date = parse_local_timestamp("2030-01-15").unwrap();
        assert_eq!(format_timestamp_date_or_datetime(date), "2030-01-15");

        let ts = parse_local_timestamp("2030-01-15 13:45").unwrap();
        let local = Utc.timestamp_opt(ts, 0).unwrap().with_timezone(&Local);
        assert_eq!(
            local.format("%Y-%m-%d %H:%M").to_string(),
            "2030-01-15 13:45"
        );
        assert_eq!(format_timestamp_datetime(ts), "2030-01-15 13:45");
    }

    #[test]
    fn parse_local_timestamp_rejects_empty_and_garbage() {
        assert!(matches!(
            parse_local_timestamp("  ").unwrap_err(),
            TimeParseError::Empty
        ));
        assert!(matches!(
            parse_local_timestamp("next tuesday").unwrap_err(),
            TimeParseError::InvalidDateTime
        ));
    }

    #[test]
    fn durations_pick_two_units() {
        assert_eq!(format_duration_secs(45), "45s");
        assert_eq!(format_duration_secs(200), "3m 20s");
        assert_eq!(format_duration_secs(3_720), "1h 2m");
        assert_eq!(format_duration_secs(-5), "0s");
    }
}
