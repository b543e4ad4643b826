use crate::model::Timestamp;
use time::OffsetDateTime;

/// Current wall-clock time in whole seconds since the Unix epoch.
pub fn now() -> Timestamp {
    OffsetDateTime::now_utc().unix_timestamp()
}

/// Whether `timestamp` is inside the calendar range `time` can represent.
pub fn is_representable(timestamp: Timestamp) -> bool {
    OffsetDateTime::from_unix_timestamp(timestamp).is_ok()
}
