use crate::error::AppError;
use crate::model::{Task, Timestamp};
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

const UNKNOWN_END: &str = "?";

pub fn local_offset() -> UtcOffset {
    UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC)
}

/// Two-state marker: brackets for the active task, `x` for a finished one.
pub fn marker(task: &Task) -> &'static str {
    match (task.is_active(), task.is_finished()) {
        (true, true) => "[x]",
        (true, false) => "[ ]",
        (false, true) => " x ",
        (false, false) => "   ",
    }
}

pub fn format_timestamp(timestamp: Timestamp, offset: UtcOffset) -> Result<String, AppError> {
    let datetime = OffsetDateTime::from_unix_timestamp(timestamp)
        .map_err(|err| AppError::invalid_data(format!("timestamp {timestamp}: {err}")))?
        .to_offset(offset);
    datetime
        .format(format_description!(
            "[year]/[month]/[day] [hour]:[minute]:[second]"
        ))
        .map_err(|err| AppError::invalid_data(err.to_string()))
}

/// `[ ] name (2024/01/02 03:04:05 - ?)`
pub fn human_line(task: &Task, offset: UtcOffset) -> Result<String, AppError> {
    let start = format_timestamp(task.start(), offset)?;
    let end = match task.end() {
        Some(end) => format_timestamp(end, offset)?,
        None => UNKNOWN_END.to_string(),
    };
    Ok(format!("{} {} ({} - {})", marker(task), task.name(), start, end))
}
