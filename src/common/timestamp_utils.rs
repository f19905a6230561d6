use crate::errors::AppError;
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local};

// Get current local timestamp as a formatted string
pub fn current_local_timestamp_str(format_str: &str) -> String {
    let now: DateTime<Local> = Local::now();
    now.format(format_str).to_string()
}

/// Rejects strftime strings chrono cannot render; formatting those panics.
pub fn check_timestamp_format(format_str: &str) -> Result<(), AppError> {
    if format_str.is_empty() {
        return Err(AppError::Config("timestamp format cannot be empty".to_string()));
    }
    if StrftimeItems::new(format_str).any(|item| matches!(item, Item::Error)) {
        return Err(AppError::Config(format!("invalid timestamp format '{}'", format_str)));
    }
    Ok(())
}
