pub mod payment;
pub mod trip;
pub mod van;
pub mod wire;

use chrono::NaiveDate;

use crate::error::AppError;

/// Wire and form date format.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub(crate) fn required(field: &str, value: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::BadRequest(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn parse_form_date(field: &str, value: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|_| AppError::BadRequest(format!("{field} must be a YYYY-MM-DD date")))
}
