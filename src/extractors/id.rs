//! Path id parsing.

use crate::error::AppError;

/// Ids are positive integers. `label` names the resource in the error ("page" → "Invalid page ID").
pub fn parse_id(raw: &str, label: &str) -> Result<i64, AppError> {
    let digits_only = !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit());
    match raw.parse::<i64>() {
        Ok(id) if digits_only && id > 0 => Ok(id),
        _ => Err(AppError::BadRequest(format!("Invalid {} ID", label))),
    }
}
