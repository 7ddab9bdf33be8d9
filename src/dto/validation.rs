//! Validation helpers for DTOs.

use time::OffsetDateTime;
use validator::ValidationError;

/// Rejects names made only of whitespace.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("Value must not be blank".into());
        return Err(err);
    }
    Ok(())
}

/// Validates that `end` does not precede `start`.
///
/// # Examples
///
/// ```ignore
/// validate_time_range(nine, ten) // Ok
/// validate_time_range(ten, nine) // Err
/// ```
pub fn validate_time_range(
    start: OffsetDateTime,
    end: OffsetDateTime,
) -> Result<(), ValidationError> {
    if end < start {
        let mut err = ValidationError::new("time_range");
        err.message = Some(format!("End ({end}) must not be before start ({start})").into());
        return Err(err);
    }
    Ok(())
}
