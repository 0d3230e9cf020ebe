use thiserror::Error;

#[derive(Error, Debug)]
pub enum AdpulseError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, AdpulseError>;

/// Reject negative, NaN and infinite values for a named metric field.
pub(crate) fn check_non_negative(field: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(AdpulseError::InvalidInput(format!(
            "{field} must be a finite non-negative number, got {value}"
        )))
    }
}
