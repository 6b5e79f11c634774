//! Validation of account display names.

/// Minimum length of a display name, in characters.
pub const MIN_NAME_LENGTH: usize = 2;

/// Maximum length of a display name, in characters.
pub const MAX_NAME_LENGTH: usize = 50;

/// Why a display name was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DisplayNameError {
    #[error("Display name is required")]
    Empty,

    #[error("Display name must be at least 2 characters")]
    TooShort,

    #[error("Display name must be 50 characters or less")]
    TooLong,

    #[error("Display name cannot contain numbers")]
    ContainsDigits,
}

/// Trims and validates a display name.
///
/// # Errors
///
/// Returns the first [`DisplayNameError`] that applies.
pub fn validate_display_name(raw: &str) -> Result<String, DisplayNameError> {
    let name = raw.trim();

    if name.is_empty() {
        return Err(DisplayNameError::Empty);
    }

    let length = name.chars().count();
    if length < MIN_NAME_LENGTH {
        return Err(DisplayNameError::TooShort);
    }
    if length > MAX_NAME_LENGTH {
        return Err(DisplayNameError::TooLong);
    }

    if name.chars().any(|c| c.is_ascii_digit()) {
        return Err(DisplayNameError::ContainsDigits);
    }

    Ok(name.to_string())
}
