//! Validation of link destination URLs.

use url::Url;

/// Maximum accepted length of a destination URL.
pub const MAX_URL_LENGTH: usize = 2048;

/// Errors that can occur while validating a destination URL.
#[derive(Debug, thiserror::Error)]
pub enum DestinationUrlError {
    #[error("Original URL is required")]
    Empty,

    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("Only HTTP and HTTPS protocols are allowed")]
    UnsupportedProtocol,

    #[error("URL must be at most {MAX_URL_LENGTH} characters")]
    TooLong,
}

/// Validates a destination URL and returns its serialized form.
///
/// The returned string is what the parser produced: fragments and query
/// strings are kept, embedded tabs and newlines are dropped and anything
/// outside the URL character set is percent-encoded. The result is always a
/// valid `Location` header value. Non-HTTP schemes such as `javascript:` or
/// `data:` are rejected.
///
/// # Errors
///
/// See [`DestinationUrlError`].
pub fn validate_destination_url(raw: &str) -> Result<String, DestinationUrlError> {
    let trimmed = raw.trim();

    if trimmed.is_empty() {
        return Err(DestinationUrlError::Empty);
    }

    if trimmed.len() > MAX_URL_LENGTH {
        return Err(DestinationUrlError::TooLong);
    }

    let parsed =
        Url::parse(trimmed).map_err(|e| DestinationUrlError::InvalidFormat(e.to_string()))?;

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(DestinationUrlError::UnsupportedProtocol);
    }

    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(DestinationUrlError::InvalidFormat("missing host".to_string()));
    }

    let serialized: String = parsed.into();
    if serialized.len() > MAX_URL_LENGTH {
        return Err(DestinationUrlError::TooLong);
    }

    Ok(serialized)
}
