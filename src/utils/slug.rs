//! Slug policy: format validation, the reserved namespace and random generation.

use rand::Rng;
use regex::Regex;
use std::sync::LazyLock;

/// Minimum length of a custom slug.
pub const MIN_SLUG_LENGTH: usize = 4;

/// Maximum length of a custom slug.
pub const MAX_SLUG_LENGTH: usize = 20;

/// Length of a generated slug.
pub const RANDOM_SLUG_LENGTH: usize = 6;

const RANDOM_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

static CUSTOM_SLUG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9-]+$").expect("static regex is valid"));

/// Slugs that collide with system routes and can never be allocated.
pub const RESERVED_SLUGS: &[&str] = &[
    "about",
    "account",
    "admin",
    "auth",
    "dashboard",
    "health",
    "help",
    "login",
    "logout",
    "privacy",
    "profile",
    "reactivate",
    "settings",
    "signup",
    "static",
    "terms",
];

/// Why a custom slug was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SlugFormatError {
    #[error("Slug cannot be empty")]
    Empty,

    #[error("Slug must be at least 4 characters")]
    TooShort,

    #[error("Slug must be 20 characters or less")]
    TooLong,

    #[error("Slug can only contain lowercase letters, numbers, and hyphens")]
    InvalidCharacters,

    #[error("Slug cannot start or end with a hyphen")]
    EdgeHyphen,

    #[error("Slug cannot contain consecutive hyphens")]
    ConsecutiveHyphens,
}

/// Normalizes and validates a user-provided slug.
///
/// Surrounding whitespace is trimmed. Case is not folded: uppercase letters are
/// outside the allowed character set and are rejected.
///
/// # Rules
///
/// - Length: 4-20 characters
/// - Allowed characters: lowercase letters, digits, hyphens
/// - Cannot start or end with a hyphen
/// - Cannot contain `--`
///
/// # Errors
///
/// Returns the first [`SlugFormatError`] that applies.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(validate_slug("  my-link ").unwrap(), "my-link");
/// assert!(validate_slug("MyLink").is_err());
/// ```
pub fn validate_slug(raw: &str) -> Result<String, SlugFormatError> {
    let slug = raw.trim();

    if slug.is_empty() {
        return Err(SlugFormatError::Empty);
    }

    let length = slug.chars().count();
    if length < MIN_SLUG_LENGTH {
        return Err(SlugFormatError::TooShort);
    }
    if length > MAX_SLUG_LENGTH {
        return Err(SlugFormatError::TooLong);
    }

    if !CUSTOM_SLUG_REGEX.is_match(slug) {
        return Err(SlugFormatError::InvalidCharacters);
    }

    if slug.starts_with('-') || slug.ends_with('-') {
        return Err(SlugFormatError::EdgeHyphen);
    }

    if slug.contains("--") {
        return Err(SlugFormatError::ConsecutiveHyphens);
    }

    Ok(slug.to_string())
}

/// Returns true if `slug` belongs to the reserved namespace.
///
/// Comparison is case-insensitive so generated mixed-case slugs cannot shadow
/// a system route either.
pub fn is_reserved(slug: &str) -> bool {
    RESERVED_SLUGS
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(slug))
}

/// Generates a random slug of [`RANDOM_SLUG_LENGTH`] characters from `[a-zA-Z0-9]`.
pub fn generate_slug() -> String {
    let mut rng = rand::rng();

    (0..RANDOM_SLUG_LENGTH)
        .map(|_| {
            let idx = rng.random_range(0..RANDOM_ALPHABET.len());
            RANDOM_ALPHABET[idx] as char
        })
        .collect()
}
