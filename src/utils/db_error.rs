//! Helpers for classifying database errors.

/// Name of the unique constraint guarding `links.slug`.
pub const LINKS_SLUG_CONSTRAINT: &str = "links_slug_key";

/// Returns true if the error is a unique violation on the link slug.
///
/// This is the signal that a concurrent writer committed the same slug first.
pub fn is_unique_violation_on_slug(e: &sqlx::Error) -> bool {
    let Some(db_err) = e.as_database_error() else {
        return false;
    };

    if !db_err.is_unique_violation() {
        return false;
    }

    matches!(db_err.constraint(), Some(LINKS_SLUG_CONSTRAINT))
}
