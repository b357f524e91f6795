//! Slug derivation and allocation
//!
//! Slugs appear in routes, so an existing slug is never silently moved to a
//! different view. A collision is reported and the caller picks another.

use crate::errors::{Result, ViewError};

/// Derive a URL-safe slug from a human label
///
/// Lowercases, then collapses every run of characters outside `[a-z0-9]`
/// into a single `-`, with no leading or trailing `-`.
///
/// ```
/// use viewcfg_core::rules::slugify;
///
/// assert_eq!(slugify("  All Movies (2024) "), "all-movies-2024");
/// ```
pub fn slugify(label: &str) -> String {
    let mut slug = String::with_capacity(label.len());
    let mut pending_dash = false;
    for c in label.trim().to_lowercase().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// Pick the slug a save will write
///
/// - `explicit` wins when non-blank; otherwise the slug is derived from
///   `label`. An explicit slug must already be in `slugify` form, unless it
///   is `current` (legacy rows may predate the rule).
/// - `current` is the slug of the view being updated, if any. Landing on an
///   existing slug other than `current` is a `SlugConflict`.
///
/// # Errors
///
/// `MissingSlug` when nothing usable can be derived, `InvalidSlug` for a
/// non-canonical explicit slug, `SlugConflict` on a collision with a
/// different view.
pub fn allocate<S: AsRef<str>>(
    existing: &[S],
    label: &str,
    explicit: Option<&str>,
    current: Option<&str>,
) -> Result<String> {
    let candidate = match explicit.map(str::trim).filter(|s| !s.is_empty()) {
        Some(slug) => {
            let suggested = slugify(slug);
            if suggested != slug && current != Some(slug) {
                return Err(ViewError::InvalidSlug {
                    slug: slug.to_string(),
                    suggested,
                });
            }
            slug.to_string()
        }
        None => slugify(label),
    };

    if candidate.is_empty() {
        return Err(ViewError::MissingSlug {
            label: label.to_string(),
        });
    }

    let taken = existing.iter().any(|s| s.as_ref() == candidate);
    if taken && current != Some(candidate.as_str()) {
        return Err(ViewError::SlugConflict { slug: candidate });
    }

    Ok(candidate)
}
