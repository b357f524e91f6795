//! Role-set normalization
//!
//! Roles are compared case-insensitively by storing them uppercased. The
//! write path calls `normalize_roles` exactly once per save; nothing else
//! rewrites role sets.

/// Canonical form of a single role, or `None` for a blank one
pub fn normalize_role(role: &str) -> Option<String> {
    let trimmed = role.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_uppercase())
    }
}

/// Uppercase, drop blanks, and dedupe keeping first-seen order
fn normalize_list(roles: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(roles.len());
    for role in roles.iter().filter_map(|r| normalize_role(r)) {
        if !out.contains(&role) {
            out.push(role);
        }
    }
    out
}

/// Role sets ready to be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRoles {
    pub roles: Vec<String>,
    pub default_roles: Vec<String>,
}

/// Normalize the role sets of a view being saved
///
/// - `roles` falls back to the acting role, then to `fallback_role`, when
///   the caller supplies nothing usable; the result is never empty.
/// - `default_roles` keeps only roles present in the final `roles`.
pub fn normalize_roles(
    requested: Option<&[String]>,
    requested_defaults: Option<&[String]>,
    acting_role: Option<&str>,
    fallback_role: &str,
) -> NormalizedRoles {
    let mut roles = requested.map(normalize_list).unwrap_or_default();
    if roles.is_empty() {
        let role = acting_role
            .and_then(normalize_role)
            .or_else(|| normalize_role(fallback_role))
            .unwrap_or_else(|| "ADMIN".to_string());
        roles.push(role);
    }

    let default_roles = requested_defaults
        .map(normalize_list)
        .unwrap_or_default()
        .into_iter()
        .filter(|r| roles.contains(r))
        .collect();

    NormalizedRoles {
        roles,
        default_roles,
    }
}
