//! Utility modules for common functionality across the crate.

pub mod tracing_targets;

/// Trims `content` and returns it together with its length in characters.
///
/// Lengths are counted in Unicode scalar values so multi-byte text is not
/// penalized.
#[inline]
pub fn trimmed_len(content: &str) -> (&str, usize) {
    let trimmed = content.trim();
    (trimmed, trimmed.chars().count())
}

/// Lowercases the domain of an email address for storage and lookup.
///
/// The local part is kept as given, so `Alice@example.com` and
/// `alice@example.com` are distinct addresses. Nothing is trimmed.
pub fn normalize_email(email: &str) -> String {
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{local}@{}", domain.to_lowercase()),
        None => email.to_owned(),
    }
}
