/// Normalize an email address by lowercasing its domain part.
///
/// The address is split at the last `@`; the local part is kept as-is
/// since mailbox names may be case sensitive. Input without `@` is
/// returned unchanged.
pub fn normalize_email(raw: &str) -> String {
    match raw.trim().rsplit_once('@') {
        Some((local, domain)) => format!("{local}@{}", domain.to_lowercase()),
        None => raw.to_string(),
    }
}
