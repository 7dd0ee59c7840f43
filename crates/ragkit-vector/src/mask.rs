//! Credential masking for log output.

/// Masks the password portion of a connection URL.
pub(crate) fn mask_url(url: &str) -> String {
    if let Some(at_pos) = url.find('@')
        && let Some(colon_pos) = url[..at_pos].rfind(':')
        && !url[colon_pos + 1..].starts_with("//")
    {
        let mut masked = url.to_string();
        masked.replace_range(colon_pos + 1..at_pos, "***");
        return masked;
    }
    url.to_string()
}
