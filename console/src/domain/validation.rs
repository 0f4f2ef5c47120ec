//! Field validators shared by the edit sessions.
//!
//! Query-fragment validation lives in [`crate::graphql`]; the checks here
//! are the plain string ones.

use url::Url;

/// Whether `input` is an absolute URL with a host, such as a webhook target
pub fn is_valid_url(input: &str) -> bool {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return false;
    }
    match Url::parse(trimmed) {
        Ok(url) => url.has_host() && !url.cannot_be_a_base(),
        Err(_) => false,
    }
}

/// Both new-password entries are filled in and identical
pub fn passwords_match(first: &str, second: &str) -> bool {
    !first.is_empty() && first == second
}
