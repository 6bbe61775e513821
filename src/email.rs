//! Syntactic email check.
//!
//! Accepts `local@domain.tld` shapes: a run of characters that are neither
//! whitespace nor `@`, then `@`, then a domain with no whitespace or `@`
//! containing a `.` that has at least one character on each side. No
//! network access, no normalization.

use thiserror::Error;

/// Why an email was rejected before any network call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EmailError {
    #[error("email is required")]
    Empty,

    #[error("email address is not valid")]
    Malformed,
}

fn is_atom_char(c: char) -> bool {
    !c.is_whitespace() && c != '@'
}

/// Returns true if `s` looks like an email address.
pub fn validate(s: &str) -> bool {
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };

    if local.is_empty() || !local.chars().all(is_atom_char) {
        return false;
    }
    if !domain.chars().all(is_atom_char) {
        return false;
    }

    // Some dot must split the domain into two non-empty runs.
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

/// Like [`validate`], but tells an empty input apart from a malformed one.
pub fn check(s: &str) -> Result<(), EmailError> {
    if s.is_empty() {
        Err(EmailError::Empty)
    } else if validate(s) {
        Ok(())
    } else {
        Err(EmailError::Malformed)
    }
}
