//! Email validation for registrations.
//!
//! Registrations are restricted to a single institution: every email must be
//! `local-part@<domain>` for the configured domain. Duplicate detection runs
//! against both the stored roster and the form being filled in, because one
//! submission introduces several new emails at once.

use regex::Regex;

use crate::error::{Error, Result};
use crate::model::eq_ignore_case;
use crate::registration::{FormSlot, RegistrationForm};
use crate::roster::Roster;

/// Institution domain used when none is configured.
pub const DEFAULT_DOMAIN: &str = "nmit.ac.in";

/// Compiled institutional email rule.
#[derive(Debug, Clone)]
pub struct EmailPolicy {
    domain: String,
    regex: Regex,
}

impl EmailPolicy {
    /// Build the rule for the given institution domain.
    ///
    /// # Errors
    ///
    /// Returns an error if the domain is empty or contains whitespace or `@`.
    pub fn new(domain: &str) -> Result<Self> {
        let domain = domain.trim();
        if domain.is_empty() || domain.contains(char::is_whitespace) || domain.contains('@') {
            return Err(Error::ConfigValidation {
                message: format!("invalid institution domain: {domain:?}"),
            });
        }

        let pattern = format!(r"^[^\s@]+@(?i:{})$", regex::escape(domain));
        let regex = Regex::new(&pattern).map_err(|e| Error::ConfigValidation {
            message: format!("invalid institution domain {domain:?}: {e}"),
        })?;

        Ok(Self {
            domain: domain.to_string(),
            regex,
        })
    }

    /// The institution domain, without the `@`.
    #[must_use]
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Check whether the email is `local-part@<domain>` with no whitespace.
    #[must_use]
    pub fn is_institutional_email(&self, email: &str) -> bool {
        self.regex.is_match(email)
    }

    /// The message shown when an email fails the domain rule.
    #[must_use]
    pub fn domain_message(&self) -> String {
        format!("Email must be from @{} domain", self.domain)
    }
}

impl Default for EmailPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_DOMAIN).expect("default domain is valid")
    }
}

/// Check whether an email is already taken.
///
/// True if a stored participant has the email, or if another slot of the
/// in-progress form holds it. The slot named by `exclude` is never compared
/// against itself.
#[must_use]
pub fn is_duplicate_email(
    email: &str,
    form: &RegistrationForm,
    exclude: FormSlot,
    roster: &Roster,
) -> bool {
    if roster.participant_by_email(email).is_some() {
        return true;
    }

    form.slots()
        .filter(|(slot, _)| *slot != exclude)
        .any(|(_, entry)| {
            let other = entry.email.trim();
            !other.is_empty() && eq_ignore_case(other, email)
        })
}
