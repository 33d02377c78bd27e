//! Two-factor recovery codes.
//!
//! Codes are persisted as one token value joined by
//! [`RECOVERY_CODE_SEPARATOR`]. An empty value holds zero codes.

use crate::constants::RECOVERY_CODE_SEPARATOR;

/// Ordered set of unused recovery codes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecoveryCodes {
    codes: Vec<String>,
}

impl RecoveryCodes {
    pub fn new<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            codes: codes.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse a stored token value
    pub fn parse(joined: &str) -> Self {
        if joined.is_empty() {
            return Self::default();
        }
        Self::new(joined.split(RECOVERY_CODE_SEPARATOR))
    }

    /// Value to store in the recovery-codes token
    pub fn join(&self) -> String {
        self.codes.join(RECOVERY_CODE_SEPARATOR)
    }

    pub fn count(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Remove the first code matching `code` ignoring case.
    ///
    /// Returns `false` when nothing matched.
    pub fn redeem(&mut self, code: &str) -> bool {
        let wanted = code.to_uppercase();
        match self.codes.iter().position(|c| c.to_uppercase() == wanted) {
            Some(index) => {
                self.codes.remove(index);
                true
            }
            None => false,
        }
    }
}
