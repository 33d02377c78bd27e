//! Structured outcome of create, update and delete operations.
//!
//! The framework branches on this value instead of catching errors, so
//! persistence failures on those operations are reported here.

use serde::{Deserialize, Serialize};

/// One failure reason
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityError {
    pub code: String,
    pub description: String,
}

impl IdentityError {
    pub fn new(code: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            description: description.into(),
        }
    }
}

/// Success or a list of failure reasons
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IdentityResult {
    Succeeded,
    Failed(Vec<IdentityError>),
}

impl IdentityResult {
    /// Create a failed result with a single error
    pub fn failed(error: IdentityError) -> Self {
        IdentityResult::Failed(vec![error])
    }

    pub fn succeeded(&self) -> bool {
        matches!(self, IdentityResult::Succeeded)
    }

    /// Failure reasons (empty on success)
    pub fn errors(&self) -> &[IdentityError] {
        match self {
            IdentityResult::Succeeded => &[],
            IdentityResult::Failed(errors) => errors,
        }
    }
}

impl std::fmt::Display for IdentityResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IdentityResult::Succeeded => write!(f, "Succeeded"),
            IdentityResult::Failed(errors) => {
                let codes: Vec<&str> = errors.iter().map(|e| e.code.as_str()).collect();
                write!(f, "Failed: {}", codes.join(","))
            }
        }
    }
}
