use std::fmt;

use thiserror::Error;

/// Why a caller was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenialReason {
    /// No identity was asserted for the caller.
    Anonymous,
    /// The caller is known but does not own the target.
    NotAuthor,
}

impl fmt::Display for DenialReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DenialReason::Anonymous => f.write_str("login required"),
            DenialReason::NotAuthor => f.write_str("only the author may do this"),
        }
    }
}

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("domain entity `{entity}` not found")]
    NotFound { entity: &'static str },
    #[error("domain validation failed: {message}")]
    Validation { message: String },
    #[error("permission denied for `{action}`: {reason}")]
    PermissionDenied {
        action: &'static str,
        reason: DenialReason,
    },
    #[error("domain invariant violated: {message}")]
    Invariant { message: String },
}

impl DomainError {
    pub fn not_found(entity: &'static str) -> Self {
        Self::NotFound { entity }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn login_required(action: &'static str) -> Self {
        Self::PermissionDenied {
            action,
            reason: DenialReason::Anonymous,
        }
    }

    pub fn not_author(action: &'static str) -> Self {
        Self::PermissionDenied {
            action,
            reason: DenialReason::NotAuthor,
        }
    }

    pub fn invariant(message: impl Into<String>) -> Self {
        Self::Invariant {
            message: message.into(),
        }
    }
}
