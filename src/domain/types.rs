//! Shared domain enumerations.

use serde::{Deserialize, Serialize};

use crate::domain::{entities::UserRecord, error::DomainError};

/// Supported listing orders. Listings never sort by arbitrary fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Descending by creation time, newest insertion first on ties.
    #[default]
    NewestFirst,
    OldestFirst,
}

impl SortOrder {
    pub fn as_sql(self) -> &'static str {
        match self {
            SortOrder::NewestFirst => "DESC",
            SortOrder::OldestFirst => "ASC",
        }
    }
}

/// The identity asserted for the current caller, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Viewer {
    #[default]
    Anonymous,
    User(UserRecord),
}

impl Viewer {
    pub fn user(&self) -> Option<&UserRecord> {
        match self {
            Viewer::Anonymous => None,
            Viewer::User(user) => Some(user),
        }
    }

    /// Return the authenticated user or a login-required denial for `action`.
    pub fn require_user(&self, action: &'static str) -> Result<&UserRecord, DomainError> {
        self.user()
            .ok_or_else(|| DomainError::login_required(action))
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self, Viewer::Anonymous)
    }
}
