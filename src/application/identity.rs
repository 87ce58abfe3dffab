//! Minimal user registry standing in for the external identity provider.

use std::sync::Arc;

use time::OffsetDateTime;
use tracing::{info, warn};

use crate::application::error::AppError;
use crate::application::repos::{CreateUserParams, RepoError, UsersRepo, UsersWriteRepo};
use crate::domain::entities::UserRecord;
use crate::domain::types::Viewer;

const MAX_USERNAME_LEN: usize = 150;

#[derive(Clone)]
pub struct IdentityService {
    reader: Arc<dyn UsersRepo>,
    writer: Arc<dyn UsersWriteRepo>,
}

impl IdentityService {
    pub fn new(reader: Arc<dyn UsersRepo>, writer: Arc<dyn UsersWriteRepo>) -> Self {
        Self { reader, writer }
    }

    pub async fn register(&self, username: &str) -> Result<UserRecord, AppError> {
        let username = username.trim();
        validate_username(username)?;

        if self.reader.find_user_by_username(username).await?.is_some() {
            return Err(AppError::validation(format!(
                "username `{username}` is already taken"
            )));
        }

        let params = CreateUserParams {
            username: username.to_string(),
            created_at: OffsetDateTime::now_utc(),
        };
        let user = match self.writer.create_user(params).await {
            Ok(user) => user,
            Err(RepoError::Duplicate { .. }) => {
                return Err(AppError::validation(format!(
                    "username `{username}` is already taken"
                )));
            }
            Err(err) => return Err(err.into()),
        };

        info!(
            target = "blogroll::identity",
            user_id = user.id,
            username = %user.username,
            "User registered"
        );
        Ok(user)
    }

    /// Remove a user together with everything that cascades from them.
    pub async fn remove(&self, username: &str) -> Result<(), AppError> {
        let user = self.find(username).await?;
        self.writer.delete_user(user.id).await?;
        info!(
            target = "blogroll::identity",
            user_id = user.id,
            username = %user.username,
            "User removed"
        );
        Ok(())
    }

    pub async fn find(&self, username: &str) -> Result<UserRecord, AppError> {
        self.reader
            .find_user_by_username(username)
            .await?
            .ok_or_else(|| AppError::not_found("user"))
    }

    /// Turn an upstream-asserted username into a viewer.
    ///
    /// Identities the registry does not know are treated as anonymous.
    pub async fn resolve_viewer(&self, asserted: Option<&str>) -> Result<Viewer, AppError> {
        let Some(username) = asserted.map(str::trim).filter(|value| !value.is_empty()) else {
            return Ok(Viewer::Anonymous);
        };

        match self.reader.find_user_by_username(username).await? {
            Some(user) => Ok(Viewer::User(user)),
            None => {
                warn!(
                    target = "blogroll::identity",
                    username,
                    "Asserted identity is not registered; treating caller as anonymous"
                );
                Ok(Viewer::Anonymous)
            }
        }
    }
}

fn validate_username(username: &str) -> Result<(), AppError> {
    if username.is_empty() {
        return Err(AppError::validation("username must not be empty"));
    }
    if username.chars().count() > MAX_USERNAME_LEN {
        return Err(AppError::validation(format!(
            "username must be at most {MAX_USERNAME_LEN} characters"
        )));
    }
    let valid = username
        .chars()
        .all(|ch| ch.is_alphanumeric() || matches!(ch, '@' | '.' | '+' | '-' | '_'));
    if !valid {
        return Err(AppError::validation(
            "username may only contain letters, digits and @/./+/-/_",
        ));
    }
    Ok(())
}
