//! Follow edge management.
//!
//! Each (follower, author) pair is either unfollowed or following. Both
//! transitions are idempotent, and self-follows are ignored before they reach
//! storage (where a check constraint rejects them as well).

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::application::error::AppError;
use crate::application::repos::{FollowsRepo, FollowsWriteRepo, UsersRepo};
use crate::domain::entities::UserRecord;
use crate::domain::types::Viewer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FollowOutcome {
    Created,
    AlreadyFollowing,
    SelfFollowIgnored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnfollowOutcome {
    Removed,
    NotFollowing,
}

#[derive(Clone)]
pub struct FollowService {
    users: Arc<dyn UsersRepo>,
    reader: Arc<dyn FollowsRepo>,
    writer: Arc<dyn FollowsWriteRepo>,
}

impl FollowService {
    pub fn new(
        users: Arc<dyn UsersRepo>,
        reader: Arc<dyn FollowsRepo>,
        writer: Arc<dyn FollowsWriteRepo>,
    ) -> Self {
        Self {
            users,
            reader,
            writer,
        }
    }

    pub async fn follow(&self, viewer: &Viewer, author: &str) -> Result<FollowOutcome, AppError> {
        let user = viewer.require_user("follow")?;
        let author = self.find_author(author).await?;

        if user.id == author.id {
            debug!(
                target = "blogroll::follows",
                user_id = user.id,
                "Ignoring self-follow"
            );
            return Ok(FollowOutcome::SelfFollowIgnored);
        }

        let outcome = if self.writer.insert_follow(user.id, author.id).await? {
            FollowOutcome::Created
        } else {
            FollowOutcome::AlreadyFollowing
        };

        info!(
            target = "blogroll::follows",
            user = %user.username,
            author = %author.username,
            outcome = ?outcome,
            "Follow requested"
        );
        Ok(outcome)
    }

    pub async fn unfollow(
        &self,
        viewer: &Viewer,
        author: &str,
    ) -> Result<UnfollowOutcome, AppError> {
        let user = viewer.require_user("unfollow")?;
        let author = self.find_author(author).await?;

        let outcome = if self.writer.delete_follow(user.id, author.id).await? {
            UnfollowOutcome::Removed
        } else {
            UnfollowOutcome::NotFollowing
        };

        info!(
            target = "blogroll::follows",
            user = %user.username,
            author = %author.username,
            outcome = ?outcome,
            "Unfollow requested"
        );
        Ok(outcome)
    }

    pub async fn is_following(&self, viewer: &Viewer, author: &str) -> Result<bool, AppError> {
        let Some(user) = viewer.user() else {
            return Ok(false);
        };
        let author = self.find_author(author).await?;
        Ok(self.reader.find_follow(user.id, author.id).await?.is_some())
    }

    async fn find_author(&self, username: &str) -> Result<UserRecord, AppError> {
        self.users
            .find_user_by_username(username)
            .await?
            .ok_or_else(|| AppError::not_found("user"))
    }
}
