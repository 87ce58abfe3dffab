use std::sync::Arc;

use time::OffsetDateTime;
use tracing::info;

use crate::application::error::AppError;
use crate::application::repos::{CommentsRepo, CommentsWriteRepo, CreateCommentParams, PostsRepo};
use crate::domain::entities::CommentRecord;
use crate::domain::posts::preview;
use crate::domain::types::{SortOrder, Viewer};

#[derive(Clone)]
pub struct CommentService {
    reader: Arc<dyn CommentsRepo>,
    writer: Arc<dyn CommentsWriteRepo>,
    posts: Arc<dyn PostsRepo>,
}

impl CommentService {
    pub fn new(
        reader: Arc<dyn CommentsRepo>,
        writer: Arc<dyn CommentsWriteRepo>,
        posts: Arc<dyn PostsRepo>,
    ) -> Self {
        Self {
            reader,
            writer,
            posts,
        }
    }

    /// Attach a comment to a post. Anonymous callers are refused before any write.
    pub async fn add(
        &self,
        viewer: &Viewer,
        post_id: i64,
        text: &str,
    ) -> Result<CommentRecord, AppError> {
        let author = viewer.require_user("comment.add")?;
        if text.trim().is_empty() {
            return Err(AppError::validation("comment text must not be empty"));
        }
        if self.posts.find_post(post_id).await?.is_none() {
            return Err(AppError::not_found("post"));
        }

        let params = CreateCommentParams {
            post_id,
            author_id: author.id,
            text: text.to_string(),
            created_at: OffsetDateTime::now_utc(),
        };
        let comment = self.writer.create_comment(params).await?;

        info!(
            target = "blogroll::comments",
            comment_id = comment.id,
            post_id,
            author = %comment.author_username,
            preview = %preview(&comment.text),
            "Comment added"
        );
        Ok(comment)
    }

    /// Comments on a post, newest first.
    pub async fn list_for_post(&self, post_id: i64) -> Result<Vec<CommentRecord>, AppError> {
        if self.posts.find_post(post_id).await?.is_none() {
            return Err(AppError::not_found("post"));
        }
        Ok(self
            .reader
            .list_comments_for_post(post_id, SortOrder::NewestFirst)
            .await?)
    }

    pub async fn count(&self) -> Result<u64, AppError> {
        Ok(self.reader.count_comments().await?)
    }
}
