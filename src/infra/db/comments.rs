use async_trait::async_trait;
use time::OffsetDateTime;

use crate::{
    application::repos::{CommentsRepo, CommentsWriteRepo, CreateCommentParams, RepoError},
    domain::{entities::CommentRecord, types::SortOrder},
};

use super::{SqliteRepositories, encode_timestamp, map_sqlx_error};

const COMMENT_SELECT: &str = "SELECT c.id, c.post_id, c.author_id, u.username AS author_username, \
        c.text, c.created_at \
    FROM comments c \
    INNER JOIN users u ON u.id = c.author_id";

#[derive(sqlx::FromRow)]
struct CommentRow {
    id: i64,
    post_id: Option<i64>,
    author_id: i64,
    author_username: String,
    text: String,
    created_at: OffsetDateTime,
}

impl From<CommentRow> for CommentRecord {
    fn from(row: CommentRow) -> Self {
        Self {
            id: row.id,
            post_id: row.post_id,
            author_id: row.author_id,
            author_username: row.author_username,
            text: row.text,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl CommentsRepo for SqliteRepositories {
    async fn find_comment(&self, id: i64) -> Result<Option<CommentRecord>, RepoError> {
        let sql = format!("{COMMENT_SELECT} WHERE c.id = ?");
        let row = sqlx::query_as::<_, CommentRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(RepoError::from_persistence)?;

        Ok(row.map(CommentRecord::from))
    }

    async fn list_comments_for_post(
        &self,
        post_id: i64,
        order: SortOrder,
    ) -> Result<Vec<CommentRecord>, RepoError> {
        let direction = order.as_sql();
        let sql = format!(
            "{COMMENT_SELECT} WHERE c.post_id = ? \
             ORDER BY c.created_at {direction}, c.id {direction}"
        );
        let rows = sqlx::query_as::<_, CommentRow>(&sql)
            .bind(post_id)
            .fetch_all(self.pool())
            .await
            .map_err(RepoError::from_persistence)?;

        Ok(rows.into_iter().map(CommentRecord::from).collect())
    }

    async fn count_comments(&self) -> Result<u64, RepoError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM comments")
            .fetch_one(self.pool())
            .await
            .map_err(RepoError::from_persistence)?;

        Self::convert_count(count)
    }
}

#[async_trait]
impl CommentsWriteRepo for SqliteRepositories {
    async fn create_comment(
        &self,
        params: CreateCommentParams,
    ) -> Result<CommentRecord, RepoError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO comments (post_id, author_id, text, created_at)
            VALUES (?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(params.post_id)
        .bind(params.author_id)
        .bind(params.text)
        .bind(encode_timestamp(params.created_at)?)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        self.find_comment(id).await?.ok_or(RepoError::NotFound)
    }
}
