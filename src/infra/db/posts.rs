use async_trait::async_trait;
use sqlx::{Sqlite, Transaction};
use time::OffsetDateTime;

use crate::{
    application::repos::{
        CreatePostParams, PostsRepo, PostsWriteRepo, RepoError, UpdatePostParams,
    },
    domain::{
        entities::PostRecord,
        posts::{PostFilter, PostQuery},
    },
};

use super::{POST_SELECT, SqliteRepositories, encode_timestamp, map_sqlx_error};

#[derive(sqlx::FromRow)]
struct PostRow {
    id: i64,
    text: String,
    author_id: i64,
    author_username: String,
    group_id: Option<i64>,
    group_slug: Option<String>,
    image: Option<String>,
    created_at: OffsetDateTime,
}

impl From<PostRow> for PostRecord {
    fn from(row: PostRow) -> Self {
        Self {
            id: row.id,
            text: row.text,
            author_id: row.author_id,
            author_username: row.author_username,
            group_id: row.group_id,
            group_slug: row.group_slug,
            image: row.image,
            created_at: row.created_at,
        }
    }
}

async fn fetch_post_in_tx(
    tx: &mut Transaction<'_, Sqlite>,
    id: i64,
) -> Result<PostRecord, RepoError> {
    let sql = format!("{POST_SELECT} AND p.id = ?");
    let row = sqlx::query_as::<_, PostRow>(&sql)
        .bind(id)
        .fetch_one(&mut **tx)
        .await
        .map_err(map_sqlx_error)?;
    Ok(PostRecord::from(row))
}

#[async_trait]
impl PostsRepo for SqliteRepositories {
    async fn find_post(&self, id: i64) -> Result<Option<PostRecord>, RepoError> {
        let mut qb = Self::post_select();
        qb.push(" AND p.id = ");
        qb.push_bind(id);

        let row = qb
            .build_query_as::<PostRow>()
            .fetch_optional(self.pool())
            .await
            .map_err(RepoError::from_persistence)?;

        Ok(row.map(PostRecord::from))
    }

    async fn count_posts(&self, filter: &PostFilter) -> Result<u64, RepoError> {
        let mut qb = sqlx::QueryBuilder::<Sqlite>::new(
            "SELECT COUNT(*) FROM posts p \
             INNER JOIN users u ON u.id = p.author_id \
             LEFT JOIN post_groups g ON g.id = p.group_id \
             WHERE 1 = 1",
        );
        Self::apply_post_filter(&mut qb, filter);

        let count: i64 = qb
            .build_query_scalar::<i64>()
            .fetch_one(self.pool())
            .await
            .map_err(RepoError::from_persistence)?;

        Self::convert_count(count)
    }

    async fn list_posts(
        &self,
        query: &PostQuery,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<PostRecord>, RepoError> {
        let limit = Self::convert_bound(limit)?;
        let offset = Self::convert_bound(offset)?;
        let direction = query.order.as_sql();

        let mut qb = Self::post_select();
        Self::apply_post_filter(&mut qb, &query.filter);
        qb.push(format!(
            " ORDER BY p.created_at {direction}, p.id {direction} LIMIT "
        ));
        qb.push_bind(limit);
        qb.push(" OFFSET ");
        qb.push_bind(offset);

        let rows = qb
            .build_query_as::<PostRow>()
            .fetch_all(self.pool())
            .await
            .map_err(RepoError::from_persistence)?;

        Ok(rows.into_iter().map(PostRecord::from).collect())
    }
}

#[async_trait]
impl PostsWriteRepo for SqliteRepositories {
    async fn create_post(&self, params: CreatePostParams) -> Result<PostRecord, RepoError> {
        let mut tx = self.begin().await.map_err(map_sqlx_error)?;

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO posts (text, author_id, group_id, image, created_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(params.text)
        .bind(params.author_id)
        .bind(params.group_id)
        .bind(params.image)
        .bind(encode_timestamp(params.created_at)?)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        let post = fetch_post_in_tx(&mut tx, id).await?;
        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(post)
    }

    async fn update_post(&self, params: UpdatePostParams) -> Result<PostRecord, RepoError> {
        let mut tx = self.begin().await.map_err(map_sqlx_error)?;

        let result = sqlx::query(
            r#"
            UPDATE posts
            SET text = ?, group_id = ?, image = ?
            WHERE id = ?
            "#,
        )
        .bind(params.text)
        .bind(params.group_id)
        .bind(params.image)
        .bind(params.id)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }

        let post = fetch_post_in_tx(&mut tx, params.id).await?;
        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(post)
    }

    async fn delete_post(&self, id: i64) -> Result<(), RepoError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}
