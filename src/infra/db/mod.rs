//! SQLite-backed repository implementations.

mod comments;
mod follows;
mod groups;
mod posts;
mod users;
mod util;

pub use util::map_sqlx_error;

use util::encode_timestamp;

use std::{str::FromStr, sync::Arc};

use sqlx::{
    QueryBuilder, Sqlite, Transaction,
    query,
    sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions},
};

use crate::application::repos::RepoError;
use crate::domain::posts::PostFilter;

const POST_SELECT: &str = "SELECT p.id, p.text, p.author_id, u.username AS author_username, \
        p.group_id, g.slug AS group_slug, p.image, p.created_at \
    FROM posts p \
    INNER JOIN users u ON u.id = p.author_id \
    LEFT JOIN post_groups g ON g.id = p.group_id \
    WHERE 1 = 1";

#[derive(Clone)]
pub struct SqliteRepositories {
    pool: Arc<SqlitePool>,
}

impl SqliteRepositories {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn begin(&self) -> Result<Transaction<'_, Sqlite>, sqlx::Error> {
        self.pool.begin().await
    }

    /// Open a pool with foreign-key enforcement switched on for every connection.
    pub async fn connect(url: &str, max_connections: u32) -> Result<SqlitePool, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
    }

    pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations")
            .run(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn health_check(&self) -> Result<(), sqlx::Error> {
        query("SELECT 1").execute(self.pool()).await.map(|_| ())
    }

    fn post_select<'q>() -> QueryBuilder<'q, Sqlite> {
        QueryBuilder::new(POST_SELECT)
    }

    fn apply_post_filter(qb: &mut QueryBuilder<'_, Sqlite>, filter: &PostFilter) {
        match filter {
            PostFilter::All => {}
            PostFilter::Group(slug) => {
                qb.push(" AND g.slug = ");
                qb.push_bind(slug.clone());
            }
            PostFilter::Author(username) => {
                qb.push(" AND u.username = ");
                qb.push_bind(username.clone());
            }
            PostFilter::FollowedBy(user_id) => {
                qb.push(" AND p.author_id IN (SELECT f.author_id FROM follows f WHERE f.user_id = ");
                qb.push_bind(*user_id);
                qb.push(")");
            }
        }
    }

    fn convert_count(value: i64) -> Result<u64, RepoError> {
        value
            .try_into()
            .map_err(|_| RepoError::from_persistence("count exceeds supported range"))
    }

    fn convert_bound(value: u64) -> Result<i64, RepoError> {
        value
            .try_into()
            .map_err(|_| RepoError::InvalidInput {
                message: format!("page bound {value} exceeds supported range"),
            })
    }
}
