#![allow(dead_code)]

use std::num::{NonZeroU32, NonZeroUsize};
use std::sync::Arc;
use std::time::Duration;

use blogroll::application::repos::{
    CommentsWriteRepo, CreateCommentParams, CreatePostParams, PostsWriteRepo,
};
use blogroll::cache::ListingCache;
use blogroll::domain::entities::{CommentRecord, PostRecord, UserRecord};
use blogroll::domain::types::Viewer;
use blogroll::infra::db::SqliteRepositories;
use blogroll::infra::http::HttpState;
use sqlx::SqlitePool;
use time::{Duration as TimeDuration, OffsetDateTime};

pub fn build_state(pool: SqlitePool) -> HttpState {
    let repos = Arc::new(SqliteRepositories::new(pool));
    let cache = Arc::new(ListingCache::new(NonZeroUsize::new(16).unwrap()));
    HttpState::new(
        repos,
        cache,
        Duration::from_secs(20),
        NonZeroU32::new(10).unwrap(),
    )
}

pub async fn register(state: &HttpState, username: &str) -> UserRecord {
    state.identity.register(username).await.unwrap()
}

pub async fn viewer(state: &HttpState, username: &str) -> Viewer {
    Viewer::User(register(state, username).await)
}

/// Common reference point for seeded rows.
pub fn base_time() -> OffsetDateTime {
    OffsetDateTime::UNIX_EPOCH + TimeDuration::days(20_000)
}

/// Insert a post directly with a fixed offset from a common base time.
pub async fn seed_post(
    state: &HttpState,
    author: &UserRecord,
    text: &str,
    minutes_after_base: i64,
) -> PostRecord {
    seed_post_at(
        state,
        author,
        text,
        base_time() + TimeDuration::minutes(minutes_after_base),
    )
    .await
}

pub async fn seed_post_at(
    state: &HttpState,
    author: &UserRecord,
    text: &str,
    created_at: OffsetDateTime,
) -> PostRecord {
    PostsWriteRepo::create_post(
        state.db.as_ref(),
        CreatePostParams {
            author_id: author.id,
            text: text.to_string(),
            group_id: None,
            image: None,
            created_at,
        },
    )
    .await
    .unwrap()
}

pub async fn seed_comment_at(
    state: &HttpState,
    post: &PostRecord,
    author: &UserRecord,
    text: &str,
    created_at: OffsetDateTime,
) -> CommentRecord {
    CommentsWriteRepo::create_comment(
        state.db.as_ref(),
        CreateCommentParams {
            post_id: post.id,
            author_id: author.id,
            text: text.to_string(),
            created_at,
        },
    )
    .await
    .unwrap()
}
