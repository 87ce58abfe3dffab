mod actions;
mod admin;
mod middleware;
mod public;
mod viewer;

pub use admin::build_admin_router;
pub use public::build_router;
pub use viewer::{CurrentViewer, REMOTE_USER_HEADER};

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use sqlx::Error as SqlxError;

use crate::application::{
    comments::CommentService, error::ErrorReport, feed::FeedService, follows::FollowService,
    groups::GroupService, identity::IdentityService, listing::IndexListingService,
    pagination::PageRequest, posts::PostService,
};
use crate::cache::ListingCache;
use crate::infra::db::SqliteRepositories;

#[derive(Clone)]
pub struct HttpState {
    pub identity: Arc<IdentityService>,
    pub groups: Arc<GroupService>,
    pub posts: Arc<PostService>,
    pub comments: Arc<CommentService>,
    pub follows: Arc<FollowService>,
    pub feed: Arc<FeedService>,
    pub index: Arc<IndexListingService>,
    pub db: Arc<SqliteRepositories>,
    pub page_size: NonZeroU32,
}

impl HttpState {
    /// Wire every service against a single repository handle.
    pub fn new(
        db: Arc<SqliteRepositories>,
        cache: Arc<ListingCache>,
        index_ttl: Duration,
        page_size: NonZeroU32,
    ) -> Self {
        let identity = Arc::new(IdentityService::new(db.clone(), db.clone()));
        let groups = Arc::new(GroupService::new(db.clone(), db.clone()));
        let posts = Arc::new(PostService::new(
            db.clone(),
            db.clone(),
            db.clone(),
            db.clone(),
            db.clone(),
            db.clone(),
        ));
        let comments = Arc::new(CommentService::new(db.clone(), db.clone(), db.clone()));
        let follows = Arc::new(FollowService::new(db.clone(), db.clone(), db.clone()));
        let feed = Arc::new(FeedService::new(db.clone()));
        let index = Arc::new(IndexListingService::new(db.clone(), cache, index_ttl));

        Self {
            identity,
            groups,
            posts,
            comments,
            follows,
            feed,
            index,
            db,
            page_size,
        }
    }

    fn page_request(&self, query: &PageQuery) -> PageRequest {
        PageRequest::parse(query.page.as_deref(), self.page_size)
    }
}

/// `?page=` as sent by the client; parsed leniently.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PageQuery {
    page: Option<String>,
}

fn db_health_response(result: Result<(), SqlxError>) -> Response {
    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => {
            let mut response = StatusCode::SERVICE_UNAVAILABLE.into_response();
            ErrorReport::from_error(
                "infra::http::db_health",
                StatusCode::SERVICE_UNAVAILABLE,
                &err,
            )
            .attach(&mut response);
            response
        }
    }
}
