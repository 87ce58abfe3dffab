//! Personalized feed resolution.

use std::sync::Arc;

use crate::application::error::AppError;
use crate::application::pagination::{Page, PageRequest};
use crate::application::posts::fetch_page;
use crate::application::repos::PostsRepo;
use crate::domain::entities::PostRecord;
use crate::domain::posts::PostQuery;
use crate::domain::types::Viewer;

#[derive(Clone)]
pub struct FeedService {
    posts: Arc<dyn PostsRepo>,
}

impl FeedService {
    pub fn new(posts: Arc<dyn PostsRepo>) -> Self {
        Self { posts }
    }

    /// Describe the viewer's feed: posts by every author they follow, newest first.
    ///
    /// No storage is touched here; the returned query is evaluated on demand
    /// and reflects the follow edges that exist at evaluation time.
    pub fn resolve_feed(&self, viewer: &Viewer) -> Result<PostQuery, AppError> {
        let user = viewer.require_user("feed")?;
        Ok(PostQuery::followed_by(user.id))
    }

    pub async fn page(
        &self,
        viewer: &Viewer,
        request: PageRequest,
    ) -> Result<Page<PostRecord>, AppError> {
        let query = self.resolve_feed(viewer)?;
        fetch_page(self.posts.as_ref(), &query, request).await
    }

    /// Evaluate a previously resolved feed query in full.
    pub async fn evaluate(&self, query: &PostQuery) -> Result<Vec<PostRecord>, AppError> {
        let total = self.posts.count_posts(&query.filter).await?;
        Ok(self.posts.list_posts(query, total, 0).await?)
    }
}
