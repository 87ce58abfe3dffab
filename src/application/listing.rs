//! Cached rendering of the global index listing.
//!
//! Only the unfiltered index goes through the cache. Post writes never touch
//! it: a rendered page is served unchanged until its TTL lapses or an
//! operator clears the cache.
//!
//! Entries are keyed by the page number the request resolves to. Numbers below
//! one read page 1 directly; numbers past the end cost a count query and then
//! share the entry of the last page.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tracing::{debug, info};

use crate::application::error::AppError;
use crate::application::pagination::{Page, PageRequest, resolve_window};
use crate::application::repos::PostsRepo;
use crate::cache::{ListingCache, index_page_key};
use crate::domain::posts::PostQuery;
use crate::presentation::views::{PostPageView, render_json};

pub const DEFAULT_INDEX_TTL: Duration = Duration::from_secs(20);

#[derive(Clone)]
pub struct IndexListingService {
    posts: Arc<dyn PostsRepo>,
    cache: Arc<ListingCache>,
    ttl: Duration,
}

impl IndexListingService {
    pub fn new(posts: Arc<dyn PostsRepo>, cache: Arc<ListingCache>, ttl: Duration) -> Self {
        Self { posts, cache, ttl }
    }

    /// Rendered bytes for an index page, served from cache when present.
    pub async fn render_page(&self, request: PageRequest) -> Result<Bytes, AppError> {
        let requested = request.number.max(1).unsigned_abs();
        if let Some(body) = self.cached(requested) {
            return Ok(body);
        }

        let query = PostQuery::all();
        let total = self.posts.count_posts(&query.filter).await?;
        let window = resolve_window(total, request);
        if window.number != requested
            && let Some(body) = self.cached(window.number)
        {
            return Ok(body);
        }

        let key = index_page_key(window.number);
        debug!(cache = "listing", outcome = "miss", key = %key);
        let items = self
            .posts
            .list_posts(&query, window.limit, window.offset)
            .await?;
        let page = Page::new(items, window, total, request.size);
        let body = render_json(&PostPageView::from(&page))?;
        self.cache.set(key, body.clone(), self.ttl);
        Ok(body)
    }

    fn cached(&self, number: u64) -> Option<Bytes> {
        let key = index_page_key(number);
        let body = self.cache.get(&key)?;
        debug!(cache = "listing", outcome = "hit", key = %key);
        Some(body)
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
        info!(target = "blogroll::listing", "Index listing cache cleared");
    }

    pub fn cache(&self) -> &Arc<ListingCache> {
        &self.cache
    }
}
