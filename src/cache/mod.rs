//! Listing cache.
//!
//! Rendered index pages are kept in a bounded in-memory store keyed by region
//! and page number, e.g. `index_page:2`. The cache is an ordinary value that
//! the application constructs once and injects where it is needed; tests build
//! their own instances.
//!
//! ```toml
//! [cache]
//! index_ttl_seconds = 20
//! capacity = 64
//! ```

mod lock;
mod store;

pub use store::ListingCache;

/// Cache region holding rendered index listing pages.
pub const INDEX_REGION: &str = "index_page";

/// Key for a resolved page number, never a raw request.
pub fn index_page_key(page: u64) -> String {
    format!("{INDEX_REGION}:{page}")
}
