//! Post listing descriptors.

use crate::domain::types::SortOrder;

const PREVIEW_CHARS: usize = 15;

/// Which posts a listing covers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PostFilter {
    All,
    Group(String),
    Author(String),
    /// Posts authored by anyone the given user follows.
    FollowedBy(i64),
}

/// A lazy, restartable description of a post listing.
///
/// Holding a `PostQuery` performs no I/O; each evaluation against a
/// repository re-reads current storage state.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PostQuery {
    pub filter: PostFilter,
    pub order: SortOrder,
}

impl PostQuery {
    pub fn new(filter: PostFilter) -> Self {
        Self {
            filter,
            order: SortOrder::default(),
        }
    }

    pub fn all() -> Self {
        Self::new(PostFilter::All)
    }

    pub fn by_group(slug: impl Into<String>) -> Self {
        Self::new(PostFilter::Group(slug.into()))
    }

    pub fn by_author(username: impl Into<String>) -> Self {
        Self::new(PostFilter::Author(username.into()))
    }

    pub fn followed_by(user_id: i64) -> Self {
        Self::new(PostFilter::FollowedBy(user_id))
    }

    pub fn with_order(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
    }
}

/// Short preview of post or comment text for log lines.
pub fn preview(text: &str) -> String {
    text.chars().take(PREVIEW_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queries_default_to_newest_first() {
        assert_eq!(PostQuery::all().order, SortOrder::NewestFirst);
        assert_eq!(
            PostQuery::followed_by(3).with_order(SortOrder::OldestFirst).order,
            SortOrder::OldestFirst
        );
        assert_eq!(
            PostQuery::by_group("cats").filter,
            PostFilter::Group("cats".to_string())
        );
    }

    #[test]
    fn preview_truncates_on_characters() {
        assert_eq!(preview("Привет, это длинный текст"), "Привет, это дли");
        assert_eq!(preview("short"), "short");
    }
}
