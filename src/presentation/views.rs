//! JSON view models and rendering helpers.

use axum::{
    http::{HeaderValue, StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use serde::Serialize;
use thiserror::Error;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use crate::application::error::AppError;
use crate::application::pagination::Page;
use crate::application::posts::{AuthorProfile, PostDetail};
use crate::domain::entities::{CommentRecord, GroupRecord, PostRecord, UserRecord};

#[derive(Debug, Error)]
#[error("{public_message}")]
pub struct RenderError {
    pub(crate) origin: &'static str,
    pub(crate) public_message: &'static str,
    #[source]
    pub(crate) error: serde_json::Error,
}

impl From<RenderError> for AppError {
    fn from(err: RenderError) -> Self {
        AppError::unexpected(format!("{} ({}): {}", err.public_message, err.origin, err.error))
    }
}

pub fn render_json<T: Serialize>(view: &T) -> Result<Bytes, RenderError> {
    serde_json::to_vec(view)
        .map(Bytes::from)
        .map_err(|error| RenderError {
            origin: "presentation::views::render_json",
            public_message: "View rendering failed",
            error,
        })
}

/// Wrap pre-rendered JSON bytes in a response.
pub fn json_response(status: StatusCode, body: Bytes) -> Response {
    let mut response = (status, body).into_response();
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}

pub fn render_response<T: Serialize>(status: StatusCode, view: &T) -> Result<Response, AppError> {
    let body = render_json(view)?;
    Ok(json_response(status, body))
}

fn format_timestamp(value: OffsetDateTime) -> String {
    value.format(&Rfc3339).unwrap_or_else(|_| value.to_string())
}

#[derive(Debug, Clone, Serialize)]
pub struct UserView {
    pub id: i64,
    pub username: String,
    pub joined: String,
}

impl From<&UserRecord> for UserView {
    fn from(user: &UserRecord) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            joined: format_timestamp(user.created_at),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupView {
    pub title: String,
    pub slug: String,
    pub description: String,
}

impl From<&GroupRecord> for GroupView {
    fn from(group: &GroupRecord) -> Self {
        Self {
            title: group.title.clone(),
            slug: group.slug.clone(),
            description: group.description.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    pub id: i64,
    pub text: String,
    pub author: String,
    pub group: Option<String>,
    pub image: Option<String>,
    pub created: String,
}

impl From<&PostRecord> for PostView {
    fn from(post: &PostRecord) -> Self {
        Self {
            id: post.id,
            text: post.text.clone(),
            author: post.author_username.clone(),
            group: post.group_slug.clone(),
            image: post.image.clone(),
            created: format_timestamp(post.created_at),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentView {
    pub id: i64,
    pub post: Option<i64>,
    pub author: String,
    pub text: String,
    pub created: String,
}

impl From<&CommentRecord> for CommentView {
    fn from(comment: &CommentRecord) -> Self {
        Self {
            id: comment.id,
            post: comment.post_id,
            author: comment.author_username.clone(),
            text: comment.text.clone(),
            created: format_timestamp(comment.created_at),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PostPageView {
    pub posts: Vec<PostView>,
    pub page: u64,
    pub num_pages: u64,
    pub total: u64,
    pub has_next: bool,
    pub has_previous: bool,
}

impl From<&Page<PostRecord>> for PostPageView {
    fn from(page: &Page<PostRecord>) -> Self {
        Self {
            posts: page.items.iter().map(PostView::from).collect(),
            page: page.number,
            num_pages: page.num_pages,
            total: page.total,
            has_next: page.has_next,
            has_previous: page.has_previous,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupPageView {
    pub group: GroupView,
    #[serde(flatten)]
    pub listing: PostPageView,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostDetailView {
    pub post: PostView,
    pub comments: Vec<CommentView>,
    pub author_post_count: u64,
}

impl From<&PostDetail> for PostDetailView {
    fn from(detail: &PostDetail) -> Self {
        Self {
            post: PostView::from(&detail.post),
            comments: detail.comments.iter().map(CommentView::from).collect(),
            author_post_count: detail.author_post_count,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileView {
    pub author: UserView,
    pub post_count: u64,
    pub followers: u64,
    pub following: u64,
    pub viewer_follows: bool,
    #[serde(flatten)]
    pub listing: PostPageView,
}

impl From<&AuthorProfile> for ProfileView {
    fn from(profile: &AuthorProfile) -> Self {
        Self {
            author: UserView::from(&profile.author),
            post_count: profile.posts.total,
            followers: profile.followers,
            following: profile.following,
            viewer_follows: profile.viewer_follows,
            listing: PostPageView::from(&profile.posts),
        }
    }
}
