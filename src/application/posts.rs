//! Post authoring and listing.

use std::sync::Arc;

use time::OffsetDateTime;
use tracing::info;

use crate::application::error::AppError;
use crate::application::pagination::{Page, PageRequest, resolve_window};
use crate::application::repos::{
    CommentsRepo, CreatePostParams, FollowsRepo, GroupsRepo, PostsRepo, PostsWriteRepo,
    UpdatePostParams, UsersRepo,
};
use crate::domain::entities::{CommentRecord, PostRecord, UserRecord};
use crate::domain::error::DomainError;
use crate::domain::posts::{PostFilter, PostQuery, preview};
use crate::domain::types::{SortOrder, Viewer};

#[derive(Debug, Clone, Default)]
pub struct CreatePostCommand {
    pub text: String,
    /// Slug of the group to file the post under.
    pub group: Option<String>,
    pub image: Option<String>,
}

/// Partial edit. `None` keeps the stored value; `Some(None)` clears an optional field.
#[derive(Debug, Clone, Default)]
pub struct EditPostCommand {
    pub text: Option<String>,
    pub group: Option<Option<String>>,
    pub image: Option<Option<String>>,
}

#[derive(Debug, Clone)]
pub struct PostDetail {
    pub post: PostRecord,
    pub comments: Vec<CommentRecord>,
    pub author_post_count: u64,
}

#[derive(Debug, Clone)]
pub struct AuthorProfile {
    pub author: UserRecord,
    pub posts: Page<PostRecord>,
    pub followers: u64,
    pub following: u64,
    pub viewer_follows: bool,
}

/// Evaluate a post query against storage and cut out the requested page.
pub async fn fetch_page(
    repo: &dyn PostsRepo,
    query: &PostQuery,
    request: PageRequest,
) -> Result<Page<PostRecord>, AppError> {
    let total = repo.count_posts(&query.filter).await?;
    let window = resolve_window(total, request);
    let items = repo.list_posts(query, window.limit, window.offset).await?;
    Ok(Page::new(items, window, total, request.size))
}

#[derive(Clone)]
pub struct PostService {
    posts: Arc<dyn PostsRepo>,
    writer: Arc<dyn PostsWriteRepo>,
    groups: Arc<dyn GroupsRepo>,
    users: Arc<dyn UsersRepo>,
    comments: Arc<dyn CommentsRepo>,
    follows: Arc<dyn FollowsRepo>,
}

impl PostService {
    pub fn new(
        posts: Arc<dyn PostsRepo>,
        writer: Arc<dyn PostsWriteRepo>,
        groups: Arc<dyn GroupsRepo>,
        users: Arc<dyn UsersRepo>,
        comments: Arc<dyn CommentsRepo>,
        follows: Arc<dyn FollowsRepo>,
    ) -> Self {
        Self {
            posts,
            writer,
            groups,
            users,
            comments,
            follows,
        }
    }

    pub async fn create(
        &self,
        viewer: &Viewer,
        command: CreatePostCommand,
    ) -> Result<PostRecord, AppError> {
        let author = viewer.require_user("post.create")?;
        let text = normalize_text(&command.text)?;
        let group_id = self.resolve_group(command.group.as_deref()).await?;

        let params = CreatePostParams {
            author_id: author.id,
            text,
            group_id,
            image: normalize_optional(command.image),
            created_at: OffsetDateTime::now_utc(),
        };
        let post = self.writer.create_post(params).await?;

        info!(
            target = "blogroll::posts",
            post_id = post.id,
            author = %post.author_username,
            group = post.group_slug.as_deref().unwrap_or(""),
            preview = %preview(&post.text),
            "Post created"
        );
        Ok(post)
    }

    /// Apply an author's edit. Anyone else leaves the stored post untouched.
    pub async fn edit(
        &self,
        viewer: &Viewer,
        post_id: i64,
        command: EditPostCommand,
    ) -> Result<PostRecord, AppError> {
        let post = self.find(post_id).await?;
        ensure_author(viewer, &post, "post.edit")?;

        let text = match command.text {
            Some(text) => normalize_text(&text)?,
            None => post.text.clone(),
        };
        let group_id = match command.group {
            Some(group) => self.resolve_group(group.as_deref()).await?,
            None => post.group_id,
        };
        let image = match command.image {
            Some(image) => normalize_optional(image),
            None => post.image.clone(),
        };

        let params = UpdatePostParams {
            id: post.id,
            text,
            group_id,
            image,
        };
        let updated = self.writer.update_post(params).await?;

        info!(
            target = "blogroll::posts",
            post_id = updated.id,
            author = %updated.author_username,
            "Post edited"
        );
        Ok(updated)
    }

    /// Delete a post. Its comments survive with their post reference cleared.
    pub async fn delete(&self, viewer: &Viewer, post_id: i64) -> Result<(), AppError> {
        let post = self.find(post_id).await?;
        ensure_author(viewer, &post, "post.delete")?;

        self.writer.delete_post(post.id).await?;
        info!(
            target = "blogroll::posts",
            post_id = post.id,
            author = %post.author_username,
            "Post deleted"
        );
        Ok(())
    }

    pub async fn find(&self, post_id: i64) -> Result<PostRecord, AppError> {
        self.posts
            .find_post(post_id)
            .await?
            .ok_or_else(|| AppError::not_found("post"))
    }

    /// List posts for a filter, rejecting unknown groups and authors.
    pub async fn list(
        &self,
        filter: PostFilter,
        request: PageRequest,
    ) -> Result<Page<PostRecord>, AppError> {
        match &filter {
            PostFilter::All | PostFilter::FollowedBy(_) => {}
            PostFilter::Group(slug) => {
                if self.groups.find_group_by_slug(slug).await?.is_none() {
                    return Err(AppError::not_found("group"));
                }
            }
            PostFilter::Author(username) => {
                if self.users.find_user_by_username(username).await?.is_none() {
                    return Err(AppError::not_found("user"));
                }
            }
        }

        fetch_page(self.posts.as_ref(), &PostQuery::new(filter), request).await
    }

    pub async fn detail(&self, post_id: i64) -> Result<PostDetail, AppError> {
        let post = self.find(post_id).await?;
        let comments = self
            .comments
            .list_comments_for_post(post.id, SortOrder::NewestFirst)
            .await?;
        let author_post_count = self
            .posts
            .count_posts(&PostFilter::Author(post.author_username.clone()))
            .await?;

        Ok(PostDetail {
            post,
            comments,
            author_post_count,
        })
    }

    pub async fn profile(
        &self,
        viewer: &Viewer,
        username: &str,
        request: PageRequest,
    ) -> Result<AuthorProfile, AppError> {
        let author = self
            .users
            .find_user_by_username(username)
            .await?
            .ok_or_else(|| AppError::not_found("user"))?;

        let query = PostQuery::by_author(author.username.clone());
        let posts = fetch_page(self.posts.as_ref(), &query, request).await?;
        let followers = self.follows.count_followers(author.id).await?;
        let following = self.follows.count_following(author.id).await?;
        let viewer_follows = match viewer.user() {
            Some(user) => self
                .follows
                .find_follow(user.id, author.id)
                .await?
                .is_some(),
            None => false,
        };

        Ok(AuthorProfile {
            author,
            posts,
            followers,
            following,
            viewer_follows,
        })
    }

    async fn resolve_group(&self, slug: Option<&str>) -> Result<Option<i64>, AppError> {
        let Some(slug) = slug.map(str::trim).filter(|value| !value.is_empty()) else {
            return Ok(None);
        };
        let group = self
            .groups
            .find_group_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::not_found("group"))?;
        Ok(Some(group.id))
    }
}

fn ensure_author(viewer: &Viewer, post: &PostRecord, action: &'static str) -> Result<(), AppError> {
    let user = viewer.require_user(action)?;
    if user.id != post.author_id {
        return Err(DomainError::not_author(action).into());
    }
    Ok(())
}

fn normalize_text(text: &str) -> Result<String, AppError> {
    if text.trim().is_empty() {
        return Err(AppError::validation("text must not be empty"));
    }
    Ok(text.to_string())
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value.and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}
