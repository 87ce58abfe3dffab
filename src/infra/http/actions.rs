//! Write endpoints reachable by signed-in users.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Deserializer, Serialize};

use crate::{
    application::{
        error::AppError,
        posts::{CreatePostCommand, EditPostCommand},
    },
    presentation::views::{CommentView, PostView, render_response},
};

use super::{HttpState, viewer::CurrentViewer};

#[derive(Debug, Deserialize)]
pub struct CreatePostBody {
    pub text: String,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

/// Absent fields are kept, `null` clears an optional field.
#[derive(Debug, Default, Deserialize)]
pub struct EditPostBody {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub group: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub image: Option<Option<String>>,
}

#[derive(Debug, Deserialize)]
pub struct CommentBody {
    pub text: String,
}

#[derive(Debug, Serialize)]
struct OutcomeView<T: Serialize> {
    outcome: T,
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

pub(super) async fn create_post(
    State(state): State<HttpState>,
    CurrentViewer(viewer): CurrentViewer,
    Json(body): Json<CreatePostBody>,
) -> Result<Response, AppError> {
    let command = CreatePostCommand {
        text: body.text,
        group: body.group,
        image: body.image,
    };
    let post = state.posts.create(&viewer, command).await?;
    render_response(StatusCode::CREATED, &PostView::from(&post))
}

pub(super) async fn edit_post(
    State(state): State<HttpState>,
    CurrentViewer(viewer): CurrentViewer,
    Path(id): Path<i64>,
    Json(body): Json<EditPostBody>,
) -> Result<Response, AppError> {
    let command = EditPostCommand {
        text: body.text,
        group: body.group,
        image: body.image,
    };
    let post = state.posts.edit(&viewer, id, command).await?;
    render_response(StatusCode::OK, &PostView::from(&post))
}

pub(super) async fn delete_post(
    State(state): State<HttpState>,
    CurrentViewer(viewer): CurrentViewer,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    state.posts.delete(&viewer, id).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

pub(super) async fn add_comment(
    State(state): State<HttpState>,
    CurrentViewer(viewer): CurrentViewer,
    Path(id): Path<i64>,
    Json(body): Json<CommentBody>,
) -> Result<Response, AppError> {
    let comment = state.comments.add(&viewer, id, &body.text).await?;
    render_response(StatusCode::CREATED, &CommentView::from(&comment))
}

pub(super) async fn follow(
    State(state): State<HttpState>,
    CurrentViewer(viewer): CurrentViewer,
    Path(username): Path<String>,
) -> Result<Response, AppError> {
    let outcome = state.follows.follow(&viewer, &username).await?;
    render_response(StatusCode::OK, &OutcomeView { outcome })
}

pub(super) async fn unfollow(
    State(state): State<HttpState>,
    CurrentViewer(viewer): CurrentViewer,
    Path(username): Path<String>,
) -> Result<Response, AppError> {
    let outcome = state.follows.unfollow(&viewer, &username).await?;
    render_response(StatusCode::OK, &OutcomeView { outcome })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edit_body_distinguishes_absent_from_null() {
        let body: EditPostBody = serde_json::from_str(r#"{"group": null}"#).expect("parse");
        assert_eq!(body.group, Some(None));
        assert_eq!(body.image, None);
        assert_eq!(body.text, None);

        let body: EditPostBody =
            serde_json::from_str(r#"{"text": "new", "image": "a.png"}"#).expect("parse");
        assert_eq!(body.text.as_deref(), Some("new"));
        assert_eq!(body.image, Some(Some("a.png".to_string())));
        assert_eq!(body.group, None);
    }
}
