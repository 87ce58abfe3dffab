//! Maintenance endpoints. Served on the admin listener only, which is expected
//! to be bound to a trusted interface.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use serde::Deserialize;

use crate::{
    application::{error::AppError, groups::CreateGroupCommand},
    presentation::views::{GroupView, UserView, render_response},
};

use super::{
    HttpState, db_health_response,
    middleware::{log_responses, set_request_context},
};

#[derive(Debug, Deserialize)]
pub struct CreateGroupBody {
    pub title: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateUserBody {
    pub username: String,
}

pub fn build_admin_router(state: HttpState) -> Router {
    Router::new()
        .route("/admin/groups", get(list_groups).post(create_group))
        .route("/admin/groups/{slug}", delete(delete_group))
        .route("/admin/users", post(create_user))
        .route("/admin/users/{username}", delete(delete_user))
        .route("/admin/cache", delete(clear_cache))
        .route("/_health/db", get(admin_health))
        .with_state(state)
        .layer(middleware::from_fn(log_responses))
        .layer(middleware::from_fn(set_request_context))
}

async fn list_groups(State(state): State<HttpState>) -> Result<Response, AppError> {
    let groups = state.groups.list().await?;
    let views: Vec<GroupView> = groups.iter().map(GroupView::from).collect();
    render_response(StatusCode::OK, &views)
}

async fn create_group(
    State(state): State<HttpState>,
    Json(body): Json<CreateGroupBody>,
) -> Result<Response, AppError> {
    let command = CreateGroupCommand {
        title: body.title,
        slug: body.slug,
        description: body.description,
    };
    let group = state.groups.create(command).await?;
    render_response(StatusCode::CREATED, &GroupView::from(&group))
}

async fn delete_group(
    State(state): State<HttpState>,
    Path(slug): Path<String>,
) -> Result<Response, AppError> {
    state.groups.delete(&slug).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

async fn create_user(
    State(state): State<HttpState>,
    Json(body): Json<CreateUserBody>,
) -> Result<Response, AppError> {
    let user = state.identity.register(&body.username).await?;
    render_response(StatusCode::CREATED, &UserView::from(&user))
}

async fn delete_user(
    State(state): State<HttpState>,
    Path(username): Path<String>,
) -> Result<Response, AppError> {
    state.identity.remove(&username).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

async fn clear_cache(State(state): State<HttpState>) -> Response {
    state.index.clear_cache();
    StatusCode::NO_CONTENT.into_response()
}

async fn admin_health(State(state): State<HttpState>) -> Response {
    db_health_response(state.db.health_check().await)
}
