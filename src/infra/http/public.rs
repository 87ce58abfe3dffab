use axum::{
    Router,
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::Response,
    routing::{get, post},
};

use crate::{
    application::error::AppError,
    domain::posts::PostFilter,
    presentation::views::{
        CommentView, GroupPageView, GroupView, PostDetailView, PostPageView, ProfileView,
        json_response, render_response,
    },
};

use super::{
    HttpState, PageQuery, actions, db_health_response,
    middleware::{log_responses, set_request_context},
    viewer::CurrentViewer,
};

pub fn build_router(state: HttpState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/group/{slug}", get(group_posts))
        .route("/profile/{username}", get(profile))
        .route("/posts/{id}", get(post_detail))
        .route("/posts/{id}/comments", get(post_comments))
        .route("/follow", get(follow_feed))
        .route("/create", post(actions::create_post))
        .route("/posts/{id}/edit", post(actions::edit_post))
        .route("/posts/{id}/delete", post(actions::delete_post))
        .route("/posts/{id}/comment", post(actions::add_comment))
        .route("/profile/{username}/follow", post(actions::follow))
        .route("/profile/{username}/unfollow", post(actions::unfollow))
        .route("/_health/db", get(public_health))
        .with_state(state)
        .layer(middleware::from_fn(log_responses))
        .layer(middleware::from_fn(set_request_context))
}

async fn index(
    State(state): State<HttpState>,
    Query(query): Query<PageQuery>,
) -> Result<Response, AppError> {
    let body = state.index.render_page(state.page_request(&query)).await?;
    Ok(json_response(StatusCode::OK, body))
}

async fn group_posts(
    State(state): State<HttpState>,
    Path(slug): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Response, AppError> {
    let group = state.groups.find(&slug).await?;
    let page = state
        .posts
        .list(PostFilter::Group(group.slug.clone()), state.page_request(&query))
        .await?;

    let view = GroupPageView {
        group: GroupView::from(&group),
        listing: PostPageView::from(&page),
    };
    render_response(StatusCode::OK, &view)
}

async fn profile(
    State(state): State<HttpState>,
    CurrentViewer(viewer): CurrentViewer,
    Path(username): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Response, AppError> {
    let profile = state
        .posts
        .profile(&viewer, &username, state.page_request(&query))
        .await?;
    render_response(StatusCode::OK, &ProfileView::from(&profile))
}

async fn post_detail(
    State(state): State<HttpState>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let detail = state.posts.detail(id).await?;
    render_response(StatusCode::OK, &PostDetailView::from(&detail))
}

async fn post_comments(
    State(state): State<HttpState>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let comments = state.comments.list_for_post(id).await?;
    let views: Vec<CommentView> = comments.iter().map(CommentView::from).collect();
    render_response(StatusCode::OK, &views)
}

async fn follow_feed(
    State(state): State<HttpState>,
    CurrentViewer(viewer): CurrentViewer,
    Query(query): Query<PageQuery>,
) -> Result<Response, AppError> {
    let page = state
        .feed
        .page(&viewer, state.page_request(&query))
        .await?;
    render_response(StatusCode::OK, &PostPageView::from(&page))
}

async fn public_health(State(state): State<HttpState>) -> Response {
    db_health_response(state.db.health_check().await)
}
