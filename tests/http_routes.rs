mod common;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header::CONTENT_TYPE},
};
use blogroll::infra::http::{REMOTE_USER_HEADER, build_admin_router, build_router};
use serde_json::{Value, json};
use sqlx::SqlitePool;
use tower::ServiceExt;

use common::{build_state, register};

async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    user: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header(REMOTE_USER_HEADER, user);
    }
    let request = match body {
        Some(body) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[sqlx::test(migrations = "./migrations")]
async fn write_routes_require_identity(pool: SqlitePool) {
    let state = build_state(pool);
    register(&state, "alice").await;
    let router = build_router(state);

    let (status, body) = send(
        &router,
        Method::POST,
        "/create",
        None,
        Some(json!({"text": "hi"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "unauthorized");

    let (status, _) = send(&router, Method::GET, "/follow", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &router,
        Method::POST,
        "/create",
        Some("nobody"),
        Some(json!({"text": "hi"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "./migrations")]
async fn author_lifecycle_over_http(pool: SqlitePool) {
    let state = build_state(pool);
    register(&state, "alice").await;
    register(&state, "bob").await;
    let router = build_router(state);

    let (status, created) = send(
        &router,
        Method::POST,
        "/create",
        Some("alice"),
        Some(json!({"text": "hello world"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_i64().unwrap();

    let (status, body) = send(
        &router,
        Method::POST,
        &format!("/posts/{id}/edit"),
        Some("bob"),
        Some(json!({"text": "mine now"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "forbidden");

    let (status, edited) = send(
        &router,
        Method::POST,
        &format!("/posts/{id}/edit"),
        Some("alice"),
        Some(json!({"text": "hello again"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(edited["text"], "hello again");
    assert_eq!(edited["created"], created["created"]);

    let (status, comment) = send(
        &router,
        Method::POST,
        &format!("/posts/{id}/comment"),
        Some("bob"),
        Some(json!({"text": "welcome"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(comment["text"], "welcome");

    let (status, comments) = send(
        &router,
        Method::GET,
        &format!("/posts/{id}/comments"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(comments.as_array().map(Vec::len), Some(1));

    let (status, _) = send(
        &router,
        Method::POST,
        &format!("/posts/{id}/delete"),
        Some("alice"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&router, Method::GET, &format!("/posts/{id}"), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "not_found");
}

#[sqlx::test(migrations = "./migrations")]
async fn follow_routes_drive_the_feed(pool: SqlitePool) {
    let state = build_state(pool);
    register(&state, "reader").await;
    register(&state, "writer").await;
    let router = build_router(state);

    send(
        &router,
        Method::POST,
        "/create",
        Some("writer"),
        Some(json!({"text": "news"})),
    )
    .await;

    let (status, body) = send(
        &router,
        Method::POST,
        "/profile/writer/follow",
        Some("reader"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "created");

    let (_, body) = send(
        &router,
        Method::POST,
        "/profile/reader/follow",
        Some("reader"),
        None,
    )
    .await;
    assert_eq!(body["outcome"], "self_follow_ignored");

    let (status, feed) = send(&router, Method::GET, "/follow", Some("reader"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(feed["total"], 1);
    assert_eq!(feed["posts"][0]["author"], "writer");

    let (status, profile) = send(
        &router,
        Method::GET,
        "/profile/writer",
        Some("reader"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["followers"], 1);
    assert_eq!(profile["viewer_follows"], true);

    let (_, body) = send(
        &router,
        Method::POST,
        "/profile/writer/unfollow",
        Some("reader"),
        None,
    )
    .await;
    assert_eq!(body["outcome"], "removed");

    let (_, feed) = send(&router, Method::GET, "/follow", Some("reader"), None).await;
    assert_eq!(feed["total"], 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn index_and_group_listings(pool: SqlitePool) {
    let state = build_state(pool);
    register(&state, "alice").await;
    let public = build_router(state.clone());
    let admin = build_admin_router(state);

    let (status, group) = send(
        &admin,
        Method::POST,
        "/admin/groups",
        None,
        Some(json!({"title": "Cats", "description": "all about cats"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(group["slug"], "cats");

    send(
        &public,
        Method::POST,
        "/create",
        Some("alice"),
        Some(json!({"text": "meow", "group": "cats"})),
    )
    .await;

    let (status, listing) = send(&public, Method::GET, "/group/cats?page=x", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listing["group"]["slug"], "cats");
    assert_eq!(listing["page"], 1);
    assert_eq!(listing["posts"][0]["group"], "cats");

    let (status, _) = send(&public, Method::GET, "/group/dogs", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, index) = send(&public, Method::GET, "/?page=-4", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(index["total"], 1);

    let (status, _) = send(&admin, Method::DELETE, "/admin/groups/cats", None, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&admin, Method::DELETE, "/admin/cache", None, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, index) = send(&public, Method::GET, "/", None, None).await;
    assert_eq!(index["posts"][0]["group"], Value::Null);
}

#[sqlx::test(migrations = "./migrations")]
async fn admin_manages_users(pool: SqlitePool) {
    let state = build_state(pool);
    let admin = build_admin_router(state);

    let (status, user) = send(
        &admin,
        Method::POST,
        "/admin/users",
        None,
        Some(json!({"username": "newcomer"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(user["username"], "newcomer");

    let (status, body) = send(
        &admin,
        Method::POST,
        "/admin/users",
        None,
        Some(json!({"username": "bad name!"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "validation_error");

    let (status, _) = send(&admin, Method::DELETE, "/admin/users/newcomer", None, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&admin, Method::DELETE, "/admin/users/newcomer", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
async fn health_endpoint_reports_database(pool: SqlitePool) {
    let state = build_state(pool);
    let router = build_router(state);

    let (status, _) = send(&router, Method::GET, "/_health/db", None, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}
