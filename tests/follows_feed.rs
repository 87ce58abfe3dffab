mod common;

use blogroll::application::error::AppError;
use blogroll::application::follows::{FollowOutcome, UnfollowOutcome};
use blogroll::application::pagination::PageRequest;
use blogroll::application::repos::FollowsRepo;
use blogroll::domain::error::{DenialReason, DomainError};
use blogroll::domain::types::Viewer;
use sqlx::SqlitePool;

use common::{build_state, register, seed_post, viewer};

#[sqlx::test(migrations = "./migrations")]
async fn following_twice_keeps_a_single_edge(pool: SqlitePool) {
    let state = build_state(pool);
    let follower = viewer(&state, "a").await;
    let author = register(&state, "b").await;

    assert_eq!(
        state.follows.follow(&follower, "b").await.unwrap(),
        FollowOutcome::Created
    );
    assert_eq!(
        state.follows.follow(&follower, "b").await.unwrap(),
        FollowOutcome::AlreadyFollowing
    );

    let followers = FollowsRepo::count_followers(state.db.as_ref(), author.id)
        .await
        .unwrap();
    assert_eq!(followers, 1);
    assert!(state.follows.is_following(&follower, "b").await.unwrap());
}

#[sqlx::test(migrations = "./migrations")]
async fn self_follow_is_ignored(pool: SqlitePool) {
    let state = build_state(pool);
    let me = viewer(&state, "solo").await;
    let user = me.user().unwrap().clone();

    assert_eq!(
        state.follows.follow(&me, "solo").await.unwrap(),
        FollowOutcome::SelfFollowIgnored
    );
    assert_eq!(
        FollowsRepo::count_following(state.db.as_ref(), user.id)
            .await
            .unwrap(),
        0
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn unfollow_is_idempotent(pool: SqlitePool) {
    let state = build_state(pool);
    let follower = viewer(&state, "a").await;
    register(&state, "b").await;

    assert_eq!(
        state.follows.unfollow(&follower, "b").await.unwrap(),
        UnfollowOutcome::NotFollowing
    );

    state.follows.follow(&follower, "b").await.unwrap();
    assert_eq!(
        state.follows.unfollow(&follower, "b").await.unwrap(),
        UnfollowOutcome::Removed
    );
    assert_eq!(
        state.follows.unfollow(&follower, "b").await.unwrap(),
        UnfollowOutcome::NotFollowing
    );
    assert!(!state.follows.is_following(&follower, "b").await.unwrap());
}

#[sqlx::test(migrations = "./migrations")]
async fn following_unknown_author_is_not_found(pool: SqlitePool) {
    let state = build_state(pool);
    let follower = viewer(&state, "a").await;

    let err = state
        .follows
        .follow(&follower, "ghost")
        .await
        .expect_err("no such author");
    assert!(matches!(
        err,
        AppError::Domain(DomainError::NotFound { entity: "user" })
    ));
}

#[sqlx::test(migrations = "./migrations")]
async fn anonymous_viewers_cannot_follow(pool: SqlitePool) {
    let state = build_state(pool);
    register(&state, "b").await;

    let err = state
        .follows
        .follow(&Viewer::Anonymous, "b")
        .await
        .expect_err("login required");
    assert!(matches!(
        err,
        AppError::Domain(DomainError::PermissionDenied {
            reason: DenialReason::Anonymous,
            ..
        })
    ));
    assert!(
        !state
            .follows
            .is_following(&Viewer::Anonymous, "b")
            .await
            .unwrap()
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn feed_contains_followed_authors_newest_first(pool: SqlitePool) {
    let state = build_state(pool);
    let reader = viewer(&state, "a").await;
    let b = register(&state, "b").await;
    let c = register(&state, "c").await;
    let d = register(&state, "d").await;

    let b_post = seed_post(&state, &b, "from b", 0).await;
    let c_post = seed_post(&state, &c, "from c", 1).await;
    seed_post(&state, &d, "from d", 2).await;

    state.follows.follow(&reader, "b").await.unwrap();
    state.follows.follow(&reader, "c").await.unwrap();

    let page = state
        .feed
        .page(&reader, PageRequest::first(state.page_size))
        .await
        .unwrap();
    let ids: Vec<i64> = page.items.iter().map(|post| post.id).collect();
    assert_eq!(ids, vec![c_post.id, b_post.id]);
    assert_eq!(page.total, 2);
}

#[sqlx::test(migrations = "./migrations")]
async fn resolved_feed_tracks_later_follow_changes(pool: SqlitePool) {
    let state = build_state(pool);
    let reader = viewer(&state, "a").await;
    let b = register(&state, "b").await;
    let c = register(&state, "c").await;
    seed_post(&state, &b, "from b", 0).await;
    let c_post = seed_post(&state, &c, "from c", 1).await;

    state.follows.follow(&reader, "b").await.unwrap();
    let query = state.feed.resolve_feed(&reader).unwrap();

    state.follows.unfollow(&reader, "b").await.unwrap();
    state.follows.follow(&reader, "c").await.unwrap();

    let posts = state.feed.evaluate(&query).await.unwrap();
    let ids: Vec<i64> = posts.iter().map(|post| post.id).collect();
    assert_eq!(ids, vec![c_post.id]);
}

#[sqlx::test(migrations = "./migrations")]
async fn feed_is_empty_without_follows(pool: SqlitePool) {
    let state = build_state(pool);
    let reader = viewer(&state, "a").await;
    let b = register(&state, "b").await;
    seed_post(&state, &b, "from b", 0).await;

    let page = state
        .feed
        .page(&reader, PageRequest::first(state.page_size))
        .await
        .unwrap();
    assert!(page.items.is_empty());
    assert_eq!(page.num_pages, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn anonymous_feed_requires_login(pool: SqlitePool) {
    let state = build_state(pool);

    let err = state
        .feed
        .page(&Viewer::Anonymous, PageRequest::first(state.page_size))
        .await
        .expect_err("anonymous feed");
    assert!(matches!(
        err,
        AppError::Domain(DomainError::PermissionDenied {
            reason: DenialReason::Anonymous,
            ..
        })
    ));
}
