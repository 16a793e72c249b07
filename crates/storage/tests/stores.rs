use std::collections::HashMap;

use chrono::NaiveDate;
use domain::ports::{CommentStore, PostStore, StoreError};
use domain::{filter_criteria, Comment, CommentStatus, CriteriaSet, Pagination, Post};
use storage::Db;

async fn db() -> Db {
    Db::new("sqlite::memory:").await.expect("in-memory database")
}

fn post(title: &str, day: u32) -> Post {
    let mut post = Post::new("markdown");
    post.title = title.to_string();
    post.slug = title.to_lowercase().replace(' ', "-");
    post.raw_content = format!("# {title}");
    post.content = format!("<h1>{title}</h1>");
    post.publication_date_start = Some(
        NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap(),
    );
    post
}

fn comment(post_id: i64, status: CommentStatus) -> Comment {
    let mut comment = Comment::new(post_id);
    comment.name = "Ferris".into();
    comment.email = "ferris@example.org".into();
    comment.message = "Hello".into();
    comment.status = Some(status);
    comment
}

fn criteria(pairs: &[(&str, &str)]) -> CriteriaSet {
    let params: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    filter_criteria(&params).unwrap()
}

#[tokio::test]
async fn post_round_trip_keeps_tags_in_order() {
    let db = db().await;
    let mut draft = post("First", 1);
    draft.tags = vec!["rust".into(), "news".into()];

    let saved = PostStore::save(&db, draft).await.unwrap();
    let id = saved.id.expect("id assigned");
    assert!(saved.created_at.is_some());

    let found = PostStore::find(&db, id).await.unwrap().unwrap();
    assert_eq!(found.title, "First");
    assert_eq!(found.tags, vec!["rust".to_string(), "news".to_string()]);
    assert_eq!(found.comments_default_status, CommentStatus::Moderate);
}

#[tokio::test]
async fn insert_defaults_publication_date() {
    let db = db().await;
    let mut draft = post("Undated", 1);
    draft.publication_date_start = None;

    let saved = PostStore::save(&db, draft).await.unwrap();
    assert!(saved.publication_date_start.is_some());
}

#[tokio::test]
async fn update_replaces_fields_and_tags() {
    let db = db().await;
    let mut saved = PostStore::save(&db, post("Draft", 1)).await.unwrap();

    saved.title = "Final".into();
    saved.tags = vec!["release".into()];
    let updated = PostStore::save(&db, saved.clone()).await.unwrap();

    assert_eq!(updated.id, saved.id);
    assert_eq!(updated.title, "Final");
    assert_eq!(updated.tags, vec!["release".to_string()]);
}

#[tokio::test]
async fn updating_missing_post_is_not_found() {
    let db = db().await;
    let mut ghost = post("Ghost", 1);
    ghost.id = Some(404);
    let err = PostStore::save(&db, ghost).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound));
}

#[tokio::test]
async fn paginate_applies_filters_and_order() {
    let db = db().await;
    let mut first = post("First", 1);
    first.tags = vec!["news".into()];
    first.author = Some("alice".into());
    let mut second = post("Second", 2);
    second.tags = vec!["news".into(), "rust".into()];
    let mut hidden = post("Hidden", 3);
    hidden.enabled = false;
    hidden.tags = vec!["news".into()];

    for p in [first, second, hidden] {
        PostStore::save(&db, p).await.unwrap();
    }

    let public = PostStore::paginate(&db, &criteria(&[])).await.unwrap();
    let titles: Vec<_> = public.entries.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, vec!["Second", "First"]);
    assert_eq!(public.total, 2);

    let admin = PostStore::paginate(&db, &criteria(&[("mode", "admin")]))
        .await
        .unwrap();
    assert_eq!(admin.total, 3);

    let disabled = PostStore::paginate(&db, &criteria(&[("enabled", "0")]))
        .await
        .unwrap();
    assert_eq!(disabled.entries.len(), 1);
    assert_eq!(disabled.entries[0].title, "Hidden");

    let tagged = PostStore::paginate(&db, &criteria(&[("tag", "rust")]))
        .await
        .unwrap();
    assert_eq!(tagged.entries.len(), 1);
    assert_eq!(tagged.entries[0].title, "Second");

    let by_author = PostStore::paginate(&db, &criteria(&[("author", "alice")]))
        .await
        .unwrap();
    assert_eq!(by_author.entries.len(), 1);
    assert_eq!(by_author.entries[0].title, "First");
}

#[tokio::test]
async fn paginate_binds_date_predicate() {
    let db = db().await;
    for (title, day) in [("One", 1), ("Two", 2), ("Three", 3)] {
        PostStore::save(&db, post(title, day)).await.unwrap();
    }

    let after = PostStore::paginate(
        &db,
        &criteria(&[("dateQuery", ">"), ("dateValue", "2024-01-02T00:00:00")]),
    )
    .await
    .unwrap();
    assert_eq!(after.total, 2);

    let before = PostStore::paginate(
        &db,
        &criteria(&[("dateQuery", "<"), ("dateValue", "2024-01-02T00:00:00")]),
    )
    .await
    .unwrap();
    assert_eq!(before.total, 1);
    assert_eq!(before.entries[0].title, "One");
}

#[tokio::test]
async fn defaulted_publication_date_matches_equal_query() {
    let db = db().await;
    let mut draft = post("Now", 1);
    draft.publication_date_start = None;
    let saved = PostStore::save(&db, draft).await.unwrap();
    let published = saved.publication_date_start.unwrap();

    let value = published.format("%Y-%m-%dT%H:%M:%S").to_string();
    let equal = criteria(&[("dateQuery", "="), ("dateValue", value.as_str())]);
    let same = PostStore::paginate(&db, &equal).await.unwrap();
    assert_eq!(same.total, 1);
    assert_eq!(same.entries[0].publication_date_start, Some(published));
}

#[tokio::test]
async fn paginate_splits_pages() {
    let db = db().await;
    for day in 1..=5 {
        PostStore::save(&db, post(&format!("Post {day}"), day))
            .await
            .unwrap();
    }

    let page = PostStore::paginate(&db, &criteria(&[("page", "2"), ("count", "2")]))
        .await
        .unwrap();
    assert_eq!(page.page, 2);
    assert_eq!(page.per_page, 2);
    assert_eq!(page.total, 5);
    assert_eq!(page.last_page, 3);
    let titles: Vec<_> = page.entries.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, vec!["Post 3", "Post 2"]);
}

#[tokio::test]
async fn page_far_past_the_end_is_empty() {
    let db = db().await;
    let first = PostStore::save(&db, post("Only", 1)).await.unwrap();
    let post_id = first.id.unwrap();
    PostStore::save(&db, post("Other", 2)).await.unwrap();
    CommentStore::save(&db, comment(post_id, CommentStatus::Valid))
        .await
        .unwrap();

    let far = criteria(&[("page", "4294967295"), ("count", "4294967295")]);
    let page = PostStore::paginate(&db, &far).await.unwrap();
    assert_eq!(page.page, u32::MAX);
    assert_eq!(page.total, 2);
    assert!(page.entries.is_empty());

    let comments = CommentStore::paginate(
        &db,
        post_id,
        Pagination {
            page: u32::MAX,
            count: u32::MAX,
        },
    )
    .await
    .unwrap();
    assert_eq!(comments.total, 1);
    assert!(comments.entries.is_empty());
}

#[tokio::test]
async fn deleting_post_removes_its_comments() {
    let db = db().await;
    let saved = PostStore::save(&db, post("Doomed", 1)).await.unwrap();
    let post_id = saved.id.unwrap();
    let c = CommentStore::save(&db, comment(post_id, CommentStatus::Valid))
        .await
        .unwrap();

    PostStore::delete(&db, &saved).await.unwrap();

    assert!(PostStore::find(&db, post_id).await.unwrap().is_none());
    assert!(CommentStore::find(&db, c.id.unwrap()).await.unwrap().is_none());
    assert!(matches!(
        PostStore::delete(&db, &saved).await.unwrap_err(),
        StoreError::NotFound
    ));
}

#[tokio::test]
async fn comment_save_tracks_valid_count() {
    let db = db().await;
    let saved = PostStore::save(&db, post("Talked about", 1)).await.unwrap();
    let post_id = saved.id.unwrap();

    CommentStore::save(&db, comment(post_id, CommentStatus::Valid))
        .await
        .unwrap();
    let mut pending = CommentStore::save(&db, comment(post_id, CommentStatus::Moderate))
        .await
        .unwrap();

    let reloaded = PostStore::find(&db, post_id).await.unwrap().unwrap();
    assert_eq!(reloaded.comments_count, 1);

    pending.status = Some(CommentStatus::Valid);
    CommentStore::save(&db, pending.clone()).await.unwrap();
    let reloaded = PostStore::find(&db, post_id).await.unwrap().unwrap();
    assert_eq!(reloaded.comments_count, 2);

    CommentStore::delete(&db, &pending).await.unwrap();
    let reloaded = PostStore::find(&db, post_id).await.unwrap().unwrap();
    assert_eq!(reloaded.comments_count, 1);
}

#[tokio::test]
async fn comment_without_status_is_rejected() {
    let db = db().await;
    let saved = PostStore::save(&db, post("Strict", 1)).await.unwrap();
    let mut c = comment(saved.id.unwrap(), CommentStatus::Valid);
    c.status = None;

    let err = CommentStore::save(&db, c).await.unwrap_err();
    assert!(matches!(err, StoreError::InvalidInput(_)));
}

#[tokio::test]
async fn comment_for_missing_post_fails_to_persist() {
    let db = db().await;
    let err = CommentStore::save(&db, comment(999, CommentStatus::Valid))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Persistence(_)));
}

#[tokio::test]
async fn comments_paginate_per_post() {
    let db = db().await;
    let a = PostStore::save(&db, post("A", 1)).await.unwrap().id.unwrap();
    let b = PostStore::save(&db, post("B", 2)).await.unwrap().id.unwrap();

    for _ in 0..3 {
        CommentStore::save(&db, comment(a, CommentStatus::Valid))
            .await
            .unwrap();
    }
    CommentStore::save(&db, comment(b, CommentStatus::Valid))
        .await
        .unwrap();

    let page = CommentStore::paginate(&db, a, Pagination { page: 1, count: 2 })
        .await
        .unwrap();
    assert_eq!(page.total, 3);
    assert_eq!(page.entries.len(), 2);
    assert!(page.entries.iter().all(|c| c.post_id == a));
    assert!(page.entries[0].id > page.entries[1].id);
}
