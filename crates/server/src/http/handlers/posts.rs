use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Json,
};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use domain::form::{CommentPayload, PostPayload};
use domain::projection::{Group, Projection};
use domain::{Page, PostId};

use crate::endpoints::{Deleted, PostEndpoint};
use crate::http::error::ApiError;

type ApiResult<T> = Result<Json<T>, ApiError>;

pub async fn list_posts(
    State(endpoint): State<Arc<PostEndpoint>>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Page<Value>> {
    let page = endpoint.list(&params).await?;
    Ok(Json(page.map(|post| post.project(Group::Read))))
}

pub async fn get_post(
    State(endpoint): State<Arc<PostEndpoint>>,
    Path(id): Path<PostId>,
) -> ApiResult<Value> {
    let post = endpoint.get(id).await?;
    Ok(Json(post.project(Group::Read)))
}

pub async fn create_post(
    State(endpoint): State<Arc<PostEndpoint>>,
    payload: Result<Json<PostPayload>, JsonRejection>,
) -> ApiResult<Value> {
    let Json(payload) = payload?;
    let post = endpoint.create(payload).await?;
    Ok(Json(post.project(Group::Read)))
}

pub async fn update_post(
    State(endpoint): State<Arc<PostEndpoint>>,
    Path(id): Path<PostId>,
    payload: Result<Json<PostPayload>, JsonRejection>,
) -> ApiResult<Value> {
    let Json(payload) = payload?;
    let post = endpoint.update(id, payload).await?;
    Ok(Json(post.project(Group::Read)))
}

pub async fn delete_post(
    State(endpoint): State<Arc<PostEndpoint>>,
    Path(id): Path<PostId>,
) -> ApiResult<Deleted> {
    Ok(Json(endpoint.delete(id).await?))
}

pub async fn list_post_comments(
    State(endpoint): State<Arc<PostEndpoint>>,
    Path(id): Path<PostId>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Page<Value>> {
    let page = endpoint.list_comments(id, &params).await?;
    Ok(Json(page.map(|comment| comment.project(Group::Read))))
}

pub async fn add_post_comment(
    State(endpoint): State<Arc<PostEndpoint>>,
    Path(id): Path<PostId>,
    payload: Result<Json<CommentPayload>, JsonRejection>,
) -> ApiResult<Value> {
    let Json(payload) = payload?;
    let comment = endpoint.add_comment(id, payload).await?;
    Ok(Json(comment.project(Group::Read)))
}

pub async fn update_post_comment(
    State(endpoint): State<Arc<PostEndpoint>>,
    Path((post_id, comment_id)): Path<(PostId, i64)>,
    payload: Result<Json<CommentPayload>, JsonRejection>,
) -> ApiResult<Value> {
    let Json(payload) = payload?;
    let comment = endpoint.update_comment(post_id, comment_id, payload).await?;
    Ok(Json(comment.project(Group::Read)))
}
