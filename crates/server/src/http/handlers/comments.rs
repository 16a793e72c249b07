use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::Value;
use std::sync::Arc;

use domain::projection::{Group, Projection};
use domain::CommentId;

use crate::endpoints::{CommentEndpoint, Deleted};
use crate::http::error::ApiError;

pub async fn get_comment(
    State(endpoint): State<Arc<CommentEndpoint>>,
    Path(id): Path<CommentId>,
) -> Result<Json<Value>, ApiError> {
    let comment = endpoint.get(id).await?;
    Ok(Json(comment.project(Group::Read)))
}

pub async fn delete_comment(
    State(endpoint): State<Arc<CommentEndpoint>>,
    Path(id): Path<CommentId>,
) -> Result<Json<Deleted>, ApiError> {
    Ok(Json(endpoint.delete(id).await?))
}
