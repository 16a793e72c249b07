//! Output shaping by explicit field groups.
//!
//! `Read` lists what responses expose, `Write` lists what clients may send.
//! Projected values are additionally cut at [`MAX_DEPTH`] levels of nesting.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::models::{Comment, Post};

pub const MAX_DEPTH: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Group {
    Read,
    Write,
}

pub trait Projection: Serialize {
    fn fields(group: Group) -> &'static [&'static str];

    fn project(&self, group: Group) -> Value {
        let value = serde_json::to_value(self).unwrap_or(Value::Null);
        bound_depth(retain_fields(value, Self::fields(group)), MAX_DEPTH)
    }
}

impl Projection for Post {
    fn fields(group: Group) -> &'static [&'static str] {
        match group {
            Group::Read => &[
                "id",
                "title",
                "slug",
                "abstract",
                "raw_content",
                "content",
                "content_formatter",
                "tags",
                "author",
                "enabled",
                "publication_date_start",
                "comments_enabled",
                "comments_close_at",
                "comments_default_status",
                "comments_count",
                "created_at",
                "updated_at",
            ],
            Group::Write => &[
                "title",
                "slug",
                "abstract",
                "raw_content",
                "content_formatter",
                "tags",
                "author",
                "enabled",
                "publication_date_start",
                "comments_enabled",
                "comments_close_at",
                "comments_default_status",
            ],
        }
    }
}

impl Projection for Comment {
    fn fields(group: Group) -> &'static [&'static str] {
        match group {
            Group::Read => &[
                "id",
                "post_id",
                "name",
                "url",
                "message",
                "status",
                "created_at",
                "updated_at",
            ],
            Group::Write => &["name", "email", "url", "message", "status"],
        }
    }
}

fn retain_fields(value: Value, fields: &[&str]) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(key, _)| fields.contains(&key.as_str()))
                .collect::<Map<String, Value>>(),
        ),
        other => other,
    }
}

/// Replaces every container nested deeper than `max_depth` with `null`.
/// The top-level value sits at depth 1.
pub fn bound_depth(value: Value, max_depth: usize) -> Value {
    fn walk(value: Value, depth: usize, max_depth: usize) -> Value {
        match value {
            Value::Object(_) | Value::Array(_) if depth > max_depth => Value::Null,
            Value::Object(map) => Value::Object(
                map.into_iter()
                    .map(|(k, v)| (k, walk(v, depth + 1, max_depth)))
                    .collect(),
            ),
            Value::Array(items) => Value::Array(
                items
                    .into_iter()
                    .map(|v| walk(v, depth + 1, max_depth))
                    .collect(),
            ),
            scalar => scalar,
        }
    }
    walk(value, 1, max_depth)
}
