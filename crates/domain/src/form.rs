//! Payload binding and validation for posts and comments.
//!
//! A form copies the fields present in a payload onto a target entity and
//! validates the result. Fields missing from the payload leave the target
//! untouched, so the same form serves create (fresh target) and update
//! (stored target).

use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use url::Url;

use crate::criteria::parse_date_value;
use crate::error::FieldErrors;
use crate::models::{Comment, CommentStatus, Post};

const MAX_LINE_LENGTH: usize = 255;

const BLANK: &str = "This value should not be blank.";
const TOO_LONG: &str = "This value is too long.";

static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s.]+$").expect("email pattern is valid"));

pub trait FormValidator<T, P>: Send + Sync {
    fn bind(&self, target: T, payload: P) -> Result<T, FieldErrors>;
}

/// Status as sent by clients: either the name or the integer code.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum StatusInput {
    Code(i64),
    Name(String),
}

impl StatusInput {
    fn resolve(&self) -> Option<CommentStatus> {
        match self {
            Self::Code(code) => CommentStatus::from_code(*code),
            Self::Name(name) => name.parse().ok(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PostPayload {
    pub title: Option<String>,
    pub slug: Option<String>,
    #[serde(rename = "abstract")]
    pub summary: Option<String>,
    pub raw_content: Option<String>,
    pub content_formatter: Option<String>,
    pub tags: Option<Vec<String>>,
    pub author: Option<String>,
    pub enabled: Option<bool>,
    pub publication_date_start: Option<String>,
    pub comments_enabled: Option<bool>,
    pub comments_close_at: Option<String>,
    pub comments_default_status: Option<StatusInput>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CommentPayload {
    pub name: Option<String>,
    pub email: Option<String>,
    pub url: Option<String>,
    pub message: Option<String>,
    pub status: Option<StatusInput>,
}

pub struct PostForm {
    formatter_ids: Vec<String>,
}

impl PostForm {
    pub fn new(formatter_ids: Vec<String>) -> Self {
        Self { formatter_ids }
    }
}

impl FormValidator<Post, PostPayload> for PostForm {
    fn bind(&self, mut post: Post, payload: PostPayload) -> Result<Post, FieldErrors> {
        let mut errors = FieldErrors::new();

        let title_changed = payload.title.is_some();
        if let Some(title) = payload.title {
            post.title = title.trim().to_string();
        }
        required_line(&mut errors, "title", &post.title);

        match payload.slug.map(|s| s.trim().to_string()) {
            Some(slug) if !slug.is_empty() => {
                if slug::slugify(&slug) != slug {
                    errors.add("slug", "This value is not a valid slug.");
                }
                post.slug = slug;
            }
            _ if title_changed || post.slug.is_empty() => {
                post.slug = slug::slugify(&post.title);
            }
            _ => {}
        }
        if post.slug.is_empty() && !post.title.is_empty() {
            errors.add("slug", "This value is not a valid slug.");
        }

        if let Some(summary) = payload.summary {
            post.summary = summary;
        }

        if let Some(raw_content) = payload.raw_content {
            post.raw_content = raw_content;
        }
        if post.raw_content.trim().is_empty() {
            errors.add("raw_content", BLANK);
        }

        if let Some(formatter) = payload.content_formatter {
            post.content_formatter = formatter.trim().to_string();
        }
        if !self.formatter_ids.contains(&post.content_formatter) {
            errors.add(
                "content_formatter",
                format!("Unknown formatter `{}`.", post.content_formatter),
            );
        }

        if let Some(tags) = payload.tags {
            post.tags = Vec::with_capacity(tags.len());
            for tag in tags {
                let tag = tag.trim();
                if tag.is_empty() || tag.contains(',') || tag.chars().any(char::is_whitespace) {
                    errors.add("tags", format!("Invalid tag `{tag}`."));
                } else if !post.tags.iter().any(|t| t == tag) {
                    post.tags.push(tag.to_string());
                }
            }
        }

        if let Some(author) = payload.author {
            let author = author.trim();
            post.author = (!author.is_empty()).then(|| author.to_string());
        }

        if let Some(enabled) = payload.enabled {
            post.enabled = enabled;
        }
        if let Some(comments_enabled) = payload.comments_enabled {
            post.comments_enabled = comments_enabled;
        }

        if let Some(raw) = payload.publication_date_start {
            post.publication_date_start = optional_date(&mut errors, "publication_date_start", &raw);
        }
        if let Some(raw) = payload.comments_close_at {
            post.comments_close_at = optional_date(&mut errors, "comments_close_at", &raw);
        }

        if let Some(input) = payload.comments_default_status {
            match input.resolve() {
                Some(status) => post.comments_default_status = status,
                None => errors.add("comments_default_status", "Unknown comment status."),
            }
        }

        errors.into_result(post)
    }
}

#[derive(Default)]
pub struct CommentForm;

impl CommentForm {
    pub fn new() -> Self {
        Self
    }
}

impl FormValidator<Comment, CommentPayload> for CommentForm {
    fn bind(&self, mut comment: Comment, payload: CommentPayload) -> Result<Comment, FieldErrors> {
        let mut errors = FieldErrors::new();

        if let Some(name) = payload.name {
            comment.name = name.trim().to_string();
        }
        required_line(&mut errors, "name", &comment.name);

        if let Some(email) = payload.email {
            comment.email = email.trim().to_string();
        }
        if comment.email.is_empty() {
            errors.add("email", BLANK);
        } else if !EMAIL.is_match(&comment.email) {
            errors.add("email", "This value is not a valid email address.");
        }

        if let Some(url) = payload.url {
            let url = url.trim();
            comment.url = (!url.is_empty()).then(|| url.to_string());
        }
        if let Some(url) = comment.url.as_deref() {
            let valid = Url::parse(url)
                .map(|u| matches!(u.scheme(), "http" | "https"))
                .unwrap_or(false);
            if !valid {
                errors.add("url", "This value is not a valid URL.");
            }
        }

        if let Some(message) = payload.message {
            comment.message = message;
        }
        if comment.message.trim().is_empty() {
            errors.add("message", BLANK);
        }

        if let Some(input) = payload.status {
            match input.resolve() {
                Some(status) => comment.status = Some(status),
                None => errors.add("status", "Unknown comment status."),
            }
        }

        errors.into_result(comment)
    }
}

fn required_line(errors: &mut FieldErrors, field: &str, value: &str) {
    if value.is_empty() {
        errors.add(field, BLANK);
    } else if value.chars().count() > MAX_LINE_LENGTH {
        errors.add(field, TOO_LONG);
    }
}

fn optional_date(errors: &mut FieldErrors, field: &str, raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    match parse_date_value(raw) {
        Ok(value) => Some(value),
        Err(_) => {
            errors.add(field, "This value is not a valid datetime.");
            None
        }
    }
}
