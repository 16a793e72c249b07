use chrono::NaiveDateTime;
use domain::{ports::StoreError, Comment, CommentStatus, Post};
use sqlx::FromRow;

pub const POST_SELECT: &str = r#"
    SELECT
        p.id, p.title, p.slug, p.abstract, p.raw_content, p.content,
        p.content_formatter, p.author, p.enabled, p.publication_date_start,
        p.comments_enabled, p.comments_close_at, p.comments_default_status,
        p.comments_count, p.created_at, p.updated_at
    FROM posts p
"#;

pub const COMMENT_SELECT: &str = r#"
    SELECT
        c.id, c.post_id, c.name, c.email, c.url, c.message, c.status,
        c.created_at, c.updated_at
    FROM comments c
"#;

#[derive(FromRow)]
pub struct SqlPost {
    pub id: i64,
    pub title: String,
    pub slug: String,
    #[sqlx(rename = "abstract")]
    pub summary: String,
    pub raw_content: String,
    pub content: String,
    pub content_formatter: String,
    pub author: Option<String>,
    pub enabled: bool,
    pub publication_date_start: Option<NaiveDateTime>,
    pub comments_enabled: bool,
    pub comments_close_at: Option<NaiveDateTime>,
    pub comments_default_status: i64,
    pub comments_count: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl SqlPost {
    pub fn into_post(self, tags: Vec<String>) -> Result<Post, StoreError> {
        let comments_default_status = status_from_code(self.comments_default_status)?;
        Ok(Post {
            id: Some(self.id),
            title: self.title,
            slug: self.slug,
            summary: self.summary,
            raw_content: self.raw_content,
            content: self.content,
            content_formatter: self.content_formatter,
            tags,
            author: self.author,
            enabled: self.enabled,
            publication_date_start: self.publication_date_start,
            comments_enabled: self.comments_enabled,
            comments_close_at: self.comments_close_at,
            comments_default_status,
            comments_count: self.comments_count,
            created_at: Some(self.created_at),
            updated_at: Some(self.updated_at),
        })
    }
}

#[derive(FromRow)]
pub struct SqlComment {
    pub id: i64,
    pub post_id: i64,
    pub name: String,
    pub email: String,
    pub url: Option<String>,
    pub message: String,
    pub status: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<SqlComment> for Comment {
    type Error = StoreError;

    fn try_from(sql: SqlComment) -> Result<Self, Self::Error> {
        Ok(Comment {
            id: Some(sql.id),
            post_id: sql.post_id,
            name: sql.name,
            email: sql.email,
            url: sql.url,
            message: sql.message,
            status: Some(status_from_code(sql.status)?),
            created_at: Some(sql.created_at),
            updated_at: Some(sql.updated_at),
        })
    }
}

fn status_from_code(code: i64) -> Result<CommentStatus, StoreError> {
    CommentStatus::from_code(code)
        .ok_or_else(|| StoreError::Persistence(format!("unknown comment status code {code}")))
}
