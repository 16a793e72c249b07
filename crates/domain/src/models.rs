use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub type PostId = i64;
pub type CommentId = i64;

/// Moderation state of a comment. The integer codes are what the store persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentStatus {
    Invalid,
    Valid,
    #[default]
    Moderate,
}

impl CommentStatus {
    pub fn code(self) -> i64 {
        match self {
            Self::Invalid => 0,
            Self::Valid => 1,
            Self::Moderate => 2,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Invalid),
            1 => Some(Self::Valid),
            2 => Some(Self::Moderate),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Invalid => "invalid",
            Self::Valid => "valid",
            Self::Moderate => "moderate",
        }
    }
}

impl FromStr for CommentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "invalid" | "0" => Ok(Self::Invalid),
            "valid" | "1" => Ok(Self::Valid),
            "moderate" | "2" => Ok(Self::Moderate),
            other => Err(format!("unknown comment status `{other}`")),
        }
    }
}

impl fmt::Display for CommentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: Option<PostId>,
    pub title: String,
    pub slug: String,
    #[serde(rename = "abstract")]
    pub summary: String,
    pub raw_content: String,
    pub content: String,
    pub content_formatter: String,
    pub tags: Vec<String>,
    pub author: Option<String>,
    pub enabled: bool,
    pub publication_date_start: Option<NaiveDateTime>,
    pub comments_enabled: bool,
    pub comments_close_at: Option<NaiveDateTime>,
    pub comments_default_status: CommentStatus,
    pub comments_count: i64,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

impl Post {
    /// A blank, unsaved post. Forms bind onto this when creating.
    pub fn new(content_formatter: impl Into<String>) -> Self {
        Self {
            id: None,
            title: String::new(),
            slug: String::new(),
            summary: String::new(),
            raw_content: String::new(),
            content: String::new(),
            content_formatter: content_formatter.into(),
            tags: Vec::new(),
            author: None,
            enabled: true,
            publication_date_start: None,
            comments_enabled: true,
            comments_close_at: None,
            comments_default_status: CommentStatus::Moderate,
            comments_count: 0,
            created_at: None,
            updated_at: None,
        }
    }

    /// A post accepts comments only while it is enabled, has comments switched
    /// on, and the optional close date lies in the future.
    pub fn is_commentable(&self, now: NaiveDateTime) -> bool {
        if !self.enabled || !self.comments_enabled {
            return false;
        }
        match self.comments_close_at {
            Some(close_at) => close_at > now,
            None => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Option<CommentId>,
    pub post_id: PostId,
    pub name: String,
    pub email: String,
    pub url: Option<String>,
    pub message: String,
    /// `None` only while a new comment is being bound; the store refuses to
    /// persist a comment without a status.
    pub status: Option<CommentStatus>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

impl Comment {
    pub fn new(post_id: PostId) -> Self {
        Self {
            id: None,
            post_id,
            name: String::new(),
            email: String::new(),
            url: None,
            message: String::new(),
            status: None,
            created_at: None,
            updated_at: None,
        }
    }
}

/// One page of a paginated listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub page: u32,
    pub per_page: u32,
    pub total: u64,
    pub last_page: u32,
    pub entries: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(entries: Vec<T>, page: u32, per_page: u32, total: u64) -> Self {
        let per_page = per_page.max(1);
        let last_page = total.div_ceil(u64::from(per_page)).max(1);
        Self {
            page,
            per_page,
            total,
            last_page: u32::try_from(last_page).unwrap_or(u32::MAX),
            entries,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            page: self.page,
            per_page: self.per_page,
            total: self.total,
            last_page: self.last_page,
            entries: self.entries.into_iter().map(f).collect(),
        }
    }
}
