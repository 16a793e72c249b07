//! In-memory collaborators for endpoint tests.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use adapter::{FormatterPool, MARKDOWN};
use domain::form::{CommentForm, PostForm};
use domain::ports::{CommentStore, ContentFormatter, Mailer, NotifyError, PostStore, StoreError};
use domain::{
    Comment, CommentId, CommentNotification, CommentStatus, CriteriaSet, Page, Pagination, Post,
    PostId,
};

use super::{CommentEndpoint, PostEndpoint, PostServices};

struct Table<T> {
    rows: BTreeMap<i64, T>,
    next_id: i64,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl<T> Table<T> {
    fn allocate(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

#[derive(Default)]
pub struct MemoryPosts {
    table: Mutex<Table<Post>>,
    last_criteria: Mutex<Option<CriteriaSet>>,
    delete_failure: Mutex<Option<String>>,
}

impl MemoryPosts {
    pub fn len(&self) -> usize {
        self.table.lock().unwrap().rows.len()
    }

    pub fn last_criteria(&self) -> Option<CriteriaSet> {
        self.last_criteria.lock().unwrap().clone()
    }

    pub fn fail_deletes(&self, message: &str) {
        *self.delete_failure.lock().unwrap() = Some(message.to_string());
    }

    fn insert(&self, mut post: Post) -> Post {
        let mut table = self.table.lock().unwrap();
        let id = match post.id {
            Some(id) => id,
            None => table.allocate(),
        };
        post.id = Some(id);
        table.rows.insert(id, post.clone());
        post
    }
}

#[async_trait]
impl PostStore for MemoryPosts {
    async fn find(&self, id: PostId) -> Result<Option<Post>, StoreError> {
        Ok(self.table.lock().unwrap().rows.get(&id).cloned())
    }

    async fn save(&self, post: Post) -> Result<Post, StoreError> {
        Ok(self.insert(post))
    }

    async fn delete(&self, post: &Post) -> Result<(), StoreError> {
        if let Some(message) = self.delete_failure.lock().unwrap().clone() {
            return Err(StoreError::Persistence(message));
        }
        let id = post.id.ok_or(StoreError::NotFound)?;
        self.table
            .lock()
            .unwrap()
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }

    async fn paginate(&self, criteria: &CriteriaSet) -> Result<Page<Post>, StoreError> {
        *self.last_criteria.lock().unwrap() = Some(criteria.clone());
        let entries: Vec<Post> = self.table.lock().unwrap().rows.values().cloned().collect();
        let total = entries.len() as u64;
        Ok(Page::new(entries, criteria.page, criteria.count, total))
    }
}

#[derive(Default)]
pub struct MemoryComments {
    table: Mutex<Table<Comment>>,
    delete_failure: Mutex<Option<String>>,
}

impl MemoryComments {
    pub fn len(&self) -> usize {
        self.table.lock().unwrap().rows.len()
    }

    pub fn fail_deletes(&self, message: &str) {
        *self.delete_failure.lock().unwrap() = Some(message.to_string());
    }
}

#[async_trait]
impl CommentStore for MemoryComments {
    async fn find(&self, id: CommentId) -> Result<Option<Comment>, StoreError> {
        Ok(self.table.lock().unwrap().rows.get(&id).cloned())
    }

    async fn save(&self, mut comment: Comment) -> Result<Comment, StoreError> {
        if comment.status.is_none() {
            return Err(StoreError::InvalidInput("comment status is required".into()));
        }
        let mut table = self.table.lock().unwrap();
        let id = match comment.id {
            Some(id) => id,
            None => table.allocate(),
        };
        comment.id = Some(id);
        table.rows.insert(id, comment.clone());
        Ok(comment)
    }

    async fn delete(&self, comment: &Comment) -> Result<(), StoreError> {
        if let Some(message) = self.delete_failure.lock().unwrap().clone() {
            return Err(StoreError::Persistence(message));
        }
        let id = comment.id.ok_or(StoreError::NotFound)?;
        self.table
            .lock()
            .unwrap()
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }

    async fn paginate(
        &self,
        post_id: PostId,
        pagination: Pagination,
    ) -> Result<Page<Comment>, StoreError> {
        let matching: Vec<Comment> = self
            .table
            .lock()
            .unwrap()
            .rows
            .values()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect();
        let total = matching.len() as u64;
        let entries = matching
            .into_iter()
            .skip(pagination.offset() as usize)
            .take(pagination.count as usize)
            .collect();
        Ok(Page::new(entries, pagination.page, pagination.count, total))
    }
}

#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<Option<CommentId>>>,
    failing: AtomicBool,
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<Option<CommentId>> {
        self.sent.lock().unwrap().clone()
    }

    pub fn fail(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }
}

impl Mailer for RecordingMailer {
    fn notify_new_comment(&self, notification: CommentNotification) -> Result<(), NotifyError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(NotifyError::Closed);
        }
        self.sent.lock().unwrap().push(notification.comment.id);
        Ok(())
    }
}

pub struct Fixture {
    pub posts: Arc<MemoryPosts>,
    pub comments: Arc<MemoryComments>,
    pub mailer: Arc<RecordingMailer>,
    formatter: Arc<FormatterPool>,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            posts: Arc::default(),
            comments: Arc::default(),
            mailer: Arc::default(),
            formatter: Arc::new(FormatterPool::new()),
        }
    }

    pub fn posts_endpoint(&self) -> PostEndpoint {
        PostEndpoint::new(PostServices {
            posts: self.posts.clone(),
            comments: self.comments.clone(),
            mailer: self.mailer.clone(),
            post_form: Arc::new(PostForm::new(self.formatter.formatter_ids())),
            comment_form: Arc::new(CommentForm::new()),
            formatter: self.formatter.clone(),
            default_formatter: MARKDOWN.to_string(),
        })
    }

    pub fn comments_endpoint(&self) -> CommentEndpoint {
        CommentEndpoint::new(self.comments.clone())
    }

    pub fn seed_post(&self, customize: impl FnOnce(&mut Post)) -> PostId {
        let mut post = Post::new(MARKDOWN);
        post.title = "Seeded".into();
        post.slug = "seeded".into();
        post.raw_content = "seeded".into();
        customize(&mut post);
        self.posts.insert(post).id.expect("id assigned")
    }

    pub fn seed_comment(&self, post_id: PostId) -> CommentId {
        let mut comment = Comment::new(post_id);
        comment.name = "Seed".into();
        comment.email = "seed@example.org".into();
        comment.message = "seeded".into();
        comment.status = Some(CommentStatus::Moderate);

        let mut table = self.comments.table.lock().unwrap();
        let id = table.allocate();
        comment.id = Some(id);
        table.rows.insert(id, comment);
        id
    }
}
