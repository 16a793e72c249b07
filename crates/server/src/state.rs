use axum::extract::FromRef;
use domain::form::{CommentForm, PostForm};
use domain::ports::{CommentStore, ContentFormatter, Mailer, PostStore};
use std::sync::Arc;

use crate::endpoints::{CommentEndpoint, PostEndpoint, PostServices};

#[derive(Clone)]
pub struct AppState {
    pub posts: Arc<PostEndpoint>,
    pub comments: Arc<CommentEndpoint>,
}

impl AppState {
    /// Wires both endpoints onto one store that serves posts and comments.
    pub fn new<S>(
        store: Arc<S>,
        mailer: Arc<dyn Mailer>,
        formatter: Arc<dyn ContentFormatter>,
        default_formatter: String,
    ) -> Self
    where
        S: PostStore + CommentStore + 'static,
    {
        let posts = PostEndpoint::new(PostServices {
            posts: store.clone(),
            comments: store.clone(),
            mailer,
            post_form: Arc::new(PostForm::new(formatter.formatter_ids())),
            comment_form: Arc::new(CommentForm::new()),
            formatter,
            default_formatter,
        });
        let comments = CommentEndpoint::new(store);

        Self {
            posts: Arc::new(posts),
            comments: Arc::new(comments),
        }
    }
}

impl FromRef<AppState> for Arc<PostEndpoint> {
    fn from_ref(state: &AppState) -> Self {
        state.posts.clone()
    }
}

impl FromRef<AppState> for Arc<CommentEndpoint> {
    fn from_ref(state: &AppState) -> Self {
        state.comments.clone()
    }
}
