pub mod criteria;
mod error;
mod events;
pub mod form;
mod models;
pub mod ports;
pub mod projection;

pub use criteria::{
    filter_criteria, CriteriaSet, DateOp, DatePredicate, ListMode, Pagination, PostFilters,
};
pub use error::{CriteriaError, FieldErrors};
pub use events::CommentNotification;
pub use models::{Comment, CommentId, CommentStatus, Page, Post, PostId};
