//! Board module for StoreLens.
//!
//! A single bulletin board with paginated posts and per-post comments.

mod comment_repository;
mod repository;
mod service;
mod types;

pub use comment_repository::CommentRepository;
pub use repository::BoardRepository;
pub use service::{
    BoardService, CommentService, MAX_BODY_LENGTH, MAX_COMMENT_LENGTH, MAX_TITLE_LENGTH,
};
pub(crate) use service::validate_draft;
pub use types::{BoardPost, Comment, PostDraft};
