//! Notices: admin-authored announcements.

mod repository;
mod service;

pub use repository::{Notice, NoticeRepository};
pub use service::NoticeService;
