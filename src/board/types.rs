//! Board post and comment models.

/// A bulletin board post joined with its author's name.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BoardPost {
    pub id: i64,
    pub user_id: i64,
    /// Author display name.
    pub name: String,
    pub title: String,
    pub content: String,
    pub views: i64,
    pub created_at: String,
    pub updated_at: String,
}

/// A comment joined with its author's name.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Comment {
    pub id: i64,
    pub board_id: i64,
    pub user_id: i64,
    /// Author display name.
    pub name: String,
    pub content: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Title and body of a post being written.
#[derive(Debug, Clone)]
pub struct PostDraft {
    pub title: String,
    pub content: String,
}

impl PostDraft {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }
}
