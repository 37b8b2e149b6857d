//! Comment repository.

use super::types::Comment;
use crate::db::DbPool;
use crate::{Result, StoreLensError};

/// Repository for comment CRUD operations.
pub struct CommentRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> CommentRepository<'a> {
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, board_id: i64, user_id: i64, content: &str) -> Result<i64> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO comments (board_id, user_id, content) VALUES (?, ?, ?) RETURNING id",
        )
        .bind(board_id)
        .bind(user_id)
        .bind(content)
        .fetch_one(self.pool)
        .await
        .map_err(|e| StoreLensError::Database(e.to_string()))?;
        Ok(id)
    }

    /// Comments of a post, newest first.
    pub async fn list_by_board(&self, board_id: i64) -> Result<Vec<Comment>> {
        let comments = sqlx::query_as::<_, Comment>(
            "SELECT c.id, c.board_id, c.user_id, u.name, c.content, c.created_at, c.updated_at
             FROM comments c JOIN users u ON u.id = c.user_id
             WHERE c.board_id = ?
             ORDER BY c.id DESC",
        )
        .bind(board_id)
        .fetch_all(self.pool)
        .await
        .map_err(|e| StoreLensError::Database(e.to_string()))?;
        Ok(comments)
    }

    /// Author of a comment, if it exists.
    pub async fn author_of(&self, id: i64) -> Result<Option<i64>> {
        let author: Option<i64> = sqlx::query_scalar("SELECT user_id FROM comments WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool)
            .await
            .map_err(|e| StoreLensError::Database(e.to_string()))?;
        Ok(author)
    }

    pub async fn update(&self, id: i64, content: &str) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE comments SET content = ?, updated_at = datetime('now') WHERE id = ?",
        )
        .bind(content)
        .bind(id)
        .execute(self.pool)
        .await
        .map_err(|e| StoreLensError::Database(e.to_string()))?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM comments WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| StoreLensError::Database(e.to_string()))?;
        Ok(result.rows_affected() > 0)
    }
}
