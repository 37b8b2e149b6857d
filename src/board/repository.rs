//! Board post repository.

use super::types::{BoardPost, PostDraft};
use crate::db::{DbPool, PAGE_SIZE};
use crate::{Result, StoreLensError};

const POST_SELECT: &str = "SELECT b.id, b.user_id, u.name, b.title, b.content, b.views,
        b.created_at, b.updated_at
     FROM boards b JOIN users u ON u.id = b.user_id";

/// Repository for board post CRUD operations.
pub struct BoardRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> BoardRepository<'a> {
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Insert a post and return its ID.
    pub async fn create(&self, user_id: i64, draft: &PostDraft) -> Result<i64> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO boards (user_id, title, content) VALUES (?, ?, ?) RETURNING id",
        )
        .bind(user_id)
        .bind(&draft.title)
        .bind(&draft.content)
        .fetch_one(self.pool)
        .await
        .map_err(|e| StoreLensError::Database(e.to_string()))?;
        Ok(id)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<BoardPost>> {
        let sql = format!("{POST_SELECT} WHERE b.id = ?");
        let post = sqlx::query_as::<_, BoardPost>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await
            .map_err(|e| StoreLensError::Database(e.to_string()))?;
        Ok(post)
    }

    /// Author of a post, if it exists.
    pub async fn author_of(&self, id: i64) -> Result<Option<i64>> {
        let author: Option<i64> = sqlx::query_scalar("SELECT user_id FROM boards WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool)
            .await
            .map_err(|e| StoreLensError::Database(e.to_string()))?;
        Ok(author)
    }

    pub async fn exists(&self, id: i64) -> Result<bool> {
        Ok(self.author_of(id).await?.is_some())
    }

    /// Increment the view counter and return the post as stored afterwards.
    pub async fn view(&self, id: i64) -> Result<Option<BoardPost>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StoreLensError::Database(e.to_string()))?;

        let updated = sqlx::query("UPDATE boards SET views = views + 1 WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| StoreLensError::Database(e.to_string()))?;
        if updated.rows_affected() == 0 {
            return Ok(None);
        }

        let sql = format!("{POST_SELECT} WHERE b.id = ?");
        let post = sqlx::query_as::<_, BoardPost>(&sql)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| StoreLensError::Database(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| StoreLensError::Database(e.to_string()))?;
        Ok(post)
    }

    /// One page of posts, newest first.
    pub async fn list(&self, offset: i64) -> Result<Vec<BoardPost>> {
        let sql = format!("{POST_SELECT} ORDER BY b.id DESC LIMIT ? OFFSET ?");
        let posts = sqlx::query_as::<_, BoardPost>(&sql)
            .bind(PAGE_SIZE)
            .bind(offset)
            .fetch_all(self.pool)
            .await
            .map_err(|e| StoreLensError::Database(e.to_string()))?;
        Ok(posts)
    }

    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM boards")
            .fetch_one(self.pool)
            .await
            .map_err(|e| StoreLensError::Database(e.to_string()))?;
        Ok(count)
    }

    pub async fn update(&self, id: i64, draft: &PostDraft) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE boards SET title = ?, content = ?, updated_at = datetime('now') WHERE id = ?",
        )
        .bind(&draft.title)
        .bind(&draft.content)
        .bind(id)
        .execute(self.pool)
        .await
        .map_err(|e| StoreLensError::Database(e.to_string()))?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a post and, through the foreign key, its comments.
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM boards WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| StoreLensError::Database(e.to_string()))?;
        Ok(result.rows_affected() > 0)
    }
}
