//! Notice repository.

use crate::board::PostDraft;
use crate::db::{DbPool, PAGE_SIZE};
use crate::{Result, StoreLensError};

/// A notice. The author may have been deleted, leaving no name.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Notice {
    pub id: i64,
    pub user_id: Option<i64>,
    pub name: Option<String>,
    pub title: String,
    pub content: String,
    pub views: i64,
    pub created_at: String,
    pub updated_at: String,
}

const NOTICE_SELECT: &str = "SELECT n.id, n.user_id, u.name, n.title, n.content, n.views,
        n.created_at, n.updated_at
     FROM notices n LEFT JOIN users u ON u.id = n.user_id";

/// Repository for notice CRUD operations.
pub struct NoticeRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> NoticeRepository<'a> {
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, user_id: i64, draft: &PostDraft) -> Result<i64> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO notices (user_id, title, content) VALUES (?, ?, ?) RETURNING id",
        )
        .bind(user_id)
        .bind(&draft.title)
        .bind(&draft.content)
        .fetch_one(self.pool)
        .await
        .map_err(|e| StoreLensError::Database(e.to_string()))?;
        Ok(id)
    }

    /// Increment the view counter and return the notice afterwards.
    pub async fn view(&self, id: i64) -> Result<Option<Notice>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StoreLensError::Database(e.to_string()))?;

        let updated = sqlx::query("UPDATE notices SET views = views + 1 WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| StoreLensError::Database(e.to_string()))?;
        if updated.rows_affected() == 0 {
            return Ok(None);
        }

        let sql = format!("{NOTICE_SELECT} WHERE n.id = ?");
        let notice = sqlx::query_as::<_, Notice>(&sql)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| StoreLensError::Database(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| StoreLensError::Database(e.to_string()))?;
        Ok(notice)
    }

    /// One page of notices, newest first.
    pub async fn list(&self, offset: i64) -> Result<Vec<Notice>> {
        let sql = format!("{NOTICE_SELECT} ORDER BY n.id DESC LIMIT ? OFFSET ?");
        let notices = sqlx::query_as::<_, Notice>(&sql)
            .bind(PAGE_SIZE)
            .bind(offset)
            .fetch_all(self.pool)
            .await
            .map_err(|e| StoreLensError::Database(e.to_string()))?;
        Ok(notices)
    }

    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM notices")
            .fetch_one(self.pool)
            .await
            .map_err(|e| StoreLensError::Database(e.to_string()))?;
        Ok(count)
    }

    pub async fn update(&self, id: i64, draft: &PostDraft) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE notices SET title = ?, content = ?, updated_at = datetime('now') WHERE id = ?",
        )
        .bind(&draft.title)
        .bind(&draft.content)
        .bind(id)
        .execute(self.pool)
        .await
        .map_err(|e| StoreLensError::Database(e.to_string()))?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM notices WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| StoreLensError::Database(e.to_string()))?;
        Ok(result.rows_affected() > 0)
    }
}
