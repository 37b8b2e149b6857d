//! Notice service. Reading is public; writing is admin only.

use tracing::info;

use super::repository::{Notice, NoticeRepository};
use crate::board::{validate_draft, PostDraft};
use crate::db::{page_count, page_offset, Database, UserRepository};
use crate::{ErrorMessage, Result, StoreLensError};

pub struct NoticeService<'a> {
    db: &'a Database,
}

impl<'a> NoticeService<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    fn repo(&self) -> NoticeRepository<'_> {
        NoticeRepository::new(self.db.pool())
    }

    /// Fails with `ERR_NOT_ALLOWED_USER` unless the user is an admin.
    ///
    /// The role is read from the database so a demotion applies at once.
    pub async fn verify_admin(&self, user_id: i64) -> Result<()> {
        let user = UserRepository::new(self.db.pool())
            .get_by_id(user_id)
            .await?
            .ok_or(StoreLensError::NotFound(ErrorMessage::ErrNotFoundUser))?;

        if !user.is_admin() {
            return Err(StoreLensError::Unauthorized(ErrorMessage::ErrNotAllowedUser));
        }
        Ok(())
    }

    pub async fn create(&self, user_id: i64, draft: &PostDraft) -> Result<i64> {
        self.verify_admin(user_id).await?;
        validate_draft(draft)?;

        let id = self.repo().create(user_id, draft).await?;
        info!(user_id, notice_id = id, "notice created");
        Ok(id)
    }

    /// Fetch a notice, counting the view.
    pub async fn get(&self, notice_id: i64) -> Result<Notice> {
        self.repo()
            .view(notice_id)
            .await?
            .ok_or(StoreLensError::NotFound(ErrorMessage::ErrNoticeNotFound))
    }

    pub async fn list_page(&self, page: i64) -> Result<Vec<Notice>> {
        let offset = page_offset(page)?;
        self.repo().list(offset).await
    }

    pub async fn page_count(&self) -> Result<i64> {
        Ok(page_count(self.repo().count().await?))
    }

    pub async fn update(&self, user_id: i64, notice_id: i64, draft: &PostDraft) -> Result<()> {
        self.verify_admin(user_id).await?;
        validate_draft(draft)?;

        if !self.repo().update(notice_id, draft).await? {
            return Err(StoreLensError::NotFound(ErrorMessage::ErrNoticeNotFound));
        }
        Ok(())
    }

    pub async fn delete(&self, user_id: i64, notice_id: i64) -> Result<()> {
        self.verify_admin(user_id).await?;

        if !self.repo().delete(notice_id).await? {
            return Err(StoreLensError::NotFound(ErrorMessage::ErrNoticeNotFound));
        }
        info!(user_id, notice_id, "notice deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{NewUser, Role};

    async fn setup() -> (Database, i64, i64) {
        let db = Database::open_in_memory().await.unwrap();
        let repo = UserRepository::new(db.pool());
        let admin = repo
            .create(&NewUser::new("admin@example.com", "admin", "hash").with_role(Role::Admin))
            .await
            .unwrap();
        let user = repo
            .create(&NewUser::new("user@example.com", "user", "hash"))
            .await
            .unwrap();
        (db, admin.id, user.id)
    }

    #[tokio::test]
    async fn test_verify_admin() {
        let (db, admin, user) = setup().await;
        let service = NoticeService::new(&db);

        assert!(service.verify_admin(admin).await.is_ok());
        let err = service.verify_admin(user).await.unwrap_err();
        assert!(matches!(
            err,
            StoreLensError::Unauthorized(ErrorMessage::ErrNotAllowedUser)
        ));
    }

    #[tokio::test]
    async fn test_create_admin_only() {
        let (db, admin, user) = setup().await;
        let service = NoticeService::new(&db);

        let err = service
            .create(user, &PostDraft::new("t", "c"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorMessage::ErrNotAllowedUser);

        let id = service
            .create(admin, &PostDraft::new("Notice", "Body"))
            .await
            .unwrap();
        let notice = service.get(id).await.unwrap();
        assert_eq!(notice.title, "Notice");
        assert_eq!(notice.views, 1);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let (db, admin, user) = setup().await;
        let service = NoticeService::new(&db);
        let id = service
            .create(admin, &PostDraft::new("t", "c"))
            .await
            .unwrap();

        let err = service
            .update(user, id, &PostDraft::new("x", "y"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorMessage::ErrNotAllowedUser);

        service
            .update(admin, id, &PostDraft::new("edited", "y"))
            .await
            .unwrap();
        assert_eq!(service.get(id).await.unwrap().title, "edited");

        let err = service.delete(user, id).await.unwrap_err();
        assert_eq!(err.code(), ErrorMessage::ErrNotAllowedUser);
        service.delete(admin, id).await.unwrap();

        let err = service.get(id).await.unwrap_err();
        assert_eq!(err.code(), ErrorMessage::ErrNoticeNotFound);
        let err = service.delete(admin, id).await.unwrap_err();
        assert_eq!(err.code(), ErrorMessage::ErrNoticeNotFound);
    }

    #[tokio::test]
    async fn test_pages() {
        let (db, admin, _) = setup().await;
        let service = NoticeService::new(&db);
        for i in 0..21 {
            service
                .create(admin, &PostDraft::new(format!("n{i}"), "c"))
                .await
                .unwrap();
        }
        assert_eq!(service.page_count().await.unwrap(), 3);
        let first = service.list_page(1).await.unwrap();
        assert_eq!(first[0].title, "n20");
        assert_eq!(service.list_page(3).await.unwrap().len(), 1);
    }
}
