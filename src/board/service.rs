//! Board and comment services.
//!
//! Ownership rules: authors may edit their own posts and comments; authors
//! and admins may delete them.

use tracing::info;

use super::comment_repository::CommentRepository;
use super::repository::BoardRepository;
use super::types::{BoardPost, Comment, PostDraft};
use crate::db::{page_count, page_offset, Database, Role};
use crate::{ErrorMessage, Result, StoreLensError};

/// Maximum length for post titles (in characters).
pub const MAX_TITLE_LENGTH: usize = 50;

/// Maximum length for post bodies (in characters).
pub const MAX_BODY_LENGTH: usize = 10_000;

/// Maximum length for comments (in characters).
pub const MAX_COMMENT_LENGTH: usize = 1_000;

fn validate_text(text: &str, max: usize) -> Result<()> {
    if text.trim().is_empty() || text.chars().count() > max {
        return Err(StoreLensError::BadRequest(
            ErrorMessage::ErrInvalidRequestField,
        ));
    }
    Ok(())
}

/// Validate a post's title and body; shared with notices.
pub(crate) fn validate_draft(draft: &PostDraft) -> Result<()> {
    validate_text(&draft.title, MAX_TITLE_LENGTH)?;
    validate_text(&draft.content, MAX_BODY_LENGTH)
}

fn not_allowed() -> StoreLensError {
    StoreLensError::Unauthorized(ErrorMessage::ErrNotAllowedUser)
}

/// Service for bulletin board posts.
pub struct BoardService<'a> {
    db: &'a Database,
}

impl<'a> BoardService<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    fn repo(&self) -> BoardRepository<'_> {
        BoardRepository::new(self.db.pool())
    }

    /// Posts on a 1-based page, newest first.
    pub async fn list_page(&self, page: i64) -> Result<Vec<BoardPost>> {
        let offset = page_offset(page)?;
        self.repo().list(offset).await
    }

    pub async fn page_count(&self) -> Result<i64> {
        Ok(page_count(self.repo().count().await?))
    }

    /// Fetch a post, counting the view.
    pub async fn get(&self, board_id: i64) -> Result<BoardPost> {
        self.repo()
            .view(board_id)
            .await?
            .ok_or(StoreLensError::NotFound(ErrorMessage::ErrBoardNotFound))
    }

    pub async fn create(&self, user_id: i64, draft: &PostDraft) -> Result<i64> {
        validate_draft(draft)?;
        let id = self.repo().create(user_id, draft).await?;
        info!(user_id, board_id = id, "board post created");
        Ok(id)
    }

    pub async fn update(&self, user_id: i64, board_id: i64, draft: &PostDraft) -> Result<()> {
        validate_draft(draft)?;
        let repo = self.repo();

        let author = repo
            .author_of(board_id)
            .await?
            .ok_or(StoreLensError::NotFound(ErrorMessage::ErrBoardNotFound))?;
        if author != user_id {
            return Err(not_allowed());
        }

        repo.update(board_id, draft).await?;
        Ok(())
    }

    pub async fn delete(&self, user_id: i64, role: Role, board_id: i64) -> Result<()> {
        let repo = self.repo();

        let author = repo
            .author_of(board_id)
            .await?
            .ok_or(StoreLensError::NotFound(ErrorMessage::ErrBoardNotFound))?;
        if author != user_id && !role.is_admin() {
            return Err(not_allowed());
        }

        repo.delete(board_id).await?;
        info!(user_id, board_id, "board post deleted");
        Ok(())
    }
}

/// Service for comments on board posts.
pub struct CommentService<'a> {
    db: &'a Database,
}

impl<'a> CommentService<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    fn repo(&self) -> CommentRepository<'_> {
        CommentRepository::new(self.db.pool())
    }

    async fn ensure_board(&self, board_id: i64) -> Result<()> {
        if !BoardRepository::new(self.db.pool()).exists(board_id).await? {
            return Err(StoreLensError::NotFound(ErrorMessage::ErrBoardNotFound));
        }
        Ok(())
    }

    pub async fn list(&self, board_id: i64) -> Result<Vec<Comment>> {
        self.ensure_board(board_id).await?;
        self.repo().list_by_board(board_id).await
    }

    pub async fn create(&self, user_id: i64, board_id: i64, content: &str) -> Result<i64> {
        validate_text(content, MAX_COMMENT_LENGTH)?;
        self.ensure_board(board_id).await?;
        self.repo().create(board_id, user_id, content).await
    }

    pub async fn update(&self, user_id: i64, comment_id: i64, content: &str) -> Result<()> {
        validate_text(content, MAX_COMMENT_LENGTH)?;
        let repo = self.repo();

        let author = repo
            .author_of(comment_id)
            .await?
            .ok_or(StoreLensError::NotFound(ErrorMessage::ErrCommentNotFound))?;
        if author != user_id {
            return Err(not_allowed());
        }

        repo.update(comment_id, content).await?;
        Ok(())
    }

    pub async fn delete(&self, user_id: i64, role: Role, comment_id: i64) -> Result<()> {
        let repo = self.repo();

        let author = repo
            .author_of(comment_id)
            .await?
            .ok_or(StoreLensError::NotFound(ErrorMessage::ErrCommentNotFound))?;
        if author != user_id && !role.is_admin() {
            return Err(not_allowed());
        }

        repo.delete(comment_id).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{NewUser, UserRepository};

    async fn setup() -> (Database, i64, i64) {
        let db = Database::open_in_memory().await.unwrap();
        let repo = UserRepository::new(db.pool());
        let alice = repo
            .create(&NewUser::new("alice@example.com", "alice", "hash"))
            .await
            .unwrap();
        let bob = repo
            .create(&NewUser::new("bob@example.com", "bob", "hash"))
            .await
            .unwrap();
        (db, alice.id, bob.id)
    }

    #[tokio::test]
    async fn test_create_and_get_counts_views() {
        let (db, alice, _) = setup().await;
        let service = BoardService::new(&db);

        let id = service
            .create(alice, &PostDraft::new("Hello", "World"))
            .await
            .unwrap();
        assert_eq!(service.get(id).await.unwrap().views, 1);
        assert_eq!(service.get(id).await.unwrap().views, 2);
    }

    #[tokio::test]
    async fn test_get_missing() {
        let (db, _, _) = setup().await;
        let err = BoardService::new(&db).get(999).await.unwrap_err();
        assert_eq!(err.code(), ErrorMessage::ErrBoardNotFound);
    }

    #[tokio::test]
    async fn test_validation() {
        let (db, alice, _) = setup().await;
        let service = BoardService::new(&db);

        for draft in [
            PostDraft::new("   ", "body"),
            PostDraft::new("title", ""),
            PostDraft::new("x".repeat(MAX_TITLE_LENGTH + 1), "body"),
            PostDraft::new("title", "x".repeat(MAX_BODY_LENGTH + 1)),
        ] {
            let err = service.create(alice, &draft).await.unwrap_err();
            assert_eq!(err.code(), ErrorMessage::ErrInvalidRequestField);
        }
        assert!(service
            .create(alice, &PostDraft::new("x".repeat(MAX_TITLE_LENGTH), "ok"))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_pages() {
        let (db, alice, _) = setup().await;
        let service = BoardService::new(&db);
        assert_eq!(service.page_count().await.unwrap(), 0);

        for i in 0..11 {
            service
                .create(alice, &PostDraft::new(format!("p{i}"), "c"))
                .await
                .unwrap();
        }
        assert_eq!(service.page_count().await.unwrap(), 2);
        assert_eq!(service.list_page(1).await.unwrap().len(), 10);
        assert_eq!(service.list_page(2).await.unwrap().len(), 1);
        assert!(service.list_page(3).await.unwrap().is_empty());

        let err = service.list_page(0).await.unwrap_err();
        assert_eq!(err.code(), ErrorMessage::ErrInvalidQueryParameter);
    }

    #[tokio::test]
    async fn test_update_author_only() {
        let (db, alice, bob) = setup().await;
        let service = BoardService::new(&db);
        let id = service
            .create(alice, &PostDraft::new("t", "c"))
            .await
            .unwrap();

        let err = service
            .update(bob, id, &PostDraft::new("hijack", "c"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorMessage::ErrNotAllowedUser);

        service
            .update(alice, id, &PostDraft::new("edited", "c"))
            .await
            .unwrap();
        assert_eq!(service.get(id).await.unwrap().title, "edited");
    }

    #[tokio::test]
    async fn test_delete_author_or_admin() {
        let (db, alice, bob) = setup().await;
        let service = BoardService::new(&db);
        let first = service
            .create(alice, &PostDraft::new("a", "c"))
            .await
            .unwrap();
        let second = service
            .create(alice, &PostDraft::new("b", "c"))
            .await
            .unwrap();

        let err = service.delete(bob, Role::User, first).await.unwrap_err();
        assert_eq!(err.code(), ErrorMessage::ErrNotAllowedUser);

        service.delete(alice, Role::User, first).await.unwrap();
        service.delete(bob, Role::Admin, second).await.unwrap();

        let err = service.delete(alice, Role::User, first).await.unwrap_err();
        assert_eq!(err.code(), ErrorMessage::ErrBoardNotFound);
    }

    #[tokio::test]
    async fn test_comment_lifecycle() {
        let (db, alice, bob) = setup().await;
        let board_id = BoardService::new(&db)
            .create(alice, &PostDraft::new("t", "c"))
            .await
            .unwrap();
        let comments = CommentService::new(&db);

        let id = comments.create(bob, board_id, "nice post").await.unwrap();
        assert_eq!(comments.list(board_id).await.unwrap().len(), 1);

        let err = comments.update(alice, id, "edited").await.unwrap_err();
        assert_eq!(err.code(), ErrorMessage::ErrNotAllowedUser);
        comments.update(bob, id, "edited").await.unwrap();
        assert_eq!(comments.list(board_id).await.unwrap()[0].content, "edited");

        let err = comments.delete(alice, Role::User, id).await.unwrap_err();
        assert_eq!(err.code(), ErrorMessage::ErrNotAllowedUser);
        comments.delete(alice, Role::Admin, id).await.unwrap();
        assert!(comments.list(board_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_comment_missing_targets() {
        let (db, alice, _) = setup().await;
        let comments = CommentService::new(&db);

        let err = comments.list(404).await.unwrap_err();
        assert_eq!(err.code(), ErrorMessage::ErrBoardNotFound);

        let err = comments.create(alice, 404, "hello").await.unwrap_err();
        assert_eq!(err.code(), ErrorMessage::ErrBoardNotFound);

        let err = comments.update(alice, 404, "hello").await.unwrap_err();
        assert_eq!(err.code(), ErrorMessage::ErrCommentNotFound);

        let err = comments.delete(alice, Role::User, 404).await.unwrap_err();
        assert_eq!(err.code(), ErrorMessage::ErrCommentNotFound);
    }
}
