//! User repository for StoreLens.

use super::user::{NewUser, Role, User};
use super::DbPool;
use crate::{ErrorMessage, Result, StoreLensError};

const USER_COLUMNS: &str =
    "id, mail, name, password, profile_img_url, user_type, user_role, created_at";

/// Map a write failure, turning unique violations on `users` into duplicate codes.
fn write_error(e: sqlx::Error) -> StoreLensError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            let message = db_err.message();
            if message.contains("users.mail") {
                return StoreLensError::BadRequest(ErrorMessage::ErrUserDuplicate);
            }
            if message.contains("users.name") {
                return StoreLensError::BadRequest(ErrorMessage::ErrNameDuplicate);
            }
        }
    }
    StoreLensError::Database(e.to_string())
}

/// Repository for user CRUD operations.
pub struct UserRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> UserRepository<'a> {
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Insert a new user and return it with its assigned ID.
    pub async fn create(&self, new_user: &NewUser) -> Result<User> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO users (mail, name, password, user_type, user_role)
             VALUES (?, ?, ?, ?, ?) RETURNING id",
        )
        .bind(&new_user.mail)
        .bind(&new_user.name)
        .bind(&new_user.password)
        .bind(new_user.user_type.as_str())
        .bind(new_user.role.as_str())
        .fetch_one(self.pool)
        .await
        .map_err(write_error)?;

        self.get_by_id(id)
            .await?
            .ok_or(StoreLensError::NotFound(ErrorMessage::ErrNotFoundUser))
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await
            .map_err(|e| StoreLensError::Database(e.to_string()))?;
        Ok(user)
    }

    /// Look up a user by mail (case-insensitive).
    pub async fn get_by_mail(&self, mail: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE mail = ? COLLATE NOCASE");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(mail)
            .fetch_optional(self.pool)
            .await
            .map_err(|e| StoreLensError::Database(e.to_string()))?;
        Ok(user)
    }

    pub async fn get_by_name(&self, name: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE name = ?");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(name)
            .fetch_optional(self.pool)
            .await
            .map_err(|e| StoreLensError::Database(e.to_string()))?;
        Ok(user)
    }

    pub async fn name_exists(&self, name: &str) -> Result<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE name = ?)")
            .bind(name)
            .fetch_one(self.pool)
            .await
            .map_err(|e| StoreLensError::Database(e.to_string()))?;
        Ok(exists)
    }

    pub async fn mail_exists(&self, mail: &str) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM users WHERE mail = ? COLLATE NOCASE)",
        )
        .bind(mail)
        .fetch_one(self.pool)
        .await
        .map_err(|e| StoreLensError::Database(e.to_string()))?;
        Ok(exists)
    }

    /// Returns false when no user has the given ID.
    pub async fn update_name(&self, id: i64, name: &str) -> Result<bool> {
        let result = sqlx::query("UPDATE users SET name = ? WHERE id = ?")
            .bind(name)
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(write_error)?;
        Ok(result.rows_affected() > 0)
    }

    /// Returns false when no user has the given mail.
    pub async fn update_password_by_mail(&self, mail: &str, password_hash: &str) -> Result<bool> {
        let result = sqlx::query("UPDATE users SET password = ? WHERE mail = ? COLLATE NOCASE")
            .bind(password_hash)
            .bind(mail)
            .execute(self.pool)
            .await
            .map_err(|e| StoreLensError::Database(e.to_string()))?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn update_role(&self, id: i64, role: Role) -> Result<bool> {
        let result = sqlx::query("UPDATE users SET user_role = ? WHERE id = ?")
            .bind(role.as_str())
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| StoreLensError::Database(e.to_string()))?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a user. Their posts and comments go with them; notices are kept.
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| StoreLensError::Database(e.to_string()))?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{Database, UserType};

    async fn setup_db() -> Database {
        Database::open_in_memory().await.unwrap()
    }

    #[tokio::test]
    async fn test_create_and_get_user() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());

        let user = repo
            .create(&NewUser::new("alice@example.com", "alice", "hash"))
            .await
            .unwrap();

        assert!(user.id > 0);
        assert_eq!(user.mail, "alice@example.com");
        assert_eq!(user.name, "alice");
        assert_eq!(user.role, Role::User);
        assert_eq!(user.user_type, UserType::Email);
        assert!(user.profile_img_url.is_none());

        let fetched = repo.get_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "alice");
    }

    #[tokio::test]
    async fn test_get_by_mail_case_insensitive() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());
        repo.create(&NewUser::new("bob@example.com", "bob", "hash"))
            .await
            .unwrap();

        let user = repo.get_by_mail("BOB@Example.com").await.unwrap();
        assert!(user.is_some());
        assert!(repo.mail_exists("Bob@example.com").await.unwrap());
        assert!(repo.get_by_mail("nobody@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_name_exists() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());
        repo.create(&NewUser::new("c@example.com", "carol", "hash"))
            .await
            .unwrap();

        assert!(repo.name_exists("carol").await.unwrap());
        assert!(!repo.name_exists("dave").await.unwrap());
        assert!(repo.get_by_name("carol").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_duplicate_mail_rejected() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());
        repo.create(&NewUser::new("dup@example.com", "one", "hash"))
            .await
            .unwrap();

        let err = repo
            .create(&NewUser::new("DUP@example.com", "two", "hash"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreLensError::BadRequest(_)));
        assert_eq!(err.code(), ErrorMessage::ErrUserDuplicate);
    }

    #[tokio::test]
    async fn test_duplicate_name_rejected() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());
        repo.create(&NewUser::new("one@example.com", "same", "hash"))
            .await
            .unwrap();
        let other = repo
            .create(&NewUser::new("two@example.com", "other", "hash"))
            .await
            .unwrap();

        let err = repo
            .create(&NewUser::new("three@example.com", "same", "hash"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorMessage::ErrNameDuplicate);

        let err = repo.update_name(other.id, "same").await.unwrap_err();
        assert_eq!(err.code(), ErrorMessage::ErrNameDuplicate);
    }

    #[tokio::test]
    async fn test_update_name_and_password() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());
        let user = repo
            .create(&NewUser::new("e@example.com", "erin", "old"))
            .await
            .unwrap();

        assert!(repo.update_name(user.id, "erin2").await.unwrap());
        assert!(repo
            .update_password_by_mail("E@example.com", "new")
            .await
            .unwrap());
        assert!(!repo
            .update_password_by_mail("missing@example.com", "new")
            .await
            .unwrap());

        let user = repo.get_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(user.name, "erin2");
        assert_eq!(user.password, "new");
    }

    #[tokio::test]
    async fn test_update_role() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());
        let user = repo
            .create(&NewUser::new("f@example.com", "frank", "hash"))
            .await
            .unwrap();

        assert!(repo.update_role(user.id, Role::Admin).await.unwrap());
        let user = repo.get_by_id(user.id).await.unwrap().unwrap();
        assert!(user.is_admin());
    }

    #[tokio::test]
    async fn test_delete_user() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());
        let user = repo
            .create(&NewUser::new("g@example.com", "grace", "hash"))
            .await
            .unwrap();

        assert!(repo.delete(user.id).await.unwrap());
        assert!(!repo.delete(user.id).await.unwrap());
        assert!(repo.get_by_id(user.id).await.unwrap().is_none());
    }
}
