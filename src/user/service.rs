//! User account service.

use tracing::{error, info};

use crate::auth::{
    hash_password, verify_password, IdCipher, PasswordError, TokenIssuer, VerificationStore,
};
use crate::db::{Database, NewUser, Role, User, UserRepository, UserType};
use crate::{ErrorMessage, Result, StoreLensError};

/// Successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub access_token: String,
    pub encrypted_user_id: String,
    pub name: String,
    pub profile_img_url: Option<String>,
    pub role: Role,
}

/// Profile returned to the account owner.
#[derive(Debug, Clone)]
pub struct UserInfo {
    pub user_type: UserType,
    pub mail: String,
    pub name: String,
    pub profile_img_url: Option<String>,
}

fn normalize_mail(mail: &str) -> String {
    mail.trim().to_lowercase()
}

/// Argon2 is CPU bound; keep it off the async workers.
async fn hash_blocking(password: String) -> Result<String> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| {
            error!(error = %e, "password hashing task failed");
            StoreLensError::Internal(ErrorMessage::ErrInternalServerError)
        })?
        .map_err(|e| match e {
            PasswordError::TooShort | PasswordError::TooLong => {
                StoreLensError::BadRequest(ErrorMessage::ErrInvalidRequestField)
            }
            other => {
                error!(error = %other, "password hashing failed");
                StoreLensError::Internal(ErrorMessage::ErrInternalServerError)
            }
        })
}

async fn verify_blocking(password: String, hash: String) -> Result<bool> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash).is_ok())
        .await
        .map_err(|e| {
            error!(error = %e, "password verification task failed");
            StoreLensError::Internal(ErrorMessage::ErrInternalServerError)
        })
}

/// Signup, login and account management.
pub struct UserService<'a> {
    db: &'a Database,
}

impl<'a> UserService<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    fn repo(&self) -> UserRepository<'_> {
        UserRepository::new(self.db.pool())
    }

    /// Fails with `ERR_NAME_DUPLICATE` when the name is taken.
    pub async fn check_name(&self, name: &str) -> Result<()> {
        if self.repo().name_exists(name.trim()).await? {
            return Err(StoreLensError::BadRequest(ErrorMessage::ErrNameDuplicate));
        }
        Ok(())
    }

    pub async fn sign_up(&self, mail: &str, name: &str, password: &str) -> Result<User> {
        let mail = normalize_mail(mail);
        let name = name.trim();

        if self.repo().mail_exists(&mail).await? {
            return Err(StoreLensError::BadRequest(ErrorMessage::ErrUserDuplicate));
        }
        self.check_name(name).await?;

        let hash = hash_blocking(password.to_string()).await?;
        let user = self.repo().create(&NewUser::new(mail, name, hash)).await?;

        info!(user_id = user.id, "user signed up");
        Ok(user)
    }

    pub async fn login(
        &self,
        mail: &str,
        password: &str,
        tokens: &TokenIssuer,
        ids: &IdCipher,
    ) -> Result<LoginOutcome> {
        let user = self
            .repo()
            .get_by_mail(&normalize_mail(mail))
            .await?
            .ok_or(StoreLensError::BadRequest(ErrorMessage::ErrLoginFailed))?;

        if !verify_blocking(password.to_string(), user.password.clone()).await? {
            return Err(StoreLensError::BadRequest(ErrorMessage::ErrLoginFailed));
        }

        let access_token = tokens.issue(user.id)?;
        let encrypted_user_id = ids.encrypt(user.id).map_err(|e| {
            error!(error = %e, user_id = user.id, "failed to encrypt user id");
            StoreLensError::Internal(ErrorMessage::ErrInternalServerEncryptionError)
        })?;

        info!(user_id = user.id, "user logged in");
        Ok(LoginOutcome {
            access_token,
            encrypted_user_id,
            name: user.name,
            profile_img_url: user.profile_img_url,
            role: user.role,
        })
    }

    pub async fn update_name(&self, user_id: i64, name: &str) -> Result<()> {
        let name = name.trim();
        self.check_name(name).await?;

        if !self.repo().update_name(user_id, name).await? {
            return Err(StoreLensError::NotFound(ErrorMessage::ErrNotFoundUser));
        }
        Ok(())
    }

    /// Reset a password with an emailed code. The code is consumed on success.
    pub async fn update_password(
        &self,
        mail: &str,
        code: u32,
        password: &str,
        codes: &VerificationStore,
    ) -> Result<()> {
        let mail = normalize_mail(mail);
        // The code gates everything else, including the account lookup.
        if !codes.consume(&mail, code) {
            return Err(StoreLensError::BadRequest(ErrorMessage::ErrInvalidMailNumber));
        }
        if !self.repo().mail_exists(&mail).await? {
            return Err(StoreLensError::NotFound(ErrorMessage::ErrNotFoundUser));
        }

        let hash = hash_blocking(password.to_string()).await?;
        self.repo().update_password_by_mail(&mail, &hash).await?;
        info!("password reset completed");
        Ok(())
    }

    pub async fn get_info(&self, user_id: i64) -> Result<UserInfo> {
        let user = self
            .repo()
            .get_by_id(user_id)
            .await?
            .ok_or(StoreLensError::NotFound(ErrorMessage::ErrNotFoundUser))?;

        Ok(UserInfo {
            user_type: user.user_type,
            mail: user.mail,
            name: user.name,
            profile_img_url: user.profile_img_url,
        })
    }

    pub async fn delete(&self, user_id: i64) -> Result<()> {
        if !self.repo().delete(user_id).await? {
            return Err(StoreLensError::NotFound(ErrorMessage::ErrNotFoundUser));
        }
        info!(user_id, "user deleted");
        Ok(())
    }

    /// Ensure the configured administrator exists.
    ///
    /// Creates the account on first start, or promotes an existing account
    /// with the same mail. The stored password is never overwritten.
    pub async fn bootstrap_admin(&self, mail: &str, name: &str, password: &str) -> Result<User> {
        let mail = normalize_mail(mail);
        let repo = self.repo();

        if let Some(user) = repo.get_by_mail(&mail).await? {
            if !user.is_admin() {
                repo.update_role(user.id, Role::Admin).await?;
                info!(user_id = user.id, "promoted existing user to admin");
            }
            return repo
                .get_by_id(user.id)
                .await?
                .ok_or(StoreLensError::NotFound(ErrorMessage::ErrNotFoundUser));
        }

        let hash = hash_blocking(password.to_string()).await.map_err(|e| {
            StoreLensError::Config(format!("admin password rejected: {e}"))
        })?;
        let user = repo
            .create(&NewUser::new(mail, name.trim(), hash).with_role(Role::Admin))
            .await?;
        info!(user_id = user.id, "created admin account");
        Ok(user)
    }
}
