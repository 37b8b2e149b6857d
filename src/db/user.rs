//! User model for StoreLens.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};

/// User role for permission checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    /// Regular member.
    #[default]
    User,
    /// Administrator. May manage notices and moderate posts.
    Admin,
}

impl Role {
    /// Database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Admin => "ADMIN",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "USER" => Ok(Role::User),
            "ADMIN" => Ok(Role::Admin),
            _ => Err(format!("unknown role: {s}")),
        }
    }
}

/// How the account was created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserType {
    #[default]
    Email,
    Kakao,
}

impl UserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::Email => "EMAIL",
            UserType::Kakao => "KAKAO",
        }
    }
}

impl FromStr for UserType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "EMAIL" => Ok(UserType::Email),
            "KAKAO" => Ok(UserType::Kakao),
            _ => Err(format!("unknown user type: {s}")),
        }
    }
}

/// A registered user.
#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    /// Login mail address (unique, case-insensitive).
    pub mail: String,
    /// Display name (unique).
    pub name: String,
    /// Argon2 PHC hash.
    pub password: String,
    pub profile_img_url: Option<String>,
    pub user_type: UserType,
    pub role: Role,
    pub created_at: String,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

fn decode_enum<T: FromStr<Err = String>>(row: &SqliteRow, column: &str) -> sqlx::Result<T> {
    let raw: String = row.try_get(column)?;
    raw.parse().map_err(|e: String| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: e.into(),
    })
}

impl<'r> FromRow<'r, SqliteRow> for User {
    fn from_row(row: &'r SqliteRow) -> sqlx::Result<Self> {
        Ok(Self {
            id: row.try_get("id")?,
            mail: row.try_get("mail")?,
            name: row.try_get("name")?,
            password: row.try_get("password")?,
            profile_img_url: row.try_get("profile_img_url")?,
            user_type: decode_enum(row, "user_type")?,
            role: decode_enum(row, "user_role")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

/// Data for creating a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub mail: String,
    pub name: String,
    /// Already hashed.
    pub password: String,
    pub user_type: UserType,
    pub role: Role,
}

impl NewUser {
    /// A regular mail-registered member.
    pub fn new(
        mail: impl Into<String>,
        name: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        Self {
            mail: mail.into(),
            name: name.into(),
            password: password_hash.into(),
            user_type: UserType::Email,
            role: Role::User,
        }
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip_strings() {
        assert_eq!("USER".parse::<Role>().unwrap(), Role::User);
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert!("sysop".parse::<Role>().is_err());
        assert_eq!(Role::Admin.to_string(), "ADMIN");
    }

    #[test]
    fn test_role_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"ADMIN\"");
        assert_eq!(serde_json::to_string(&UserType::Kakao).unwrap(), "\"KAKAO\"");
    }

    #[test]
    fn test_user_type_parse() {
        assert_eq!("EMAIL".parse::<UserType>().unwrap(), UserType::Email);
        assert!("GOOGLE".parse::<UserType>().is_err());
    }

    #[test]
    fn test_new_user_defaults() {
        let user = NewUser::new("a@b.com", "alice", "hash");
        assert_eq!(user.role, Role::User);
        assert_eq!(user.user_type, UserType::Email);
        assert_eq!(user.with_role(Role::Admin).role, Role::Admin);
    }
}
