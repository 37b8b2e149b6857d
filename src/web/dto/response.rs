//! Response DTOs for the account, board and notice endpoints.

use serde::Serialize;

use crate::board::{BoardPost, Comment};
use crate::notice::Notice;
use crate::user::{LoginOutcome, UserInfo};

/// Login response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Access token (JWT).
    pub access_token: String,
    /// Encrypted user id.
    pub user_id: String,
    pub user_name: String,
    pub user_profile_url: Option<String>,
    pub user_role: String,
}

impl From<LoginOutcome> for LoginResponse {
    fn from(outcome: LoginOutcome) -> Self {
        Self {
            access_token: outcome.access_token,
            user_id: outcome.encrypted_user_id,
            user_name: outcome.name,
            user_profile_url: outcome.profile_img_url,
            user_role: outcome.role.as_str().to_string(),
        }
    }
}

/// Account details of the caller.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfoResponse {
    pub user_type: String,
    pub mail: String,
    pub name: String,
    pub profile_img_url: Option<String>,
}

impl From<UserInfo> for UserInfoResponse {
    fn from(info: UserInfo) -> Self {
        Self {
            user_type: info.user_type.as_str().to_string(),
            mail: info.mail,
            name: info.name,
            profile_img_url: info.profile_img_url,
        }
    }
}

// ============================================================================
// Board DTOs
// ============================================================================

/// Board post.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardResponse {
    pub board_id: i64,
    /// Author name.
    pub name: String,
    pub title: String,
    pub content: String,
    pub views: i64,
    pub created_at: String,
}

impl From<BoardPost> for BoardResponse {
    fn from(post: BoardPost) -> Self {
        Self {
            board_id: post.id,
            name: post.name,
            title: post.title,
            content: post.content,
            views: post.views,
            created_at: post.created_at,
        }
    }
}

/// Comment on a board post.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub comment_id: i64,
    pub name: String,
    pub content: String,
    pub created_at: String,
}

impl From<Comment> for CommentResponse {
    fn from(comment: Comment) -> Self {
        Self {
            comment_id: comment.id,
            name: comment.name,
            content: comment.content,
            created_at: comment.created_at,
        }
    }
}

// ============================================================================
// Notice DTOs
// ============================================================================

/// Notice. `name` is null once the author account is gone.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoticeResponse {
    pub notice_id: i64,
    pub name: Option<String>,
    pub title: String,
    pub content: String,
    pub views: i64,
    pub created_at: String,
}

impl From<Notice> for NoticeResponse {
    fn from(notice: Notice) -> Self {
        Self {
            notice_id: notice.id,
            name: notice.name,
            title: notice.title,
            content: notice.content,
            views: notice.views,
            created_at: notice.created_at,
        }
    }
}

// ============================================================================
// Shared
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageCountResponse {
    pub page_count: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertedIdResponse {
    pub inserted_id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Role;
    use serde_json::json;

    #[test]
    fn test_login_response_wire_names() {
        let response = LoginResponse::from(LoginOutcome {
            access_token: "jwt".to_string(),
            encrypted_user_id: "enc".to_string(),
            name: "owner".to_string(),
            profile_img_url: None,
            role: Role::Admin,
        });
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({
                "accessToken": "jwt",
                "userId": "enc",
                "userName": "owner",
                "userProfileUrl": null,
                "userRole": "ADMIN"
            })
        );
    }

    #[test]
    fn test_board_response_wire_names() {
        let response = BoardResponse::from(BoardPost {
            id: 3,
            user_id: 1,
            name: "owner".to_string(),
            title: "hello".to_string(),
            content: "body".to_string(),
            views: 2,
            created_at: "2024-05-01 10:00:00".to_string(),
            updated_at: "2024-05-01 10:00:00".to_string(),
        });
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["boardId"], 3);
        assert_eq!(value["createdAt"], "2024-05-01 10:00:00");
        assert!(value.get("userId").is_none());
    }
}
