//! Request DTOs for the account, board and notice endpoints.

use serde::Deserialize;
use validator::Validate;

use super::validation::{no_control_chars, single_line_name, visible_text};

/// Name availability check and name change.
#[derive(Debug, Deserialize, Validate)]
pub struct NameRequest {
    #[validate(length(min = 1, max = 20), custom(function = "single_line_name"))]
    pub name: String,
}

/// Email signup.
#[derive(Debug, Deserialize, Validate)]
pub struct SignUpRequest {
    #[validate(email, length(max = 254))]
    pub mail: String,
    #[validate(length(min = 1, max = 20), custom(function = "single_line_name"))]
    pub name: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

/// Email login.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 254))]
    pub mail: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

/// Password reset with an emailed code.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordRequest {
    #[validate(email)]
    pub mail: String,
    pub user_number: u32,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

/// Verification code request.
#[derive(Debug, Deserialize, Validate)]
pub struct MailRequest {
    #[validate(email, length(max = 254))]
    pub mail: String,
}

/// Verification code check.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MailVerifyRequest {
    #[validate(email)]
    pub mail: String,
    pub user_number: u32,
}

/// Board post or notice body.
#[derive(Debug, Deserialize, Validate)]
pub struct PostRequest {
    #[validate(length(min = 1, max = 50), custom(function = "visible_text"))]
    pub title: String,
    #[validate(length(min = 1, max = 10000), custom(function = "no_control_chars"))]
    pub content: String,
}

/// Comment body.
#[derive(Debug, Deserialize, Validate)]
pub struct CommentRequest {
    #[validate(length(min = 1, max = 1000), custom(function = "visible_text"))]
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_update_password_uses_camel_case() {
        let req: UpdatePasswordRequest = serde_json::from_value(json!({
            "mail": "owner@example.com",
            "userNumber": 123456,
            "password": "new-password"
        }))
        .unwrap();
        assert_eq!(req.user_number, 123456);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_signup_rejects_bad_mail_and_short_password() {
        let req: SignUpRequest = serde_json::from_value(json!({
            "mail": "not-a-mail",
            "name": "owner",
            "password": "short"
        }))
        .unwrap();
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("mail"));
        assert!(fields.contains_key("password"));
        assert!(!fields.contains_key("name"));
    }

    #[test]
    fn test_post_request_limits() {
        let ok = PostRequest {
            title: "영업시간 안내".to_string(),
            content: "첫 줄\n둘째 줄".to_string(),
        };
        assert!(ok.validate().is_ok());

        let blank = PostRequest {
            title: "   ".to_string(),
            content: "body".to_string(),
        };
        assert!(blank.validate().is_err());

        let long = PostRequest {
            title: "t".repeat(51),
            content: "body".to_string(),
        };
        assert!(long.validate().is_err());
    }
}
