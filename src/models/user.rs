//! User model with profile settings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::sync::LazyLock;
use uuid::Uuid;
use validator::Validate;

/// Accent color format shared by profile settings and categories.
pub static HEX_COLOR_RE: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(r"^#[0-9A-Fa-f]{6}$").unwrap());

/// UI font size preference.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "font_size", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FontSize {
    Small,
    Medium,
    Large,
}

/// Full user row from database (includes password_hash — never serialize to API).
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub avatar: Option<String>,
    pub email_notifications: bool,
    pub timezone: String,
    pub theme_color: String,
    pub font_size: FontSize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User response DTO — excludes password_hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub avatar: Option<String>,
    pub email_notifications: bool,
    pub timezone: String,
    pub theme_color: String,
    pub font_size: FontSize,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
            avatar: u.avatar,
            email_notifications: u.email_notifications,
            timezone: u.timezone,
            theme_color: u.theme_color,
            font_size: u.font_size,
            created_at: u.created_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterUser {
    #[validate(length(min = 1, max = 255, message = "name must be 1-255 characters"))]
    pub name: String,
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate, Default)]
pub struct UpdateProfile {
    #[validate(length(min = 1, max = 255, message = "name must be 1-255 characters"))]
    pub name: Option<String>,
    #[validate(email(message = "email must be a valid address"))]
    pub email: Option<String>,
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ChangePassword {
    pub current_password: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate, Default)]
pub struct UpdateSettings {
    pub email_notifications: Option<bool>,
    #[validate(length(min = 1, max = 64, message = "timezone must be 1-64 characters"))]
    pub timezone: Option<String>,
    #[validate(regex(path = *HEX_COLOR_RE, message = "theme_color must be a #RRGGBB hex color"))]
    pub theme_color: Option<String>,
    pub font_size: Option<FontSize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: Uuid::nil(),
            name: "Ari".to_string(),
            email: "ari@example.com".to_string(),
            password_hash: "secret_hash".to_string(),
            avatar: None,
            email_notifications: true,
            timezone: "Asia/Jakarta".to_string(),
            theme_color: "#3B82F6".to_string(),
            font_size: FontSize::Medium,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn user_response_excludes_password() {
        let json = serde_json::to_string(&UserResponse::from(sample_user())).unwrap();
        assert!(!json.contains("password"));
        assert!(!json.contains("hash"));
    }

    #[test]
    fn font_size_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&FontSize::Large).unwrap(), "\"large\"");
    }

    #[test]
    fn register_rejects_short_password() {
        let input = RegisterUser {
            name: "Ari".to_string(),
            email: "ari@example.com".to_string(),
            password: "short".to_string(),
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn settings_reject_bad_hex_color() {
        let input = UpdateSettings {
            theme_color: Some("blue".to_string()),
            ..Default::default()
        };
        assert!(input.validate().is_err());

        let ok = UpdateSettings {
            theme_color: Some("#AB12ef".to_string()),
            ..Default::default()
        };
        assert!(ok.validate().is_ok());
    }
}
