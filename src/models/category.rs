//! Category model and request DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::models::user::HEX_COLOR_RE;

/// Full category row from database.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub color: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Category with aggregated todo counts, as returned by list/show.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CategoryWithCounts {
    pub id: Uuid,
    pub name: String,
    pub color: String,
    pub total_todos: i64,
    pub completed_todos: i64,
    pub pending_todos: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCategory {
    #[validate(length(min = 1, max = 255, message = "name must be 1-255 characters"))]
    pub name: String,
    #[validate(regex(path = *HEX_COLOR_RE, message = "color must be a #RRGGBB hex color"))]
    pub color: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, Default)]
pub struct UpdateCategory {
    #[validate(length(min = 1, max = 255, message = "name must be 1-255 characters"))]
    pub name: Option<String>,
    #[validate(regex(path = *HEX_COLOR_RE, message = "color must be a #RRGGBB hex color"))]
    pub color: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_category_accepts_valid_color() {
        let input = CreateCategory {
            name: "Work".to_string(),
            color: Some("#FF8800".to_string()),
        };
        assert!(input.validate().is_ok());
    }

    #[test]
    fn create_category_rejects_bad_color() {
        let input = CreateCategory {
            name: "Work".to_string(),
            color: Some("#FF88".to_string()),
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn update_category_allows_partial_body() {
        let input = UpdateCategory {
            name: None,
            color: None,
        };
        assert!(input.validate().is_ok());
    }
}
