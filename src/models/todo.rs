//! Todo model, priority enum, and request DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Todo priority. Declared low -> high to match the Postgres enum, so
/// `ORDER BY priority DESC` puts high-priority todos first.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "todo_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

/// Full todo row from database.
#[derive(Debug, Clone, FromRow)]
pub struct Todo {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub due_date: Option<DateTime<Utc>>,
    pub is_completed: bool,
    pub is_overdue: bool,
    pub category_id: Option<Uuid>,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Todo response DTO with its category joined in.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TodoWithCategory {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub due_date: Option<DateTime<Utc>>,
    pub is_completed: bool,
    pub is_overdue: bool,
    pub category_id: Option<Uuid>,
    pub category_name: Option<String>,
    pub category_color: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTodo {
    #[validate(length(min = 1, max = 255, message = "title must be 1-255 characters"))]
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub due_date: Option<DateTime<Utc>>,
    pub category_id: Option<Uuid>,
}

#[derive(Debug, Clone, Deserialize, Validate, Default)]
pub struct UpdateTodo {
    #[validate(length(min = 1, max = 255, message = "title must be 1-255 characters"))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub due_date: Option<DateTime<Utc>>,
    pub is_completed: Option<bool>,
    pub category_id: Option<Uuid>,
}

/// Completion-status filter for the todo list.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    Completed,
    Pending,
    All,
}

/// Due-date window filter for the todo list.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DueFilter {
    Today,
    Week,
    Overdue,
    Upcoming,
}

/// Query-string filters for listing todos.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct TodoFilters {
    pub search: Option<String>,
    pub status: Option<StatusFilter>,
    pub priority: Option<Priority>,
    pub category_id: Option<Uuid>,
    pub due: Option<DueFilter>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Priority::High).unwrap(), "\"high\"");
        let parsed: Priority = serde_json::from_str("\"medium\"").unwrap();
        assert_eq!(parsed, Priority::Medium);
    }

    #[test]
    fn priority_as_str_matches_serde() {
        for p in [Priority::Low, Priority::Medium, Priority::High] {
            assert_eq!(
                serde_json::to_string(&p).unwrap(),
                format!("\"{}\"", p.as_str())
            );
        }
    }

    #[test]
    fn create_todo_rejects_empty_title() {
        let input = CreateTodo {
            title: String::new(),
            description: None,
            priority: None,
            due_date: None,
            category_id: None,
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn create_todo_rejects_overlong_title() {
        let input = CreateTodo {
            title: "x".repeat(256),
            description: None,
            priority: None,
            due_date: None,
            category_id: None,
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn filters_deserialize_from_query_values() {
        let f: TodoFilters =
            serde_json::from_str(r#"{"status":"pending","due":"week","priority":"high"}"#).unwrap();
        assert_eq!(f.status, Some(StatusFilter::Pending));
        assert_eq!(f.due, Some(DueFilter::Week));
        assert_eq!(f.priority, Some(Priority::High));
    }
}
